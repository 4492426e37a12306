// Blocking subprocess runner for external collaborators.
//
// The transducer lookup and constraint-grammar engines run as external
// programs that read a stream on stdin and answer on stdout. A call blocks
// until the program exits or the configured timeout elapses.

use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::{Result, UdarError};

/// Default time a collaborator process may take to answer.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// How to invoke one external program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessConfig {
    /// Executable name (looked up on `PATH`) or path.
    pub program: PathBuf,
    /// Arguments passed before any input.
    pub args: Vec<String>,
    /// Maximum wall-clock time for one call.
    pub timeout: Duration,
}

impl ProcessConfig {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Name used in error messages.
    pub fn display_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.program.display().to_string())
    }
}

/// Run the program once, feeding `input` on stdin, and return its stdout.
///
/// Fails with [`UdarError::CollaboratorUnavailable`] if the program cannot
/// be started or exits unsuccessfully, and with
/// [`UdarError::CollaboratorTimeout`] if it does not finish in time (the
/// process is killed).
pub fn run(config: &ProcessConfig, input: &str) -> Result<String> {
    let name = config.display_name();
    let mut child = Command::new(&config.program)
        .args(&config.args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| UdarError::unavailable(&name, e))?;

    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| UdarError::unavailable(&name, "stdin not captured"))?;
    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| UdarError::unavailable(&name, "stdout not captured"))?;
    let mut stderr = child
        .stderr
        .take()
        .ok_or_else(|| UdarError::unavailable(&name, "stderr not captured"))?;

    // Feed and drain on helper threads so a full pipe cannot deadlock us.
    let input = input.to_owned();
    let writer = thread::spawn(move || stdin.write_all(input.as_bytes()));
    let out_reader = thread::spawn(move || {
        let mut buf = String::new();
        stdout.read_to_string(&mut buf).map(|_| buf)
    });
    let err_reader = thread::spawn(move || {
        let mut buf = String::new();
        stderr.read_to_string(&mut buf).map(|_| buf)
    });

    let deadline = Instant::now() + config.timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(UdarError::CollaboratorTimeout {
                    collaborator: name,
                    timeout: config.timeout,
                });
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => return Err(UdarError::unavailable(&name, e)),
        }
    };

    let write_result = writer
        .join()
        .map_err(|_| UdarError::unavailable(&name, "stdin writer panicked"))?;
    let output = out_reader
        .join()
        .map_err(|_| UdarError::unavailable(&name, "stdout reader panicked"))?
        .map_err(|e| UdarError::unavailable(&name, e))?;
    let errors = err_reader
        .join()
        .map_err(|_| UdarError::unavailable(&name, "stderr reader panicked"))?
        .unwrap_or_default();

    if !status.success() {
        return Err(UdarError::unavailable(
            &name,
            format!("exited with {status}: {}", errors.trim()),
        ));
    }
    // A program may legitimately stop reading early (broken pipe) and still
    // succeed; only report the write error if nothing came back.
    if let Err(e) = write_result {
        if output.is_empty() {
            return Err(UdarError::unavailable(&name, e));
        }
    }
    if !errors.trim().is_empty() {
        debug!(collaborator = %name, stderr = %errors.trim(), "collaborator wrote to stderr");
    }
    Ok(output)
}
