// hfst-lookup process backend.
//
// Each call pipes one wordform (or analysis string, for generation) per
// line into `hfst-lookup` and reads back its Xerox-style answer: one
// `input<TAB>output<TAB>weight` line per result, results for one input
// followed by a blank line. Inputs the transducer does not know come back
// as `input<TAB>input+?<TAB>inf`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;
use udar_core::process::{self, ProcessConfig};
use udar_core::reading::UNKNOWN_SUFFIX;
use udar_core::{Result, UdarError};

use crate::{Analyzer, Generator, RawAnalysis, analysis_str, parse_weight};

/// Default executable name, looked up on `PATH`.
pub const DEFAULT_PROGRAM: &str = "hfst-lookup";

/// Results for one input line of a lookup call.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupBlock {
    pub input: String,
    /// `(output, weight)` pairs in transducer order, unknown markers kept.
    pub results: Vec<(String, f64)>,
}

impl LookupBlock {
    /// Results other than the `+?` unknown marker.
    pub fn known(&self) -> impl Iterator<Item = &(String, f64)> {
        self.results.iter().filter(|(out, _)| !out.ends_with(UNKNOWN_SUFFIX))
    }
}

/// Parse `hfst-lookup` output into one block per input line.
pub fn parse_lookup_output(output: &str) -> Result<Vec<LookupBlock>> {
    let mut blocks = Vec::new();
    let mut current: Option<LookupBlock> = None;

    for (index, line) in output.lines().enumerate() {
        let line_no = index + 1;
        if line.trim().is_empty() {
            if let Some(block) = current.take() {
                blocks.push(block);
            }
            continue;
        }
        let mut fields = line.split('\t');
        let input = fields.next().unwrap_or_default();
        let Some(out) = fields.next() else {
            return Err(UdarError::MalformedStream {
                line: line_no,
                reason: format!("expected input and output columns in {line:?}"),
            });
        };
        let weight_field = fields.next().unwrap_or_default();
        let weight = parse_weight(weight_field).ok_or_else(|| UdarError::MalformedStream {
            line: line_no,
            reason: format!("invalid weight {weight_field:?}"),
        })?;

        match current.as_mut() {
            Some(block) if block.input == input => block.results.push((out.to_string(), weight)),
            _ => {
                if let Some(block) = current.take() {
                    blocks.push(block);
                }
                current = Some(LookupBlock {
                    input: input.to_string(),
                    results: vec![(out.to_string(), weight)],
                });
            }
        }
    }
    if let Some(block) = current {
        blocks.push(block);
    }
    Ok(blocks)
}

/// A transducer file served by an `hfst-lookup` subprocess.
///
/// The same type serves analyzers and generators; which one it is depends
/// only on the transducer file.
#[derive(Debug, Clone)]
pub struct HfstLookup {
    config: ProcessConfig,
    transducer: PathBuf,
}

impl HfstLookup {
    /// Use `hfst-lookup` from `PATH` over the given `.hfstol` file.
    pub fn new(transducer: impl Into<PathBuf>) -> Self {
        Self::with_program(DEFAULT_PROGRAM, transducer)
    }

    pub fn with_program(program: impl Into<PathBuf>, transducer: impl Into<PathBuf>) -> Self {
        let transducer = transducer.into();
        let config = ProcessConfig::new(program)
            .with_args(["--quiet".to_string(), transducer.display().to_string()]);
        Self { config, transducer }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn transducer(&self) -> &Path {
        &self.transducer
    }

    /// Run one lookup round trip for the given input lines.
    pub fn lookup(&self, inputs: &[&str]) -> Result<Vec<LookupBlock>> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }
        let mut request = inputs.join("\n");
        request.push('\n');
        let response = process::run(&self.config, &request)?;
        let blocks = parse_lookup_output(&response)?;
        if blocks.len() != inputs.len() {
            return Err(UdarError::unavailable(
                self.config.display_name(),
                format!("expected {} result blocks, got {}", inputs.len(), blocks.len()),
            ));
        }
        debug!(
            transducer = %self.transducer.display(),
            inputs = inputs.len(),
            "hfst lookup"
        );
        Ok(blocks)
    }
}

impl Analyzer for HfstLookup {
    fn analyze(&self, wordform: &str) -> Result<Vec<RawAnalysis>> {
        let mut all = self.analyze_batch(&[wordform])?;
        Ok(all.pop().unwrap_or_default())
    }

    fn analyze_batch(&self, wordforms: &[&str]) -> Result<Vec<Vec<RawAnalysis>>> {
        // hfst-lookup treats each line as one input; a wordform with a
        // newline in it would shift every following block.
        if let Some(bad) = wordforms.iter().find(|w| w.contains('\n')) {
            return Err(UdarError::malformed(*bad, "wordform contains a line break"));
        }
        let blocks = self.lookup(wordforms)?;
        Ok(blocks
            .iter()
            .map(|block| {
                block
                    .known()
                    .filter_map(|(out, weight)| RawAnalysis::from_analysis_str(out, *weight))
                    .collect()
            })
            .collect())
    }
}

impl Generator for HfstLookup {
    fn generate(&self, lemma: &str, tags: &[&str]) -> Result<Option<String>> {
        self.generate_analysis(&analysis_str(lemma, tags))
    }

    fn generate_analysis(&self, analysis: &str) -> Result<Option<String>> {
        let blocks = self.lookup(&[analysis])?;
        Ok(blocks
            .first()
            .and_then(|block| {
                block
                    .known()
                    .min_by(|a, b| a.1.total_cmp(&b.1))
                    .map(|(form, _)| form.clone())
            }))
    }
}
