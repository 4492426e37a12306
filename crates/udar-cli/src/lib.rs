// udar-cli: shared utilities for CLI tools.

use std::path::PathBuf;
use std::process;

use tracing::debug;
use tracing_subscriber::EnvFilter;
use udar_ru::handle::resources;
use udar_ru::{Collaborators, UdarHandle};

/// Environment variable naming the resource directory.
const RESOURCE_PATH_ENV: &str = "UDAR_RESOURCE_PATH";

/// Install the stderr log subscriber. `RUST_LOG` overrides the default
/// `warn` level.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Search for a resource directory and create a UdarHandle.
///
/// A directory qualifies if it holds `lexicon.tsv` or the analyzer
/// transducer. Search order:
/// 1. `resource_path` argument (if provided)
/// 2. `UDAR_RESOURCE_PATH` environment variable
/// 3. `~/.udar/resources`
/// 4. `/usr/share/udar/resources`
/// 5. Current working directory
pub fn load_handle(resource_path: Option<&str>) -> Result<UdarHandle, String> {
    let search_paths = build_search_paths(resource_path);
    let collaborators = Collaborators::from_env();

    for dir in &search_paths {
        if dir.join(resources::LEXICON).is_file() || dir.join(resources::ANALYZER).is_file() {
            debug!(dir = %dir.display(), "using resource directory");
            return UdarHandle::from_resource_dir(dir, &collaborators)
                .map_err(|e| format!("failed to load resources from {}: {e}", dir.display()));
        }
    }

    Err(format!(
        "could not find {} or {} in any of the search paths:\n{}",
        resources::ANALYZER,
        resources::LEXICON,
        search_paths
            .iter()
            .map(|p| format!("  - {}", p.display()))
            .collect::<Vec<_>>()
            .join("\n")
    ))
}

/// Build the list of directories to search for resources.
fn build_search_paths(resource_path: Option<&str>) -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Some(p) = resource_path {
        paths.push(PathBuf::from(p));
    }

    if let Ok(env_path) = std::env::var(RESOURCE_PATH_ENV) {
        paths.push(PathBuf::from(env_path));
    }

    if let Some(home) = home_dir() {
        paths.push(home.join(".udar").join("resources"));
    }

    paths.push(PathBuf::from("/usr/share/udar/resources"));

    // fallback for local development
    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd);
    }

    paths
}

/// Get the user's home directory.
fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}

/// Parse a `--resource-path=PATH` or `-r PATH` argument from command line
/// args.
///
/// Returns `(resource_path, remaining_args)`.
pub fn parse_resource_path(args: &[String]) -> (Option<String>, Vec<String>) {
    let mut resource_path = None;
    let mut remaining = Vec::new();
    let mut skip_next = false;

    for (i, arg) in args.iter().enumerate() {
        if skip_next {
            skip_next = false;
            continue;
        }
        if let Some(val) = arg.strip_prefix("--resource-path=") {
            resource_path = Some(val.to_string());
        } else if arg == "--resource-path" || arg == "-r" {
            if i + 1 < args.len() {
                resource_path = Some(args[i + 1].clone());
                skip_next = true;
            } else {
                fatal(&format!("{arg} requires a value"));
            }
        } else {
            remaining.push(arg.clone());
        }
    }

    (resource_path, remaining)
}

/// Read input units: the non-flag arguments if any, otherwise the
/// non-empty lines of stdin.
pub fn inputs(args: &[String]) -> Vec<String> {
    let given: Vec<String> = args.iter().filter(|a| !a.starts_with('-')).cloned().collect();
    if !given.is_empty() {
        return given;
    }
    let mut lines = Vec::new();
    for line in std::io::stdin().lines() {
        match line {
            Ok(l) if !l.trim().is_empty() => lines.push(l.trim().to_string()),
            Ok(_) => {}
            Err(e) => {
                eprintln!("error reading stdin: {e}");
                break;
            }
        }
    }
    lines
}

/// Print an error message and exit with code 1.
pub fn fatal(msg: &str) -> ! {
    eprintln!("error: {msg}");
    process::exit(1);
}

/// Check if `--help` or `-h` is in the args.
pub fn wants_help(args: &[String]) -> bool {
    args.iter().any(|a| a == "--help" || a == "-h")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn resource_path_forms() {
        let (path, rest) = parse_resource_path(&args(&["-r", "/res", "слово"]));
        assert_eq!(path.as_deref(), Some("/res"));
        assert_eq!(rest, ["слово"]);

        let (path, rest) = parse_resource_path(&args(&["--json", "--resource-path=/x"]));
        assert_eq!(path.as_deref(), Some("/x"));
        assert_eq!(rest, ["--json"]);
    }

    #[test]
    fn explicit_path_is_searched_first() {
        let paths = build_search_paths(Some("/first"));
        assert_eq!(paths[0], PathBuf::from("/first"));
        assert!(paths.contains(&PathBuf::from("/usr/share/udar/resources")));
    }

    #[test]
    fn help_flags() {
        assert!(wants_help(&args(&["-h"])));
        assert!(wants_help(&args(&["x", "--help"])));
        assert!(!wants_help(&args(&["--json"])));
    }

    #[test]
    fn arguments_take_precedence_over_stdin() {
        assert_eq!(inputs(&args(&["--json", "слова"])), ["слова"]);
    }
}
