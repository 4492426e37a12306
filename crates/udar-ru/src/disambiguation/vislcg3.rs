// vislcg3 process backend.
//
// vislcg3 speaks its own stream dialect:
//
//   "<системы>"
//   	"система" N Fem Inan Pl Nom <W:8.236328> <udar:1> SELECT:20
//   ;	"система" N Fem Inan Sg Gen <W:8.236328> <udar:0> REMOVE:10
//
// Lemmas are quoted, tags space separated, removed readings start with
// `;` and rule traces follow the tags when `--trace` is on. A compound
// reading is its head line followed by the earlier sub-readings, each one
// tab deeper:
//
//   	"час" N Msc Inan Sg Gen Count <W:0.000000> <udar:0>
//   		"пол" Num Acc
//
// The submission
// is converted into this dialect with an `<udar:N>` index tag on every
// reading, and the answer is converted back into the disambiguation
// stream in submitted order by that index.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, warn};
use udar_core::process::{self, ProcessConfig};
use udar_core::reading::{COMPOUND_SEPARATOR, split_analysis, split_compound};
use udar_core::{Result, UdarError};

use super::Disambiguator;
use crate::stream::cg::{self, Cohort, MOST_LIKELY_MARKER, REMOVED_MARKER};

/// Default executable name, looked up on `PATH`.
pub const DEFAULT_PROGRAM: &str = "vislcg3";

const INDEX_PREFIX: &str = "<udar:";
const WEIGHT_PREFIX: &str = "<W:";

/// A compiled or textual grammar run by a `vislcg3` subprocess.
#[derive(Debug, Clone)]
pub struct Vislcg3 {
    config: ProcessConfig,
    grammar: PathBuf,
}

impl Vislcg3 {
    pub fn new(grammar: impl Into<PathBuf>) -> Self {
        Self::with_program(DEFAULT_PROGRAM, grammar)
    }

    pub fn with_program(program: impl Into<PathBuf>, grammar: impl Into<PathBuf>) -> Self {
        let grammar = grammar.into();
        let config = ProcessConfig::new(program).with_args([
            "--grammar".to_string(),
            grammar.display().to_string(),
            "--trace".to_string(),
        ]);
        Self { config, grammar }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn grammar(&self) -> &Path {
        &self.grammar
    }
}

impl Disambiguator for Vislcg3 {
    fn disambiguate(&self, stream: &str) -> Result<String> {
        let submitted = cg::parse_cohorts(stream)?;
        let native = to_native(&submitted);
        let answer = process::run(&self.config, &native)?;
        debug!(grammar = %self.grammar.display(), cohorts = submitted.len(), "vislcg3 run");
        from_native(&answer, &submitted)
    }
}

/// Convert cohorts into vislcg3 input, tagging each reading with its index.
pub fn to_native(cohorts: &[Cohort]) -> String {
    let mut out = String::new();
    for cohort in cohorts {
        out.push_str(&format!("\"<{}>\"\n", cohort.surface));
        for (index, reading) in cohort.readings.iter().enumerate() {
            let parts = split_compound(&reading.analysis);
            for (depth, part) in parts.iter().rev().enumerate() {
                let (lemma, tags) = split_analysis(part);
                out.push_str(&"\t".repeat(depth + 1));
                out.push_str(&format!("\"{lemma}\""));
                for tag in tags {
                    out.push(' ');
                    out.push_str(tag);
                }
                if depth == 0 {
                    out.push_str(&format!(
                        " {WEIGHT_PREFIX}{:.6}> {INDEX_PREFIX}{index}>",
                        reading.weight
                    ));
                }
                out.push('\n');
            }
        }
    }
    out
}

/// Whether a word is a rule trace such as `REMOVE:123` or `SELECT:45:name`.
fn is_trace(word: &str) -> bool {
    let Some((name, rest)) = word.split_once(':') else {
        return false;
    };
    !name.is_empty()
        && name.chars().all(|c| c.is_ascii_uppercase() || c == '-')
        && rest.starts_with(|c: char| c.is_ascii_digit())
}

#[derive(Debug, Default)]
struct NativeReading {
    lemma: String,
    tags: Vec<String>,
    weight: Option<f64>,
    index: Option<usize>,
    removed: bool,
    traces: Vec<String>,
    /// Deeper sub-readings as (lemma, tags), nearest to the head first.
    prefix: Vec<(String, Vec<String>)>,
}

impl NativeReading {
    /// `lemma+TAGS`, sub-readings joined in analysis order.
    fn analysis(&self) -> String {
        let mut out = String::new();
        for (lemma, tags) in self.prefix.iter().rev() {
            push_analysis(&mut out, lemma, tags);
            out.push(COMPOUND_SEPARATOR);
        }
        push_analysis(&mut out, &self.lemma, &self.tags);
        out
    }
}

fn push_analysis(out: &mut String, lemma: &str, tags: &[String]) {
    out.push_str(lemma);
    for tag in tags {
        out.push('+');
        out.push_str(tag);
    }
}

fn parse_native_reading(body: &str, removed: bool, line: usize) -> Result<NativeReading> {
    let body = body.trim_start();
    let quoted = body.strip_prefix('"').and_then(|rest| {
        rest.find('"').map(|end| (&rest[..end], &rest[end + 1..]))
    });
    let Some((lemma, rest)) = quoted else {
        return Err(UdarError::MalformedStream {
            line,
            reason: format!("vislcg3 reading without a quoted lemma: {body:?}"),
        });
    };
    let mut reading = NativeReading {
        lemma: lemma.to_string(),
        removed,
        ..NativeReading::default()
    };
    for word in rest.split_whitespace() {
        if let Some(index) = word.strip_prefix(INDEX_PREFIX).and_then(|w| w.strip_suffix('>')) {
            reading.index = index.parse().ok();
        } else if let Some(weight) = word.strip_prefix(WEIGHT_PREFIX).and_then(|w| w.strip_suffix('>')) {
            reading.weight = weight.parse().ok();
        } else if is_trace(word) {
            reading.traces.push(word.to_string());
        } else if word.starts_with('<') && word.ends_with('>') {
            // other secondary tags added by the grammar
        } else {
            reading.tags.push(word.to_string());
        }
    }
    Ok(reading)
}

fn parse_native(answer: &str) -> Result<Vec<(String, Vec<NativeReading>)>> {
    let mut cohorts: Vec<(String, Vec<NativeReading>)> = Vec::new();
    for (index, line) in answer.lines().enumerate() {
        let line_no = index + 1;
        if let Some(rest) = line.strip_prefix("\"<") {
            let surface = rest.rfind(">\"").map_or(rest, |end| &rest[..end]);
            cohorts.push((surface.to_string(), Vec::new()));
            continue;
        }
        let (body, removed) = if let Some(body) = line.strip_prefix(";\t") {
            (body, true)
        } else if let Some(body) = line.strip_prefix('\t') {
            (body, false)
        } else {
            continue;
        };
        let sub_reading = body.starts_with('\t');
        let reading = parse_native_reading(body, removed, line_no)?;
        let Some((_, readings)) = cohorts.last_mut() else {
            return Err(UdarError::MalformedStream {
                line: line_no,
                reason: "vislcg3 reading before any cohort".into(),
            });
        };
        if !sub_reading {
            readings.push(reading);
            continue;
        }
        match readings.last_mut() {
            Some(head) => {
                head.traces.extend(reading.traces);
                head.prefix.push((reading.lemma, reading.tags));
            }
            None => warn!(line = line_no, "ignoring vislcg3 sub-reading without a reading"),
        }
    }
    Ok(cohorts)
}

/// Convert a vislcg3 answer back into the disambiguation stream, readings
/// in submitted order. A submitted reading missing from the answer is
/// written as removed. The first surviving reading with a `SELECT` trace
/// is marked most likely.
pub fn from_native(answer: &str, submitted: &[Cohort]) -> Result<String> {
    let cohorts = parse_native(answer)?;
    let mut out = String::new();
    for (k, (surface, readings)) in cohorts.into_iter().enumerate() {
        let original = submitted.get(k);
        let count = original.map_or(readings.len(), |c| c.readings.len());
        let mut slots: Vec<Option<NativeReading>> = (0..count).map(|_| None).collect();
        for (position, reading) in readings.into_iter().enumerate() {
            let index = reading.index.unwrap_or(position);
            if index >= slots.len() {
                // not one of ours; the merge reports the count difference
                slots.push(Some(reading));
            } else if slots[index].is_none() {
                slots[index] = Some(reading);
            } else {
                warn!(cohort = %surface, index, "duplicate vislcg3 reading ignored");
            }
        }

        out.push_str(&format!("\"<{surface}>\"\n"));
        let mut selected = false;
        for (index, slot) in slots.into_iter().enumerate() {
            let submitted_reading = original.and_then(|c| c.readings.get(index));
            let weight = slot
                .as_ref()
                .and_then(|r| r.weight)
                .or_else(|| submitted_reading.map(|r| r.weight))
                .unwrap_or(0.0);
            let (analysis, removed, traces) = match slot {
                Some(reading) => (reading.analysis(), reading.removed, reading.traces),
                None => (
                    submitted_reading.map(|r| r.analysis.clone()).unwrap_or_default(),
                    true,
                    Vec::new(),
                ),
            };
            out.push_str(&format!("\t{analysis}\t{weight:.6}"));
            if removed {
                out.push(' ');
                out.push_str(REMOVED_MARKER);
            } else if !selected && traces.iter().any(|t| t.starts_with("SELECT:")) {
                out.push(' ');
                out.push_str(MOST_LIKELY_MARKER);
                selected = true;
            }
            for trace in traces {
                out.push(' ');
                out.push_str(&trace);
            }
            out.push('\n');
        }
        out.push('\n');
    }
    Ok(out)
}
