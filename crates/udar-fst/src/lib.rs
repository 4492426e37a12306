//! Finite-state transducer boundary for UDAR.
//!
//! The transducers themselves are compiled elsewhere; this crate only
//! defines how the rest of the pipeline talks to them.
//!
//! # Architecture
//!
//! - [`Analyzer`] / [`Generator`] -- the two capabilities the pipeline needs
//! - [`RawAnalysis`] -- one `(lemma, tags, weight)` triple as the transducer reports it
//! - [`hfst`] -- backend driving the `hfst-lookup` program over `.hfstol` files
//! - [`lexicon`] -- in-memory backend over a tab-separated analysis table

pub mod hfst;
pub mod lexicon;

use udar_core::Result;
use udar_core::reading::{UNKNOWN_SUFFIX, split_analysis};

/// One analysis triple reported by a transducer, before validation.
///
/// Tag names are kept as plain strings; turning them into registry tags is
/// the job of reading ingestion, which reports unknown names.
#[derive(Debug, Clone, PartialEq)]
pub struct RawAnalysis {
    pub lemma: String,
    pub tags: Vec<String>,
    pub weight: f64,
}

impl RawAnalysis {
    pub fn new<S: Into<String>>(
        lemma: impl Into<String>,
        tags: impl IntoIterator<Item = S>,
        weight: f64,
    ) -> Self {
        Self {
            lemma: lemma.into(),
            tags: tags.into_iter().map(Into::into).collect(),
            weight,
        }
    }

    /// Split an `lemma+TAG+TAG` string. Returns `None` for the
    /// out-of-vocabulary marker (`word+?`).
    pub fn from_analysis_str(analysis: &str, weight: f64) -> Option<Self> {
        if analysis.ends_with(UNKNOWN_SUFFIX) {
            return None;
        }
        let (lemma, tags) = split_analysis(analysis);
        Some(Self::new(lemma, tags, weight))
    }

    /// `lemma+TAG+TAG`.
    pub fn analysis_str(&self) -> String {
        analysis_str(&self.lemma, &self.tags)
    }
}

/// Join a lemma and tag names into transducer notation.
pub fn analysis_str<S: AsRef<str>>(lemma: &str, tags: &[S]) -> String {
    let mut out = String::from(lemma);
    for tag in tags {
        out.push('+');
        out.push_str(tag.as_ref());
    }
    out
}

/// Parse a transducer weight column. `inf` is accepted; an empty column
/// counts as zero.
pub fn parse_weight(field: &str) -> Option<f64> {
    let field = field.trim();
    if field.is_empty() {
        return Some(0.0);
    }
    field.parse::<f64>().ok()
}

/// Maps surface wordforms to their candidate analyses.
///
/// Implementations must be usable from several threads at once; each
/// call is a blocking lookup.
pub trait Analyzer: Send + Sync {
    /// All analyses of one wordform, in the order the transducer reports
    /// them. An unknown wordform yields an empty list.
    fn analyze(&self, wordform: &str) -> Result<Vec<RawAnalysis>>;

    /// Analyze several wordforms at once. Backends with a per-call cost
    /// (such as a subprocess) override this to look everything up in one
    /// round trip.
    fn analyze_batch(&self, wordforms: &[&str]) -> Result<Vec<Vec<RawAnalysis>>> {
        wordforms.iter().map(|w| self.analyze(w)).collect()
    }
}

/// Maps a lemma and tag sequence back to a surface wordform.
pub trait Generator: Send + Sync {
    /// The preferred surface form, or `None` if the combination is not in
    /// the paradigm.
    fn generate(&self, lemma: &str, tags: &[&str]) -> Result<Option<String>>;

    /// Like [`Generator::generate`] for a whole analysis string, compound
    /// (`#`-joined) analyses included.
    fn generate_analysis(&self, analysis: &str) -> Result<Option<String>> {
        let (lemma, tags) = split_analysis(analysis);
        self.generate(lemma, &tags)
    }
}
