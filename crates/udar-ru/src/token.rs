// Token: one surface wordform and its candidate readings.
//
// Readings live in two partitions. `readings` holds the active ones;
// disambiguation moves excluded readings to `removed_readings` and never
// deletes or invents any, so the union is fixed once analysis is done.

use std::collections::BTreeSet;
use std::ops::Range;

use serde::Serialize;
use tracing::debug;
use udar_core::reading::Reading;
use udar_core::tag::Tag;
use udar_core::Result;
use udar_fst::{Generator, RawAnalysis};

use crate::derivation::{self, StressOptions, StressSelection};

/// A token of a sentence with its readings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    text: String,
    /// 1-based index within the sentence.
    position: usize,
    /// Byte range in the sentence text, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    span: Option<Range<usize>>,
    readings: Vec<Reading>,
    removed_readings: Vec<Reading>,
    /// Dependency head position, 0 for the root.
    #[serde(skip_serializing_if = "Option::is_none")]
    head: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    deprel: Option<String>,
}

impl Token {
    /// A token without readings.
    pub fn new(text: impl Into<String>, position: usize) -> Self {
        Self {
            text: text.into(),
            position,
            span: None,
            readings: Vec::new(),
            removed_readings: Vec::new(),
            head: None,
            deprel: None,
        }
    }

    /// Build a token from transducer output.
    ///
    /// Readings are ordered by ascending weight; equal weights keep the
    /// transducer's order. The lowest-weight reading is marked most likely.
    /// An empty `analyses` list gives an out-of-vocabulary token. Any
    /// malformed triple fails the whole token with
    /// [`udar_core::UdarError::MalformedAnalysis`]. Compound analyses (`#`) become
    /// compound readings.
    pub fn from_analyses(
        text: impl Into<String>,
        position: usize,
        analyses: &[RawAnalysis],
    ) -> Result<Self> {
        let mut readings = Vec::with_capacity(analyses.len());
        for raw in analyses {
            if let Some(reading) = Reading::parse(&raw.analysis_str(), raw.weight)? {
                readings.push(reading);
            }
        }
        // `sort_by` is stable, which keeps ties in transducer order.
        readings.sort_by(|a, b| a.weight().total_cmp(&b.weight()));

        let mut token = Self::new(text, position);
        token.readings = readings;
        token.select_fallback_most_likely();
        Ok(token)
    }

    /// Reassemble a token from already partitioned readings, keeping their
    /// order and flags as given.
    pub(crate) fn from_partitions(
        text: impl Into<String>,
        position: usize,
        readings: Vec<Reading>,
        removed_readings: Vec<Reading>,
    ) -> Self {
        let mut token = Self::new(text, position);
        token.readings = readings;
        token.removed_readings = removed_readings;
        token
    }

    pub fn with_span(mut self, span: Range<usize>) -> Self {
        self.span = Some(span);
        self
    }

    pub(crate) fn set_span(&mut self, span: Option<Range<usize>>) {
        self.span = span;
    }

    pub(crate) fn set_position(&mut self, position: usize) {
        self.position = position;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn span(&self) -> Option<Range<usize>> {
        self.span.clone()
    }

    /// Active readings.
    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    /// Readings excluded by disambiguation.
    pub fn removed_readings(&self) -> &[Reading] {
        &self.removed_readings
    }

    /// Total number of readings in both partitions.
    pub fn reading_count(&self) -> usize {
        self.readings.len() + self.removed_readings.len()
    }

    pub fn head(&self) -> Option<usize> {
        self.head
    }

    pub fn deprel(&self) -> Option<&str> {
        self.deprel.as_deref()
    }

    /// Record a dependency attachment.
    pub fn set_dependency(&mut self, head: usize, deprel: impl Into<String>) {
        self.head = Some(head);
        self.deprel = Some(deprel.into());
    }

    /// The transducer knew nothing about this wordform.
    pub fn is_oov(&self) -> bool {
        self.readings.is_empty() && self.removed_readings.is_empty()
    }

    /// The active reading marked most likely.
    pub fn most_likely(&self) -> Option<&Reading> {
        self.readings.iter().find(|r| r.is_most_likely())
    }

    /// Distinct lemmas of the active readings, in reading order. Every
    /// lemma of a compound reading counts.
    pub fn lemmas(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for lemma in self.readings.iter().flat_map(Reading::lemmas) {
            if !out.contains(&lemma) {
                out.push(lemma);
            }
        }
        out
    }

    /// Any active reading has this lemma.
    pub fn has_lemma(&self, lemma: &str) -> bool {
        self.readings.iter().any(|r| r.has_lemma(lemma))
    }

    /// Any active reading carries this tag.
    pub fn has_tag(&self, tag: Tag) -> bool {
        self.readings.iter().any(|r| r.has_tag(tag))
    }

    /// Like [`Token::has_tag`], by tag name.
    pub fn has_tag_name(&self, name: &str) -> bool {
        self.readings.iter().any(|r| r.has_tag_name(name))
    }

    /// Mark the lowest-weight active reading as most likely unless one is
    /// already marked. The first of equal weights wins.
    pub(crate) fn select_fallback_most_likely(&mut self) {
        if self.readings.iter().any(Reading::is_most_likely) {
            return;
        }
        let mut best: Option<usize> = None;
        for (i, reading) in self.readings.iter().enumerate() {
            match best {
                Some(b) if self.readings[b].weight() <= reading.weight() => {}
                _ => best = Some(i),
            }
        }
        if let Some(i) = best {
            debug!(token = %self.text, reading = %self.readings[i], "most-likely fallback by weight");
            self.readings[i].set_most_likely(true);
        }
    }

    pub(crate) fn readings_mut(&mut self) -> &mut Vec<Reading> {
        &mut self.readings
    }

    pub(crate) fn removed_readings_mut(&mut self) -> &mut Vec<Reading> {
        &mut self.removed_readings
    }

    // -----------------------------------------------------------------------
    // Derived surface forms
    // -----------------------------------------------------------------------

    /// Stressed form of this token under the given policy. Never fails:
    /// without a usable generation the surface text comes back unmarked.
    pub fn stressed(&self, generator: &dyn Generator, selection: StressSelection) -> String {
        derivation::stress::stressed_form(self, generator, selection)
    }

    /// Like [`Token::stressed`], with guessing and frequency selection.
    pub fn stressed_with(&self, generator: &dyn Generator, options: &StressOptions<'_>) -> String {
        derivation::stress::stressed_form_with(self, generator, options)
    }

    /// All distinct stressed forms over the active readings.
    pub fn stresses(&self, generator: &dyn Generator) -> BTreeSet<String> {
        derivation::stress::stresses(self, generator)
    }

    /// Number of distinct stressed forms; above one means the stress
    /// depends on which reading is right.
    pub fn stress_ambiguity(&self, generator: &dyn Generator) -> usize {
        self.stresses(generator).len()
    }

    /// Phonetic transcription of the stressed form.
    pub fn phonetic(&self, generator: &dyn Generator, selection: StressSelection) -> String {
        derivation::phonetic::transcribe(&self.stressed(generator, selection))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use udar_core::UdarError;

    fn raw(analysis: &str, weight: f64) -> RawAnalysis {
        RawAnalysis::from_analysis_str(analysis, weight).unwrap()
    }

    fn slova() -> Vec<RawAnalysis> {
        vec![
            raw("слово+N+Neu+Inan+Pl+Acc", 6.5),
            raw("слово+N+Neu+Inan+Sg+Gen", 5.975586),
            raw("слово+N+Neu+Inan+Pl+Nom", 6.5),
        ]
    }

    #[test]
    fn ingestion_sorts_by_weight_keeping_ties() {
        let token = Token::from_analyses("слова", 1, &slova()).unwrap();
        let order: Vec<String> = token.readings().iter().map(|r| r.hfst_str()).collect();
        assert_eq!(
            order,
            [
                "слово+N+Neu+Inan+Sg+Gen",
                "слово+N+Neu+Inan+Pl+Acc",
                "слово+N+Neu+Inan+Pl+Nom",
            ]
        );
        assert_eq!(token.most_likely().unwrap().hfst_str(), "слово+N+Neu+Inan+Sg+Gen");
        assert_eq!(token.readings().iter().filter(|r| r.is_most_likely()).count(), 1);
    }

    #[test]
    fn empty_analysis_is_out_of_vocabulary() {
        let token = Token::from_analyses("шмурдяк", 3, &[]).unwrap();
        assert!(token.is_oov());
        assert!(token.most_likely().is_none());
        assert!(token.lemmas().is_empty());
        assert_eq!(token.position(), 3);
    }

    #[test]
    fn malformed_triple_fails_token() {
        let mut analyses = slova();
        analyses.push(RawAnalysis::new("слово", ["N", "Bogus"], 1.0));
        let err = Token::from_analyses("слова", 1, &analyses).unwrap_err();
        assert!(matches!(err, UdarError::MalformedAnalysis { .. }));
    }

    #[test]
    fn compound_triples_become_compound_readings() {
        let analyses = [
            raw("пол+Num+Nom#час+N+Msc+Inan+Sg+Gen+Count", 2.0),
            raw("пол+Num+Acc#час+N+Msc+Inan+Sg+Gen+Count", 1.0),
        ];
        let token = Token::from_analyses("полчаса", 1, &analyses).unwrap();
        assert_eq!(token.readings().len(), 2);
        let ml = token.most_likely().unwrap();
        assert!(ml.is_compound());
        assert_eq!(ml.hfst_str(), "пол+Num+Acc#час+N+Msc+Inan+Sg+Gen+Count");
        assert_eq!(token.lemmas(), ["пол", "час"]);
        assert!(token.has_lemma("пол"));
        assert!(token.has_tag_name("Count"));
        assert!(token.has_tag_name("Num"));
    }

    #[test]
    fn membership_over_active_readings() {
        let token = Token::from_analyses("слова", 1, &slova()).unwrap();
        assert!(token.has_lemma("слово"));
        assert!(!token.has_lemma("слова"));
        assert!(token.has_tag(Tag::from_name("Acc").unwrap()));
        assert!(token.has_tag_name("Gen"));
        assert!(!token.has_tag_name("Ins"));
        assert_eq!(token.lemmas(), ["слово"]);
        assert_eq!(token.reading_count(), 3);
    }

    #[test]
    fn dependency_annotation() {
        let mut token = Token::new("Мы", 1).with_span(0..4);
        assert_eq!(token.head(), None);
        token.set_dependency(2, "nsubj");
        assert_eq!(token.head(), Some(2));
        assert_eq!(token.deprel(), Some("nsubj"));
        assert_eq!(token.span(), Some(0..4));
    }
}
