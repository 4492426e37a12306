// Evaluation of stress placement against hand-stressed text.
//
// The gold text is stripped of stress, analyzed and stressed again; each
// predicted token is then classified against its gold counterpart:
//
//   Skip            gold has fewer than two vowels
//   Unknown         gold carries no stress at all
//   TrueNegative    gold stress is a bare ё and the prediction adds no mark
//   FalseNegative   the prediction carries no stress
//   TruePositive    the prediction marks exactly the gold vowels
//   FalsePositive   anything else
//
// Only the first four classes enter the metrics.

use std::fmt;

use serde::Serialize;
use udar_core::character::{ACUTE, destress, is_vowel, stressed_vowels};
use udar_core::{Result, UdarError};
use udar_fst::Generator;

use super::{StressOptions, StressSelection};
use crate::document::Document;

/// Outcome of one token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StressResult {
    /// Stress was added in the wrong place.
    FalsePositive,
    /// A word that should be stressed was left unmarked.
    FalseNegative,
    TruePositive,
    /// Correctly left without a mark.
    TrueNegative,
    Skip,
    Unknown,
}

impl StressResult {
    pub const ALL: [StressResult; 6] = [
        Self::TruePositive,
        Self::TrueNegative,
        Self::FalsePositive,
        Self::FalseNegative,
        Self::Skip,
        Self::Unknown,
    ];

    pub fn abbreviation(self) -> &'static str {
        match self {
            Self::FalsePositive => "FP",
            Self::FalseNegative => "FN",
            Self::TruePositive => "TP",
            Self::TrueNegative => "TN",
            Self::Skip => "SKIP",
            Self::Unknown => "UNK",
        }
    }

    /// Classify `predicted` against the hand-stressed `gold` form.
    pub fn evaluate(gold: &str, predicted: &str) -> Self {
        if vowel_count(gold) < 2 {
            return Self::Skip;
        }
        let gold_stress = stressed_vowels(gold);
        if gold_stress.is_empty() {
            return Self::Unknown;
        }
        let predicted_stress = stressed_vowels(predicted);
        if !predicted.contains(ACUTE) {
            if gold.contains(ACUTE) {
                return Self::FalseNegative;
            }
            // ё only: nothing to add
            return if predicted_stress == gold_stress {
                Self::TrueNegative
            } else {
                Self::FalsePositive
            };
        }
        let same_word = destress(predicted).to_lowercase() == destress(gold).to_lowercase();
        if same_word && predicted_stress == gold_stress {
            Self::TruePositive
        } else {
            Self::FalsePositive
        }
    }
}

impl fmt::Display for StressResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

fn vowel_count(word: &str) -> usize {
    word.chars().filter(|&c| is_vowel(c)).count()
}

/// Result tallies of one evaluation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StressCounts {
    pub true_positive: usize,
    pub true_negative: usize,
    pub false_positive: usize,
    pub false_negative: usize,
    pub skip: usize,
    pub unknown: usize,
    /// Words of two or more vowels whose readings allow more than one
    /// stressed form.
    pub n_ambig: usize,
}

impl StressCounts {
    pub fn add(&mut self, result: StressResult) {
        *self.slot(result) += 1;
    }

    pub fn get(&self, result: StressResult) -> usize {
        match result {
            StressResult::FalsePositive => self.false_positive,
            StressResult::FalseNegative => self.false_negative,
            StressResult::TruePositive => self.true_positive,
            StressResult::TrueNegative => self.true_negative,
            StressResult::Skip => self.skip,
            StressResult::Unknown => self.unknown,
        }
    }

    fn slot(&mut self, result: StressResult) -> &mut usize {
        match result {
            StressResult::FalsePositive => &mut self.false_positive,
            StressResult::FalseNegative => &mut self.false_negative,
            StressResult::TruePositive => &mut self.true_positive,
            StressResult::TrueNegative => &mut self.true_negative,
            StressResult::Skip => &mut self.skip,
            StressResult::Unknown => &mut self.unknown,
        }
    }

    /// Sum of two runs, e.g. over the texts of a corpus.
    pub fn merge(&mut self, other: &StressCounts) {
        for result in StressResult::ALL {
            *self.slot(result) += other.get(result);
        }
        self.n_ambig += other.n_ambig;
    }

    /// Precision, recall and rates. `None` when a denominator would be
    /// zero: no evaluated token, no attempted stress, or no token that
    /// needed stress.
    pub fn compute_metrics(&self) -> Option<StressMetrics> {
        let n = self.false_positive + self.false_negative + self.true_positive + self.true_negative;
        let tot_t = self.true_positive + self.true_negative;
        let tot_p = self.true_positive + self.false_positive;
        let tot_relevant = self.true_positive + self.false_negative;
        if n == 0 || tot_p == 0 || tot_relevant == 0 {
            return None;
        }
        let ratio = |a: usize, b: usize| a as f64 / b as f64;
        Some(StressMetrics {
            n,
            tot_t,
            tot_p,
            tot_relevant,
            accuracy: ratio(tot_t, n),
            error_rate: ratio(self.false_positive, n),
            abstention_rate: ratio(self.false_negative, n),
            attempt_rate: ratio(tot_p, n),
            precision: ratio(self.true_positive, tot_p),
            recall: ratio(self.true_positive, tot_relevant),
            counts: *self,
        })
    }
}

/// Derived evaluation metrics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StressMetrics {
    /// Tokens in the four evaluated classes.
    pub n: usize,
    /// Correct decisions (TP + TN).
    pub tot_t: usize,
    /// Attempted stress (TP + FP).
    pub tot_p: usize,
    /// Tokens needing stress (TP + FN).
    pub tot_relevant: usize,
    pub accuracy: f64,
    pub error_rate: f64,
    pub abstention_rate: f64,
    pub attempt_rate: f64,
    pub precision: f64,
    pub recall: f64,
    pub counts: StressCounts,
}

/// The settings an evaluation run was made with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct StressParams {
    pub disambiguate: bool,
    pub selection: StressSelection,
    pub guess: bool,
}

impl StressParams {
    /// `CG-safe-guess`, `noCG-freq-no_guess` and so on.
    pub fn readable_name(&self) -> String {
        let cg = if self.disambiguate { "CG" } else { "noCG" };
        let guess = if self.guess { "guess" } else { "no_guess" };
        format!("{cg}-{}-{guess}", self.selection.name())
    }
}

impl fmt::Display for StressParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.readable_name())
    }
}

/// Stress `doc` and classify every token against `gold`, the
/// hand-stressed words in token order.
///
/// `doc` is expected to be the analysis of the gold text with stress
/// removed; a token count that differs from `gold` fails with
/// [`UdarError::StreamMismatch`].
pub fn stress_eval<S: AsRef<str>>(
    doc: &Document,
    gold: &[S],
    generator: &dyn Generator,
    options: &StressOptions<'_>,
) -> Result<StressCounts> {
    if doc.num_tokens() != gold.len() {
        return Err(UdarError::StreamMismatch(format!(
            "{} analyzed tokens for {} gold tokens",
            doc.num_tokens(),
            gold.len()
        )));
    }
    let mut counts = StressCounts::default();
    for (token, gold) in doc.tokens().zip(gold) {
        let gold = gold.as_ref();
        counts.add(StressResult::evaluate(gold, &token.stressed_with(generator, options)));
        if vowel_count(gold) > 1 && token.stress_ambiguity(generator) > 1 {
            counts.n_ambig += 1;
        }
    }
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::RuleTokenizer;
    use udar_fst::lexicon::LexiconTransducer;

    #[test]
    fn classification() {
        use StressResult::*;
        assert_eq!(StressResult::evaluate("сло́ва", "сло́ва"), TruePositive);
        assert_eq!(StressResult::evaluate("Сло́ва", "Сло́ва"), TruePositive);
        assert_eq!(StressResult::evaluate("сло́ва", "слова́"), FalsePositive);
        assert_eq!(StressResult::evaluate("сло́ва", "сло́ва́"), FalsePositive);
        assert_eq!(StressResult::evaluate("сло́ва", "слова"), FalseNegative);
        assert_eq!(StressResult::evaluate("ёлка", "ёлка"), TrueNegative);
        assert_eq!(StressResult::evaluate("ёлка", "ёлка́"), FalsePositive);
        assert_eq!(StressResult::evaluate("мы́", "мы"), Skip);
        assert_eq!(StressResult::evaluate("слова", "сло́ва"), Unknown);
    }

    #[test]
    fn metrics_from_counts() {
        let mut counts = StressCounts::default();
        for result in [
            StressResult::TruePositive,
            StressResult::TruePositive,
            StressResult::TruePositive,
            StressResult::FalsePositive,
            StressResult::FalseNegative,
            StressResult::FalseNegative,
            StressResult::TrueNegative,
            StressResult::TrueNegative,
            StressResult::Skip,
        ] {
            counts.add(result);
        }
        let m = counts.compute_metrics().unwrap();
        assert_eq!((m.n, m.tot_t, m.tot_p, m.tot_relevant), (8, 5, 4, 5));
        assert_eq!(m.accuracy, 5.0 / 8.0);
        assert_eq!(m.error_rate, 1.0 / 8.0);
        assert_eq!(m.abstention_rate, 2.0 / 8.0);
        assert_eq!(m.attempt_rate, 4.0 / 8.0);
        assert_eq!(m.precision, 3.0 / 4.0);
        assert_eq!(m.recall, 3.0 / 5.0);
        assert_eq!(m.counts.get(StressResult::Skip), 1);

        let mut twice = counts;
        twice.merge(&counts);
        assert_eq!(twice.get(StressResult::TruePositive), 6);
    }

    #[test]
    fn metrics_need_attempts() {
        assert_eq!(StressCounts::default().compute_metrics(), None);
        let mut abstained = StressCounts::default();
        abstained.add(StressResult::FalseNegative);
        assert_eq!(abstained.compute_metrics(), None);
    }

    #[test]
    fn readable_params() {
        let params = StressParams {
            disambiguate: true,
            selection: StressSelection::Safe,
            guess: false,
        };
        assert_eq!(params.readable_name(), "CG-safe-no_guess");
        let params = StressParams {
            disambiguate: false,
            selection: StressSelection::Frequency,
            guess: true,
        };
        assert_eq!(params.to_string(), "noCG-freq-guess");
    }

    #[test]
    fn evaluation_over_a_document() {
        let lex = LexiconTransducer::from_tsv(
            "\
сло́ва\tслово+N+Neu+Inan+Sg+Gen\t5.0
слова́\tслово+N+Neu+Inan+Pl+Nom\t6.0
мы́\tмы+Pron+Pers+Pl1+Nom\t1.0
ви́дим\tвидеть+V+Impf+TV+Prs+Pl1\t2.0
",
        )
        .unwrap();
        let gold = "Мы ви́дим слова́ шмурдя́ка.";
        let doc = Document::from_text(&destress(gold), &RuleTokenizer, &lex).unwrap();
        let gold_words: Vec<&str> = vec!["Мы", "ви́дим", "слова́", "шмурдя́ка", "."];

        let counts = stress_eval(&doc, gold_words.as_slice(), &lex, &StressOptions::from(StressSelection::MostLikely)).unwrap();
        assert_eq!(counts.skip, 2);
        assert_eq!(counts.true_positive, 1);
        assert_eq!(counts.false_positive, 1);
        assert_eq!(counts.false_negative, 1);
        assert_eq!(counts.n_ambig, 1);

        let options = StressOptions {
            guess: true,
            ..StressOptions::from(StressSelection::MostLikely)
        };
        let counts = stress_eval(&doc, gold_words.as_slice(), &lex, &options).unwrap();
        assert_eq!(counts.true_positive, 2);
        assert_eq!(counts.false_negative, 0);

        let err = stress_eval(&doc, &gold_words[..2], &lex, &options).unwrap_err();
        assert!(matches!(err, UdarError::StreamMismatch(_)));
    }
}
