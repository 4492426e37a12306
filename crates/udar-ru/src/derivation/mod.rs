// Surface-form derivation: stress, phonetic transcription and
// transliteration, plus the rules for putting per-token output back
// together into running text.

pub mod evaluation;
pub mod frequency;
pub mod guess;
pub mod phonetic;
pub mod stress;
pub mod transliterate;

use std::ops::Range;

use serde::Serialize;
use udar_core::reading::Reading;
use udar_core::{Result, UdarError};
use udar_fst::Generator;

use self::frequency::StressFrequencies;

/// Which readings decide the stress of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum StressSelection {
    /// Stress of the most-likely reading.
    #[default]
    MostLikely,
    /// Stress only when every active reading agrees; otherwise unmarked.
    Safe,
    /// Every stress position any active reading allows.
    All,
    /// Stress of the reading most frequent in a corpus table; the
    /// most-likely reading when no table is given or nothing matches.
    Frequency,
}

impl StressSelection {
    /// Parse a policy name (`most-likely`, `safe`, `all`, `freq`),
    /// ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().replace('_', "-").as_str() {
            "most-likely" | "mostlikely" => Some(Self::MostLikely),
            "safe" => Some(Self::Safe),
            "all" => Some(Self::All),
            "freq" | "frequency" => Some(Self::Frequency),
            _ => None,
        }
    }

    /// Short name, as accepted by [`StressSelection::from_name`].
    pub fn name(self) -> &'static str {
        match self {
            Self::MostLikely => "most-likely",
            Self::Safe => "safe",
            Self::All => "all",
            Self::Frequency => "freq",
        }
    }
}

/// Everything that decides how a token is stressed.
#[derive(Debug, Clone, Copy, Default)]
pub struct StressOptions<'a> {
    pub selection: StressSelection,
    /// Guess stress for words the analyzer does not know.
    pub guess: bool,
    /// Corpus counts for [`StressSelection::Frequency`].
    pub frequencies: Option<&'a StressFrequencies>,
}

impl From<StressSelection> for StressOptions<'_> {
    fn from(selection: StressSelection) -> Self {
        Self {
            selection,
            ..Self::default()
        }
    }
}

/// Generate the surface form of a reading. Learner-error tags are left out
/// of the request since no generator knows them; compound readings are
/// generated as one analysis.
pub fn generate(reading: &Reading, generator: &dyn Generator) -> Result<Option<String>> {
    generator.generate_analysis(&reading.hfst_str_without_l2())
}

/// Punctuation that attaches to the preceding word.
fn is_closing_punct(c: char) -> bool {
    matches!(
        c,
        '.' | ',' | '!' | '?' | ':' | ';' | ')' | ']' | '\u{00BB}' | '\u{201D}' | '\u{2026}'
    )
}

/// Punctuation that attaches to the following word.
fn is_opening_punct(c: char) -> bool {
    matches!(c, '(' | '[' | '\u{00AB}' | '\u{201E}' | '\u{201C}')
}

/// Remove the spaces a word-by-word join leaves around punctuation:
/// `"Мы , да ."` becomes `"Мы, да."` and `"« да »"` becomes `"«да»"`.
pub fn unspace_punct(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    for (i, &c) in chars.iter().enumerate() {
        if c == ' ' {
            let before_closing = chars.get(i + 1).is_some_and(|&n| is_closing_punct(n));
            let after_opening = i > 0 && is_opening_punct(chars[i - 1]);
            if before_closing || after_opening {
                continue;
            }
        }
        out.push(c);
    }
    out
}

/// Rebuild running text from per-token output.
///
/// With spans, each piece replaces its span of `source` and everything
/// between spans is copied verbatim. Pieces without a span fall back to a
/// space-joined text with [`unspace_punct`] applied.
pub fn join_pieces(source: &str, pieces: &[(Option<Range<usize>>, String)]) -> String {
    let spans_valid = pieces.iter().all(|(span, _)| span.is_some())
        && pieces
            .windows(2)
            .all(|w| matches!((&w[0].0, &w[1].0), (Some(a), Some(b)) if a.end <= b.start))
        && pieces.iter().all(|(span, _)| {
            span.as_ref().is_some_and(|s| {
                source.is_char_boundary(s.start) && source.is_char_boundary(s.end)
            })
        });

    if !spans_valid {
        let joined: Vec<&str> = pieces.iter().map(|(_, p)| p.as_str()).collect();
        return unspace_punct(&joined.join(" "));
    }

    let mut out = String::with_capacity(source.len() + pieces.len() * 4);
    let mut cursor = 0;
    for (span, piece) in pieces {
        if let Some(span) = span {
            out.push_str(&source[cursor..span.start]);
            out.push_str(piece);
            cursor = span.end;
        }
    }
    out.push_str(&source[cursor..]);
    out
}

/// Require a transliteration scheme by name.
pub fn scheme(name: &str) -> Result<transliterate::Scheme> {
    transliterate::Scheme::from_name(name)
        .ok_or_else(|| UdarError::UnknownTransliterationScheme(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_names() {
        assert_eq!(StressSelection::from_name("Safe"), Some(StressSelection::Safe));
        assert_eq!(StressSelection::from_name("most_likely"), Some(StressSelection::MostLikely));
        assert_eq!(StressSelection::from_name("ALL"), Some(StressSelection::All));
        assert_eq!(StressSelection::from_name("freq"), Some(StressSelection::Frequency));
        assert_eq!(StressSelection::from_name("some"), None);
        assert_eq!(StressSelection::default(), StressSelection::MostLikely);
        for selection in [
            StressSelection::MostLikely,
            StressSelection::Safe,
            StressSelection::All,
            StressSelection::Frequency,
        ] {
            assert_eq!(StressSelection::from_name(selection.name()), Some(selection));
        }
    }

    #[test]
    fn unspacing() {
        assert_eq!(unspace_punct("Мы удивились простоте системы ."), "Мы удивились простоте системы.");
        assert_eq!(unspace_punct("Он , сказал : « да » ."), "Он, сказал: «да».");
        assert_eq!(unspace_punct("кто-то - там"), "кто-то - там");
    }

    #[test]
    fn join_with_spans_keeps_whitespace() {
        let source = "Мы  удивились.";
        let pieces = vec![
            (Some(0..4), "Мы́".to_string()),
            (Some(6..24), "удиви́лись".to_string()),
            (Some(24..25), ".".to_string()),
        ];
        assert_eq!(join_pieces(source, &pieces), "Мы́  удиви́лись.");
    }

    #[test]
    fn join_without_spans() {
        let pieces = vec![(None, "Мы́".to_string()), (None, ".".to_string())];
        assert_eq!(join_pieces("", &pieces), "Мы́.");
    }

    #[test]
    fn unknown_scheme() {
        assert_eq!(
            scheme("Klingon"),
            Err(UdarError::UnknownTransliterationScheme("Klingon".into()))
        );
        assert!(scheme("iso9").is_ok());
    }
}
