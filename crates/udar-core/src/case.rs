// Capitalization patterns of wordforms.
//
// Generated forms come back from the transducer in lowercase; these helpers
// carry the pattern of the original surface form over to them.

use crate::character::{is_lower, is_upper, simple_lower, simple_upper};

/// Classification of character casing within a word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaseType {
    /// No letters found in the word (only digits, punctuation, etc.).
    NoLetters,
    /// All letters are lowercase: "слово".
    AllLower,
    /// First letter is uppercase, rest are lowercase: "Слово".
    FirstUpper,
    /// Mixed case that does not fit other patterns: "сЛово".
    Complex,
    /// All letters are uppercase: "СЛОВО".
    AllUpper,
}

/// Detect the case pattern of a character slice.
///
/// Non-letter characters (digits, punctuation, stress marks) are ignored.
pub fn detect_case(word: &[char]) -> CaseType {
    let mut letters = word.iter().copied().filter(|&c| is_upper(c) || is_lower(c));
    let Some(first) = letters.next() else {
        return CaseType::NoLetters;
    };

    let mut rest_lc = true;
    let mut all_uc = is_upper(first);
    for c in letters {
        if is_upper(c) {
            rest_lc = false;
        } else {
            all_uc = false;
        }
    }

    if all_uc {
        return CaseType::AllUpper;
    }
    if !rest_lc {
        return CaseType::Complex;
    }
    if is_upper(first) {
        CaseType::FirstUpper
    } else {
        CaseType::AllLower
    }
}

/// Apply a case transformation to a mutable character slice.
///
/// `NoLetters` and `Complex` leave the word unchanged.
pub fn set_case(word: &mut [char], case_type: CaseType) {
    match case_type {
        CaseType::NoLetters | CaseType::Complex => {}
        CaseType::AllLower => {
            for c in word.iter_mut() {
                *c = simple_lower(*c);
            }
        }
        CaseType::AllUpper => {
            for c in word.iter_mut() {
                *c = simple_upper(*c);
            }
        }
        CaseType::FirstUpper => {
            let mut seen_letter = false;
            for c in word.iter_mut() {
                if !seen_letter && (is_upper(*c) || is_lower(*c)) {
                    *c = simple_upper(*c);
                    seen_letter = true;
                } else {
                    *c = simple_lower(*c);
                }
            }
        }
    }
}

/// Return `word` rewritten with the capitalization pattern of `template`.
pub fn match_case(template: &str, word: &str) -> String {
    let template: Vec<char> = template.chars().collect();
    let mut chars: Vec<char> = word.chars().collect();
    set_case(&mut chars, detect_case(&template));
    chars.into_iter().collect()
}
