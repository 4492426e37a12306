// Stress guessing for words the analyzer does not know.
//
// Productive suffixes with a fixed stress position decide first; any other
// word of two or more syllables gets penultimate stress, the most common
// pattern in running text. The guess never overrides stress that is
// already written (an acute mark or ё).

use tracing::trace;
use udar_core::character::{has_stress, is_cyrillic, is_vowel, mark_vowels, simple_lower};

/// Suffixes (lowercase, unstressed) and the stressed vowel counted from
/// the end of the word, 1 being the last vowel. Longer suffixes first.
const SUFFIX_RULES: &[(&str, usize)] = &[
    ("ировать", 3),
    ("ировал", 3),
    ("логия", 3),
    ("ость", 2),
    ("ение", 3),
    ("ание", 3),
    ("тель", 2),
    ("ция", 3),
    ("изм", 1),
    ("ист", 1),
];

/// Guessed stressed form of an unknown word, or `None` when nothing is
/// guessed: monosyllables, words with written stress, and words that are
/// not entirely Cyrillic letters.
pub fn guess_stress(word: &str) -> Option<String> {
    if word.is_empty() || has_stress(word) || !word.chars().all(|c| is_cyrillic(c) || c == '-') {
        return None;
    }
    let vowels = word.chars().filter(|&c| is_vowel(c)).count();
    if vowels < 2 {
        return None;
    }
    let lower: String = word.chars().map(simple_lower).collect();
    let from_end = SUFFIX_RULES
        .iter()
        .find(|(suffix, _)| lower.ends_with(suffix))
        .map_or(2, |&(suffix, n)| {
            trace!(word, suffix, "stress guessed by suffix");
            n
        });
    let ordinal = vowels.checked_sub(from_end)?;
    Some(mark_vowels(word, &[ordinal]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn productive_suffixes() {
        assert_eq!(guess_stress("компостировать").as_deref(), Some("компости\u{301}ровать"));
        assert_eq!(guess_stress("дедупликация").as_deref(), Some("дедуплика\u{301}ция"));
        assert_eq!(guess_stress("гуглизм").as_deref(), Some("гугли\u{301}зм"));
        assert_eq!(guess_stress("Блогеристость").as_deref(), Some("Блогери\u{301}стость"));
    }

    #[test]
    fn penultimate_by_default() {
        assert_eq!(guess_stress("шмурдяк").as_deref(), Some("шму\u{301}рдяк"));
        assert_eq!(guess_stress("ШМУРДЯКИ").as_deref(), Some("ШМУРДЯ\u{301}КИ"));
    }

    #[test]
    fn nothing_to_guess() {
        assert_eq!(guess_stress("брысь"), None);
        assert_eq!(guess_stress("ёлкин"), None);
        assert_eq!(guess_stress("шму\u{301}рдяк"), None);
        assert_eq!(guess_stress("okay"), None);
        assert_eq!(guess_stress(""), None);
        // Suffix rule needs more vowels than the word has.
        assert_eq!(guess_stress("ция"), None);
    }
}
