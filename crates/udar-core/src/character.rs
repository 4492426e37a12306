// Character classification, stress marks and Cyrillic helpers.

// ---------------------------------------------------------------------------
// Stress marks
// ---------------------------------------------------------------------------

/// Combining acute accent, the primary stress mark: x́
pub const ACUTE: char = '\u{0301}';

/// Combining grave accent, the secondary stress mark: x̀
pub const GRAVE: char = '\u{0300}';

/// Russian vowel letters (lowercase): а е ё и о у ы э ю я
const RUSSIAN_VOWELS: &[char] = &['а', 'е', 'ё', 'и', 'о', 'у', 'ы', 'э', 'ю', 'я'];

/// Check whether a character is a combining stress mark.
pub fn is_stress_mark(c: char) -> bool {
    c == ACUTE || c == GRAVE
}

/// Remove stress marks from a wordform and write ё as е.
pub fn destress(word: &str) -> String {
    word.chars()
        .filter(|&c| !is_stress_mark(c))
        .map(|c| match c {
            'ё' => 'е',
            'Ё' => 'Е',
            other => other,
        })
        .collect()
}

/// Remove stress marks only; ё stays.
pub fn strip_stress_marks(word: &str) -> String {
    word.chars().filter(|&c| !is_stress_mark(c)).collect()
}

/// Check whether a wordform carries an explicit stress mark or a ё.
pub fn has_stress(word: &str) -> bool {
    word.chars()
        .any(|c| c == ACUTE || c == 'ё' || c == 'Ё')
}

/// Positions (as vowel ordinals, counted from 0) of stressed vowels.
///
/// A vowel is stressed if it is followed by an acute mark or if it is ё.
pub fn stressed_vowels(word: &str) -> Vec<usize> {
    let chars: Vec<char> = word.chars().collect();
    let mut result = Vec::new();
    let mut ordinal = 0;
    for (i, &c) in chars.iter().enumerate() {
        if !is_vowel(c) {
            continue;
        }
        let marked = chars.get(i + 1) == Some(&ACUTE);
        if marked || simple_lower(c) == 'ё' {
            result.push(ordinal);
        }
        ordinal += 1;
    }
    result
}

/// Add acute marks after the vowels at the given ordinals.
///
/// Marks already present are kept; ё is never marked.
pub fn mark_vowels(word: &str, ordinals: &[usize]) -> String {
    let chars: Vec<char> = word.chars().collect();
    let mut out = String::with_capacity(word.len() + ordinals.len() * 2);
    let mut ordinal = 0;
    for (i, &c) in chars.iter().enumerate() {
        out.push(c);
        if !is_vowel(c) {
            continue;
        }
        let already = chars.get(i + 1) == Some(&ACUTE);
        if ordinals.contains(&ordinal) && !already && simple_lower(c) != 'ё' {
            out.push(ACUTE);
        }
        ordinal += 1;
    }
    out
}

// ---------------------------------------------------------------------------
// Character type classification
// ---------------------------------------------------------------------------

/// Character type classification used by the tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharType {
    Unknown,
    Letter,
    Digit,
    Whitespace,
    Punctuation,
    /// Combining stress mark, part of the preceding letter.
    StressMark,
}

/// Returns the character type for a given character.
pub fn get_char_type(c: char) -> CharType {
    if is_stress_mark(c) {
        return CharType::StressMark;
    }
    if c.is_alphabetic() {
        return CharType::Letter;
    }
    if c.is_ascii_digit() {
        return CharType::Digit;
    }
    if c.is_whitespace() {
        return CharType::Whitespace;
    }
    if is_punctuation_char(c) {
        return CharType::Punctuation;
    }
    CharType::Unknown
}

fn is_punctuation_char(c: char) -> bool {
    c.is_ascii_punctuation()
        || matches!(
            c,
            '\u{00AB}' // « LEFT-POINTING DOUBLE ANGLE QUOTATION MARK
                | '\u{00BB}' // » RIGHT-POINTING DOUBLE ANGLE QUOTATION MARK
                | '\u{2010}' // HYPHEN
                | '\u{2011}' // NON-BREAKING HYPHEN
                | '\u{2013}' // EN DASH
                | '\u{2014}' // EM DASH
                | '\u{2018}' // LEFT SINGLE QUOTATION MARK
                | '\u{2019}' // RIGHT SINGLE QUOTATION MARK
                | '\u{201C}' // LEFT DOUBLE QUOTATION MARK
                | '\u{201D}' // RIGHT DOUBLE QUOTATION MARK
                | '\u{201E}' // DOUBLE LOW-9 QUOTATION MARK
                | '\u{2026}' // HORIZONTAL ELLIPSIS
        )
}

/// Check whether a character ends a sentence.
pub fn is_sentence_final(c: char) -> bool {
    matches!(c, '.' | '!' | '?' | '\u{2026}')
}

// ---------------------------------------------------------------------------
// Russian phonological classification
// ---------------------------------------------------------------------------

/// Check whether a character is a Russian vowel letter (case-insensitive).
pub fn is_vowel(c: char) -> bool {
    RUSSIAN_VOWELS.contains(&simple_lower(c))
}

/// Check whether a character is a Russian consonant letter (case-insensitive).
///
/// The hard and soft signs are not consonants.
pub fn is_consonant(c: char) -> bool {
    let lower = simple_lower(c);
    ('а'..='я').contains(&lower) && !is_vowel(lower) && lower != 'ъ' && lower != 'ь'
}

/// Check whether a character is a Cyrillic letter.
pub fn is_cyrillic(c: char) -> bool {
    ('\u{0400}'..='\u{04FF}').contains(&c)
}

// ---------------------------------------------------------------------------
// Simple case conversion
// ---------------------------------------------------------------------------

/// Convert a character to its simple (one-to-one) lowercase equivalent.
pub fn simple_lower(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// Convert a character to its simple (one-to-one) uppercase equivalent.
pub fn simple_upper(c: char) -> char {
    c.to_uppercase().next().unwrap_or(c)
}

/// Check whether a character is an uppercase letter.
pub fn is_upper(c: char) -> bool {
    c != simple_lower(c)
}

/// Check whether a character is a lowercase letter.
pub fn is_lower(c: char) -> bool {
    c != simple_upper(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destress_removes_marks_and_yo() {
        assert_eq!(destress("сло́во"), "слово");
        assert_eq!(destress("ёлка"), "елка");
        assert_eq!(destress("Ёжик"), "Ежик");
        assert_eq!(destress("по\u{0300}луостро\u{0301}в"), "полуостров");
        assert_eq!(strip_stress_marks("ещё сло́во"), "ещё слово");
    }

    #[test]
    fn stress_detection() {
        assert!(has_stress("сло́во"));
        assert!(has_stress("ёж"));
        assert!(!has_stress("слово"));
    }

    #[test]
    fn stressed_vowel_ordinals() {
        assert_eq!(stressed_vowels("сло́во"), vec![0]);
        assert_eq!(stressed_vowels("слова́"), vec![1]);
        assert_eq!(stressed_vowels("ещё"), vec![1]);
        assert!(stressed_vowels("слово").is_empty());
    }

    #[test]
    fn marking_vowels() {
        assert_eq!(mark_vowels("слова", &[0, 1]), "сло́ва́");
        assert_eq!(mark_vowels("сло́ва", &[0]), "сло́ва");
        assert_eq!(mark_vowels("ещё", &[1]), "ещё");
    }

    #[test]
    fn char_types() {
        assert_eq!(get_char_type('ж'), CharType::Letter);
        assert_eq!(get_char_type('Q'), CharType::Letter);
        assert_eq!(get_char_type('7'), CharType::Digit);
        assert_eq!(get_char_type(' '), CharType::Whitespace);
        assert_eq!(get_char_type('\u{00A0}'), CharType::Whitespace);
        assert_eq!(get_char_type(','), CharType::Punctuation);
        assert_eq!(get_char_type('\u{00AB}'), CharType::Punctuation);
        assert_eq!(get_char_type('\u{2014}'), CharType::Punctuation);
        assert_eq!(get_char_type(ACUTE), CharType::StressMark);
        assert_eq!(get_char_type('\u{2603}'), CharType::Unknown);
    }

    #[test]
    fn vowels_and_consonants() {
        assert!(is_vowel('а'));
        assert!(is_vowel('Ё'));
        assert!(is_vowel('ы'));
        assert!(!is_vowel('б'));
        assert!(is_consonant('щ'));
        assert!(is_consonant('Й'));
        assert!(!is_consonant('ь'));
        assert!(!is_consonant('ъ'));
        assert!(!is_consonant('a')); // latin
    }

    #[test]
    fn case_helpers() {
        assert_eq!(simple_lower('Ж'), 'ж');
        assert_eq!(simple_upper('ё'), 'Ё');
        assert!(is_upper('Я'));
        assert!(is_lower('я'));
        assert!(!is_upper('1'));
        assert!(!is_lower('1'));
    }

    #[test]
    fn cyrillic_range() {
        assert!(is_cyrillic('д'));
        assert!(!is_cyrillic('d'));
    }
}
