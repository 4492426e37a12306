// Transliteration of Cyrillic text into Latin script.
//
// Each scheme is a lowercase substitution table. Uppercase letters take the
// lowercase value capitalized, or fully uppercased inside an all-caps word.
// Characters a table does not list pass through unchanged.

use std::fmt;

use serde::Serialize;
use udar_core::character::{is_lower, is_upper, simple_lower};

/// A named transliteration table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Scheme {
    /// Scholarly (linguistic) system.
    #[default]
    Scholarly,
    /// ISO 9:1995, one Latin letter per Cyrillic letter.
    Iso9,
    /// Library of Congress (ALA-LC), without tie marks.
    Loc,
    /// Russian international passports, 2013 rules (ICAO 9303).
    Passport2013,
}

const SCHOLARLY: &[(char, &str)] = &[
    ('а', "a"), ('б', "b"), ('в', "v"), ('г', "g"), ('д', "d"), ('е', "e"),
    ('ё', "ë"), ('ж', "ž"), ('з', "z"), ('и', "i"), ('й', "j"), ('к', "k"),
    ('л', "l"), ('м', "m"), ('н', "n"), ('о', "o"), ('п', "p"), ('р', "r"),
    ('с', "s"), ('т', "t"), ('у', "u"), ('ф', "f"), ('х', "x"), ('ц', "c"),
    ('ч', "č"), ('ш', "š"), ('щ', "šč"), ('ъ', "ʺ"), ('ы', "y"), ('ь', "ʹ"),
    ('э', "è"), ('ю', "ju"), ('я', "ja"),
];

const ISO9: &[(char, &str)] = &[
    ('а', "a"), ('б', "b"), ('в', "v"), ('г', "g"), ('д', "d"), ('е', "e"),
    ('ё', "ë"), ('ж', "ž"), ('з', "z"), ('и', "i"), ('й', "j"), ('к', "k"),
    ('л', "l"), ('м', "m"), ('н', "n"), ('о', "o"), ('п', "p"), ('р', "r"),
    ('с', "s"), ('т', "t"), ('у', "u"), ('ф', "f"), ('х', "h"), ('ц', "c"),
    ('ч', "č"), ('ш', "š"), ('щ', "ŝ"), ('ъ', "ʺ"), ('ы', "y"), ('ь', "ʹ"),
    ('э', "è"), ('ю', "û"), ('я', "â"),
];

const LOC: &[(char, &str)] = &[
    ('а', "a"), ('б', "b"), ('в', "v"), ('г', "g"), ('д', "d"), ('е', "e"),
    ('ё', "ë"), ('ж', "zh"), ('з', "z"), ('и', "i"), ('й', "ĭ"), ('к', "k"),
    ('л', "l"), ('м', "m"), ('н', "n"), ('о', "o"), ('п', "p"), ('р', "r"),
    ('с', "s"), ('т', "t"), ('у', "u"), ('ф', "f"), ('х', "kh"), ('ц', "ts"),
    ('ч', "ch"), ('ш', "sh"), ('щ', "shch"), ('ъ', "ʺ"), ('ы', "y"), ('ь', "ʹ"),
    ('э', "ė"), ('ю', "iu"), ('я', "ia"),
];

const PASSPORT_2013: &[(char, &str)] = &[
    ('а', "a"), ('б', "b"), ('в', "v"), ('г', "g"), ('д', "d"), ('е', "e"),
    ('ё', "e"), ('ж', "zh"), ('з', "z"), ('и', "i"), ('й', "i"), ('к', "k"),
    ('л', "l"), ('м', "m"), ('н', "n"), ('о', "o"), ('п', "p"), ('р', "r"),
    ('с', "s"), ('т', "t"), ('у', "u"), ('ф', "f"), ('х', "kh"), ('ц', "ts"),
    ('ч', "ch"), ('ш', "sh"), ('щ', "shch"), ('ъ', "ie"), ('ы', "y"), ('ь', ""),
    ('э', "e"), ('ю', "iu"), ('я', "ia"),
];

impl Scheme {
    pub const ALL: [Scheme; 4] = [Scheme::Scholarly, Scheme::Iso9, Scheme::Loc, Scheme::Passport2013];

    /// Look up a scheme by name, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.name().eq_ignore_ascii_case(name.trim()))
    }

    pub fn name(self) -> &'static str {
        match self {
            Scheme::Scholarly => "Scholarly",
            Scheme::Iso9 => "ISO9",
            Scheme::Loc => "LOC",
            Scheme::Passport2013 => "Passport2013",
        }
    }

    fn table(self) -> &'static [(char, &'static str)] {
        match self {
            Scheme::Scholarly => SCHOLARLY,
            Scheme::Iso9 => ISO9,
            Scheme::Loc => LOC,
            Scheme::Passport2013 => PASSPORT_2013,
        }
    }

    fn lookup(self, lower: char) -> Option<&'static str> {
        self.table()
            .iter()
            .find(|&&(c, _)| c == lower)
            .map(|&(_, latin)| latin)
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn capitalize(latin: &str) -> String {
    let mut chars = latin.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Transliterate `text` with `scheme`.
pub fn transliterate(text: &str, scheme: Scheme) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    for (i, &c) in chars.iter().enumerate() {
        let Some(latin) = scheme.lookup(simple_lower(c)) else {
            out.push(c);
            continue;
        };
        if !is_upper(c) {
            out.push_str(latin);
            continue;
        }
        let next_upper = chars.get(i + 1).is_some_and(|&n| is_upper(n));
        let prev_upper = i > 0 && is_upper(chars[i - 1]);
        let next_lower = chars.get(i + 1).is_some_and(|&n| is_lower(n));
        if next_upper || (prev_upper && !next_lower) {
            out.push_str(&latin.to_uppercase());
        } else {
            out.push_str(&capitalize(latin));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_case_insensitive() {
        assert_eq!(Scheme::from_name("iso9"), Some(Scheme::Iso9));
        assert_eq!(Scheme::from_name("PASSPORT2013"), Some(Scheme::Passport2013));
        assert_eq!(Scheme::from_name("loc"), Some(Scheme::Loc));
        assert_eq!(Scheme::from_name("Klingon"), None);
        assert_eq!(Scheme::default().to_string(), "Scholarly");
    }

    #[test]
    fn schemes_differ_on_sibilants() {
        let word = "щука";
        assert_eq!(transliterate(word, Scheme::Scholarly), "ščuka");
        assert_eq!(transliterate(word, Scheme::Iso9), "ŝuka");
        assert_eq!(transliterate(word, Scheme::Loc), "shchuka");
        assert_eq!(transliterate(word, Scheme::Passport2013), "shchuka");
    }

    #[test]
    fn capitalization() {
        assert_eq!(transliterate("Щука", Scheme::Loc), "Shchuka");
        assert_eq!(transliterate("ЩУКА", Scheme::Loc), "SHCHUKA");
        assert_eq!(transliterate("Юля Ж", Scheme::Scholarly), "Julja Ž");
    }

    #[test]
    fn unmapped_characters_pass_through() {
        assert_eq!(
            transliterate("Мы удивились простоте системы.", Scheme::Scholarly),
            "My udivilis' prostote sistemy.".replace('\'', "ʹ")
        );
        assert_eq!(transliterate("OK, 42!", Scheme::Iso9), "OK, 42!");
    }

    #[test]
    fn passport_drops_soft_sign() {
        assert_eq!(transliterate("Ольга", Scheme::Passport2013), "Olga");
        // Hard sign is written out in full and the following vowel is kept.
        assert_eq!(transliterate("объект", Scheme::Passport2013), "obieekt");
        assert_eq!(transliterate("подъезд", Scheme::Passport2013), "podieezd");
    }
}
