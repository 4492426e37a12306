// Phonetic transcription of stressed Russian wordforms.
//
// A word is cut into phones and rewritten by a fixed sequence of passes,
// each working on the output of the previous one:
//
//   1. jotation        iotated vowels after a vowel, a sign or at word start
//                      get an explicit [j]
//   2. palatalization  consonants soften before iotated vowels, и and ь
//   3. backing         и after ж, ш, ц is pronounced [ɨ]
//   4. signs           ь and ъ are dropped
//   5. reduction       unstressed vowels reduce (pretonic vs. other,
//                      hard vs. soft context)
//   6. devoicing       word-final voiced obstruents devoice
//   7. assimilation    obstruent clusters take the voicing of their last
//                      member (в does not trigger it)
//
// and then rendered as IPA. The stressed vowel keeps an acute mark. Words
// without a marked stress and with more than one vowel are not reduced.

use udar_core::character::{ACUTE, GRAVE, is_cyrillic, is_stress_mark, simple_lower};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phone {
    /// Consonant, by its Cyrillic letter.
    Cons { letter: char, soft: bool },
    /// Vowel: a Cyrillic letter before reduction, an IPA symbol after.
    Vowel { symbol: char, stressed: bool },
    /// Hard or soft sign, gone after pass 4.
    Sign(char),
}

const IOTATED: &[(char, char)] = &[('е', 'э'), ('ё', 'о'), ('ю', 'у'), ('я', 'а')];
const VOICING_PAIRS: &[(char, char)] = &[
    ('б', 'п'),
    ('в', 'ф'),
    ('г', 'к'),
    ('д', 'т'),
    ('ж', 'ш'),
    ('з', 'с'),
];

fn is_iotated(c: char) -> bool {
    IOTATED.iter().any(|&(i, _)| i == c)
}

fn is_always_hard(c: char) -> bool {
    matches!(c, 'ж' | 'ш' | 'ц')
}

fn is_always_soft(c: char) -> bool {
    matches!(c, 'й' | 'ч' | 'щ')
}

fn is_voiced_obstruent(c: char) -> bool {
    VOICING_PAIRS.iter().any(|&(v, _)| v == c)
}

fn is_voiceless_obstruent(c: char) -> bool {
    VOICING_PAIRS.iter().any(|&(_, u)| u == c) || matches!(c, 'х' | 'ц' | 'ч' | 'щ')
}

fn devoice(c: char) -> char {
    VOICING_PAIRS
        .iter()
        .find(|&&(v, _)| v == c)
        .map_or(c, |&(_, u)| u)
}

fn voice(c: char) -> char {
    VOICING_PAIRS
        .iter()
        .find(|&&(_, u)| u == c)
        .map_or(c, |&(v, _)| v)
}

fn is_vowel_letter(c: char) -> bool {
    matches!(c, 'а' | 'е' | 'ё' | 'и' | 'о' | 'у' | 'ы' | 'э' | 'ю' | 'я')
}

/// Cut one lowercase word into phones. Returns the phones and whether the
/// stress position is known.
fn segment(word: &str) -> (Vec<Phone>, bool) {
    let chars: Vec<char> = word.chars().map(simple_lower).collect();
    let mut phones = Vec::with_capacity(chars.len());
    let mut any_stress = false;
    for (i, &c) in chars.iter().enumerate() {
        if is_stress_mark(c) {
            continue;
        }
        if is_vowel_letter(c) {
            let stressed = c == 'ё' || chars.get(i + 1) == Some(&ACUTE);
            any_stress |= stressed;
            phones.push(Phone::Vowel { symbol: c, stressed });
        } else if c == 'ь' || c == 'ъ' {
            phones.push(Phone::Sign(c));
        } else {
            phones.push(Phone::Cons {
                letter: c,
                soft: is_always_soft(c),
            });
        }
    }
    if !any_stress {
        let mut vowels = phones.iter_mut().filter_map(|p| match p {
            Phone::Vowel { stressed, .. } => Some(stressed),
            _ => None,
        });
        if let (Some(only), None) = (vowels.next(), vowels.next()) {
            *only = true;
            any_stress = true;
        }
    }
    (phones, any_stress)
}

fn jotation(phones: &mut Vec<Phone>) {
    let mut i = 0;
    while i < phones.len() {
        if let Phone::Vowel { symbol, .. } = phones[i] {
            let prev = i.checked_sub(1).map(|p| phones[p]);
            let needs_j = match prev {
                None | Some(Phone::Vowel { .. }) => is_iotated(symbol),
                Some(Phone::Sign(_)) => is_iotated(symbol) || symbol == 'и',
                Some(Phone::Cons { .. }) => false,
            };
            if needs_j {
                phones.insert(i, Phone::Cons { letter: 'й', soft: true });
                i += 1;
            }
        }
        i += 1;
    }
}

fn palatalization(phones: &mut [Phone]) {
    for i in 1..phones.len() {
        let softens = match phones[i] {
            Phone::Vowel { symbol, .. } => is_iotated(symbol) || symbol == 'и',
            Phone::Sign('ь') => true,
            _ => false,
        };
        if !softens {
            continue;
        }
        if let Phone::Cons { letter, soft } = &mut phones[i - 1] {
            if !is_always_hard(*letter) {
                *soft = true;
            }
        }
    }
    for phone in phones.iter_mut() {
        if let Phone::Vowel { symbol, .. } = phone {
            if let Some(&(_, plain)) = IOTATED.iter().find(|&&(i, _)| i == *symbol) {
                *symbol = plain;
            }
        }
    }
}

fn backing(phones: &mut [Phone]) {
    for i in 1..phones.len() {
        let after_hard = matches!(phones[i - 1], Phone::Cons { letter, .. } if is_always_hard(letter));
        if let Phone::Vowel { symbol, .. } = &mut phones[i] {
            if after_hard && *symbol == 'и' {
                *symbol = 'ы';
            }
        }
    }
}

fn remove_signs(phones: &mut Vec<Phone>) {
    phones.retain(|p| !matches!(p, Phone::Sign(_)));
}

fn reduction(phones: &mut [Phone], stress_known: bool) {
    let stressed_ordinal = phones
        .iter()
        .filter(|p| matches!(p, Phone::Vowel { .. }))
        .position(|p| matches!(p, Phone::Vowel { stressed: true, .. }));

    let mut ordinal = 0;
    for i in 0..phones.len() {
        let prev = i.checked_sub(1).map(|p| phones[p]);
        let Phone::Vowel { symbol, stressed } = &mut phones[i] else {
            continue;
        };
        let full = match *symbol {
            'а' => 'a',
            'о' => 'o',
            'у' => 'u',
            'ы' => 'ɨ',
            'э' => 'e',
            'и' => 'i',
            other => other,
        };
        let reduced = if *stressed || !stress_known {
            full
        } else {
            let soft = matches!(prev, Some(Phone::Cons { soft: true, .. }));
            let initial = prev.is_none();
            let pretonic = stressed_ordinal.is_some_and(|s| ordinal + 1 == s);
            match (full, soft) {
                ('a' | 'o' | 'e', true) => 'ɪ',
                ('a' | 'o', false) if pretonic || initial => 'ɐ',
                ('a' | 'o', false) => 'ə',
                ('e', false) if initial => 'ɪ',
                ('e', false) => 'ɨ',
                ('i', _) => 'ɪ',
                ('u', _) => 'ʊ',
                (other, _) => other,
            }
        };
        *symbol = reduced;
        ordinal += 1;
    }
}

fn final_devoicing(phones: &mut [Phone]) {
    if let Some(Phone::Cons { letter, .. }) = phones.last_mut() {
        *letter = devoice(*letter);
    }
}

fn assimilation(phones: &mut [Phone]) {
    for i in (0..phones.len().saturating_sub(1)).rev() {
        let Phone::Cons { letter: next, .. } = phones[i + 1] else {
            continue;
        };
        let Phone::Cons { letter, .. } = &mut phones[i] else {
            continue;
        };
        if !(is_voiced_obstruent(*letter) || is_voiceless_obstruent(*letter)) {
            continue;
        }
        if is_voiceless_obstruent(next) {
            *letter = devoice(*letter);
        } else if is_voiced_obstruent(next) && next != 'в' {
            *letter = voice(*letter);
        }
    }
}

fn consonant_ipa(letter: char, soft: bool) -> &'static str {
    match (letter, soft) {
        ('б', false) => "b",
        ('б', true) => "bʲ",
        ('в', false) => "v",
        ('в', true) => "vʲ",
        ('г', false) => "ɡ",
        ('г', true) => "ɡʲ",
        ('д', false) => "d",
        ('д', true) => "dʲ",
        ('ж', _) => "ʐ",
        ('з', false) => "z",
        ('з', true) => "zʲ",
        ('й', _) => "j",
        ('к', false) => "k",
        ('к', true) => "kʲ",
        ('л', false) => "ɫ",
        ('л', true) => "lʲ",
        ('м', false) => "m",
        ('м', true) => "mʲ",
        ('н', false) => "n",
        ('н', true) => "nʲ",
        ('п', false) => "p",
        ('п', true) => "pʲ",
        ('р', false) => "r",
        ('р', true) => "rʲ",
        ('с', false) => "s",
        ('с', true) => "sʲ",
        ('т', false) => "t",
        ('т', true) => "tʲ",
        ('ф', false) => "f",
        ('ф', true) => "fʲ",
        ('х', false) => "x",
        ('х', true) => "xʲ",
        ('ц', _) => "t͡s",
        ('ч', _) => "t͡ɕ",
        ('ш', _) => "ʂ",
        ('щ', _) => "ɕː",
        _ => "",
    }
}

fn render(phones: &[Phone], fallback: &str) -> String {
    let mut out = String::with_capacity(fallback.len() * 2);
    for phone in phones {
        match *phone {
            Phone::Cons { letter, soft } => match consonant_ipa(letter, soft) {
                "" => out.push(letter),
                ipa => out.push_str(ipa),
            },
            Phone::Vowel { symbol, stressed } => {
                out.push(symbol);
                if stressed {
                    out.push(ACUTE);
                }
            }
            Phone::Sign(_) => {}
        }
    }
    out
}

/// Transcribe one Cyrillic word.
fn transcribe_word(word: &str) -> String {
    let (mut phones, stress_known) = segment(word);
    jotation(&mut phones);
    palatalization(&mut phones);
    backing(&mut phones);
    remove_signs(&mut phones);
    reduction(&mut phones, stress_known);
    final_devoicing(&mut phones);
    assimilation(&mut phones);
    render(&phones, word)
}

/// Phonetic transcription of stressed text.
///
/// Runs of Cyrillic letters (with their stress marks) are transcribed as
/// words; everything else is copied unchanged. Every input has exactly one
/// output.
pub fn transcribe(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    let mut word = String::new();
    for c in text.chars() {
        if is_cyrillic(c) || (!word.is_empty() && (c == ACUTE || c == GRAVE)) {
            word.push(c);
            continue;
        }
        if !word.is_empty() {
            out.push_str(&transcribe_word(&word));
            word.clear();
        }
        out.push(c);
    }
    if !word.is_empty() {
        out.push_str(&transcribe_word(&word));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reduction_after_hard_consonants() {
        assert_eq!(transcribe("сло́во"), "sɫóvə");
        assert_eq!(transcribe("вода́"), "vɐdá");
        assert_eq!(transcribe("огоро́д"), "ɐɡɐrót");
    }

    #[test]
    fn jotation_and_soft_reduction() {
        assert_eq!(transcribe("я́блоко"), "jábɫəkə");
        assert_eq!(transcribe("ещё"), "jɪɕːó");
    }

    #[test]
    fn palatalization_and_final_devoicing() {
        assert_eq!(transcribe("хлеб"), "xlʲép");
        assert_eq!(transcribe("друг"), "drúk");
    }

    #[test]
    fn voicing_assimilation() {
        assert_eq!(transcribe("ска́зка"), "skáskə");
        assert_eq!(transcribe("вокза́л"), "vɐɡzáɫ");
    }

    #[test]
    fn hard_consonant_backing_and_signs() {
        assert_eq!(transcribe("жизнь"), "ʐɨ́znʲ");
        assert_eq!(transcribe("Мы́"), "mɨ́");
    }

    #[test]
    fn non_cyrillic_passes_through() {
        assert_eq!(transcribe("."), ".");
        assert_eq!(transcribe("hello"), "hello");
        assert_eq!(transcribe("Мы́, да́."), "mɨ́, dá.");
    }

    #[test]
    fn unknown_stress_is_not_reduced() {
        assert_eq!(transcribe("молоко"), "moɫoko");
    }
}
