// Tokenization and sentence splitting.
//
// Word tokens are runs of letters and digits; combining stress marks and
// inner hyphens stay inside the word ("сло́во", "кто-то"). Every other
// non-space character is a token of its own, except that a run of dots
// ("...") stays together. Whitespace separates tokens and is dropped.

use std::ops::Range;

use udar_core::character::{CharType, get_char_type, is_sentence_final, is_upper};

/// One token as cut from the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawToken {
    pub text: String,
    /// Byte range in the tokenized text.
    pub span: Range<usize>,
}

/// Splits text into tokens with positions.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<RawToken>;
}

/// The default rule-based tokenizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleTokenizer;

fn is_word_char(t: CharType) -> bool {
    matches!(t, CharType::Letter | CharType::Digit | CharType::StressMark)
}

fn is_hyphen(c: char) -> bool {
    c == '-' || c == '\u{2010}' || c == '\u{2011}'
}

impl Tokenizer for RuleTokenizer {
    fn tokenize(&self, text: &str) -> Vec<RawToken> {
        let chars: Vec<(usize, char)> = text.char_indices().collect();
        let end_of = |i: usize| chars.get(i).map_or(text.len(), |&(pos, _)| pos);
        let mut tokens = Vec::new();
        let mut i = 0;

        while i < chars.len() {
            let (start, c) = chars[i];
            let mut j = i + 1;
            match get_char_type(c) {
                CharType::Whitespace => {
                    i += 1;
                    continue;
                }
                CharType::Letter | CharType::Digit => {
                    while j < chars.len() {
                        let next = chars[j].1;
                        if is_word_char(get_char_type(next)) {
                            j += 1;
                        } else if is_hyphen(next)
                            && chars
                                .get(j + 1)
                                .is_some_and(|&(_, after)| {
                                    matches!(get_char_type(after), CharType::Letter | CharType::Digit)
                                })
                        {
                            j += 2;
                        } else {
                            break;
                        }
                    }
                }
                _ if c == '.' => {
                    while j < chars.len() && chars[j].1 == '.' {
                        j += 1;
                    }
                }
                _ => {}
            }
            let end = end_of(j);
            tokens.push(RawToken {
                text: text[start..end].to_string(),
                span: start..end,
            });
            i = j;
        }
        tokens
    }
}

/// Characters that may follow sentence-final punctuation and still belong
/// to the same sentence.
fn is_closing(c: char) -> bool {
    matches!(c, '"' | '\'' | ')' | ']' | '\u{00BB}' | '\u{201D}' | '\u{2019}')
}

/// Byte ranges of the sentences in `text`, trimmed of surrounding
/// whitespace.
///
/// A sentence ends after `.`, `!`, `?` or `…` (plus any closing quotes or
/// brackets) when followed by whitespace and an uppercase letter, or by the
/// end of the text.
pub fn split_sentences(text: &str) -> Vec<Range<usize>> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let end_of = |i: usize| chars.get(i).map_or(text.len(), |&(pos, _)| pos);
    let mut ranges = Vec::new();
    let mut sentence_start: Option<usize> = None;
    let mut i = 0;

    while i < chars.len() {
        let (pos, c) = chars[i];
        if sentence_start.is_none() {
            if c.is_whitespace() {
                i += 1;
                continue;
            }
            sentence_start = Some(pos);
        }
        if !is_sentence_final(c) {
            i += 1;
            continue;
        }

        let mut j = i + 1;
        while j < chars.len() && (is_sentence_final(chars[j].1) || is_closing(chars[j].1)) {
            j += 1;
        }
        let mut k = j;
        while k < chars.len() && chars[k].1.is_whitespace() {
            k += 1;
        }
        let boundary = k == chars.len() || (k > j && is_upper(chars[k].1));
        if boundary {
            if let Some(start) = sentence_start.take() {
                ranges.push(start..end_of(j));
            }
        }
        i = j;
    }

    if let Some(start) = sentence_start {
        let end = text.trim_end().len();
        if end > start {
            ranges.push(start..end);
        }
    }
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(s: &str) -> Vec<String> {
        RuleTokenizer.tokenize(s).into_iter().map(|t| t.text).collect()
    }

    #[test]
    fn words_and_punctuation() {
        assert_eq!(
            texts("Мы удивились простоте системы."),
            ["Мы", "удивились", "простоте", "системы", "."]
        );
    }

    #[test]
    fn spans_index_source() {
        let text = "Он, сказал:  «да».";
        for token in RuleTokenizer.tokenize(text) {
            assert_eq!(&text[token.span.clone()], token.text);
        }
        assert_eq!(texts(text), ["Он", ",", "сказал", ":", "«", "да", "»", "."]);
    }

    #[test]
    fn stress_marks_and_hyphens_stay_in_words() {
        assert_eq!(texts("сло́во кто-то"), ["сло́во", "кто-то"]);
        assert_eq!(texts("слово - дело"), ["слово", "-", "дело"]);
        assert_eq!(texts("конец-"), ["конец", "-"]);
    }

    #[test]
    fn ellipsis_is_one_token() {
        assert_eq!(texts("Ну... да"), ["Ну", "...", "да"]);
    }

    #[test]
    fn empty_and_blank_text() {
        assert!(texts("").is_empty());
        assert!(texts(" \n\t").is_empty());
    }

    #[test]
    fn sentence_boundaries() {
        let text = "Мы удивились. Он ушёл! А потом? Да";
        let sentences: Vec<&str> = split_sentences(text).into_iter().map(|r| &text[r]).collect();
        assert_eq!(sentences, ["Мы удивились.", "Он ушёл!", "А потом?", "Да"]);
    }

    #[test]
    fn no_boundary_before_lowercase() {
        let text = "т. е. всё.  ";
        let sentences: Vec<&str> = split_sentences(text).into_iter().map(|r| &text[r]).collect();
        assert_eq!(sentences, ["т. е. всё."]);
    }

    #[test]
    fn closing_quotes_stay_with_sentence() {
        let text = "Он сказал «да.» Потом ушёл.";
        let sentences: Vec<&str> = split_sentences(text).into_iter().map(|r| &text[r]).collect();
        assert_eq!(sentences, ["Он сказал «да.»", "Потом ушёл."]);
    }
}
