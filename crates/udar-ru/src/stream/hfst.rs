// Flat analysis stream, in the format hfst-lookup prints:
//
//   слова	слово+N+Neu+Inan+Sg+Gen	5.975586
//   слова	слово+N+Neu+Inan+Pl+Acc	5.975586
//
//   шмурдяк	шмурдяк+?	inf
//
// One line per active reading, one blank-line separated block per token.
// A token without readings is written with the `+?` unknown marker.
// Removed readings and markers have no representation here.

use udar_core::Result;
use udar_core::reading::{Reading, UNKNOWN_SUFFIX};
use udar_fst::hfst::parse_lookup_output;

use super::locate_spans;
use crate::derivation::unspace_punct;
use crate::sentence::Sentence;
use crate::token::Token;

/// Write one token block.
pub fn write_token(out: &mut String, token: &Token) {
    if token.readings().is_empty() {
        out.push_str(&format!("{0}\t{0}{UNKNOWN_SUFFIX}\tinf\n", token.text()));
    }
    for reading in token.readings() {
        out.push_str(&format!(
            "{}\t{}\t{:.6}\n",
            token.text(),
            reading.hfst_str(),
            reading.weight()
        ));
    }
    out.push('\n');
}

/// Write the active readings of every token of a sentence.
pub fn write_sentence(sentence: &Sentence) -> String {
    let mut out = String::new();
    for token in sentence.tokens() {
        write_token(&mut out, token);
    }
    out
}

/// Parse a flat stream as one sentence.
///
/// Reading order is kept as written. Since the format has no selection
/// marker, the lowest-weight reading of each token is marked most likely.
pub fn parse_sentence(stream: &str) -> Result<Sentence> {
    let blocks = parse_lookup_output(stream)?;
    let mut tokens = Vec::with_capacity(blocks.len());
    for (i, block) in blocks.iter().enumerate() {
        let mut readings = Vec::new();
        for (analysis, weight) in block.known() {
            if let Some(reading) = Reading::parse(analysis, *weight)? {
                readings.push(reading);
            }
        }
        let mut token = Token::from_partitions(&block.input, i + 1, readings, Vec::new());
        token.select_fallback_most_likely();
        tokens.push(token);
    }
    let surfaces: Vec<&str> = tokens.iter().map(Token::text).collect();
    let text = unspace_punct(&surfaces.join(" "));
    locate_spans(&text, &mut tokens);
    Ok(Sentence::from_parts(None, text, tokens))
}

#[cfg(test)]
mod tests {
    use super::*;
    use udar_core::UdarError;

    const STREAM: &str = "\
слова\tслово+N+Neu+Inan+Sg+Gen\t5.975586
слова\tслово+N+Neu+Inan+Pl+Acc\t5.975586
слова\tслово+N+Neu+Inan+Pl+Nom\t5.975586

шмурдяк\tшмурдяк+?\tinf

";

    #[test]
    fn round_trip() {
        let sentence = parse_sentence(STREAM).unwrap();
        assert_eq!(sentence.tokens().len(), 2);
        assert_eq!(sentence.tokens()[0].readings().len(), 3);
        assert!(sentence.tokens()[1].is_oov());
        assert_eq!(write_sentence(&sentence), STREAM);
        assert_eq!(parse_sentence(&write_sentence(&sentence)).unwrap(), sentence);
    }

    #[test]
    fn first_of_equal_weights_is_most_likely() {
        let sentence = parse_sentence(STREAM).unwrap();
        let ml = sentence.tokens()[0].most_likely().unwrap();
        assert_eq!(ml.hfst_str(), "слово+N+Neu+Inan+Sg+Gen");
    }

    #[test]
    fn unknown_tag_is_malformed_analysis() {
        let err = parse_sentence("слова\tслово+N+Bogus\t1.0\n\n").unwrap_err();
        assert!(matches!(err, UdarError::MalformedAnalysis { .. }));
    }
}
