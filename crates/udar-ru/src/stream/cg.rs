// Disambiguation stream codec.
//
//   "<системы>"
//   	система+N+Fem+Inan+Sg+Gen	8.236328 @most-likely
//   	система+N+Fem+Inan+Pl+Nom	8.236328 ;removed REMOVE:2141
//
// One cohort per token: a quoted surface header, then one tab-indented
// line per reading with the analysis, a tab, the weight (six decimals) and
// optional space-separated markers. `;removed` moves the reading to the
// removed partition, `@most-likely` selects it, any other word is a rule
// reference. Cohorts are separated by a blank line.

use tracing::warn;
use udar_core::reading::Reading;
use udar_core::{Result, UdarError};
use udar_fst::parse_weight;

use super::{SentenceHeader, locate_spans, split_sentences};
use crate::derivation::unspace_punct;
use crate::sentence::Sentence;
use crate::token::Token;

pub const REMOVED_MARKER: &str = ";removed";
pub const MOST_LIKELY_MARKER: &str = "@most-likely";

/// One reading line as it appears in a stream.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamReading {
    /// `lemma+TAG+TAG` exactly as written.
    pub analysis: String,
    pub weight: f64,
    pub removed: bool,
    pub most_likely: bool,
    /// Rule references, in line order.
    pub rules: Vec<String>,
    /// 1-based line number in the stream.
    pub line: usize,
}

impl StreamReading {
    /// Rule references joined into one string, if any.
    pub fn rule(&self) -> Option<String> {
        (!self.rules.is_empty()).then(|| self.rules.join(" "))
    }
}

/// One token block of a stream.
#[derive(Debug, Clone, PartialEq)]
pub struct Cohort {
    pub surface: String,
    pub readings: Vec<StreamReading>,
    pub line: usize,
}

fn parse_header(line: &str) -> Option<&str> {
    line.strip_prefix("\"<")?.strip_suffix(">\"")
}

fn parse_reading_line(body: &str, line: usize) -> Result<StreamReading> {
    let Some((analysis, rest)) = body.split_once('\t') else {
        return Err(UdarError::MalformedStream {
            line,
            reason: "reading line without a weight column".into(),
        });
    };
    let mut words = rest.split_whitespace();
    let weight_field = words.next().unwrap_or_default();
    let weight = match parse_weight(weight_field) {
        Some(w) if !weight_field.is_empty() => w,
        _ => {
            return Err(UdarError::MalformedStream {
                line,
                reason: format!("invalid weight {weight_field:?}"),
            });
        }
    };

    let mut reading = StreamReading {
        analysis: analysis.to_string(),
        weight,
        removed: false,
        most_likely: false,
        rules: Vec::new(),
        line,
    };
    for word in words {
        match word {
            REMOVED_MARKER => reading.removed = true,
            MOST_LIKELY_MARKER => reading.most_likely = true,
            w if w.starts_with(';') || w.starts_with('@') => {
                warn!(line, marker = w, "ignoring unknown stream marker");
            }
            w => reading.rules.push(w.to_string()),
        }
    }
    Ok(reading)
}

/// Parse stream lines into cohorts. `first_line` is the stream line
/// number of `lines[0]`. Comment lines and blank lines are skipped.
pub(crate) fn parse_lines(lines: &[&str], first_line: usize) -> Result<Vec<Cohort>> {
    let mut cohorts: Vec<Cohort> = Vec::new();
    for (offset, raw) in lines.iter().enumerate() {
        let line = first_line + offset;
        let text = raw.trim_end_matches('\r');
        if text.trim().is_empty() || text.starts_with('#') {
            continue;
        }
        if let Some(surface) = parse_header(text) {
            cohorts.push(Cohort {
                surface: surface.to_string(),
                readings: Vec::new(),
                line,
            });
        } else if let Some(body) = text.strip_prefix('\t') {
            let reading = parse_reading_line(body, line)?;
            match cohorts.last_mut() {
                Some(cohort) => cohort.readings.push(reading),
                None => {
                    return Err(UdarError::MalformedStream {
                        line,
                        reason: "reading line before any cohort header".into(),
                    });
                }
            }
        } else {
            return Err(UdarError::MalformedStream {
                line,
                reason: format!("expected a cohort header or a reading line, got {text:?}"),
            });
        }
    }
    Ok(cohorts)
}

/// Parse a whole stream into cohorts, ignoring sentence headers.
pub fn parse_cohorts(stream: &str) -> Result<Vec<Cohort>> {
    let lines: Vec<&str> = stream.lines().collect();
    parse_lines(&lines, 1)
}

/// Build a token from a parsed cohort, keeping reading order, partitions
/// and flags as written. The first `@most-likely` on an active reading
/// wins.
pub fn cohort_to_token(cohort: &Cohort, position: usize) -> Result<Token> {
    let mut active = Vec::new();
    let mut removed = Vec::new();
    let mut selected = false;
    for sr in &cohort.readings {
        let Some(mut reading) = Reading::parse(&sr.analysis, sr.weight)? else {
            continue;
        };
        reading.set_cg_rule(sr.rule());
        if sr.removed {
            removed.push(reading);
        } else {
            if sr.most_likely && !selected {
                reading.set_most_likely(true);
                selected = true;
            }
            active.push(reading);
        }
    }
    Ok(Token::from_partitions(&cohort.surface, position, active, removed))
}

fn sentence_from_cohorts(
    header: SentenceHeader,
    cohorts: &[Cohort],
) -> Result<Sentence> {
    let mut tokens = cohorts
        .iter()
        .enumerate()
        .map(|(i, cohort)| cohort_to_token(cohort, i + 1))
        .collect::<Result<Vec<_>>>()?;
    let text = match header.text {
        Some(text) => text,
        None => {
            let surfaces: Vec<&str> = tokens.iter().map(Token::text).collect();
            unspace_punct(&surfaces.join(" "))
        }
    };
    locate_spans(&text, &mut tokens);
    Ok(Sentence::from_parts(header.id, text, tokens))
}

/// Parse a stream as one sentence. Headers, if present, supply the id
/// and text; otherwise the text is rebuilt from the surfaces.
pub fn parse_sentence(stream: &str) -> Result<Sentence> {
    let mut header = SentenceHeader::default();
    for line in stream.lines() {
        let mut candidate = SentenceHeader::default();
        if candidate.read_line(line) {
            if header.id.is_none() {
                header.id = candidate.id;
            }
            if header.text.is_none() {
                header.text = candidate.text;
            }
        }
    }
    let cohorts = parse_cohorts(stream)?;
    sentence_from_cohorts(header, &cohorts)
}

/// Parse a multi-sentence stream, one sentence per header group.
pub fn parse_document(stream: &str) -> Result<Vec<Sentence>> {
    split_sentences(stream)
        .into_iter()
        .map(|(first_line, header, lines)| {
            let cohorts = parse_lines(&lines, first_line)?;
            sentence_from_cohorts(header, &cohorts)
        })
        .collect()
}

fn write_reading(out: &mut String, reading: &Reading, removed: bool, markers: bool) {
    out.push('\t');
    out.push_str(&reading.hfst_str());
    out.push('\t');
    out.push_str(&format!("{:.6}", reading.weight()));
    if markers {
        if removed {
            out.push(' ');
            out.push_str(REMOVED_MARKER);
        } else if reading.is_most_likely() {
            out.push(' ');
            out.push_str(MOST_LIKELY_MARKER);
        }
        if let Some(rule) = reading.cg_rule() {
            out.push(' ');
            out.push_str(rule);
        }
    }
    out.push('\n');
}

/// Write one cohort. With `full`, removed readings follow the active ones
/// and markers and rule references are printed; otherwise only the active
/// readings are written, bare.
pub fn write_token(out: &mut String, token: &Token, full: bool) {
    out.push_str("\"<");
    out.push_str(token.text());
    out.push_str(">\"\n");
    for reading in token.readings() {
        write_reading(out, reading, false, full);
    }
    if full {
        for reading in token.removed_readings() {
            write_reading(out, reading, true, true);
        }
    }
    out.push('\n');
}

/// Full serialization of a sentence, headers included.
pub fn write_sentence(sentence: &Sentence) -> String {
    let mut out = String::new();
    SentenceHeader {
        id: sentence.id().map(str::to_string),
        text: Some(sentence.text().to_string()),
    }
    .write(&mut out);
    for token in sentence.tokens() {
        write_token(&mut out, token, true);
    }
    out
}

/// The request sent to a disambiguator: active readings only, no headers
/// or markers.
pub fn write_submission(sentence: &Sentence) -> String {
    let mut out = String::new();
    for token in sentence.tokens() {
        write_token(&mut out, token, false);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const STREAM: &str = "\
\"<системы>\"
\tсистема+N+Fem+Inan+Sg+Gen\t8.236328 @most-likely SELECT:88
\tсистема+N+Fem+Inan+Pl+Nom\t8.236328 ;removed REMOVE:2141

\"<.>\"
\t.+PUNCT+SENT\t0.000000 @most-likely

";

    #[test]
    fn parse_markers_and_rules() {
        let cohorts = parse_cohorts(STREAM).unwrap();
        assert_eq!(cohorts.len(), 2);
        let r = &cohorts[0].readings;
        assert!(r[0].most_likely && !r[0].removed);
        assert_eq!(r[0].rule().as_deref(), Some("SELECT:88"));
        assert!(r[1].removed);
        assert_eq!(r[1].rules, ["REMOVE:2141"]);
        assert_eq!(r[1].line, 3);
        assert_eq!(cohorts[1].surface, ".");
    }

    #[test]
    fn cohort_partitions() {
        let cohorts = parse_cohorts(STREAM).unwrap();
        let token = cohort_to_token(&cohorts[0], 1).unwrap();
        assert_eq!(token.readings().len(), 1);
        assert_eq!(token.removed_readings().len(), 1);
        assert_eq!(token.removed_readings()[0].cg_rule(), Some("REMOVE:2141"));
        assert!(token.most_likely().is_some());
    }

    #[test]
    fn full_round_trip() {
        let sentence = parse_sentence(STREAM).unwrap();
        assert_eq!(sentence.text(), "системы.");
        let written = write_sentence(&sentence);
        assert_eq!(written, format!("# TEXT: системы.\n{STREAM}"));
        assert_eq!(parse_sentence(&written).unwrap(), sentence);
    }

    #[test]
    fn submission_lists_active_readings_only() {
        let sentence = parse_sentence(STREAM).unwrap();
        let submission = write_submission(&sentence);
        assert_eq!(
            submission,
            "\"<системы>\"\n\tсистема+N+Fem+Inan+Sg+Gen\t8.236328\n\n\"<.>\"\n\t.+PUNCT+SENT\t0.000000\n\n"
        );
    }

    #[test]
    fn malformed_lines_are_reported() {
        let err = parse_cohorts("\tслово+N\t1.0\n").unwrap_err();
        assert!(matches!(err, UdarError::MalformedStream { line: 1, .. }));
        let err = parse_cohorts("\"<слово>\"\n\tслово+N\n").unwrap_err();
        assert!(matches!(err, UdarError::MalformedStream { line: 2, .. }));
        let err = parse_cohorts("\"<слово>\"\n\tслово+N\tabc\n").unwrap_err();
        assert!(matches!(err, UdarError::MalformedStream { line: 2, .. }));
        let err = parse_cohorts("слово\n").unwrap_err();
        assert!(matches!(err, UdarError::MalformedStream { line: 1, .. }));
    }

    #[test]
    fn unknown_markers_are_ignored() {
        let cohorts = parse_cohorts("\"<да>\"\n\tда+Pcle\t1.0 @bogus\n").unwrap();
        assert!(cohorts[0].readings[0].rules.is_empty());
        assert!(!cohorts[0].readings[0].most_likely);
    }

    #[test]
    fn first_selection_wins() {
        let stream = "\"<да>\"\n\tда+Pcle\t1.0 @most-likely\n\tда+CC\t1.0 @most-likely\n";
        let token = cohort_to_token(&parse_cohorts(stream).unwrap()[0], 1).unwrap();
        assert_eq!(token.readings().iter().filter(|r| r.is_most_likely()).count(), 1);
        assert_eq!(token.most_likely().unwrap().hfst_str(), "да+Pcle");
    }

    #[test]
    fn multi_sentence_document() {
        let stream = "# SENT ID: 1\n# TEXT: Да.\n\"<Да>\"\n\tда+Pcle\t1.000000 @most-likely\n\n\"<.>\"\n\t.+PUNCT+SENT\t0.000000 @most-likely\n\n# SENT ID: 2\n# TEXT: Нет!\n\"<Нет>\"\n\n\"<!>\"\n\n";
        let sentences = parse_document(stream).unwrap();
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0].id(), Some("1"));
        assert_eq!(sentences[1].text(), "Нет!");
        assert!(sentences[1].tokens()[0].is_oov());
        assert_eq!(sentences[1].tokens()[1].span(), Some(6..7));
    }
}
