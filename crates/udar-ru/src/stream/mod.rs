// Interchange stream formats.
//
// Two independent codecs over the same Token/Reading structure:
//
// - [`cg`]   disambiguation stream: cohort header, one indented line per
//            reading, removal/selection markers and rule references
// - [`hfst`] flat analysis stream as printed by hfst-lookup, no markers
//
// Sentences in a multi-sentence stream are introduced by `# SENT ID:` and
// `# TEXT:` comment lines.

pub mod cg;
pub mod hfst;

use std::ops::Range;

use crate::token::Token;

/// Comment line carrying the sentence id.
pub const SENT_ID_HEADER: &str = "# SENT ID: ";
/// Comment line carrying the sentence source text.
pub const TEXT_HEADER: &str = "# TEXT: ";

/// Sentence-level header values read from comment lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SentenceHeader {
    pub id: Option<String>,
    pub text: Option<String>,
}

impl SentenceHeader {
    /// Consume a header comment line. Returns `false` if the line is not
    /// a sentence header.
    pub fn read_line(&mut self, line: &str) -> bool {
        if let Some(id) = line.strip_prefix(SENT_ID_HEADER.trim_end()) {
            self.id = Some(id.trim().to_string());
            true
        } else if let Some(text) = line.strip_prefix(TEXT_HEADER.trim_end()) {
            self.text = Some(text.strip_prefix(' ').unwrap_or(text).to_string());
            true
        } else {
            false
        }
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.text.is_none()
    }

    /// Write the header lines, if any.
    pub fn write(&self, out: &mut String) {
        if let Some(id) = &self.id {
            out.push_str(SENT_ID_HEADER);
            out.push_str(id);
            out.push('\n');
        }
        if let Some(text) = &self.text {
            out.push_str(TEXT_HEADER);
            out.push_str(&text.replace('\n', " "));
            out.push('\n');
        }
    }
}

/// Split a stream into per-sentence chunks at header lines. A header
/// that follows body lines starts a new chunk; a stream without headers is
/// one chunk. Line numbers of each chunk's first line are kept for error
/// reporting.
pub(crate) fn split_sentences(stream: &str) -> Vec<(usize, SentenceHeader, Vec<&str>)> {
    let mut chunks = Vec::new();
    let mut header = SentenceHeader::default();
    let mut body: Vec<&str> = Vec::new();
    let mut first_line = 1;
    let mut body_seen = false;

    for (index, line) in stream.lines().enumerate() {
        let mut candidate = SentenceHeader::default();
        if candidate.read_line(line) {
            if body_seen {
                chunks.push((first_line, std::mem::take(&mut header), std::mem::take(&mut body)));
                body_seen = false;
                first_line = index + 1;
            }
            header.read_line(line);
            body.push("");
            continue;
        }
        if !line.trim().is_empty() && !line.starts_with('#') {
            body_seen = true;
        }
        body.push(line);
    }
    if body_seen || !header.is_empty() {
        chunks.push((first_line, header, body));
    }
    chunks
}

/// Find each token's text in `text`, left to right, and return its byte
/// span. Tokens that cannot be found get no span.
pub(crate) fn locate_spans(text: &str, tokens: &mut [Token]) {
    let mut cursor = 0;
    for token in tokens.iter_mut() {
        let span: Option<Range<usize>> = text
            .get(cursor..)
            .and_then(|rest| rest.find(token.text()))
            .map(|offset| {
                let start = cursor + offset;
                start..start + token.text().len()
            });
        if let Some(span) = &span {
            cursor = span.end;
        }
        token.set_span(span);
    }
}
