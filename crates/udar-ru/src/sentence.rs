// Sentence: an ordered run of tokens over a span of source text.
//
// The token set is fixed when the sentence is built; disambiguation only
// changes the readings inside the tokens. A sentence that belongs to a
// document knows its index there but holds no reference to it.

use std::ops::Range;

use serde::Serialize;
use tracing::warn;
use udar_core::{Result, UdarError};
use udar_fst::{Analyzer, Generator};

use crate::derivation::transliterate::{self, Scheme};
use crate::derivation::{StressOptions, StressSelection, join_pieces, phonetic};
use crate::disambiguation::{self, Disambiguator};
use crate::stream;
use crate::token::Token;
use crate::tokenizer::Tokenizer;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sentence {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    text: String,
    tokens: Vec<Token>,
    /// Index of this sentence in its document.
    #[serde(skip)]
    doc_index: Option<usize>,
    /// Byte range of `text` in the document text.
    #[serde(skip)]
    span: Option<Range<usize>>,
    /// Tokens whose analysis could not be ingested, kept without readings.
    #[serde(skip)]
    errors: Vec<UdarError>,
}

impl Sentence {
    /// Tokenize and analyze `text`.
    ///
    /// A token whose transducer output is malformed is kept without
    /// readings and its [`UdarError::MalformedAnalysis`] is recorded in
    /// [`Sentence::ingestion_errors`]; the rest of the sentence is built
    /// normally. Collaborator failures abort the whole call.
    pub fn analyze(text: &str, tokenizer: &dyn Tokenizer, analyzer: &dyn Analyzer) -> Result<Self> {
        let raw_tokens = tokenizer.tokenize(text);
        let words: Vec<&str> = raw_tokens.iter().map(|t| t.text.as_str()).collect();
        let analyses = analyzer.analyze_batch(&words)?;
        if analyses.len() != raw_tokens.len() {
            return Err(UdarError::unavailable(
                "analyzer",
                format!("asked for {} wordforms, got {} results", words.len(), analyses.len()),
            ));
        }

        let mut tokens = Vec::with_capacity(raw_tokens.len());
        let mut errors = Vec::new();
        for (i, (raw, found)) in raw_tokens.into_iter().zip(analyses).enumerate() {
            let position = i + 1;
            let token = match Token::from_analyses(raw.text.as_str(), position, &found) {
                Ok(token) => token,
                Err(e) => {
                    warn!(token = %raw.text, position, error = %e, "keeping token without readings");
                    errors.push(e);
                    Token::new(raw.text.as_str(), position)
                }
            };
            tokens.push(token.with_span(raw.span));
        }

        let mut sentence = Self::from_parts(None, text.to_string(), tokens);
        sentence.errors = errors;
        Ok(sentence)
    }

    /// A sentence from already built tokens. Positions are renumbered
    /// from 1.
    pub fn from_tokens(text: impl Into<String>, tokens: Vec<Token>) -> Self {
        let text = text.into();
        let mut tokens = tokens;
        for (i, token) in tokens.iter_mut().enumerate() {
            token.set_position(i + 1);
        }
        if tokens.iter().any(|t| t.span().is_none()) {
            stream::locate_spans(&text, &mut tokens);
        }
        Self::from_parts(None, text, tokens)
    }

    pub(crate) fn from_parts(id: Option<String>, text: String, tokens: Vec<Token>) -> Self {
        Self {
            id,
            text,
            tokens,
            doc_index: None,
            span: None,
            errors: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Index of this sentence in its document, if it belongs to one.
    pub fn doc_index(&self) -> Option<usize> {
        self.doc_index
    }

    /// Byte range of this sentence in the document text.
    pub fn span(&self) -> Option<Range<usize>> {
        self.span.clone()
    }

    /// Ingestion errors of tokens that were kept without readings.
    pub fn ingestion_errors(&self) -> &[UdarError] {
        &self.errors
    }

    pub(crate) fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    pub(crate) fn tokens_mut(&mut self) -> &mut [Token] {
        &mut self.tokens
    }

    pub(crate) fn attach(&mut self, doc_index: usize, span: Option<Range<usize>>) {
        self.doc_index = Some(doc_index);
        self.span = span;
    }

    // -----------------------------------------------------------------------
    // Streams
    // -----------------------------------------------------------------------

    /// Disambiguation stream with headers, markers and removed readings.
    pub fn to_cg_stream(&self) -> String {
        stream::cg::write_sentence(self)
    }

    pub fn from_cg_stream(text: &str) -> Result<Self> {
        stream::cg::parse_sentence(text)
    }

    /// Flat analysis stream of the active readings.
    pub fn to_hfst_stream(&self) -> String {
        stream::hfst::write_sentence(self)
    }

    pub fn from_hfst_stream(text: &str) -> Result<Self> {
        stream::hfst::parse_sentence(text)
    }

    // -----------------------------------------------------------------------
    // Disambiguation
    // -----------------------------------------------------------------------

    /// Submit the sentence to `disambiguator` and merge its decisions.
    /// On any error the sentence is left unchanged.
    pub fn disambiguate(&mut self, disambiguator: &dyn Disambiguator) -> Result<()> {
        let request = stream::cg::write_submission(self);
        let response = disambiguator.disambiguate(&request)?;
        self.apply_disambiguation(&response)
    }

    /// Merge an already obtained disambiguation response.
    pub fn apply_disambiguation(&mut self, response: &str) -> Result<()> {
        disambiguation::merge(self, response)
    }

    // -----------------------------------------------------------------------
    // Derived text
    // -----------------------------------------------------------------------

    fn derive(&self, per_token: impl Fn(&Token) -> String) -> String {
        let pieces: Vec<_> = self
            .tokens
            .iter()
            .map(|t| (t.span(), per_token(t)))
            .collect();
        join_pieces(&self.text, &pieces)
    }

    /// The sentence with stress marks, whitespace as in the source.
    pub fn stressed(&self, generator: &dyn Generator, selection: StressSelection) -> String {
        self.stressed_with(generator, &selection.into())
    }

    pub fn stressed_with(&self, generator: &dyn Generator, options: &StressOptions<'_>) -> String {
        self.derive(|t| t.stressed_with(generator, options))
    }

    /// Phonetic transcription, whitespace as in the source.
    pub fn phonetic(&self, generator: &dyn Generator, selection: StressSelection) -> String {
        self.phonetic_with(generator, &selection.into())
    }

    pub fn phonetic_with(&self, generator: &dyn Generator, options: &StressOptions<'_>) -> String {
        self.derive(|t| phonetic::transcribe(&t.stressed_with(generator, options)))
    }

    /// Transliteration of the sentence text.
    pub fn transliterate(&self, scheme: Scheme) -> String {
        self.derive(|t| transliterate::transliterate(t.text(), scheme))
    }
}
