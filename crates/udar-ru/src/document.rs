// Document: the sentences of one text, plus a lazily extracted feature
// bundle.

#[cfg(feature = "features")]
use std::sync::OnceLock;

use serde::Serialize;
use udar_core::Result;
use udar_fst::{Analyzer, Generator};

use crate::derivation::transliterate::Scheme;
use crate::derivation::{StressOptions, StressSelection, join_pieces};
use crate::disambiguation::Disambiguator;
#[cfg(feature = "features")]
use crate::features::{FeatureSet, Features};
use crate::sentence::Sentence;
use crate::stream;
use crate::token::Token;
use crate::tokenizer::{self, Tokenizer};

#[derive(Debug, Clone, Serialize)]
pub struct Document {
    text: String,
    sentences: Vec<Sentence>,
    #[cfg(feature = "features")]
    #[serde(skip)]
    features: OnceLock<Features>,
}

impl Document {
    /// Split `text` into sentences and analyze each of them.
    pub fn from_text(text: &str, tokenizer: &dyn Tokenizer, analyzer: &dyn Analyzer) -> Result<Self> {
        let mut sentences = Vec::new();
        for (index, span) in tokenizer::split_sentences(text).into_iter().enumerate() {
            let mut sentence = Sentence::analyze(&text[span.clone()], tokenizer, analyzer)?;
            sentence.attach(index, Some(span));
            sentences.push(sentence);
        }
        Ok(Self {
            text: text.to_string(),
            sentences,
            #[cfg(feature = "features")]
            features: OnceLock::new(),
        })
    }

    /// A document of already built sentences. The document text is their
    /// texts joined by a space.
    pub fn from_sentences(sentences: Vec<Sentence>) -> Self {
        let mut text = String::new();
        let mut sentences = sentences;
        for (index, sentence) in sentences.iter_mut().enumerate() {
            if index > 0 {
                text.push(' ');
            }
            let start = text.len();
            text.push_str(sentence.text());
            sentence.attach(index, Some(start..text.len()));
        }
        Self {
            text,
            sentences,
            #[cfg(feature = "features")]
            features: OnceLock::new(),
        }
    }

    /// Parse a disambiguation stream with `# SENT ID` / `# TEXT` headers.
    pub fn from_cg_stream(stream: &str) -> Result<Self> {
        stream::cg::parse_document(stream).map(Self::from_sentences)
    }

    pub fn to_cg_stream(&self) -> String {
        self.sentences.iter().map(Sentence::to_cg_stream).collect()
    }

    /// Parse a flat analysis stream. The format has no sentence
    /// boundaries, so the text rebuilt from the tokens is split into
    /// sentences the way [`Document::from_text`] splits raw text and each
    /// token goes to the sentence its span falls in.
    pub fn from_hfst_stream(stream: &str) -> Result<Self> {
        let whole = Sentence::from_hfst_stream(stream)?;
        let text = whole.text().to_string();
        let ranges = tokenizer::split_sentences(&text);
        let mut tokens = whole.into_tokens().into_iter().peekable();
        let mut sentences = Vec::with_capacity(ranges.len());
        for (index, range) in ranges.iter().enumerate() {
            let last = index + 1 == ranges.len();
            let mut members = Vec::new();
            while let Some(mut token) =
                tokens.next_if(|t| last || t.span().is_none_or(|s| s.start < range.end))
            {
                let local = token.span().and_then(|s| {
                    let start = s.start.checked_sub(range.start)?;
                    (s.end <= range.end).then(|| start..s.end - range.start)
                });
                token.set_span(local);
                members.push(token);
            }
            let mut sentence = Sentence::from_tokens(&text[range.clone()], members);
            sentence.attach(index, Some(range.clone()));
            sentences.push(sentence);
        }
        Ok(Self {
            text,
            sentences,
            #[cfg(feature = "features")]
            features: OnceLock::new(),
        })
    }

    /// Flat analysis stream of all tokens. Sentence boundaries are not
    /// represented.
    pub fn to_hfst_stream(&self) -> String {
        self.sentences.iter().map(Sentence::to_hfst_stream).collect()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.sentences.iter().flat_map(|s| s.tokens().iter())
    }

    pub fn num_tokens(&self) -> usize {
        self.sentences.iter().map(Sentence::len).sum()
    }

    /// Disambiguate every sentence in order. Stops at the first failing
    /// sentence; sentences before it keep their merged readings.
    pub fn disambiguate(&mut self, disambiguator: &dyn Disambiguator) -> Result<()> {
        // readings are about to change
        #[cfg(feature = "features")]
        {
            self.features = OnceLock::new();
        }
        for sentence in &mut self.sentences {
            sentence.disambiguate(disambiguator)?;
        }
        Ok(())
    }

    /// All registered features, extracted on first use.
    #[cfg(feature = "features")]
    pub fn features(&self) -> &Features {
        self.features.get_or_init(|| FeatureSet::all().extract(self))
    }

    // -----------------------------------------------------------------------
    // Derived text
    // -----------------------------------------------------------------------

    fn derive(&self, per_sentence: impl Fn(&Sentence) -> String) -> String {
        let pieces: Vec<_> = self
            .sentences
            .iter()
            .map(|s| (s.span(), per_sentence(s)))
            .collect();
        join_pieces(&self.text, &pieces)
    }

    pub fn stressed(&self, generator: &dyn Generator, selection: StressSelection) -> String {
        self.stressed_with(generator, &selection.into())
    }

    pub fn stressed_with(&self, generator: &dyn Generator, options: &StressOptions<'_>) -> String {
        self.derive(|s| s.stressed_with(generator, options))
    }

    pub fn phonetic(&self, generator: &dyn Generator, selection: StressSelection) -> String {
        self.phonetic_with(generator, &selection.into())
    }

    pub fn phonetic_with(&self, generator: &dyn Generator, options: &StressOptions<'_>) -> String {
        self.derive(|s| s.phonetic_with(generator, options))
    }

    pub fn transliterate(&self, scheme: Scheme) -> String {
        self.derive(|s| s.transliterate(scheme))
    }
}
