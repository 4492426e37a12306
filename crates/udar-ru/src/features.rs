// Document feature extraction.
//
// A feature is a named function from a document to a number. Extractors
// are registered in a static table; a `FeatureSet` picks some of them by
// name and runs them in table order.

use hashbrown::HashSet;
use serde::ser::{Serialize, SerializeMap, Serializer};
use udar_core::{Result, UdarError};

use crate::document::Document;
use crate::token::Token;

type Extractor = fn(&Document) -> f64;

struct FeatureDef {
    name: &'static str,
    description: &'static str,
    extract: Extractor,
}

static FEATURES: &[FeatureDef] = &[
    FeatureDef {
        name: "num_tokens",
        description: "Number of tokens, punctuation included",
        extract: |doc| doc.num_tokens() as f64,
    },
    FeatureDef {
        name: "num_words",
        description: "Number of tokens containing a letter",
        extract: |doc| words(doc).count() as f64,
    },
    FeatureDef {
        name: "num_sentences",
        description: "Number of sentences",
        extract: |doc| doc.sentences().len() as f64,
    },
    FeatureDef {
        name: "type_token_ratio",
        description: "Distinct lowercased word forms per word",
        extract: type_token_ratio,
    },
    FeatureDef {
        name: "lemma_type_token_ratio",
        description: "Distinct most likely lemmas per word",
        extract: lemma_type_token_ratio,
    },
    FeatureDef {
        name: "mean_word_length",
        description: "Mean word length in characters, stress marks excluded",
        extract: |doc| mean(words(doc).map(|t| udar_core::character::destress(t.text()).chars().count() as f64)),
    },
    FeatureDef {
        name: "mean_readings_per_word",
        description: "Mean number of active readings per word",
        extract: |doc| mean(words(doc).map(|t| t.readings().len() as f64)),
    },
    FeatureDef {
        name: "oov_ratio",
        description: "Share of words without any reading",
        extract: |doc| mean(words(doc).map(|t| if t.is_oov() { 1.0 } else { 0.0 })),
    },
    FeatureDef {
        name: "l2_error_ratio",
        description: "Share of words with a learner-error reading",
        extract: |doc| mean(words(doc).map(|t| if has_learner_error(t) { 1.0 } else { 0.0 })),
    },
];

fn words(doc: &Document) -> impl Iterator<Item = &Token> {
    doc.tokens().filter(|t| t.text().chars().any(char::is_alphabetic))
}

fn has_learner_error(token: &Token) -> bool {
    token
        .readings()
        .iter()
        .any(|r| r.learner_error_tags().next().is_some())
}

/// Mean of the values, 0 for none.
fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 { 0.0 } else { sum / count as f64 }
}

fn type_token_ratio(doc: &Document) -> f64 {
    let mut types = HashSet::new();
    let mut count = 0usize;
    for token in words(doc) {
        types.insert(udar_core::character::destress(&token.text().to_lowercase()));
        count += 1;
    }
    if count == 0 { 0.0 } else { types.len() as f64 / count as f64 }
}

fn lemma_type_token_ratio(doc: &Document) -> f64 {
    let mut types = HashSet::new();
    let mut count = 0usize;
    for token in words(doc) {
        let lemma = match token.most_likely() {
            Some(reading) => reading.lemma().to_string(),
            None => token.text().to_lowercase(),
        };
        types.insert(lemma);
        count += 1;
    }
    if count == 0 { 0.0 } else { types.len() as f64 / count as f64 }
}

/// A selection of registered features.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSet {
    indices: Vec<usize>,
}

impl FeatureSet {
    /// Every registered feature.
    pub fn all() -> Self {
        Self {
            indices: (0..FEATURES.len()).collect(),
        }
    }

    /// The named features, in registry order. Fails with
    /// [`UdarError::UnknownFeature`] on the first unregistered name.
    pub fn subset(names: &[&str]) -> Result<Self> {
        let mut wanted = HashSet::new();
        for name in names {
            let index = FEATURES
                .iter()
                .position(|f| f.name == *name)
                .ok_or_else(|| UdarError::UnknownFeature((*name).to_string()))?;
            wanted.insert(index);
        }
        let mut indices: Vec<usize> = wanted.into_iter().collect();
        indices.sort_unstable();
        Ok(Self { indices })
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.indices.iter().map(|&i| FEATURES[i].name).collect()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn extract(&self, doc: &Document) -> Features {
        let values = self
            .indices
            .iter()
            .map(|&i| (FEATURES[i].name, (FEATURES[i].extract)(doc)))
            .collect();
        Features { values }
    }
}

/// Description of a registered feature.
pub fn feature_description(name: &str) -> Result<&'static str> {
    FEATURES
        .iter()
        .find(|f| f.name == name)
        .map(|f| f.description)
        .ok_or_else(|| UdarError::UnknownFeature(name.to_string()))
}

/// Extracted feature values, in registry order.
#[derive(Debug, Clone, PartialEq)]
pub struct Features {
    values: Vec<(&'static str, f64)>,
}

impl Features {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.iter().find(|(n, _)| *n == name).map(|&(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        self.values.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Serialize for Features {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in &self.values {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::RuleTokenizer;
    use udar_fst::lexicon::LexiconTransducer;

    const TABLE: &str = "\
мы́\tмы+Pron+Pers+Pl1+Nom\t1.0
ви́дим\tвидеть+V+Impf+TV+Prs+Pl1\t2.0
.\t.+PUNCT+SENT\t0.0
";

    fn document(text: &str) -> Document {
        let lex = LexiconTransducer::from_tsv(TABLE).unwrap();
        Document::from_text(text, &RuleTokenizer, &lex).unwrap()
    }

    #[test]
    fn counts_and_ratios() {
        let doc = document("Мы видим. Мы шмурдяк.");
        let f = FeatureSet::all().extract(&doc);
        assert_eq!(f.len(), 9);
        assert_eq!(f.get("num_tokens"), Some(6.0));
        assert_eq!(f.get("num_words"), Some(4.0));
        assert_eq!(f.get("num_sentences"), Some(2.0));
        assert_eq!(f.get("type_token_ratio"), Some(0.75));
        assert_eq!(f.get("oov_ratio"), Some(0.25));
        assert_eq!(f.get("l2_error_ratio"), Some(0.0));
        assert_eq!(f.get("mean_readings_per_word"), Some(0.75));
        assert_eq!(f.get("nope"), None);
    }

    #[test]
    fn empty_document_has_zero_ratios() {
        let doc = document("");
        let f = FeatureSet::all().extract(&doc);
        assert_eq!(f.get("num_words"), Some(0.0));
        assert_eq!(f.get("type_token_ratio"), Some(0.0));
        assert_eq!(f.get("mean_word_length"), Some(0.0));
    }

    #[test]
    fn subset_keeps_registry_order() {
        let set = FeatureSet::subset(&["oov_ratio", "num_tokens", "oov_ratio"]).unwrap();
        assert_eq!(set.names(), ["num_tokens", "oov_ratio"]);
        let err = FeatureSet::subset(&["num_tokens", "sparkle"]).unwrap_err();
        assert_eq!(err, UdarError::UnknownFeature("sparkle".into()));
        assert!(feature_description("num_words").is_ok());
    }

    #[test]
    fn serializes_as_map() {
        let doc = document("Мы видим.");
        let f = FeatureSet::subset(&["num_tokens", "num_words"]).unwrap().extract(&doc);
        let json = serde_json::to_string(&f).unwrap();
        assert_eq!(json, r#"{"num_tokens":3.0,"num_words":2.0}"#);
    }
}
