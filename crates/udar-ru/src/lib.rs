//! Russian morphological analysis, disambiguation and surface-form
//! derivation.
//!
//! Transducer output is ingested into [`Token`]s of weighted readings,
//! sentences are disambiguated by a constraint-grammar collaborator over a
//! line-oriented stream, and stressed text, phonetic transcription and
//! transliteration are derived from the resolved readings.
//!
//! # Architecture
//!
//! - [`tokenizer`] -- word and sentence segmentation
//! - [`token`] -- one wordform with active and removed readings
//! - [`sentence`] / [`document`] -- the analyzed text
//! - [`stream`] -- the disambiguation stream and the flat hfst stream
//! - [`disambiguation`] -- the grammar collaborator and the merge of its answer
//! - [`derivation`] -- stress, phonetics, transliteration
//! - [`convenience`] -- `noun_distractors`, `diagnose_l2`, `tag_info`
//! - `features` -- numeric document features
//! - `handle` -- `UdarHandle`, everything behind one value
//!
//! # Cargo features
//!
//! - `vislcg3` -- the vislcg3 process disambiguator
//! - `features` -- document feature extraction
//! - `handle` (default) -- the top-level handle; enables both of the above

pub mod convenience;
pub mod derivation;
pub mod disambiguation;
pub mod document;
#[cfg(feature = "features")]
pub mod features;
#[cfg(feature = "handle")]
pub mod handle;
pub mod sentence;
pub mod stream;
pub mod token;
pub mod tokenizer;

pub use convenience::{diagnose_l2, noun_distractors, tag_info};
pub use derivation::evaluation::{StressCounts, StressMetrics, StressParams, StressResult};
pub use derivation::frequency::StressFrequencies;
pub use derivation::{StressOptions, StressSelection};
pub use derivation::transliterate::Scheme;
pub use disambiguation::Disambiguator;
pub use document::Document;
#[cfg(feature = "features")]
pub use features::{FeatureSet, Features};
#[cfg(feature = "handle")]
pub use handle::{Collaborators, HandleOptions, UdarHandle};
pub use sentence::Sentence;
pub use token::Token;
pub use tokenizer::{RuleTokenizer, Tokenizer};
pub use udar_core::{Result, UdarError};
