//! Shared types for the UDAR Russian morphological analyzer.
//!
//! - [`tag`] -- grammatical tags and the static tag registry
//! - [`reading`] -- one candidate analysis of a token (lemma + tags + weight)
//! - [`character`] -- Cyrillic character classes and stress marks
//! - [`case`] -- capitalization patterns of wordforms
//! - [`process`] -- blocking subprocess runner for external collaborators

pub mod case;
pub mod character;
pub mod process;
pub mod reading;
pub mod tag;

use std::time::Duration;

/// Error type shared by every UDAR crate.
///
/// Each variant is one failure kind; callers match on the variant to decide
/// whether to retry, skip or abort.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UdarError {
    /// Transducer output for one token could not be turned into a reading.
    #[error("malformed analysis {analysis:?}: {reason}")]
    MalformedAnalysis { analysis: String, reason: String },

    /// A disambiguation response disagrees structurally with the request.
    #[error("disambiguation stream mismatch: {0}")]
    StreamMismatch(String),

    /// A line of an interchange stream could not be parsed.
    #[error("malformed stream at line {line}: {reason}")]
    MalformedStream { line: usize, reason: String },

    /// No noun reading was found for the given wordform.
    #[error("no noun reading for {0:?}")]
    NotANoun(String),

    /// The tag name is not in the tag registry.
    #[error("unknown tag: {0}")]
    UnknownTag(String),

    /// The transliteration scheme name is not registered.
    #[error("unknown transliteration scheme: {0}")]
    UnknownTransliterationScheme(String),

    /// The feature name is not registered.
    #[error("unknown feature: {0}")]
    UnknownFeature(String),

    /// An external process did not answer in time.
    #[error("{collaborator} timed out after {timeout:?}")]
    CollaboratorTimeout {
        collaborator: String,
        timeout: Duration,
    },

    /// An external process could not be started or failed.
    #[error("{collaborator} unavailable: {reason}")]
    CollaboratorUnavailable {
        collaborator: String,
        reason: String,
    },
}

impl UdarError {
    /// Shorthand for [`UdarError::MalformedAnalysis`].
    pub fn malformed(analysis: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedAnalysis {
            analysis: analysis.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for [`UdarError::CollaboratorUnavailable`].
    pub fn unavailable(collaborator: impl Into<String>, reason: impl ToString) -> Self {
        Self::CollaboratorUnavailable {
            collaborator: collaborator.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, UdarError>;
