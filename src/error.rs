//! Error types shared across the translation pipeline.
//!
//! Translation failures have no type here: the batch translator
//! and the dispatcher turn them into empty bundles or per-locale `error`
//! events instead of propagating them.

use thiserror::Error;

/// A locale code that is not part of the supported set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown locale code: '{0}'")]
pub struct UnknownLocale(pub String);

/// An entity type name with no translation schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown entity type: '{0}'")]
pub struct UnknownEntityType(pub String);

/// Failure of a single text-generation provider call.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider request timed out")]
    Timeout,

    #[error("failed to reach provider: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("provider API error ({status}): {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to parse provider response: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("provider response contained no content")]
    EmptyResponse,
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else if err.is_decode() {
            ProviderError::Decode(err)
        } else {
            ProviderError::Transport(err)
        }
    }
}

/// Failure of a document store operation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity_type} '{id}' not found")]
    NotFound { entity_type: String, id: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("stored record is corrupt: {0}")]
    Corrupt(String),
}
