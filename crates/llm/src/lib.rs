//! Prediction endpoint integration
//!
//! All language understanding is delegated to a remote prediction API; this
//! crate owns the pooled HTTP client, the retry/backoff policy, and the
//! fallback replies substituted when the endpoint degrades.

pub mod prediction;

pub use prediction::{PredictionClient, ANSWER_FALLBACK, REQUEST_FALLBACK};

use thiserror::Error;

/// Prediction client errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        LlmError::Network(err.to_string())
    }
}

impl From<LlmError> for voiceline_core::Error {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Network(msg) => voiceline_core::Error::RequestFailed(msg),
            LlmError::Configuration(msg) => voiceline_core::Error::Configuration(msg),
        }
    }
}
