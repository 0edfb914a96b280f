//! Error types shared across the service seams

use thiserror::Error;

/// Errors crossing the core trait boundaries
///
/// Lower layers keep richer per-crate error enums; only the kinds the
/// conversation manager must distinguish surface here. Configuration and
/// synthesis errors abort the current call; a failed prediction request
/// degrades to a spoken fallback reply.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing playback executable or API key; fatal for the call
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Synthesis or playback failure; fatal for the current turn
    #[error("synthesis error: {0}")]
    Synthesis(String),

    /// Prediction transport failure persisting after retries
    #[error("prediction request failed: {0}")]
    RequestFailed(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Configuration("ffplay not found".into());
        assert_eq!(err.to_string(), "configuration error: ffplay not found");

        let err = Error::RequestFailed("connection refused".into());
        assert!(err.to_string().contains("connection refused"));
    }
}
