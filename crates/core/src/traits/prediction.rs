//! Prediction backend trait

use crate::{DialogTurn, Result};
use async_trait::async_trait;

/// Turns one utterance plus the dialog history into one reply string
///
/// Implementations:
/// - `PredictionClient` - JSON-over-HTTP round trip with retry and fallbacks
///
/// Ordinary HTTP failures never surface here: the implementation degrades
/// them to fixed fallback strings. Only a transport failure that persists
/// after retries returns `Error::RequestFailed`.
#[async_trait]
pub trait PredictionBackend: Send + Sync {
    /// Generate a reply for `question` given the history so far
    ///
    /// The history is replayed to the endpoint verbatim, as it stood before
    /// the reply being generated.
    async fn process(&self, question: &str, history: &[DialogTurn]) -> Result<String>;
}
