//! Speech processing traits

use crate::Result;
use async_trait::async_trait;

/// One live listening phase against the recognition service
///
/// Implementations:
/// - `LiveRecognizer` - streaming session fed by microphone capture
///
/// # Example
///
/// ```ignore
/// let source: Arc<dyn UtteranceSource> = Arc::new(LiveRecognizer::new(config));
/// let mut heard = None;
/// source.listen(&mut |text| heard = Some(text.to_string())).await;
/// ```
#[async_trait]
pub trait UtteranceSource: Send + Sync {
    /// Listen until one complete utterance is finalized
    ///
    /// Invokes `on_utterance` at most once, with the trimmed non-empty
    /// transcript. Session errors are logged by the implementation and the
    /// phase returns without invoking the callback; the caller decides
    /// whether to listen again.
    async fn listen(&self, on_utterance: &mut (dyn for<'a> FnMut(&'a str) + Send));
}

/// Streaming text-to-speech playback
///
/// Implementations:
/// - `StreamingSpeaker` - streams synthesized audio into a local player process
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Speak the given text, returning once playback has fully finished
    ///
    /// Fails with `Error::Configuration` when the playback executable or API
    /// key is unavailable, `Error::Synthesis` for request or playback
    /// failures. Both are fatal for the current turn.
    async fn speak(&self, text: &str) -> Result<()>;
}
