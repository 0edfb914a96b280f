//! Live recognition sessions against the streaming speech-to-text service
//!
//! One WebSocket session per listening phase: microphone frames flow out as
//! binary messages while transcript events flow back, until speech-finality
//! yields one usable utterance. The session protocol is Deepgram's live API.

use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::time::{interval_at, Instant};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;

use voiceline_config::RecognitionConfig;
use voiceline_core::{CaptureFormat, TranscriptCollector, UtteranceSource};

use crate::mic::MicrophoneCapture;
use crate::PipelineError;

/// Half-close frame telling the service no further audio is coming
const CLOSE_STREAM_MESSAGE: &str = r#"{"type":"CloseStream"}"#;

/// Keepalive frame; the service drops sessions that go quiet for too long
const KEEPALIVE_MESSAGE: &str = r#"{"type":"KeepAlive"}"#;

const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(5);

/// One-shot live recognition over a streaming session
///
/// Each [`listen`](UtteranceSource::listen) call opens a fresh session and
/// microphone capture, runs until one utterance finalizes or the session
/// ends, then tears both down.
pub struct LiveRecognizer {
    config: RecognitionConfig,
}

impl LiveRecognizer {
    pub fn new(config: RecognitionConfig) -> Self {
        Self { config }
    }

    async fn run_session(
        &self,
        on_utterance: &mut (dyn FnMut(&str) + Send),
    ) -> Result<(), PipelineError> {
        let api_key = self.config.api_key.as_deref().ok_or_else(|| {
            PipelineError::Configuration("recognition.api_key is not set".to_string())
        })?;

        let mut request = session_url(&self.config)
            .into_client_request()
            .map_err(|e| PipelineError::Session(format!("invalid session endpoint: {e}")))?;
        let auth = HeaderValue::from_str(&format!("Token {api_key}")).map_err(|e| {
            PipelineError::Configuration(format!("recognition.api_key is not header-safe: {e}"))
        })?;
        request.headers_mut().insert("Authorization", auth);

        let (socket, _response) = connect_async(request)
            .await
            .map_err(|e| PipelineError::Session(format!("failed to open session: {e}")))?;
        let (mut sink, mut events) = socket.split();

        let format = CaptureFormat {
            sample_rate: self.config.sample_rate,
            channels: self.config.channels,
        };
        let (capture, mut frames) = MicrophoneCapture::start(format, self.config.chunk_ms).await?;
        tracing::info!("Listening...");

        let keepalive = self.config.keepalive;
        let feed = tokio::spawn(async move {
            let mut ping = interval_at(Instant::now() + KEEPALIVE_INTERVAL, KEEPALIVE_INTERVAL);
            loop {
                tokio::select! {
                    frame = frames.recv() => match frame {
                        Some(frame) => {
                            if let Err(e) = sink.send(Message::Binary(frame.into())).await {
                                tracing::debug!(error = %e, "session sink closed while feeding audio");
                                return;
                            }
                        }
                        None => break,
                    },
                    _ = ping.tick(), if keepalive => {
                        if sink.send(Message::Text(KEEPALIVE_MESSAGE.into())).await.is_err() {
                            return;
                        }
                    }
                }
            }
            // Capture has stopped; half-close so the service flushes
            // anything still pending.
            let _ = sink.send(Message::Text(CLOSE_STREAM_MESSAGE.into())).await;
            let _ = sink.close().await;
        });

        let mut collector = TranscriptCollector::new();
        let mut session_error = None;
        while let Some(message) = events.next().await {
            match message {
                Ok(Message::Text(event)) => {
                    if let Some(utterance) = apply_event(&mut collector, event.as_str()) {
                        tracing::info!(utterance = %utterance, "utterance finalized");
                        on_utterance(&utterance);
                        break;
                    }
                }
                Ok(Message::Close(_)) => {
                    tracing::debug!("session closed by the service");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    session_error =
                        Some(PipelineError::Session(format!("session stream failed: {e}")));
                    break;
                }
            }
        }

        // The microphone stops first; the closed frame channel then lets the
        // feed task half-close the session and release the sink.
        capture.finish().await;
        let _ = feed.await;

        match session_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl UtteranceSource for LiveRecognizer {
    async fn listen(&self, on_utterance: &mut (dyn for<'a> FnMut(&'a str) + Send)) {
        if let Err(e) = self.run_session(on_utterance).await {
            tracing::error!(error = %e, "recognition session failed, abandoning listen phase");
        }
    }
}

fn session_url(config: &RecognitionConfig) -> String {
    format!(
        "{}?model={}&language={}&punctuate={}&encoding={}&channels={}&sample_rate={}&endpointing={}&smart_format={}",
        config.endpoint,
        config.model,
        config.language,
        config.punctuate,
        config.encoding,
        config.channels,
        config.sample_rate,
        config.endpointing_ms,
        config.smart_format,
    )
}

/// Fold one service event into the collector
///
/// Returns the trimmed utterance once an event carries speech-finality and
/// the joined transcript is non-empty. Only then is the collector reset; a
/// speech-final that trims to nothing keeps accumulating into the next event.
fn apply_event(collector: &mut TranscriptCollector, raw: &str) -> Option<String> {
    let event: serde_json::Value = match serde_json::from_str(raw) {
        Ok(event) => event,
        Err(e) => {
            tracing::debug!(error = %e, "ignoring unparseable session event");
            return None;
        }
    };

    if event.get("type").and_then(|t| t.as_str()) != Some("Results") {
        tracing::debug!(kind = ?event.get("type"), "ignoring non-transcript event");
        return None;
    }

    let fragment = event
        .pointer("/channel/alternatives/0/transcript")
        .and_then(|t| t.as_str())
        .unwrap_or("");
    collector.add_part(fragment);

    let speech_final = event
        .get("speech_final")
        .and_then(|f| f.as_bool())
        .unwrap_or(false);
    if !speech_final {
        return None;
    }

    let full = collector.get_full_transcript();
    let trimmed = full.trim();
    if trimmed.is_empty() {
        return None;
    }

    let utterance = trimmed.to_string();
    collector.reset();
    Some(utterance)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results_event(transcript: &str, speech_final: bool) -> String {
        serde_json::json!({
            "type": "Results",
            "channel": { "alternatives": [ { "transcript": transcript } ] },
            "speech_final": speech_final,
        })
        .to_string()
    }

    #[test]
    fn test_fragments_join_in_receipt_order() {
        let mut collector = TranscriptCollector::new();

        assert!(apply_event(&mut collector, &results_event("what time", false)).is_none());
        assert!(apply_event(&mut collector, &results_event("does the office", false)).is_none());
        let utterance = apply_event(&mut collector, &results_event("open tomorrow", true));

        assert_eq!(
            utterance.as_deref(),
            Some("what time does the office open tomorrow")
        );
    }

    #[test]
    fn test_whitespace_only_final_never_fires() {
        let mut collector = TranscriptCollector::new();

        assert!(apply_event(&mut collector, &results_event("", false)).is_none());
        assert!(apply_event(&mut collector, &results_event("  ", true)).is_none());

        // Silence is not finalized, so speech arriving afterwards still
        // completes against the same collector.
        let utterance = apply_event(&mut collector, &results_event("hello", true));
        assert_eq!(utterance.as_deref(), Some("hello"));
    }

    #[test]
    fn test_collector_is_empty_after_finalize() {
        let mut collector = TranscriptCollector::new();

        apply_event(&mut collector, &results_event("goodbye", true));
        assert!(collector.is_empty());
        assert!(apply_event(&mut collector, &results_event("", true)).is_none());
    }

    #[test]
    fn test_non_transcript_events_are_ignored() {
        let mut collector = TranscriptCollector::new();

        let metadata = serde_json::json!({"type": "Metadata", "request_id": "abc"}).to_string();
        assert!(apply_event(&mut collector, &metadata).is_none());
        assert!(collector.is_empty());

        assert_eq!(
            apply_event(&mut collector, &results_event("hi", true)).as_deref(),
            Some("hi")
        );
    }

    #[test]
    fn test_unparseable_event_is_ignored() {
        let mut collector = TranscriptCollector::new();
        assert!(apply_event(&mut collector, "not json").is_none());
        assert!(collector.is_empty());
    }

    #[test]
    fn test_session_url_carries_the_full_live_contract() {
        let config = RecognitionConfig::default();
        assert_eq!(
            session_url(&config),
            "wss://api.deepgram.com/v1/listen?model=nova-2&language=en-US&punctuate=true\
             &encoding=linear16&channels=1&sample_rate=16000&endpointing=300&smart_format=true"
        );
    }
}
