//! Prediction HTTP client
//!
//! One pooled client per conversation, reused across turns. Transient
//! failures (5xx and transport errors) are retried with exponential backoff;
//! a degraded endpoint always yields a speakable fallback sentence rather
//! than silence.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;

use voiceline_config::PredictionConfig;
use voiceline_core::{DialogTurn, PredictionBackend, Speaker};

use crate::LlmError;

/// Spoken when the endpoint answers 200 without a usable reply
pub const ANSWER_FALLBACK: &str = "Sorry, I couldn't find an answer to your question.";

/// Spoken when the endpoint keeps failing or rejects the request
pub const REQUEST_FALLBACK: &str = "Sorry, I couldn't process your request at the moment.";

/// Response statuses worth another attempt
const RETRYABLE_STATUSES: [u16; 4] = [500, 502, 503, 504];

/// Client for the remote prediction endpoint
pub struct PredictionClient {
    client: Client,
    config: PredictionConfig,
}

/// What a single attempt produced
enum AttemptOutcome {
    /// A final reply: the answer, or a fallback sentence
    Reply(String),
    /// A status worth retrying
    Retryable(StatusCode),
}

impl PredictionClient {
    /// Create a new prediction client
    pub fn new(config: PredictionConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| LlmError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Retry loop with exponential backoff
    ///
    /// Retryable statuses exhaust into the request fallback sentence;
    /// transport errors exhaust into `LlmError::Network`.
    async fn request_with_retries(&self, request: &PredictionRequest) -> Result<String, LlmError> {
        let mut last_error = None;
        let mut backoff = Duration::from_millis(self.config.initial_backoff_ms);

        for attempt in 1..=self.config.max_attempts {
            if attempt > 1 {
                tracing::warn!(
                    "prediction request failed, retrying in {:?} (attempt {}/{})",
                    backoff,
                    attempt,
                    self.config.max_attempts
                );
                tokio::time::sleep(backoff).await;
                backoff *= 2;
            }

            match self.execute_request(request).await {
                Ok(AttemptOutcome::Reply(text)) => return Ok(text),
                Ok(AttemptOutcome::Retryable(status)) => {
                    tracing::debug!(%status, attempt, "retryable status from prediction endpoint");
                    last_error = None;
                }
                Err(e) => {
                    tracing::debug!(error = %e, attempt, "prediction transport error");
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) => Err(e),
            None => Ok(REQUEST_FALLBACK.to_string()),
        }
    }

    /// Execute a single request (used by retry logic)
    async fn execute_request(
        &self,
        request: &PredictionRequest,
    ) -> Result<AttemptOutcome, LlmError> {
        let response = self
            .client
            .post(&self.config.endpoint)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::OK {
            let body = response.text().await?;
            tracing::debug!(body = %body, "raw prediction response");

            let reply = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("text").and_then(|t| t.as_str()).map(str::to_string))
                .unwrap_or_else(|| ANSWER_FALLBACK.to_string());
            return Ok(AttemptOutcome::Reply(reply));
        }

        if RETRYABLE_STATUSES.contains(&status.as_u16()) {
            return Ok(AttemptOutcome::Retryable(status));
        }

        tracing::warn!(%status, "prediction endpoint rejected the request");
        Ok(AttemptOutcome::Reply(REQUEST_FALLBACK.to_string()))
    }
}

#[async_trait]
impl PredictionBackend for PredictionClient {
    async fn process(
        &self,
        question: &str,
        history: &[DialogTurn],
    ) -> voiceline_core::Result<String> {
        let request = PredictionRequest {
            question: question.to_string(),
            dialog_history: history.iter().map(WireTurn::from).collect(),
        };

        let start = Instant::now();
        let reply = self
            .request_with_retries(&request)
            .await
            .map_err(voiceline_core::Error::from)?;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        tracing::info!(elapsed_ms, reply = %reply, "prediction complete");
        metrics::histogram!("prediction_latency_ms").record(elapsed_ms as f64);

        Ok(reply)
    }
}

/// Wire format of one prediction request
#[derive(Debug, Serialize)]
struct PredictionRequest {
    question: String,
    dialog_history: Vec<WireTurn>,
}

/// The slice of a dialog turn that crosses the wire
#[derive(Debug, Serialize)]
struct WireTurn {
    speaker: Speaker,
    text: String,
}

impl From<&DialogTurn> for WireTurn {
    fn from(turn: &DialogTurn) -> Self {
        Self {
            speaker: turn.speaker,
            text: turn.text.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};

    fn test_config(endpoint: String) -> PredictionConfig {
        PredictionConfig {
            endpoint,
            timeout_seconds: 5,
            max_attempts: 3,
            initial_backoff_ms: 1,
        }
    }

    async fn spawn_server(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/predict", addr)
    }

    #[test]
    fn test_request_serialization() {
        let history = vec![
            DialogTurn::system("Can I help you?"),
            DialogTurn::human("When is my bill due?"),
        ];
        let request = PredictionRequest {
            question: "When is my bill due?".to_string(),
            dialog_history: history.iter().map(WireTurn::from).collect(),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["question"], "When is my bill due?");
        assert_eq!(value["dialog_history"][0]["speaker"], "System");
        assert_eq!(value["dialog_history"][1]["speaker"], "Human");
        assert_eq!(value["dialog_history"][1]["text"], "When is my bill due?");
        // Timestamps never cross the wire
        assert!(value["dialog_history"][0].get("timestamp").is_none());
    }

    #[tokio::test]
    async fn test_returns_text_field_verbatim() {
        let app = Router::new().route(
            "/predict",
            post(|| async { Json(serde_json::json!({"text": "Your bill is due on the 5th."})) }),
        );
        let endpoint = spawn_server(app).await;

        let client = PredictionClient::new(test_config(endpoint)).unwrap();
        let reply = client.process("When is my bill due?", &[]).await.unwrap();
        assert_eq!(reply, "Your bill is due on the 5th.");
    }

    #[tokio::test]
    async fn test_ok_without_text_falls_back() {
        let app = Router::new().route(
            "/predict",
            post(|| async { Json(serde_json::json!({"other": 1})) }),
        );
        let endpoint = spawn_server(app).await;

        let client = PredictionClient::new(test_config(endpoint)).unwrap();
        let reply = client.process("hello", &[]).await.unwrap();
        assert_eq!(reply, ANSWER_FALLBACK);
    }

    #[tokio::test]
    async fn test_retryable_status_exhausts_all_attempts() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let app = Router::new().route(
            "/predict",
            post(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    (StatusCode::SERVICE_UNAVAILABLE, "down")
                }
            }),
        );
        let endpoint = spawn_server(app).await;

        let client = PredictionClient::new(test_config(endpoint)).unwrap();
        let reply = client.process("hello", &[]).await.unwrap();
        assert_eq!(reply, REQUEST_FALLBACK);
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_retryable_status_fails_fast() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let app = Router::new().route(
            "/predict",
            post(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    (StatusCode::NOT_FOUND, "gone")
                }
            }),
        );
        let endpoint = spawn_server(app).await;

        let client = PredictionClient::new(test_config(endpoint)).unwrap();
        let reply = client.process("hello", &[]).await.unwrap();
        assert_eq!(reply, REQUEST_FALLBACK);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_recovers_after_retryable_status() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let app = Router::new().route(
            "/predict",
            post(move || {
                let counter = counter.clone();
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                        (StatusCode::BAD_GATEWAY, Json(serde_json::json!({})))
                    } else {
                        (StatusCode::OK, Json(serde_json::json!({"text": "recovered"})))
                    }
                }
            }),
        );
        let endpoint = spawn_server(app).await;

        let client = PredictionClient::new(test_config(endpoint)).unwrap();
        let reply = client.process("hello", &[]).await.unwrap();
        assert_eq!(reply, "recovered");
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_transport_failure_is_an_error() {
        // Bind a listener, then drop it so the port refuses connections
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = PredictionClient::new(test_config(format!("http://{}/predict", addr))).unwrap();
        let err = client.process("hello", &[]).await.unwrap_err();
        assert!(matches!(err, voiceline_core::Error::RequestFailed(_)));
    }
}
