//! Streaming speech synthesis into a local player process
//!
//! Synthesized audio is streamed chunk-by-chunk from the service straight
//! into the player's stdin, so playback starts at the first byte instead of
//! waiting for the full utterance to render.

use std::process::Stdio;
use std::time::Instant;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use voiceline_config::SynthesisConfig;
use voiceline_core::SpeechSynthesizer;

use crate::PipelineError;

/// Streams synthesized speech through the configured player executable
pub struct StreamingSpeaker {
    client: Client,
    config: SynthesisConfig,
}

impl StreamingSpeaker {
    pub fn new(config: SynthesisConfig) -> Result<Self, PipelineError> {
        let client = Client::builder()
            .build()
            .map_err(|e| PipelineError::Configuration(format!("failed to build client: {e}")))?;
        Ok(Self { client, config })
    }

    async fn stream_to_player(&self, text: &str) -> Result<(), PipelineError> {
        // Playback preflight runs before any network I/O.
        which::which(&self.config.player).map_err(|_| {
            PipelineError::Configuration(format!(
                "{} not found, necessary to stream audio",
                self.config.player
            ))
        })?;

        let api_key = self.config.api_key.as_deref().ok_or_else(|| {
            PipelineError::Configuration("synthesis.api_key is not set".to_string())
        })?;

        let mut player = Command::new(&self.config.player)
            .args(&self.config.player_args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                PipelineError::Synthesis(format!("failed to spawn {}: {e}", self.config.player))
            })?;
        let mut stdin = player
            .stdin
            .take()
            .ok_or_else(|| PipelineError::Synthesis("player stdin unavailable".to_string()))?;

        let sample_rate = self.config.sample_rate.to_string();
        let started = Instant::now();
        let response = self
            .client
            .post(&self.config.endpoint)
            .query(&[
                ("model", self.config.model.as_str()),
                ("performance", self.config.performance.as_str()),
                ("encoding", self.config.encoding.as_str()),
                ("sample_rate", sample_rate.as_str()),
            ])
            .header("Authorization", format!("Token {api_key}"))
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await
            .map_err(|e| PipelineError::Synthesis(format!("synthesis request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(PipelineError::Synthesis(format!(
                "synthesis endpoint returned {}",
                response.status()
            )));
        }

        let mut stream = response.bytes_stream();
        let mut got_first_chunk = false;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk
                .map_err(|e| PipelineError::Synthesis(format!("synthesis stream failed: {e}")))?;
            if chunk.is_empty() {
                continue;
            }
            if !got_first_chunk {
                got_first_chunk = true;
                let ttfb_ms = started.elapsed().as_millis() as u64;
                tracing::info!(ttfb_ms, "synthesis time to first byte");
                metrics::histogram!("synthesis_ttfb_ms").record(ttfb_ms as f64);
            }
            stdin.write_all(&chunk).await.map_err(|e| {
                PipelineError::Synthesis(format!("failed to write to player stdin: {e}"))
            })?;
            stdin.flush().await.map_err(|e| {
                PipelineError::Synthesis(format!("failed to flush player stdin: {e}"))
            })?;
        }

        // EOF on stdin lets the player drain its buffer and exit.
        drop(stdin);
        let status = player.wait().await.map_err(|e| {
            PipelineError::Synthesis(format!("failed to wait for {}: {e}", self.config.player))
        })?;
        if !status.success() {
            tracing::warn!(
                player = %self.config.player,
                code = ?status.code(),
                "player exited with failure"
            );
        }
        Ok(())
    }
}

#[async_trait]
impl SpeechSynthesizer for StreamingSpeaker {
    /// Returns once playback has fully finished, not once the request ends
    async fn speak(&self, text: &str) -> voiceline_core::Result<()> {
        self.stream_to_player(text).await.map_err(Into::into)
    }
}
