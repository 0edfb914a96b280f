//! Audio pipeline: microphone capture, live recognition, streaming synthesis
//!
//! This crate provides the audio half of the agent:
//! - Microphone capture on a dedicated thread (PCM16 frames over a channel)
//! - One-shot live recognition sessions against the streaming
//!   speech-to-text service
//! - Streaming text-to-speech playback through a local player process

pub mod mic;
pub mod stt;
pub mod tts;

// Capture exports
pub use mic::MicrophoneCapture;

// STT exports
pub use stt::LiveRecognizer;

// TTS exports
pub use tts::StreamingSpeaker;

use thiserror::Error;

/// Pipeline errors
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("audio device error: {0}")]
    AudioDevice(String),

    #[error("recognition session error: {0}")]
    Session(String),

    #[error("synthesis error: {0}")]
    Synthesis(String),

    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Capture and session errors stay inside the pipeline (`listen` logs and
/// swallows them); only the configuration and synthesis kinds cross the
/// core seams.
impl From<PipelineError> for voiceline_core::Error {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Configuration(msg) => voiceline_core::Error::Configuration(msg),
            PipelineError::AudioDevice(msg)
            | PipelineError::Session(msg)
            | PipelineError::Synthesis(msg) => voiceline_core::Error::Synthesis(msg),
        }
    }
}
