//! Core traits and types for the voiceline agent
//!
//! This crate provides the foundational pieces used across all other crates:
//! - Dialog turns, history, and per-call conversation state
//! - The transcript collector for in-progress utterances
//! - Capture format and PCM16 conversion helpers
//! - Service traits for the listen / infer / speak seams
//! - Error types

pub mod audio;
pub mod conversation;
pub mod error;
pub mod transcript;
pub mod traits;

pub use audio::{f32_from_pcm16, pcm16_from_f32, CaptureFormat, PCM16_NORMALIZE, PCM16_SCALE};
pub use conversation::{ConversationState, DialogHistory, DialogTurn, Speaker};
pub use error::{Error, Result};
pub use transcript::TranscriptCollector;

pub use traits::{PredictionBackend, SpeechSynthesizer, UtteranceSource};
