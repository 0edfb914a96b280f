//! Service traits for the conversation loop
//!
//! The three external collaborators the manager orchestrates, behind traits
//! so the loop can be driven with mocks in tests:
//!
//! ```text
//! Speech:
//!   - UtteranceSource: one live listening phase -> at most one utterance
//!   - SpeechSynthesizer: reply text -> audible playback
//!
//! Prediction:
//!   - PredictionBackend: utterance + history -> reply text
//! ```

mod prediction;
mod speech;

pub use prediction::PredictionBackend;
pub use speech::{SpeechSynthesizer, UtteranceSource};
