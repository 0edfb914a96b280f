//! Conversation orchestration for the voiceline agent
//!
//! Drives one call at a time through its phases:
//! - Greeting: speak the configured opening line
//! - Listening: one live recognition phase per caller turn
//! - Inferring: prediction round trip with the running dialog history
//! - Speaking: stream the reply through the synthesizer
//!
//! The loop runs until the caller says the exit phrase or stops responding,
//! then reports the completed call.

pub mod conversation;
pub mod phase;
pub mod report;

pub use conversation::ConversationManager;
pub use phase::ConversationPhase;
pub use report::{CallReport, EndReason};

use thiserror::Error;

/// Agent errors
#[derive(Error, Debug)]
pub enum AgentError {
    /// Broken loop invariant, e.g. an illegal phase transition
    #[error("conversation error: {0}")]
    Conversation(String),

    /// Speech pipeline failure that is fatal for the call
    #[error("speech error: {0}")]
    Speech(String),
}

impl From<voiceline_core::Error> for AgentError {
    fn from(err: voiceline_core::Error) -> Self {
        AgentError::Speech(err.to_string())
    }
}
