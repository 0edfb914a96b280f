//! Conversation types: dialog turns and per-call state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who produced a dialog turn
///
/// The variant names are serialized as-is ("System"/"Human") because the
/// prediction endpoint replays the history verbatim and expects these exact
/// speaker labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Speaker {
    /// The agent (greeting and generated replies)
    System,
    /// The caller
    Human,
}

impl Speaker {
    pub fn as_str(&self) -> &'static str {
        match self {
            Speaker::System => "System",
            Speaker::Human => "Human",
        }
    }
}

impl std::fmt::Display for Speaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single turn in the dialog history
///
/// Immutable once appended. Only `speaker` and `text` are sent to the
/// prediction endpoint; `timestamp` stays local for the call report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogTurn {
    /// Who spoke
    pub speaker: Speaker,
    /// What was said
    pub text: String,
    /// When the turn was appended
    pub timestamp: DateTime<Utc>,
}

impl DialogTurn {
    /// Create a new turn
    pub fn new(speaker: Speaker, text: impl Into<String>) -> Self {
        Self {
            speaker,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a caller turn
    pub fn human(text: impl Into<String>) -> Self {
        Self::new(Speaker::Human, text)
    }

    /// Create an agent turn
    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Speaker::System, text)
    }

    /// Get word count
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// Ordered dialog history for one call
///
/// Insertion order is significant: the sequence is replayed to the prediction
/// endpoint exactly as recorded. Owned exclusively by the conversation
/// manager and discarded when the call ends.
pub type DialogHistory = Vec<DialogTurn>;

/// Mutable state of one conversation, owned by the manager
///
/// Passed explicitly between phase functions; never shared across calls.
#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    /// Turns recorded so far, greeting first
    pub history: DialogHistory,
    /// The most recent finalized caller utterance
    pub last_utterance: String,
    /// Set exactly when the latest utterance contains the exit phrase
    pub ended: bool,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn to the history
    pub fn push(&mut self, turn: DialogTurn) {
        self.history.push(turn);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speaker_labels() {
        assert_eq!(Speaker::System.as_str(), "System");
        assert_eq!(Speaker::Human.as_str(), "Human");
    }

    #[test]
    fn test_speaker_serializes_verbatim() {
        let json = serde_json::to_string(&Speaker::Human).unwrap();
        assert_eq!(json, "\"Human\"");
        let json = serde_json::to_string(&Speaker::System).unwrap();
        assert_eq!(json, "\"System\"");
    }

    #[test]
    fn test_turn_creation() {
        let turn = DialogTurn::human("when is my bill due");
        assert_eq!(turn.speaker, Speaker::Human);
        assert_eq!(turn.word_count(), 5);

        let turn = DialogTurn::system("Your bill is due on the 5th.");
        assert_eq!(turn.speaker, Speaker::System);
    }

    #[test]
    fn test_state_push_preserves_order() {
        let mut state = ConversationState::new();
        state.push(DialogTurn::system("greeting"));
        state.push(DialogTurn::human("question"));
        state.push(DialogTurn::system("answer"));

        let speakers: Vec<Speaker> = state.history.iter().map(|t| t.speaker).collect();
        assert_eq!(speakers, vec![Speaker::System, Speaker::Human, Speaker::System]);
    }
}
