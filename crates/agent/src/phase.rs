//! Call phases and their legal transitions

/// Phase of one call
///
/// ```text
/// Greeting -> Listening -> Inferring -> Speaking -> Listening -> ...
///                 |
///                 +-> Ended
/// ```
///
/// `Listening` re-enters itself when a listen phase produces no utterance,
/// and is the only phase that can end the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationPhase {
    /// Speaking the configured opening line
    Greeting,
    /// One live recognition phase, waiting for a caller utterance
    Listening,
    /// Prediction round trip for the latest utterance
    Inferring,
    /// Speaking the generated reply
    Speaking,
    /// Terminal
    Ended,
}

impl ConversationPhase {
    /// All phases reachable from this one in a single step
    pub fn valid_transitions(&self) -> Vec<ConversationPhase> {
        match self {
            ConversationPhase::Greeting => vec![ConversationPhase::Listening],
            ConversationPhase::Listening => vec![
                ConversationPhase::Inferring,
                ConversationPhase::Listening,
                ConversationPhase::Ended,
            ],
            ConversationPhase::Inferring => vec![ConversationPhase::Speaking],
            ConversationPhase::Speaking => vec![ConversationPhase::Listening],
            ConversationPhase::Ended => vec![],
        }
    }

    pub fn can_transition_to(&self, next: ConversationPhase) -> bool {
        self.valid_transitions().contains(&next)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ConversationPhase::Ended)
    }
}
