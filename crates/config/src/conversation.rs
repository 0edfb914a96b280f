//! Conversation manager configuration

use serde::{Deserialize, Serialize};

/// Conversation manager configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationConfig {
    /// Greeting spoken when the call is answered
    #[serde(default = "default_greeting")]
    pub greeting: String,

    /// Case-insensitive phrase that ends the call when the caller says it
    #[serde(default = "default_exit_phrase")]
    pub exit_phrase: String,

    /// Consecutive listen phases with no utterance before the call ends
    #[serde(default = "default_max_silent_listens")]
    pub max_silent_listens: u32,
}

fn default_greeting() -> String {
    "Thank you for calling the City of Carrollton, my Name is Carrie, can I help you?".to_string()
}
fn default_exit_phrase() -> String {
    "goodbye".to_string()
}
fn default_max_silent_listens() -> u32 {
    5
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            greeting: default_greeting(),
            exit_phrase: default_exit_phrase(),
            max_silent_listens: default_max_silent_listens(),
        }
    }
}
