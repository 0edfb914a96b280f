//! Application State
//!
//! Shared state across all handlers.

use std::sync::Arc;

use tokio::sync::Mutex;

use voiceline_config::Settings;

/// Application state
///
/// The audio guard serializes answer requests: the process owns one
/// microphone and one playback device, so at most one call may run at a
/// time. A request that arrives while the guard is held is rejected,
/// not queued.
#[derive(Clone)]
pub struct AppState {
    /// Configuration snapshot taken at startup
    pub settings: Arc<Settings>,
    /// Held for the full duration of a call
    pub audio_guard: Arc<Mutex<()>>,
}

impl AppState {
    /// Create new application state
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Arc::new(settings),
            audio_guard: Arc::new(Mutex::new(())),
        }
    }
}
