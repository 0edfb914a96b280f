//! Call completion reports

use serde::Serialize;
use uuid::Uuid;

use voiceline_core::DialogHistory;

/// Why a call ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// The caller said the exit phrase
    CallerGoodbye,
    /// Too many consecutive listen phases produced no utterance
    NoInput,
}

/// Summary of one completed call
///
/// Returned by the manager when a call reaches `Ended`; the webhook adapter
/// serializes it back to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct CallReport {
    pub call_id: Uuid,
    pub end_reason: EndReason,
    /// Turns recorded over the whole call, greeting included
    pub turns: usize,
    pub history: DialogHistory,
}
