//! Transcript accumulation for the in-progress utterance

/// Buffers partial recognition fragments until speech-finality
///
/// One utterance accumulates at a time: the collector is reset at the start
/// of each listening phase, appended to as transcript events arrive, and
/// joined exactly once when the recognition service signals speech-final.
#[derive(Debug, Default)]
pub struct TranscriptCollector {
    parts: Vec<String>,
}

impl TranscriptCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all accumulated fragments
    pub fn reset(&mut self) {
        self.parts.clear();
    }

    /// Append a fragment unconditionally (empty fragments allowed)
    pub fn add_part(&mut self, part: impl Into<String>) {
        self.parts.push(part.into());
    }

    /// Join accumulated fragments with a single space, in append order
    pub fn get_full_transcript(&self) -> String {
        self.parts.join(" ")
    }

    /// Whether no fragments have been accumulated
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}
