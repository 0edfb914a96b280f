//! Conversation management
//!
//! Drives one call through its phases against the three service seams:
//! an utterance source, a prediction backend, and a speech synthesizer.

use std::sync::Arc;

use uuid::Uuid;

use voiceline_config::ConversationConfig;
use voiceline_core::{
    ConversationState, DialogTurn, PredictionBackend, SpeechSynthesizer, UtteranceSource,
};
use voiceline_llm::REQUEST_FALLBACK;

use crate::phase::ConversationPhase;
use crate::report::{CallReport, EndReason};
use crate::AgentError;

/// Orchestrates one call from greeting to completion
///
/// The manager is the only writer to the dialog history and runs exactly
/// one phase at a time; the collaborators sit behind trait objects so the
/// loop can be driven with scripted mocks in tests. One manager serves one
/// call and is consumed by [`run`](Self::run).
pub struct ConversationManager {
    call_id: Uuid,
    source: Arc<dyn UtteranceSource>,
    predictor: Arc<dyn PredictionBackend>,
    speaker: Arc<dyn SpeechSynthesizer>,
    config: ConversationConfig,
    state: ConversationState,
    phase: ConversationPhase,
}

impl ConversationManager {
    pub fn new(
        source: Arc<dyn UtteranceSource>,
        predictor: Arc<dyn PredictionBackend>,
        speaker: Arc<dyn SpeechSynthesizer>,
        config: ConversationConfig,
    ) -> Self {
        Self {
            call_id: Uuid::new_v4(),
            source,
            predictor,
            speaker,
            config,
            state: ConversationState::new(),
            phase: ConversationPhase::Greeting,
        }
    }

    pub fn call_id(&self) -> Uuid {
        self.call_id
    }

    /// Run the call to completion
    ///
    /// Returns the call report when the caller says the exit phrase or stays
    /// silent for too many listen phases. Synthesis and configuration
    /// failures abort the call; a failed prediction degrades to the request
    /// fallback so the caller always hears something.
    pub async fn run(mut self) -> Result<CallReport, AgentError> {
        tracing::info!(call_id = %self.call_id, "call started");
        metrics::counter!("calls_started").increment(1);

        let greeting = self.config.greeting.clone();
        self.state.push(DialogTurn::system(greeting.as_str()));
        self.speaker.speak(&greeting).await?;
        self.advance(ConversationPhase::Listening)?;

        let exit_phrase = self.config.exit_phrase.to_lowercase();
        let mut silent_listens = 0u32;
        let end_reason = loop {
            let Some(utterance) = self.listen_once().await else {
                silent_listens += 1;
                if silent_listens >= self.config.max_silent_listens {
                    tracing::info!(call_id = %self.call_id, "no caller input, giving up");
                    break EndReason::NoInput;
                }
                self.advance(ConversationPhase::Listening)?;
                continue;
            };
            silent_listens = 0;

            self.state.last_utterance = utterance.clone();
            self.state.push(DialogTurn::human(utterance.as_str()));
            if utterance.to_lowercase().contains(&exit_phrase) {
                self.state.ended = true;
                break EndReason::CallerGoodbye;
            }

            self.advance(ConversationPhase::Inferring)?;
            let reply = match self.predictor.process(&utterance, &self.state.history).await {
                Ok(reply) => reply,
                Err(e) => {
                    tracing::warn!(
                        call_id = %self.call_id,
                        error = %e,
                        "prediction failed, speaking the fallback reply"
                    );
                    REQUEST_FALLBACK.to_string()
                }
            };
            self.state.push(DialogTurn::system(reply.as_str()));

            self.advance(ConversationPhase::Speaking)?;
            self.speaker.speak(&reply).await?;
            self.dump_history();
            self.advance(ConversationPhase::Listening)?;
        };

        self.advance(ConversationPhase::Ended)?;
        tracing::info!(call_id = %self.call_id, reason = ?end_reason, "Conversation ended.");
        metrics::counter!("calls_completed").increment(1);

        Ok(CallReport {
            call_id: self.call_id,
            end_reason,
            turns: self.state.history.len(),
            history: self.state.history,
        })
    }

    /// One listening phase; at most one utterance
    async fn listen_once(&self) -> Option<String> {
        let mut heard = None;
        self.source
            .listen(&mut |text| heard = Some(text.to_string()))
            .await;
        heard
    }

    fn advance(&mut self, next: ConversationPhase) -> Result<(), AgentError> {
        if !self.phase.can_transition_to(next) {
            return Err(AgentError::Conversation(format!(
                "illegal phase transition {:?} -> {:?}",
                self.phase, next
            )));
        }
        tracing::debug!(call_id = %self.call_id, from = ?self.phase, to = ?next, "phase transition");
        self.phase = next;
        Ok(())
    }

    fn dump_history(&self) {
        for turn in &self.state.history {
            tracing::debug!(
                call_id = %self.call_id,
                speaker = %turn.speaker,
                text = %turn.text,
                "dialog turn"
            );
        }
    }
}
