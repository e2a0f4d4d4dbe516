//! Help/cancel interception, ahead of any slot-specific logic.
//!
//! The guard sees every turn of every dialog. Help consumes the turn and
//! leaves the outstanding prompt as it is; cancel unwinds the whole
//! session, nested specification dialog included.

use std::sync::Arc;

use tracing::info;

use wayfarer_core::telemetry::{dialog_record, TelemetryLevel, TelemetrySink};
use wayfarer_core::{ChannelError, ConversationKey, MessageChannel, SessionState};

pub const HELP_SYNONYMS: [&str; 3] = ["help", "?", "sos"];
pub const CANCEL_SYNONYMS: [&str; 3] = ["cancel", "quit", "bye"];

pub const HELP_MESSAGE: &str = "I will ask you the questions, just answer or say 'Bye'";
pub const FAREWELL_MESSAGE: &str = "Ok, I let you go. See you soon.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interruption {
    Help,
    Cancel,
}

/// Classify a turn against the fixed synonym sets. Matching is on the
/// trimmed, lower-cased text.
pub fn detect(utterance: &str) -> Option<Interruption> {
    let normalized = utterance.trim().to_lowercase();
    if HELP_SYNONYMS.contains(&normalized.as_str()) {
        return Some(Interruption::Help);
    }
    if CANCEL_SYNONYMS.contains(&normalized.as_str()) {
        return Some(Interruption::Cancel);
    }
    None
}

pub struct InterruptGuard {
    sink: Arc<dyn TelemetrySink>,
}

impl InterruptGuard {
    pub fn new(sink: Arc<dyn TelemetrySink>) -> Self {
        Self { sink }
    }

    /// Intercept an interruption before step logic runs. Returns `None`
    /// when the turn should proceed normally. The caller has already
    /// recorded the utterance in the active spec's log; when no dialog is
    /// active the telemetry record carries an empty placeholder log.
    pub async fn intercept(
        &self,
        channel: &dyn MessageChannel,
        key: &ConversationKey,
        utterance: &str,
        session: &mut SessionState,
    ) -> Result<Option<Interruption>, ChannelError> {
        let Some(interruption) = detect(utterance) else {
            return Ok(None);
        };

        let utterances = session
            .specifying
            .as_ref()
            .map(|state| state.spec.utterance_log.clone())
            .unwrap_or_default();

        match interruption {
            Interruption::Help => {
                self.sink.emit(dialog_record(
                    TelemetryLevel::Info,
                    "help requested",
                    "interrupt",
                    None,
                    &utterances,
                    true,
                ));
                info!(conversation = %key, "help requested");
                channel.send(key, HELP_MESSAGE).await?;
                // The next answer to the still-outstanding prompt must be
                // logged as well.
                if let Some(state) = session.specifying.as_mut() {
                    state.spec.awaiting_log = true;
                }
            }
            Interruption::Cancel => {
                self.sink.emit(dialog_record(
                    TelemetryLevel::Info,
                    "conversation cancelled",
                    "interrupt",
                    None,
                    &utterances,
                    false,
                ));
                info!(conversation = %key, "conversation cancelled by the user");
                channel.send(key, FAREWELL_MESSAGE).await?;
                *session = SessionState::idle();
            }
        }

        Ok(Some(interruption))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use wayfarer_core::telemetry::InMemoryTelemetrySink;
    use wayfarer_core::{
        BufferedChannel, ConversationKey, JourneySpec, PromptKind, SessionState, SpecifyingState,
    };

    use super::{detect, InterruptGuard, Interruption, FAREWELL_MESSAGE, HELP_MESSAGE};

    fn session_waiting_for_destination() -> SessionState {
        let mut spec = JourneySpec::default();
        spec.utterance_log.push("help".to_owned());
        SessionState {
            specifying: Some(SpecifyingState::suspended(PromptKind::DestinationCity, spec)),
        }
    }

    #[test]
    fn detection_matches_exact_synonyms_only() {
        assert_eq!(detect(" HELP "), Some(Interruption::Help));
        assert_eq!(detect("?"), Some(Interruption::Help));
        assert_eq!(detect("Bye"), Some(Interruption::Cancel));
        assert_eq!(detect("cancel"), Some(Interruption::Cancel));
        assert_eq!(detect("I would like to cancel my plans to travel"), None);
        assert_eq!(detect("Paris"), None);
    }

    #[tokio::test]
    async fn help_consumes_the_turn_and_keeps_the_dialog() {
        let sink = InMemoryTelemetrySink::default();
        let guard = InterruptGuard::new(Arc::new(sink.clone()));
        let channel = BufferedChannel::default();
        let key = ConversationKey::new("c-1");
        let mut session = session_waiting_for_destination();

        let interruption = guard
            .intercept(&channel, &key, "help", &mut session)
            .await
            .expect("send succeeds");

        assert_eq!(interruption, Some(Interruption::Help));
        assert_eq!(channel.texts_for(&key), vec![HELP_MESSAGE.to_owned()]);
        let state = session.specifying.expect("dialog still active");
        assert!(state.spec.awaiting_log);

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].tags.get("messages").map(String::as_str), Some("help"));
    }

    #[tokio::test]
    async fn cancel_unwinds_the_whole_session() {
        let sink = InMemoryTelemetrySink::default();
        let guard = InterruptGuard::new(Arc::new(sink));
        let channel = BufferedChannel::default();
        let key = ConversationKey::new("c-2");
        let mut session = session_waiting_for_destination();

        let interruption = guard
            .intercept(&channel, &key, "cancel", &mut session)
            .await
            .expect("send succeeds");

        assert_eq!(interruption, Some(Interruption::Cancel));
        assert!(session.is_idle());
        assert_eq!(channel.texts_for(&key), vec![FAREWELL_MESSAGE.to_owned()]);
    }

    #[tokio::test]
    async fn cancel_without_an_active_dialog_still_succeeds() {
        let sink = InMemoryTelemetrySink::default();
        let guard = InterruptGuard::new(Arc::new(sink.clone()));
        let channel = BufferedChannel::default();
        let key = ConversationKey::new("c-3");
        let mut session = SessionState::idle();

        let interruption = guard
            .intercept(&channel, &key, "quit", &mut session)
            .await
            .expect("send succeeds");

        assert_eq!(interruption, Some(Interruption::Cancel));
        assert_eq!(sink.records()[0].tags.get("messages").map(String::as_str), Some(""));
    }
}
