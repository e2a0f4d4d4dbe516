//! Per-conversation turn loop: load state, guard, dispatch, save.
//!
//! Each conversation is an independent cooperative state machine. One turn
//! runs to completion before the next for the same conversation is
//! accepted; the store guarantees a single visible `SessionState` per
//! conversation per turn.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use wayfarer_core::nlu::NluRecognizer;
use wayfarer_core::store::ConversationStore;
use wayfarer_core::telemetry::{SpecificationCounters, TelemetrySink};
use wayfarer_core::{ChannelError, ConversationKey, JourneySpec, MessageChannel, StoreError};

use crate::confirm;
use crate::interrupt::{InterruptGuard, Interruption};
use crate::main_dialog::{self, RouteAction};
use crate::specifying::{SlotFillingEngine, TurnOutcome};

#[derive(Debug, Error)]
pub enum DialogError {
    #[error(transparent)]
    Channel(#[from] ChannelError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// How a turn left the conversation, from the transport's point of view.
#[derive(Clone, Debug, PartialEq)]
pub enum TurnDisposition {
    /// The conversation continues; a prompt or reply has been sent.
    Active,
    /// The traveller confirmed the finished specification.
    Confirmed(JourneySpec),
    /// The traveller declined at confirmation.
    Declined,
    /// The traveller cancelled; the whole session was unwound.
    Cancelled,
}

pub struct DialogRuntime {
    engine: SlotFillingEngine,
    guard: InterruptGuard,
    recognizer: Arc<dyn NluRecognizer>,
    store: Arc<dyn ConversationStore>,
    channel: Arc<dyn MessageChannel>,
}

impl DialogRuntime {
    pub fn new(
        recognizer: Arc<dyn NluRecognizer>,
        store: Arc<dyn ConversationStore>,
        channel: Arc<dyn MessageChannel>,
        sink: Arc<dyn TelemetrySink>,
        counters: Arc<dyn SpecificationCounters>,
    ) -> Self {
        let engine = SlotFillingEngine::new(
            recognizer.clone(),
            channel.clone(),
            sink.clone(),
            counters,
        );
        let guard = InterruptGuard::new(sink);
        Self { engine, guard, recognizer, store, channel }
    }

    pub async fn on_turn(
        &self,
        key: &ConversationKey,
        utterance: &str,
    ) -> Result<TurnDisposition, DialogError> {
        let loaded = self.store.load(key).await?;
        let is_new_conversation = loaded.is_none();
        let mut session = loaded.unwrap_or_default();

        if let Some(state) = session.specifying.as_mut() {
            state.spec.begin_turn(utterance);
        }

        if let Some(interruption) =
            self.guard.intercept(&*self.channel, key, utterance, &mut session).await?
        {
            return match interruption {
                Interruption::Help => {
                    self.store.save(key, session).await?;
                    Ok(TurnDisposition::Active)
                }
                Interruption::Cancel => {
                    self.store.clear(key).await?;
                    Ok(TurnDisposition::Cancelled)
                }
            };
        }

        match session.specifying.take() {
            Some(state) => {
                debug!(conversation = %key, turn = state.spec.turn_number, "resuming specification dialog");
                match self.engine.handle_turn(key, state, utterance).await? {
                    TurnOutcome::Suspended(next) => {
                        session.specifying = Some(next);
                        self.store.save(key, session).await?;
                        Ok(TurnDisposition::Active)
                    }
                    TurnOutcome::Completed(spec) => {
                        self.channel.send(key, &confirm::confirmed_announcement(&spec)).await?;
                        self.channel.send(key, main_dialog::GOODBYE).await?;
                        self.store.clear(key).await?;
                        Ok(TurnDisposition::Confirmed(spec))
                    }
                    TurnOutcome::Declined => {
                        self.channel.send(key, main_dialog::GOODBYE).await?;
                        self.store.clear(key).await?;
                        Ok(TurnDisposition::Declined)
                    }
                }
            }
            None => {
                if is_new_conversation && !self.recognizer.is_configured() {
                    self.channel.send(key, main_dialog::UNCONFIGURED_NOTE).await?;
                }
                match main_dialog::route_idle_turn(&*self.recognizer, utterance).await {
                    RouteAction::Reply(text) => {
                        self.channel.send(key, text).await?;
                        self.store.save(key, session).await?;
                        Ok(TurnDisposition::Active)
                    }
                    RouteAction::BeginSpecifying(seed) => {
                        match self.engine.begin(key, seed, utterance).await? {
                            TurnOutcome::Suspended(state) => {
                                session.specifying = Some(state);
                                self.store.save(key, session).await?;
                                Ok(TurnDisposition::Active)
                            }
                            TurnOutcome::Completed(spec) => {
                                self.channel
                                    .send(key, &confirm::confirmed_announcement(&spec))
                                    .await?;
                                self.channel.send(key, main_dialog::GOODBYE).await?;
                                Ok(TurnDisposition::Confirmed(spec))
                            }
                            TurnOutcome::Declined => {
                                self.channel.send(key, main_dialog::GOODBYE).await?;
                                Ok(TurnDisposition::Declined)
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rust_decimal::Decimal;

    use wayfarer_core::telemetry::{AtomicSpecificationCounters, InMemoryTelemetrySink};
    use wayfarer_core::{
        BufferedChannel, ConversationKey, ConversationStore, NluRecognizer, UnconfiguredRecognizer,
    };
    use wayfarer_store::InMemoryConversationStore;

    use crate::interrupt::{FAREWELL_MESSAGE, HELP_MESSAGE};
    use crate::main_dialog::{FALLBACK_REPLY, GOODBYE, UNCONFIGURED_NOTE};
    use crate::testing::{journey_result, money_result, ScriptedRecognizer};

    use super::{DialogRuntime, TurnDisposition};

    struct Harness {
        runtime: DialogRuntime,
        channel: BufferedChannel,
        store: Arc<InMemoryConversationStore>,
        counters: AtomicSpecificationCounters,
        key: ConversationKey,
    }

    fn harness_with(recognizer: Arc<dyn NluRecognizer>) -> Harness {
        let channel = BufferedChannel::default();
        let store = Arc::new(InMemoryConversationStore::default());
        let counters = AtomicSpecificationCounters::default();
        let runtime = DialogRuntime::new(
            recognizer,
            store.clone(),
            Arc::new(channel.clone()),
            Arc::new(InMemoryTelemetrySink::default()),
            Arc::new(counters.clone()),
        );
        Harness { runtime, channel, store, counters, key: ConversationKey::new("thread-9") }
    }

    fn scripted_harness() -> Harness {
        let recognizer = ScriptedRecognizer::default()
            .with("I want to plan a journey", journey_result(None, None))
            .with("Paris", journey_result(Some("Paris"), None))
            .with("1000 EUR", money_result(1000, Some("EUR")));
        harness_with(Arc::new(recognizer))
    }

    #[tokio::test]
    async fn six_turn_happy_path_confirms_the_specification() {
        let harness = scripted_harness();

        let opening = harness
            .runtime
            .on_turn(&harness.key, "I want to plan a journey")
            .await
            .expect("turn");
        assert_eq!(opening, TurnDisposition::Active);

        for utterance in ["Paris", "London", "2024-06-01", "2024-06-10", "1000 EUR"] {
            let disposition =
                harness.runtime.on_turn(&harness.key, utterance).await.expect("turn");
            assert_eq!(disposition, TurnDisposition::Active, "utterance {utterance}");
        }

        let disposition = harness.runtime.on_turn(&harness.key, "yes").await.expect("turn");
        let TurnDisposition::Confirmed(spec) = disposition else { panic!("expected confirmation") };
        assert_eq!(spec.destination.as_deref(), Some("Paris"));
        assert_eq!(spec.origin.as_deref(), Some("London"));
        assert_eq!(spec.departure_date.as_deref(), Some("2024-06-01"));
        assert_eq!(spec.return_date.as_deref(), Some("2024-06-10"));
        let budget = spec.max_budget.clone().expect("budget");
        assert_eq!(budget.amount, Decimal::new(1000, 0));
        assert_eq!(budget.unit.as_deref(), Some("EUR"));

        assert_eq!(harness.counters.validated(), 1);
        assert!(harness.store.load(&harness.key).await.expect("load").is_none());

        let texts = harness.channel.texts_for(&harness.key);
        assert!(texts.contains(
            &"You have confirmed that you want to go to Paris from London on 2024-06-01 to \
              2024-06-10. Your best budget is 1000 EUR."
                .to_owned()
        ));
        assert_eq!(texts.last().map(String::as_str), Some(GOODBYE));
    }

    #[tokio::test]
    async fn help_leaves_slot_values_unchanged() {
        let harness = scripted_harness();

        harness.runtime.on_turn(&harness.key, "I want to plan a journey").await.expect("turn");
        harness.runtime.on_turn(&harness.key, "Paris").await.expect("turn");

        let disposition = harness.runtime.on_turn(&harness.key, "help").await.expect("turn");
        assert_eq!(disposition, TurnDisposition::Active);
        assert!(harness.channel.texts_for(&harness.key).contains(&HELP_MESSAGE.to_owned()));

        let session = harness.store.load(&harness.key).await.expect("load").expect("active");
        let state = session.specifying.expect("dialog active");
        assert_eq!(state.spec.destination.as_deref(), Some("Paris"));
        assert!(state.spec.origin.is_none());
        assert!(state.spec.utterance_log.contains(&"help".to_owned()));

        // The dialog picks up exactly where it left off.
        let disposition = harness.runtime.on_turn(&harness.key, "London").await.expect("turn");
        assert_eq!(disposition, TurnDisposition::Active);
        let session = harness.store.load(&harness.key).await.expect("load").expect("active");
        assert_eq!(
            session.specifying.expect("dialog active").spec.origin.as_deref(),
            Some("London")
        );
    }

    #[tokio::test]
    async fn cancel_preempts_any_pending_prompt() {
        let harness = scripted_harness();

        harness.runtime.on_turn(&harness.key, "I want to plan a journey").await.expect("turn");
        harness.runtime.on_turn(&harness.key, "Paris").await.expect("turn");

        let disposition = harness.runtime.on_turn(&harness.key, "cancel").await.expect("turn");
        assert_eq!(disposition, TurnDisposition::Cancelled);
        assert!(harness.store.load(&harness.key).await.expect("load").is_none());
        assert_eq!(
            harness.channel.texts_for(&harness.key).last().map(String::as_str),
            Some(FAREWELL_MESSAGE)
        );
    }

    #[tokio::test]
    async fn declined_confirmation_counts_as_not_validated() {
        let harness = scripted_harness();

        harness.runtime.on_turn(&harness.key, "I want to plan a journey").await.expect("turn");
        for utterance in ["Paris", "London", "2024-06-01", "2024-06-10", "1000 EUR"] {
            harness.runtime.on_turn(&harness.key, utterance).await.expect("turn");
        }

        let disposition = harness.runtime.on_turn(&harness.key, "no").await.expect("turn");
        assert_eq!(disposition, TurnDisposition::Declined);
        assert_eq!(harness.counters.not_validated(), 1);
        assert!(harness.store.load(&harness.key).await.expect("load").is_none());
        assert_eq!(
            harness.channel.texts_for(&harness.key).last().map(String::as_str),
            Some(GOODBYE)
        );
    }

    #[tokio::test]
    async fn unrouted_idle_turn_gets_the_fallback_reply() {
        let harness = scripted_harness();

        let disposition =
            harness.runtime.on_turn(&harness.key, "blub blub").await.expect("turn");
        assert_eq!(disposition, TurnDisposition::Active);
        assert_eq!(
            harness.channel.texts_for(&harness.key),
            vec![FALLBACK_REPLY.to_owned()]
        );
    }

    #[tokio::test]
    async fn unconfigured_recognizer_is_announced_once() {
        let harness = harness_with(Arc::new(UnconfiguredRecognizer));

        harness.runtime.on_turn(&harness.key, "hello").await.expect("turn");
        harness.runtime.on_turn(&harness.key, "hello again").await.expect("turn");

        let notes = harness
            .channel
            .texts_for(&harness.key)
            .into_iter()
            .filter(|text| text == UNCONFIGURED_NOTE)
            .count();
        assert_eq!(notes, 1);
    }

    #[tokio::test]
    async fn pre_seeded_slots_skip_their_prompts() {
        let recognizer = ScriptedRecognizer::default().with(
            "I want to go to Paris from London",
            journey_result(Some("Paris"), Some("London")),
        );
        let harness = harness_with(Arc::new(recognizer));

        harness
            .runtime
            .on_turn(&harness.key, "I want to go to Paris from London")
            .await
            .expect("turn");

        // Destination and origin are already known: the first prompt asks
        // for the departure date.
        assert_eq!(
            harness.channel.texts_for(&harness.key),
            vec!["When do you want to leave?".to_owned()]
        );
        let session = harness.store.load(&harness.key).await.expect("load").expect("active");
        let spec = session.specifying.expect("dialog active").spec;
        assert_eq!(spec.destination.as_deref(), Some("Paris"));
        assert_eq!(spec.origin.as_deref(), Some("London"));
    }
}
