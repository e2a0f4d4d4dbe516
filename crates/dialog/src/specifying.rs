//! The slot-filling waterfall for one journey specification dialog.
//!
//! Steps run in a fixed order; within a single turn the engine advances
//! from step to step until one of them suspends on a prompt or reaches a
//! terminal outcome. The suspended position is an explicit serializable
//! value (`SpecifyingState`), so resuming a conversation is a plain load.
//!
//! When NLU decoding fails to produce a required entity the whole dialog
//! is restarted from `init` with the accumulated spec carried forward:
//! the failure may stem from a misrouted intent rather than a bad value,
//! and re-entering `init` re-evaluates every slot, including ones the
//! failed utterance's other entities may have filled. Confirmation, by
//! contrast, re-prompts in place. At most one restart happens per turn;
//! afterwards the free-text decode branches accept input verbatim, which
//! keeps a turn from looping through the waterfall forever.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{info, warn};

use wayfarer_core::nlu::NluRecognizer;
use wayfarer_core::telemetry::{
    dialog_record, SpecificationCounters, TelemetryLevel, TelemetrySink,
};
use wayfarer_core::{
    timex, Budget, ChannelError, ConversationKey, JourneySpec, MessageChannel, PromptKind,
    SpecStep, SpecifyingState,
};

use crate::confirm;
use crate::decode;
use crate::prompts::{self, PromptOutcome, StepInput};

/// How a processed turn left the specification dialog.
#[derive(Clone, Debug, PartialEq)]
pub enum TurnOutcome {
    Suspended(SpecifyingState),
    Completed(JourneySpec),
    Declined,
}

enum StepOutcome {
    Next(StepInput),
    Suspend(PromptKind),
    Restart,
    Complete(JourneySpec),
    Decline,
}

pub struct SlotFillingEngine {
    recognizer: Arc<dyn NluRecognizer>,
    channel: Arc<dyn MessageChannel>,
    sink: Arc<dyn TelemetrySink>,
    counters: Arc<dyn SpecificationCounters>,
}

impl SlotFillingEngine {
    pub fn new(
        recognizer: Arc<dyn NluRecognizer>,
        channel: Arc<dyn MessageChannel>,
        sink: Arc<dyn TelemetrySink>,
        counters: Arc<dyn SpecificationCounters>,
    ) -> Self {
        Self { recognizer, channel, sink, counters }
    }

    /// Enter the dialog with a (possibly pre-seeded) spec. `utterance` is
    /// the turn that triggered the dialog; free-text decode branches may
    /// consult it.
    pub async fn begin(
        &self,
        key: &ConversationKey,
        spec: JourneySpec,
        utterance: &str,
    ) -> Result<TurnOutcome, ChannelError> {
        self.run(key, spec, SpecStep::Init, StepInput::Entry, utterance).await
    }

    /// Resume a suspended dialog with the next user turn. The caller has
    /// already recorded the utterance via `JourneySpec::begin_turn` and
    /// ruled out interruptions.
    pub async fn handle_turn(
        &self,
        key: &ConversationKey,
        state: SpecifyingState,
        utterance: &str,
    ) -> Result<TurnOutcome, ChannelError> {
        match prompts::validate(state.prompt, utterance) {
            PromptOutcome::Retry(messages) => {
                for message in &messages {
                    self.channel.send(key, message).await?;
                }
                let mut state = state;
                state.spec.awaiting_log = true;
                Ok(TurnOutcome::Suspended(state))
            }
            PromptOutcome::Valid(input) => {
                self.run(key, state.spec, state.step, input, utterance).await
            }
        }
    }

    async fn run(
        &self,
        key: &ConversationKey,
        mut spec: JourneySpec,
        mut step: SpecStep,
        mut input: StepInput,
        utterance: &str,
    ) -> Result<TurnOutcome, ChannelError> {
        let mut restarted = false;
        loop {
            let outcome = match step {
                SpecStep::Init => self.init_step(&mut spec),
                SpecStep::Destination => self.destination_step(&mut spec, input, utterance).await,
                SpecStep::Origin => {
                    self.origin_step(&mut spec, input, utterance, restarted).await
                }
                SpecStep::DepartureDate => {
                    self.departure_date_step(&mut spec, input, utterance, restarted).await
                }
                SpecStep::ReturnDate => self.return_date_step(&mut spec, input),
                SpecStep::Budget => self.budget_step(&mut spec, input),
                SpecStep::Confirm => self.confirm_step(key, &mut spec, input, utterance).await?,
                SpecStep::Final => self.final_step(key, &spec, input).await?,
            };

            match outcome {
                StepOutcome::Next(value) => {
                    input = value;
                    step = step.successor();
                }
                StepOutcome::Suspend(prompt) => {
                    spec.awaiting_log = true;
                    self.send_prompt(key, prompt, &spec).await?;
                    return Ok(TurnOutcome::Suspended(SpecifyingState::suspended(prompt, spec)));
                }
                StepOutcome::Restart => {
                    restarted = true;
                    step = SpecStep::Init;
                    input = StepInput::Entry;
                }
                StepOutcome::Complete(done) => return Ok(TurnOutcome::Completed(done)),
                StepOutcome::Decline => return Ok(TurnOutcome::Declined),
            }
        }
    }

    fn init_step(&self, spec: &mut JourneySpec) -> StepOutcome {
        match spec.destination.clone() {
            None => StepOutcome::Suspend(PromptKind::DestinationCity),
            Some(destination) => {
                spec.drop_origin_if_matches_destination();
                StepOutcome::Next(StepInput::Text(destination))
            }
        }
    }

    async fn destination_step(
        &self,
        spec: &mut JourneySpec,
        input: StepInput,
        utterance: &str,
    ) -> StepOutcome {
        if spec.destination.is_some() {
            return StepOutcome::Next(input);
        }

        let result = decode::recognize_or_default(&*self.recognizer, utterance).await;
        let decoded = decode::decode_journey(&result);
        spec.merge(&decoded, false);
        if spec.destination.is_none() {
            return self.entity_miss(spec, "destination");
        }
        StepOutcome::Next(StepInput::Text(utterance.to_owned()))
    }

    async fn origin_step(
        &self,
        spec: &mut JourneySpec,
        input: StepInput,
        utterance: &str,
        restarted: bool,
    ) -> StepOutcome {
        let value = text_input(input, utterance);
        let resolved = if is_multiword(&value) && !restarted {
            let result = decode::recognize_or_default(&*self.recognizer, utterance).await;
            let decoded = decode::decode_journey(&result);
            spec.merge(&decoded, false);
            match decoded.destination {
                Some(destination) => destination,
                None => return self.entity_miss(spec, "destination"),
            }
        } else {
            value
        };

        spec.destination = Some(resolved);
        spec.drop_origin_if_matches_destination();

        match spec.origin.clone() {
            Some(origin) => StepOutcome::Next(StepInput::Text(origin)),
            None => StepOutcome::Suspend(PromptKind::OriginCity),
        }
    }

    async fn departure_date_step(
        &self,
        spec: &mut JourneySpec,
        input: StepInput,
        utterance: &str,
        restarted: bool,
    ) -> StepOutcome {
        let value = text_input(input, utterance);
        let resolved = if is_multiword(&value) && !restarted {
            let result = decode::recognize_or_default(&*self.recognizer, utterance).await;
            let decoded = decode::decode_journey(&result);
            spec.merge(&decoded, false);
            match decoded.origin {
                Some(origin) => origin,
                None => return self.entity_miss(spec, "origin"),
            }
        } else {
            value
        };

        spec.origin = Some(resolved);
        if spec.drop_origin_if_matches_destination() {
            // Same city both ways: the origin has to be asked again.
            return StepOutcome::Suspend(PromptKind::OriginCity);
        }

        match spec.departure_date.clone() {
            Some(date) if !timex::is_ambiguous(&date) => StepOutcome::Next(StepInput::Date(date)),
            _ => StepOutcome::Suspend(PromptKind::DepartureDate),
        }
    }

    fn return_date_step(&self, spec: &mut JourneySpec, input: StepInput) -> StepOutcome {
        if spec.departure_date.as_deref().map_or(true, timex::is_ambiguous) {
            if let StepInput::Date(date) = &input {
                spec.departure_date = Some(date.clone());
            }
        }

        match spec.return_date.clone() {
            Some(date) if !timex::is_ambiguous(&date) => StepOutcome::Next(StepInput::Date(date)),
            _ => StepOutcome::Suspend(PromptKind::ReturnDate),
        }
    }

    fn budget_step(&self, spec: &mut JourneySpec, input: StepInput) -> StepOutcome {
        if spec.return_date.as_deref().map_or(true, timex::is_ambiguous) {
            if let StepInput::Date(date) = &input {
                spec.return_date = Some(date.clone());
            }
        }

        if spec.max_budget.is_none() {
            return StepOutcome::Suspend(PromptKind::Budget);
        }
        StepOutcome::Next(StepInput::Entry)
    }

    async fn confirm_step(
        &self,
        key: &ConversationKey,
        spec: &mut JourneySpec,
        input: StepInput,
        utterance: &str,
    ) -> Result<StepOutcome, ChannelError> {
        if spec.max_budget.is_none() {
            let raw = text_input(input, utterance);
            let budget = match parse_budget(&raw) {
                Some(budget) => budget,
                None => {
                    let result =
                        decode::recognize_or_default(&*self.recognizer, utterance).await;
                    match decode::decode_journey(&result).max_budget {
                        Some(budget) => budget,
                        None => return Ok(self.entity_miss(spec, "budget")),
                    }
                }
            };
            spec.max_budget = Some(budget);
        }

        self.channel.send(key, confirm::CONFIRM_LEAD_IN).await?;
        self.channel.send(key, &confirm::travel_line(spec)).await?;
        self.channel.send(key, &confirm::dates_line(spec)).await?;
        Ok(StepOutcome::Suspend(PromptKind::Confirm))
    }

    async fn final_step(
        &self,
        key: &ConversationKey,
        spec: &JourneySpec,
        input: StepInput,
    ) -> Result<StepOutcome, ChannelError> {
        if matches!(input, StepInput::Confirm(true)) {
            self.counters.specification_validated();
            self.sink.emit(dialog_record(
                TelemetryLevel::Info,
                "specification validated",
                "specifying",
                None,
                &spec.utterance_log,
                true,
            ));
            info!(conversation = %key, "journey specification confirmed");
            return Ok(StepOutcome::Complete(spec.clone()));
        }

        self.channel.send(key, confirm::APOLOGY).await?;
        self.sink.emit(dialog_record(
            TelemetryLevel::Info,
            "specification not validated",
            "specifying",
            None,
            &spec.utterance_log,
            false,
        ));
        self.counters.specification_not_validated();
        info!(conversation = %key, "journey specification declined");
        Ok(StepOutcome::Decline)
    }

    fn entity_miss(&self, spec: &mut JourneySpec, prompt: &str) -> StepOutcome {
        spec.awaiting_log = true;
        self.sink.emit(dialog_record(
            TelemetryLevel::Warning,
            "entity not found",
            "specifying",
            Some(prompt),
            &spec.utterance_log,
            false,
        ));
        warn!(prompt, "required entity missing after decode; restarting the specification dialog");
        StepOutcome::Restart
    }

    async fn send_prompt(
        &self,
        key: &ConversationKey,
        prompt: PromptKind,
        spec: &JourneySpec,
    ) -> Result<(), ChannelError> {
        match prompt {
            PromptKind::Confirm => self.channel.send(key, &confirm::budget_line(spec)).await,
            other => self.channel.send(key, prompts::prompt_text(other)).await,
        }
    }
}

fn is_multiword(value: &str) -> bool {
    value.split_whitespace().count() > 1
}

fn text_input(input: StepInput, utterance: &str) -> String {
    match input {
        StepInput::Text(text) => text,
        StepInput::Date(date) => date,
        _ => utterance.to_owned(),
    }
}

/// Purely numeric answers (digits with at most one decimal point) are
/// captured directly; anything else goes through the recognizer.
fn parse_budget(raw: &str) -> Option<Budget> {
    let candidate = raw.trim();
    if candidate.is_empty()
        || candidate.matches('.').count() > 1
        || !candidate.chars().all(|c| c.is_ascii_digit() || c == '.')
    {
        return None;
    }
    candidate.parse::<Decimal>().ok().map(|amount| Budget { amount, unit: None })
}
