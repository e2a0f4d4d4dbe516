use serde::{Deserialize, Serialize};

use crate::domain::journey::JourneySpec;

/// Step identifiers of the specification waterfall, in execution order.
/// The persisted step is the one that consumes the next validated input,
/// so the state machine's position is a plain serializable value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpecStep {
    Init,
    Destination,
    Origin,
    DepartureDate,
    ReturnDate,
    Budget,
    Confirm,
    Final,
}

impl SpecStep {
    pub fn successor(self) -> SpecStep {
        match self {
            SpecStep::Init => SpecStep::Destination,
            SpecStep::Destination => SpecStep::Origin,
            SpecStep::Origin => SpecStep::DepartureDate,
            SpecStep::DepartureDate => SpecStep::ReturnDate,
            SpecStep::ReturnDate => SpecStep::Budget,
            SpecStep::Budget => SpecStep::Confirm,
            SpecStep::Confirm => SpecStep::Final,
            SpecStep::Final => SpecStep::Final,
        }
    }
}

/// Which prompt is outstanding, and therefore which validator applies to
/// the next incoming turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PromptKind {
    DestinationCity,
    OriginCity,
    DepartureDate,
    ReturnDate,
    Budget,
    Confirm,
}

impl PromptKind {
    /// Waterfall step that consumes the validated answer to this prompt.
    pub fn consumer(self) -> SpecStep {
        match self {
            PromptKind::DestinationCity => SpecStep::Destination,
            PromptKind::OriginCity => SpecStep::DepartureDate,
            PromptKind::DepartureDate => SpecStep::ReturnDate,
            PromptKind::ReturnDate => SpecStep::Budget,
            PromptKind::Budget => SpecStep::Confirm,
            PromptKind::Confirm => SpecStep::Final,
        }
    }
}

/// Suspended position of one specification dialog between two turns.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpecifyingState {
    pub step: SpecStep,
    pub prompt: PromptKind,
    pub spec: JourneySpec,
}

impl SpecifyingState {
    /// Suspend on `prompt`: the recorded step is the one that will consume
    /// the next validated input.
    pub fn suspended(prompt: PromptKind, spec: JourneySpec) -> Self {
        Self { step: prompt.consumer(), prompt, spec }
    }
}

/// Everything persisted per conversation. `specifying: None` means the
/// outer router owns the next turn.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub specifying: Option<SpecifyingState>,
}

impl SessionState {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn is_idle(&self) -> bool {
        self.specifying.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::{SessionState, SpecStep};

    #[test]
    fn successor_walks_the_waterfall_in_order() {
        let mut step = SpecStep::Init;
        let expected = [
            SpecStep::Destination,
            SpecStep::Origin,
            SpecStep::DepartureDate,
            SpecStep::ReturnDate,
            SpecStep::Budget,
            SpecStep::Confirm,
            SpecStep::Final,
            SpecStep::Final,
        ];
        for next in expected {
            step = step.successor();
            assert_eq!(step, next);
        }
    }

    #[test]
    fn fresh_session_is_idle() {
        assert!(SessionState::idle().is_idle());
    }
}
