//! Prompt texts and per-prompt input validation.
//!
//! A prompt loops on its own retry messages until the answer validates;
//! only a validated answer reaches the waterfall step that consumes it.

use wayfarer_core::timex::{self, DateExpression, FORMAT_HINT};
use wayfarer_core::PromptKind;

/// Validated answer handed to a waterfall step, or the neutral `Entry`
/// value used when a dialog is (re-)entered without a prompt result.
#[derive(Clone, Debug, PartialEq)]
pub enum StepInput {
    Entry,
    Text(String),
    Date(String),
    Confirm(bool),
}

/// Result of validating one incoming turn against the outstanding prompt.
#[derive(Clone, Debug, PartialEq)]
pub enum PromptOutcome {
    Valid(StepInput),
    Retry(Vec<String>),
}

pub fn prompt_text(kind: PromptKind) -> &'static str {
    match kind {
        PromptKind::DestinationCity => "To which city would you like to travel?",
        PromptKind::OriginCity => "From which city will you be travelling?",
        PromptKind::DepartureDate => "When do you want to leave?",
        PromptKind::ReturnDate => "When do you want to come back?",
        PromptKind::Budget => "Up to how much are you ready to spend?",
        PromptKind::Confirm => "Please answer with yes or no.",
    }
}

pub fn retry_text(kind: PromptKind) -> &'static str {
    match kind {
        PromptKind::DestinationCity => "I do need to know where you want to go.",
        PromptKind::DepartureDate => "Please be more precise.",
        PromptKind::ReturnDate => "I need you to be more precise.",
        PromptKind::Confirm => "Please answer with yes or no.",
        // No dedicated retry: re-issue the prompt itself.
        PromptKind::OriginCity | PromptKind::Budget => prompt_text(kind),
    }
}

pub fn validate(kind: PromptKind, utterance: &str) -> PromptOutcome {
    match kind {
        PromptKind::DestinationCity | PromptKind::OriginCity | PromptKind::Budget => {
            let trimmed = utterance.trim();
            if trimmed.is_empty() {
                PromptOutcome::Retry(vec![retry_text(kind).to_owned()])
            } else {
                PromptOutcome::Valid(StepInput::Text(trimmed.to_owned()))
            }
        }
        PromptKind::DepartureDate | PromptKind::ReturnDate => match DateExpression::parse(utterance)
        {
            None => PromptOutcome::Retry(vec![
                retry_text(kind).to_owned(),
                FORMAT_HINT.to_owned(),
            ]),
            Some(expression) if !expression.is_definite() => PromptOutcome::Retry(vec![
                timex::imprecision_message(&expression.missing()),
                FORMAT_HINT.to_owned(),
            ]),
            Some(expression) => PromptOutcome::Valid(StepInput::Date(expression.timex())),
        },
        PromptKind::Confirm => match parse_yes_no(utterance) {
            Some(answer) => PromptOutcome::Valid(StepInput::Confirm(answer)),
            None => PromptOutcome::Retry(vec![retry_text(kind).to_owned()]),
        },
    }
}

pub fn parse_yes_no(text: &str) -> Option<bool> {
    match text.trim().to_lowercase().as_str() {
        "yes" | "y" | "yep" | "sure" | "ok" | "okay" | "confirm" => Some(true),
        "no" | "n" | "nope" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use wayfarer_core::PromptKind;

    use super::{validate, PromptOutcome, StepInput};

    #[test]
    fn text_prompt_rejects_blank_answers() {
        let outcome = validate(PromptKind::DestinationCity, "   ");
        assert_eq!(
            outcome,
            PromptOutcome::Retry(vec!["I do need to know where you want to go.".to_owned()])
        );
    }

    #[test]
    fn text_prompt_trims_valid_answers() {
        let outcome = validate(PromptKind::OriginCity, " London ");
        assert_eq!(outcome, PromptOutcome::Valid(StepInput::Text("London".to_owned())));
    }

    #[test]
    fn date_prompt_accepts_definite_dates() {
        let outcome = validate(PromptKind::DepartureDate, "2024-06-01");
        assert_eq!(outcome, PromptOutcome::Valid(StepInput::Date("2024-06-01".to_owned())));
    }

    #[test]
    fn date_prompt_explains_missing_components() {
        let outcome = validate(PromptKind::DepartureDate, "March 2024");
        assert_eq!(
            outcome,
            PromptOutcome::Retry(vec![
                "Please be more precise. I miss the day.".to_owned(),
                "You can use the format YYYY-MM-DD".to_owned(),
            ])
        );
    }

    #[test]
    fn unrecognizable_date_falls_back_to_retry_text() {
        let outcome = validate(PromptKind::ReturnDate, "whenever really");
        assert_eq!(
            outcome,
            PromptOutcome::Retry(vec![
                "I need you to be more precise.".to_owned(),
                "You can use the format YYYY-MM-DD".to_owned(),
            ])
        );
    }

    #[test]
    fn confirm_prompt_parses_yes_no_synonyms() {
        assert_eq!(
            validate(PromptKind::Confirm, "Yes"),
            PromptOutcome::Valid(StepInput::Confirm(true))
        );
        assert_eq!(
            validate(PromptKind::Confirm, "nope"),
            PromptOutcome::Valid(StepInput::Confirm(false))
        );
        assert!(matches!(validate(PromptKind::Confirm, "maybe"), PromptOutcome::Retry(_)));
    }
}
