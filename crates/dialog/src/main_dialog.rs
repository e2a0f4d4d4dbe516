//! Intent routing for turns arriving outside a specification dialog.

use wayfarer_core::nlu::NluRecognizer;
use wayfarer_core::{Intent, JourneySpec};

use crate::decode;

pub const UNCONFIGURED_NOTE: &str =
    "NOTE: the language understanding service is not configured. Set the nlu endpoint, app id \
     and api key to enable full understanding.";
pub const GREETING_REPLY: &str = "Hello to you too. Can I know where you want to go?";
pub const HELP_REPLY: &str = "I am expecting you to disclose your journey.";
pub const FALLBACK_REPLY: &str = "Sorry, I didn't get that. I wish to know where you want to go?";
pub const GOODBYE: &str = "Thank you. Have a good day.";

/// What the router decided to do with an idle turn.
#[derive(Clone, Debug, PartialEq)]
pub enum RouteAction {
    Reply(&'static str),
    /// Enter the specification dialog, pre-seeded with whatever the
    /// recognizer already extracted from this turn.
    BeginSpecifying(JourneySpec),
}

pub async fn route_idle_turn(recognizer: &dyn NluRecognizer, utterance: &str) -> RouteAction {
    let result = decode::recognize_or_default(recognizer, utterance).await;
    match decode::effective_intent(&result) {
        Intent::SpecifyJourney => RouteAction::BeginSpecifying(decode::decode_journey(&result)),
        Intent::Greetings => RouteAction::Reply(GREETING_REPLY),
        Intent::Help => RouteAction::Reply(HELP_REPLY),
        Intent::None => RouteAction::Reply(FALLBACK_REPLY),
    }
}

#[cfg(test)]
mod tests {
    use wayfarer_core::nlu::RecognizerResult;
    use wayfarer_core::UnconfiguredRecognizer;

    use crate::testing::{journey_result, ScriptedRecognizer};

    use super::{route_idle_turn, RouteAction, FALLBACK_REPLY, GREETING_REPLY};

    #[tokio::test]
    async fn journey_intent_seeds_the_dialog() {
        let recognizer = ScriptedRecognizer::default()
            .with("I want to go to Paris", journey_result(Some("Paris"), Some("London")));

        let action = route_idle_turn(&recognizer, "I want to go to Paris").await;
        let RouteAction::BeginSpecifying(seed) = action else { panic!("expected dialog entry") };
        assert_eq!(seed.destination.as_deref(), Some("Paris"));
        assert_eq!(seed.origin.as_deref(), Some("London"));
    }

    #[tokio::test]
    async fn greeting_intent_gets_the_greeting_reply() {
        let mut result = RecognizerResult::default();
        result.intents.insert("Greetings".to_owned(), 0.8);
        let recognizer = ScriptedRecognizer::default().with("hello there", result);

        let action = route_idle_turn(&recognizer, "hello there").await;
        assert_eq!(action, RouteAction::Reply(GREETING_REPLY));
    }

    #[tokio::test]
    async fn recognizer_failure_falls_back_to_the_default_reply() {
        let action = route_idle_turn(&UnconfiguredRecognizer, "mumble").await;
        assert_eq!(action, RouteAction::Reply(FALLBACK_REPLY));
    }
}
