//! Shared scripted fakes for the dialog tests.

use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;

use wayfarer_core::nlu::{MoneyEntity, NluError, NluRecognizer, RecognizerResult};

/// Recognizer fake keyed by exact utterance. Unknown utterances return the
/// empty result, mirroring a service that found nothing.
#[derive(Default)]
pub struct ScriptedRecognizer {
    responses: HashMap<String, RecognizerResult>,
    fail_unknown: bool,
}

impl ScriptedRecognizer {
    pub fn with(mut self, utterance: &str, result: RecognizerResult) -> Self {
        self.responses.insert(utterance.to_owned(), result);
        self
    }

    /// Make every unscripted utterance fail, as an unreachable service would.
    pub fn failing_unknown(mut self) -> Self {
        self.fail_unknown = true;
        self
    }
}

#[async_trait]
impl NluRecognizer for ScriptedRecognizer {
    async fn recognize(&self, utterance: &str) -> Result<RecognizerResult, NluError> {
        match self.responses.get(utterance) {
            Some(result) => Ok(result.clone()),
            None if self.fail_unknown => Err(NluError("scripted outage".to_owned())),
            None => Ok(RecognizerResult::default()),
        }
    }
}

/// A `Specify_journey` result carrying the given cities, with the
/// composite spans the decode rules cross-reference.
pub fn journey_result(destination: Option<&str>, origin: Option<&str>) -> RecognizerResult {
    let mut result = RecognizerResult::default();
    result.intents.insert("Specify_journey".to_owned(), 0.9);
    if let Some(city) = destination {
        result.entities.cities.push(city.to_owned());
        result.entities.to_place.push(format!("to {city}"));
    }
    if let Some(city) = origin {
        result.entities.cities.push(city.to_owned());
        result.entities.from_place.push(format!("from {city}"));
    }
    result
}

/// A `Specify_journey` result carrying only a money entity.
pub fn money_result(amount: i64, unit: Option<&str>) -> RecognizerResult {
    let mut result = RecognizerResult::default();
    result.intents.insert("Specify_journey".to_owned(), 0.9);
    result.entities.money.push(MoneyEntity {
        number: Decimal::new(amount, 0),
        units: unit.map(str::to_owned),
    });
    result
}
