//! Wire-level request/response shapes for the NLU prediction endpoint.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use wayfarer_core::nlu::{DateTimeEntity, MoneyEntity, RecognizedEntities, RecognizerResult};

#[derive(Debug, Serialize)]
pub struct PredictionRequest<'a> {
    pub query: &'a str,
}

#[derive(Debug, Default, Deserialize)]
pub struct PredictionResponse {
    #[serde(default)]
    pub intents: BTreeMap<String, IntentScore>,
    #[serde(default)]
    pub entities: WireEntities,
}

#[derive(Debug, Deserialize)]
pub struct IntentScore {
    pub score: f64,
}

#[derive(Debug, Default, Deserialize)]
pub struct WireEntities {
    #[serde(default, rename = "geographyV2_city")]
    pub cities: Vec<String>,
    #[serde(default, rename = "From_place")]
    pub from_place: Vec<String>,
    #[serde(default, rename = "To_place")]
    pub to_place: Vec<String>,
    #[serde(default, rename = "From_date")]
    pub from_date: Vec<String>,
    #[serde(default, rename = "To_date")]
    pub to_date: Vec<String>,
    #[serde(default, rename = "datetime")]
    pub datetimes: Vec<WireDateTime>,
    #[serde(default)]
    pub money: Vec<WireMoney>,
}

#[derive(Debug, Deserialize)]
pub struct WireDateTime {
    #[serde(default)]
    pub timex: Vec<String>,
    #[serde(default, rename = "type")]
    pub entity_type: String,
}

#[derive(Debug, Deserialize)]
pub struct WireMoney {
    pub number: f64,
    #[serde(default)]
    pub units: Option<String>,
}

impl From<PredictionResponse> for RecognizerResult {
    fn from(response: PredictionResponse) -> Self {
        let intents = response
            .intents
            .into_iter()
            .map(|(name, intent)| (name, intent.score))
            .collect();

        let entities = RecognizedEntities {
            cities: response.entities.cities,
            from_place: response.entities.from_place,
            to_place: response.entities.to_place,
            from_date: response.entities.from_date,
            to_date: response.entities.to_date,
            datetimes: response
                .entities
                .datetimes
                .into_iter()
                .map(|entity| DateTimeEntity {
                    timex: entity.timex,
                    entity_type: entity.entity_type,
                })
                .collect(),
            money: response
                .entities
                .money
                .into_iter()
                .filter_map(|entity| {
                    // Amounts a Decimal cannot represent are dropped rather
                    // than surfaced as garbage values.
                    Decimal::try_from(entity.number)
                        .ok()
                        .map(|number| MoneyEntity { number, units: entity.units })
                })
                .collect(),
        };

        RecognizerResult { intents, entities }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use wayfarer_core::nlu::RecognizerResult;
    use wayfarer_core::Intent;

    use super::PredictionResponse;

    const SAMPLE: &str = r#"{
        "intents": {
            "Specify_journey": {"score": 0.92},
            "Greetings": {"score": 0.03}
        },
        "entities": {
            "geographyV2_city": ["Paris", "London"],
            "From_place": ["from London"],
            "To_place": ["to Paris"],
            "datetime": [{"timex": ["2024-06-01"], "type": "date"}],
            "money": [{"number": 1000, "units": "EUR"}]
        }
    }"#;

    #[test]
    fn full_prediction_parses_into_a_recognizer_result() {
        let response: PredictionResponse = serde_json::from_str(SAMPLE).expect("valid json");
        let result = RecognizerResult::from(response);

        assert_eq!(result.top_intent(), (Intent::SpecifyJourney, 0.92));
        assert_eq!(result.entities.cities, vec!["Paris".to_owned(), "London".to_owned()]);
        assert_eq!(result.entities.to_place, vec!["to Paris".to_owned()]);
        assert_eq!(result.entities.datetimes[0].timex, vec!["2024-06-01".to_owned()]);
        assert_eq!(result.entities.money[0].number, Decimal::new(1000, 0));
        assert_eq!(result.entities.money[0].units.as_deref(), Some("EUR"));
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let response: PredictionResponse = serde_json::from_str("{}").expect("valid json");
        let result = RecognizerResult::from(response);

        assert!(result.intents.is_empty());
        assert!(result.entities.cities.is_empty());
        assert!(result.entities.money.is_empty());
    }
}
