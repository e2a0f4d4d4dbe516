//! Entity decoding rules for recognizer output.
//!
//! These rules belong to the dialog, not the adapter: the adapter only
//! transports ranked intents and raw entity lists, and this module turns
//! them into a partial `JourneySpec`.

use tracing::warn;

use wayfarer_core::nlu::{NluRecognizer, RecognizedEntities, RecognizerResult};
use wayfarer_core::timex::DateExpression;
use wayfarer_core::{Budget, Intent, JourneySpec, INTENT_CONFIDENCE_THRESHOLD};

/// Run the recognizer, degrading any failure to the empty result so the
/// turn continues as "intent unknown".
pub async fn recognize_or_default(
    recognizer: &dyn NluRecognizer,
    utterance: &str,
) -> RecognizerResult {
    match recognizer.recognize(utterance).await {
        Ok(result) => result,
        Err(error) => {
            warn!(%error, "nlu recognizer failed; treating intent as unknown");
            RecognizerResult::default()
        }
    }
}

/// Top intent after the confidence threshold: low-confidence results are
/// demoted to `Intent::None`, leaving raw entities only.
pub fn effective_intent(result: &RecognizerResult) -> Intent {
    let (intent, score) = result.top_intent();
    if score < INTENT_CONFIDENCE_THRESHOLD {
        Intent::None
    } else {
        intent
    }
}

/// Decode a best-effort partial journey from recognized entities.
///
/// City names are cross-referenced against the from-place/to-place
/// composite spans to split origin from destination; a decode that lands
/// the same city on both sides keeps the destination and drops the origin.
pub fn decode_journey(result: &RecognizerResult) -> JourneySpec {
    let entities = &result.entities;
    let mut decoded = JourneySpec::default();

    for city in &entities.cities {
        if decoded.destination.is_none()
            && entities.to_place.iter().any(|span| span.contains(city.as_str()))
        {
            decoded.destination = Some(city.clone());
            continue;
        }
        if decoded.origin.is_none()
            && entities.from_place.iter().any(|span| span.contains(city.as_str()))
        {
            decoded.origin = Some(city.clone());
        }
    }
    decoded.drop_origin_if_matches_destination();

    decode_dates(entities, &mut decoded);

    if let Some(money) = entities.money.first() {
        decoded.max_budget = Some(Budget { amount: money.number, unit: money.units.clone() });
    }

    decoded
}

/// Assign date entities to the departure/return slots. Only one or two
/// date entities are decodable; more than two is too ambiguous to guess.
/// A single date defaults to the departure unless only a to-date role was
/// recognized. Two definite dates in the wrong order are swapped.
fn decode_dates(entities: &RecognizedEntities, decoded: &mut JourneySpec) {
    let timexes: Vec<String> = entities
        .datetimes
        .iter()
        .filter_map(|entity| entity.timex.first())
        .map(|timex| date_part(timex))
        .collect();

    match timexes.as_slice() {
        [single] => {
            if entities.to_date.is_empty() || !entities.from_date.is_empty() {
                decoded.departure_date = Some(single.clone());
            } else {
                decoded.return_date = Some(single.clone());
            }
        }
        [first, second] => {
            let mut departure = first.clone();
            let mut return_date = second.clone();
            if both_definite(&departure, &return_date) && return_date < departure {
                std::mem::swap(&mut departure, &mut return_date);
            }
            decoded.departure_date = Some(departure);
            decoded.return_date = Some(return_date);
        }
        _ => {}
    }
}

fn both_definite(first: &str, second: &str) -> bool {
    DateExpression::parse(first).is_some_and(|e| e.is_definite())
        && DateExpression::parse(second).is_some_and(|e| e.is_definite())
}

fn date_part(timex: &str) -> String {
    timex.split('T').next().unwrap_or(timex).to_owned()
}
