//! Recognizer result model and the adapter seam to the NLU service.
//!
//! The service itself is an external collaborator: this module only fixes
//! the wire-level shape the dialog consumes (ranked intents plus entity
//! lists) and the async trait an implementation must provide. Entity
//! decoding rules live with the dialog, not here.

use std::collections::BTreeMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Below this confidence the top intent is discarded and the caller works
/// from raw entities only.
pub const INTENT_CONFIDENCE_THRESHOLD: f64 = 0.20;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    SpecifyJourney,
    Greetings,
    Help,
    None,
}

impl Intent {
    /// Intent name as the NLU service reports it.
    pub fn service_name(self) -> &'static str {
        match self {
            Intent::SpecifyJourney => "Specify_journey",
            Intent::Greetings => "Greetings",
            Intent::Help => "Help",
            Intent::None => "NoneIntent",
        }
    }

    pub fn from_service_name(raw: &str) -> Intent {
        match raw {
            "Specify_journey" => Intent::SpecifyJourney,
            "Greetings" => Intent::Greetings,
            "Help" => Intent::Help,
            _ => Intent::None,
        }
    }
}

/// A recognized date expression. `timex` carries one or more normalized
/// partial-date strings; `entity_type` is the service's type tag
/// (`date`, `daterange`, ...).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateTimeEntity {
    pub timex: Vec<String>,
    pub entity_type: String,
}

/// A recognized money amount with its raw unit text, when present.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoneyEntity {
    pub number: Decimal,
    pub units: Option<String>,
}

/// Entity lists the journey decode rules consume. City names come with
/// the composite from-place/to-place spans used to disambiguate origin
/// from destination.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RecognizedEntities {
    pub cities: Vec<String>,
    pub from_place: Vec<String>,
    pub to_place: Vec<String>,
    pub from_date: Vec<String>,
    pub to_date: Vec<String>,
    pub datetimes: Vec<DateTimeEntity>,
    pub money: Vec<MoneyEntity>,
}

/// Ranked intents plus entities for one utterance. `Default` doubles as
/// the degenerate "service unreachable" result.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RecognizerResult {
    pub intents: BTreeMap<String, f64>,
    pub entities: RecognizedEntities,
}

impl RecognizerResult {
    /// Highest-confidence intent with its score, before any threshold is
    /// applied. An empty intent map yields `(Intent::None, 0.0)`.
    pub fn top_intent(&self) -> (Intent, f64) {
        self.intents
            .iter()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(name, score)| (Intent::from_service_name(name), *score))
            .unwrap_or((Intent::None, 0.0))
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("nlu recognizer unavailable: {0}")]
pub struct NluError(pub String);

/// Adapter seam to the NLU service. An implementation reports transport
/// failures as `NluError`; the dialog treats any error as "intent unknown"
/// for that turn and never propagates it to the user.
#[async_trait]
pub trait NluRecognizer: Send + Sync {
    async fn recognize(&self, utterance: &str) -> Result<RecognizerResult, NluError>;

    /// Whether the adapter has enough configuration to reach a service.
    fn is_configured(&self) -> bool {
        true
    }
}

/// Stand-in recognizer for deployments without an NLU service. Every
/// query fails, which downstream degrades to "no intent".
#[derive(Clone, Copy, Debug, Default)]
pub struct UnconfiguredRecognizer;

#[async_trait]
impl NluRecognizer for UnconfiguredRecognizer {
    async fn recognize(&self, _utterance: &str) -> Result<RecognizerResult, NluError> {
        Err(NluError("recognizer is not configured".to_owned()))
    }

    fn is_configured(&self) -> bool {
        false
    }
}
