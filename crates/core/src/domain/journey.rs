use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::timex;

/// Maximum spend the traveller volunteered, with the raw currency unit text
/// when one was recognized.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    pub amount: Decimal,
    pub unit: Option<String>,
}

/// The five journey slots, in prompting order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Slot {
    Destination,
    Origin,
    DepartureDate,
    ReturnDate,
    MaxBudget,
}

/// Accumulator for one in-progress journey specification conversation.
///
/// Slot values are only ever written by the slot-filling steps and by
/// merges of recognizer output; the utterance log and turn counter are
/// bookkeeping owned by the turn loop and are never touched by `merge`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct JourneySpec {
    pub destination: Option<String>,
    pub origin: Option<String>,
    pub departure_date: Option<String>,
    pub return_date: Option<String>,
    pub max_budget: Option<Budget>,
    pub utterance_log: Vec<String>,
    pub turn_number: u32,
    pub awaiting_log: bool,
}

impl JourneySpec {
    /// Adopt `other`'s slot values: a local slot is overwritten when it is
    /// unset, or when `replace_when_exist` is true and `other` has a value.
    /// The utterance log and turn counter are never affected.
    pub fn merge(&mut self, other: &JourneySpec, replace_when_exist: bool) {
        if self.destination.is_none() || (replace_when_exist && other.destination.is_some()) {
            self.destination = other.destination.clone();
        }
        if self.origin.is_none() || (replace_when_exist && other.origin.is_some()) {
            self.origin = other.origin.clone();
        }
        if self.departure_date.is_none() || (replace_when_exist && other.departure_date.is_some()) {
            self.departure_date = other.departure_date.clone();
        }
        if self.return_date.is_none() || (replace_when_exist && other.return_date.is_some()) {
            self.return_date = other.return_date.clone();
        }
        if self.max_budget.is_none() || (replace_when_exist && other.max_budget.is_some()) {
            self.max_budget = other.max_budget.clone();
        }
    }

    /// Origin and destination must never hold the same city. Equality
    /// forces `origin` back to unset, never `destination`.
    pub fn drop_origin_if_matches_destination(&mut self) -> bool {
        match (&self.origin, &self.destination) {
            (Some(origin), Some(destination)) if origin == destination => {
                self.origin = None;
                true
            }
            _ => false,
        }
    }

    /// First unresolved slot in the fixed prompting order. A date slot
    /// holding a partially specified expression still counts as missing.
    pub fn next_slot(&self) -> Option<Slot> {
        if self.destination.is_none() {
            return Some(Slot::Destination);
        }
        if self.origin.is_none() {
            return Some(Slot::Origin);
        }
        if self.departure_date.as_deref().map_or(true, timex::is_ambiguous) {
            return Some(Slot::DepartureDate);
        }
        if self.return_date.as_deref().map_or(true, timex::is_ambiguous) {
            return Some(Slot::ReturnDate);
        }
        if self.max_budget.is_none() {
            return Some(Slot::MaxBudget);
        }
        None
    }

    /// Advance the turn counter and, when the previous prompt armed
    /// `awaiting_log`, append the raw utterance to the log exactly once.
    pub fn begin_turn(&mut self, utterance: &str) {
        self.turn_number += 1;
        if self.awaiting_log {
            self.utterance_log.push(utterance.to_owned());
            self.awaiting_log = false;
        }
    }

    /// Tab-joined utterance log, the shape the telemetry sink expects.
    pub fn joined_log(&self) -> String {
        self.utterance_log.join("\t")
    }
}
