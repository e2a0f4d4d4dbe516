//! HTTP implementation of the `NluRecognizer` seam.
//!
//! Sends `{"query": …}` to `{endpoint}/apps/{app_id}/predict` with a
//! subscription-key header and maps the ranked-intent/entity response onto
//! `wayfarer_core::nlu::RecognizerResult`. Any transport or decode failure
//! is reported as `NluError`, which the dialog treats as "intent unknown"
//! for that turn.

pub mod client;
pub mod wire;

pub use client::{HttpNluClient, NluClientError};
