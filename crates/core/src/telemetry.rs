//! Structured telemetry records and outcome counters.
//!
//! Sinks are fire-and-forget: emission must never make a dialog turn fail,
//! so the trait is infallible and implementations swallow their own
//! errors. Every engine receives an explicit sink reference; the default
//! is the no-op sink, never a shared mutable client.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TelemetryLevel {
    Info,
    Warning,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    pub record_id: String,
    pub level: TelemetryLevel,
    pub message: String,
    pub tags: BTreeMap<String, String>,
    pub occurred_at: DateTime<Utc>,
}

impl TelemetryRecord {
    pub fn new(level: TelemetryLevel, message: impl Into<String>) -> Self {
        Self {
            record_id: Uuid::new_v4().to_string(),
            level,
            message: message.into(),
            tags: BTreeMap::new(),
            occurred_at: Utc::now(),
        }
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }
}

/// Build the record shape the dialog emits: `module`, optional `prompt`,
/// `messages` (tab-joined utterance log) and `success` tags.
pub fn dialog_record(
    level: TelemetryLevel,
    message: impl Into<String>,
    module: &str,
    prompt: Option<&str>,
    utterances: &[String],
    success: bool,
) -> TelemetryRecord {
    let mut record = TelemetryRecord::new(level, message)
        .with_tag("module", module)
        .with_tag("messages", utterances.join("\t"))
        .with_tag("success", success.to_string());
    if let Some(prompt) = prompt {
        record = record.with_tag("prompt", prompt);
    }
    record
}

pub trait TelemetrySink: Send + Sync {
    fn emit(&self, record: TelemetryRecord);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopTelemetrySink;

impl TelemetrySink for NoopTelemetrySink {
    fn emit(&self, _record: TelemetryRecord) {}
}

#[derive(Clone, Default)]
pub struct InMemoryTelemetrySink {
    records: Arc<Mutex<Vec<TelemetryRecord>>>,
}

impl InMemoryTelemetrySink {
    pub fn records(&self) -> Vec<TelemetryRecord> {
        match self.records.lock() {
            Ok(records) => records.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl TelemetrySink for InMemoryTelemetrySink {
    fn emit(&self, record: TelemetryRecord) {
        match self.records.lock() {
            Ok(mut records) => records.push(record),
            Err(poisoned) => poisoned.into_inner().push(record),
        }
    }
}

/// Monotone outcome counters, incremented once per terminal outcome. The
/// dialog never reads them back.
pub trait SpecificationCounters: Send + Sync {
    fn specification_validated(&self);
    fn specification_not_validated(&self);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSpecificationCounters;

impl SpecificationCounters for NoopSpecificationCounters {
    fn specification_validated(&self) {}
    fn specification_not_validated(&self) {}
}

#[derive(Clone, Default)]
pub struct AtomicSpecificationCounters {
    validated: Arc<AtomicU64>,
    not_validated: Arc<AtomicU64>,
}

impl AtomicSpecificationCounters {
    pub fn validated(&self) -> u64 {
        self.validated.load(Ordering::Relaxed)
    }

    pub fn not_validated(&self) -> u64 {
        self.not_validated.load(Ordering::Relaxed)
    }
}

impl SpecificationCounters for AtomicSpecificationCounters {
    fn specification_validated(&self) {
        self.validated.fetch_add(1, Ordering::Relaxed);
    }

    fn specification_not_validated(&self) {
        self.not_validated.fetch_add(1, Ordering::Relaxed);
    }
}
