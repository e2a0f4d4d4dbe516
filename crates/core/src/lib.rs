pub mod channel;
pub mod config;
pub mod domain;
pub mod nlu;
pub mod store;
pub mod telemetry;
pub mod timex;

pub use channel::{BufferedChannel, ChannelError, MessageChannel};
pub use config::{AppConfig, ConfigError, LoadOptions, LogFormat, LoggingConfig, NluConfig};
pub use domain::conversation::ConversationKey;
pub use domain::journey::{Budget, JourneySpec, Slot};
pub use domain::state::{PromptKind, SessionState, SpecStep, SpecifyingState};
pub use nlu::{
    DateTimeEntity, Intent, MoneyEntity, NluError, NluRecognizer, RecognizedEntities,
    RecognizerResult, UnconfiguredRecognizer, INTENT_CONFIDENCE_THRESHOLD,
};
pub use store::{ConversationStore, StoreError};
pub use telemetry::{
    dialog_record, AtomicSpecificationCounters, InMemoryTelemetrySink, NoopSpecificationCounters,
    NoopTelemetrySink, SpecificationCounters, TelemetryLevel, TelemetryRecord, TelemetrySink,
};
pub use timex::{imprecision_message, is_ambiguous, DateComponent, DateExpression, FORMAT_HINT};
