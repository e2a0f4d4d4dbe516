pub mod conversation;
pub mod journey;
pub mod state;

pub use conversation::ConversationKey;
pub use journey::{Budget, JourneySpec, Slot};
pub use state::{PromptKind, SessionState, SpecStep, SpecifyingState};
