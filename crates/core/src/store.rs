//! Conversation store seam.
//!
//! The dialog loads session state at turn start and saves it at turn end;
//! concurrency control (last-writer-wins or better) is the store's
//! responsibility. The core only requires that one `SessionState` instance
//! is visible per conversation per turn.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::conversation::ConversationKey;
use crate::domain::state::SessionState;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("conversation state could not be loaded: {0}")]
    Load(String),
    #[error("conversation state could not be saved: {0}")]
    Save(String),
}

#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn load(&self, key: &ConversationKey) -> Result<Option<SessionState>, StoreError>;
    async fn save(&self, key: &ConversationKey, state: SessionState) -> Result<(), StoreError>;
    async fn clear(&self, key: &ConversationKey) -> Result<(), StoreError>;
}
