//! In-memory conversation store.
//!
//! Backs the `ConversationStore` seam with a `tokio::sync::RwLock` map.
//! Writes are last-writer-wins, which satisfies the core's requirement
//! that one `SessionState` instance is visible per conversation per turn.

use std::collections::HashMap;

use tokio::sync::RwLock;

use wayfarer_core::store::{ConversationStore, StoreError};
use wayfarer_core::{ConversationKey, SessionState};

#[derive(Default)]
pub struct InMemoryConversationStore {
    sessions: RwLock<HashMap<String, SessionState>>,
}

#[async_trait::async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn load(&self, key: &ConversationKey) -> Result<Option<SessionState>, StoreError> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(&key.0).cloned())
    }

    async fn save(&self, key: &ConversationKey, state: SessionState) -> Result<(), StoreError> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(key.0.clone(), state);
        Ok(())
    }

    async fn clear(&self, key: &ConversationKey) -> Result<(), StoreError> {
        let mut sessions = self.sessions.write().await;
        sessions.remove(&key.0);
        Ok(())
    }
}
