//! Outbound message channel seam.
//!
//! The dialog only ever sends plain text keyed by conversation; the real
//! transport lives outside the core. `BufferedChannel` is the in-process
//! implementation used by tests and the CLI.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::conversation::ConversationKey;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ChannelError {
    #[error("message delivery failed: {0}")]
    Delivery(String),
}

#[async_trait]
pub trait MessageChannel: Send + Sync {
    async fn send(&self, key: &ConversationKey, text: &str) -> Result<(), ChannelError>;
}

#[derive(Clone, Default)]
pub struct BufferedChannel {
    sent: Arc<Mutex<Vec<(ConversationKey, String)>>>,
}

impl BufferedChannel {
    pub fn sent(&self) -> Vec<(ConversationKey, String)> {
        match self.sent.lock() {
            Ok(sent) => sent.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Texts sent to one conversation, in order.
    pub fn texts_for(&self, key: &ConversationKey) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter(|(sent_key, _)| sent_key == key)
            .map(|(_, text)| text)
            .collect()
    }
}

#[async_trait]
impl MessageChannel for BufferedChannel {
    async fn send(&self, key: &ConversationKey, text: &str) -> Result<(), ChannelError> {
        match self.sent.lock() {
            Ok(mut sent) => sent.push((key.clone(), text.to_owned())),
            Err(poisoned) => poisoned.into_inner().push((key.clone(), text.to_owned())),
        }
        Ok(())
    }
}
