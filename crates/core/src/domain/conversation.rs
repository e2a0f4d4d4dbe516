use serde::{Deserialize, Serialize};

/// Opaque conversation/session identifier, minted by the transport. The
/// dialog core never invents one; it only keys loads, saves and sends by it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationKey(pub String);

impl ConversationKey {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }
}

impl std::fmt::Display for ConversationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
