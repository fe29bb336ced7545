use crate::patch::PatchOperation;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One transcript entry
///
/// An assistant message carrying `patches` is a record that exactly those
/// patches were applied and committed as a version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: Role,
    pub content: String,

    /// Milliseconds since the Unix epoch
    pub timestamp: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patches: Option<Vec<PatchOperation>>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content.into(), None)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content.into(), None)
    }

    pub fn assistant_with_patches(content: impl Into<String>, patches: Vec<PatchOperation>) -> Self {
        Self::new(Role::Assistant, content.into(), Some(patches))
    }

    fn new(role: Role, content: String, patches: Option<Vec<PatchOperation>>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content,
            timestamp: crate::now_millis(),
            patches,
        }
    }
}
