//! Chat history: the persisted turns of the single conversation.
//!
//! The gateway never writes history itself; the orchestration layer
//! appends user turns before assembly and assistant/system turns after.

use crate::error::StoreError;
use crate::message::{ChatTurn, Role};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Content of the marker turn written by a context reset.
pub const RESET_MARKER: &str = "--- Context Reset ---";

/// A persisted chat turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// Set on context-reset markers; nothing at or before it is sent upstream.
    #[serde(default)]
    pub is_reset_point: bool,
}

impl HistoryEntry {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
            is_reset_point: false,
        }
    }

    pub fn reset_point() -> Self {
        Self {
            is_reset_point: true,
            ..Self::new(Role::System, RESET_MARKER)
        }
    }

    pub fn to_turn(&self) -> ChatTurn {
        ChatTurn::new(self.role, self.content.clone())
    }
}

/// Storage for the conversation history.
///
/// Implementations: in-memory (see `sydia-memory`). Platform databases
/// implement the same trait outside this workspace.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Append a turn and return its id.
    async fn append(&self, role: Role, content: &str) -> Result<String, StoreError>;

    /// Append a context-reset marker.
    async fn append_reset_point(&self) -> Result<String, StoreError>;

    /// The most recent `limit` entries, newest first.
    async fn recent(&self, limit: usize) -> Result<Vec<HistoryEntry>, StoreError>;

    async fn clear(&self) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_point_is_system_marker() {
        let entry = HistoryEntry::reset_point();
        assert!(entry.is_reset_point);
        assert_eq!(entry.role, Role::System);
        assert_eq!(entry.content, RESET_MARKER);
    }

    #[test]
    fn entry_converts_to_turn() {
        let entry = HistoryEntry::new(Role::User, "hello");
        assert!(!entry.is_reset_point);
        assert_eq!(entry.to_turn(), ChatTurn::user("hello"));
    }
}
