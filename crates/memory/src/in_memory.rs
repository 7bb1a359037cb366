//! In-memory stores, used by the CLI and by tests.

use async_trait::async_trait;
use std::sync::Arc;
use sydia_core::error::StoreError;
use sydia_core::history::{HistoryEntry, HistoryStore};
use sydia_core::memory::{Memory, MemoryStore};
use sydia_core::message::Role;
use tokio::sync::RwLock;
use tracing::debug;

/// Conversation history kept in a Vec, oldest first.
#[derive(Clone, Default)]
pub struct InMemoryHistory {
    entries: Arc<RwLock<Vec<HistoryEntry>>>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    async fn push(&self, entry: HistoryEntry) -> String {
        let id = entry.id.clone();
        self.entries.write().await.push(entry);
        id
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistory {
    async fn append(&self, role: Role, content: &str) -> Result<String, StoreError> {
        Ok(self.push(HistoryEntry::new(role, content)).await)
    }

    async fn append_reset_point(&self) -> Result<String, StoreError> {
        debug!("Context reset point recorded");
        Ok(self.push(HistoryEntry::reset_point()).await)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<HistoryEntry>, StoreError> {
        let entries = self.entries.read().await;
        Ok(entries.iter().rev().take(limit).cloned().collect())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.entries.write().await.clear();
        Ok(())
    }
}

/// Long-term memories kept in a Vec, oldest first.
#[derive(Clone, Default)]
pub struct InMemoryMemories {
    memories: Arc<RwLock<Vec<Memory>>>,
}

impl InMemoryMemories {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.memories.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.memories.read().await.is_empty()
    }
}

#[async_trait]
impl MemoryStore for InMemoryMemories {
    async fn add(&self, memory: Memory) -> Result<String, StoreError> {
        let id = memory.id.clone();
        debug!(id = %id, category = ?memory.category, "Memory stored");
        self.memories.write().await.push(memory);
        Ok(id)
    }

    async fn all(&self) -> Result<Vec<Memory>, StoreError> {
        Ok(self.memories.read().await.iter().rev().cloned().collect())
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let mut memories = self.memories.write().await;
        let len_before = memories.len();
        memories.retain(|m| m.id != id);
        Ok(memories.len() < len_before)
    }

    /// Case-insensitive substring match on the body, newest first.
    async fn search(&self, query: &str) -> Result<Vec<Memory>, StoreError> {
        let needle = query.to_lowercase();
        let memories = self.memories.read().await;
        Ok(memories
            .iter()
            .rev()
            .filter(|m| m.body.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }
}
