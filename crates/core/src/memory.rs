//! Long-term memories injected into the system prompt.

use crate::error::StoreError;
use crate::provider::EmbeddingVector;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted fact about the user or the conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Memory {
    pub id: String,

    /// The text injected into the system prompt
    pub body: String,

    /// Importance weight (manual memories use 1.0)
    pub weight: f32,

    /// When the memory was formed
    pub date: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Embedding of `body`, when one was computed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<EmbeddingVector>,

    #[serde(default)]
    pub is_pinned: bool,
}

impl Memory {
    pub fn new(body: impl Into<String>, weight: f32, category: Option<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            body: body.into(),
            weight,
            date: Utc::now(),
            category,
            embedding: None,
            is_pinned: false,
        }
    }

    pub fn with_embedding(mut self, embedding: EmbeddingVector) -> Self {
        self.embedding = Some(embedding);
        self
    }
}

/// Storage for memories.
///
/// Ranking is not part of this contract: `all()` returns memories newest
/// first and the context assembler includes them verbatim.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// Store a memory and return its id.
    async fn add(&self, memory: Memory) -> Result<String, StoreError>;

    /// Every memory, newest first.
    async fn all(&self) -> Result<Vec<Memory>, StoreError>;

    /// Returns `true` if a memory was removed.
    async fn delete(&self, id: &str) -> Result<bool, StoreError>;

    /// Memories whose body contains `query` (case-insensitive).
    async fn search(&self, query: &str) -> Result<Vec<Memory>, StoreError>;
}
