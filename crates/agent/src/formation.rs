//! Automatic memory formation from user turns.

use sydia_config::AppConfig;
use sydia_core::memory::{Memory, MemoryStore};
use sydia_core::provider::ProviderConfig;
use sydia_providers::Gateway;
use tracing::{debug, warn};

/// Category attached to automatically formed memories.
pub const AUTO_CATEGORY: &str = "Auto";

/// Decides which user turns become memories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormationPolicy {
    frequency: u32,
}

impl FormationPolicy {
    /// User turns with this many characters or fewer are never kept.
    pub const MIN_CHARS: usize = 20;

    pub fn new(frequency: u32) -> Self {
        Self { frequency }
    }

    pub fn from_settings(settings: &AppConfig) -> Self {
        Self::new(settings.extraction_frequency)
    }

    pub fn frequency(&self) -> u32 {
        self.frequency
    }

    /// `turn_number` counts user turns from 1.
    pub fn is_candidate(&self, turn_number: u64, text: &str) -> bool {
        if self.frequency == 0 || turn_number == 0 {
            return false;
        }
        turn_number % u64::from(self.frequency) == 0 && text.chars().count() > Self::MIN_CHARS
    }
}

/// Embed `text` and store it as an automatic memory.
///
/// Failures are logged and swallowed: memory formation never fails the
/// chat turn that triggered it.
pub async fn form_memory(
    gateway: &Gateway,
    store: &dyn MemoryStore,
    embedding: &ProviderConfig,
    text: &str,
) -> Option<String> {
    let vector = match gateway.embed(embedding, text).await {
        Ok(v) => v,
        Err(e) => {
            warn!(provider = %embedding.provider, error = %e, "Memory formation skipped: embedding failed");
            return None;
        }
    };

    let memory = Memory::new(text, 1.0, Some(AUTO_CATEGORY.into())).with_embedding(vector);
    match store.add(memory).await {
        Ok(id) => {
            debug!(id = %id, "Formed memory from user turn");
            Some(id)
        }
        Err(e) => {
            warn!(error = %e, "Memory formation skipped: store failed");
            None
        }
    }
}
