//! # Sydia Core
//!
//! Domain types, traits, and error definitions for the Sydia assistant
//! gateway. This crate performs no I/O; it defines the vocabulary that
//! the provider gateway, the stores, and the chat orchestration share.
//!
//! ## Layout
//!
//! - [`message`] — role-tagged conversation turns
//! - [`provider`] — provider selection, per-call configuration, deltas
//! - [`history`] / [`memory`] — the store traits the gateway reads from
//! - [`error`] — the typed failure taxonomy

pub mod error;
pub mod history;
pub mod memory;
pub mod message;
pub mod provider;

// Re-export key types at crate root for ergonomics
pub use error::{Error, GatewayError, Result, StoreError};
pub use history::{HistoryEntry, HistoryStore};
pub use memory::{Memory, MemoryStore};
pub use message::{ChatTurn, Role};
pub use provider::{EmbeddingVector, ProviderConfig, ProviderKind, TextDelta};
