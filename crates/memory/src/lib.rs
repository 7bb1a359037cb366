//! Store implementations for Sydia.
//!
//! Only the in-process stores live here. The host platform supplies its
//! own persistent [`HistoryStore`](sydia_core::HistoryStore) and
//! [`MemoryStore`](sydia_core::MemoryStore) implementations.

pub mod in_memory;

pub use in_memory::{InMemoryHistory, InMemoryMemories};
