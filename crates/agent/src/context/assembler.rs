//! Context assembly pipeline.
//!
//! Builds the ordered turn list sent to the gateway from two layers:
//!
//! 1. **System**: fixed preamble, personality, and every supplied memory
//!    as a bullet line, in the order given
//! 2. **Conversation history**: turns after the newest context reset,
//!    limited to the `context_length` newest, oldest first
//!
//! The user's newest message is expected to be the last history entry; it
//! is never appended separately.
//!
//! # Determinism
//!
//! Identical inputs always produce identical outputs. Memories are not
//! re-ranked and nothing time-dependent is consulted.

use serde::{Deserialize, Serialize};
use sydia_config::AppConfig;
use sydia_core::history::HistoryEntry;
use sydia_core::memory::Memory;
use sydia_core::message::ChatTurn;

pub const SYSTEM_PREAMBLE: &str = "You are Sydia, a digital assistant.";

/// Order in which a history source hands over its entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryOrder {
    /// Chronological. The assembler uses it as is.
    OldestFirst,
    /// What `HistoryStore::recent` returns. The assembler reverses it.
    NewestFirst,
}

/// All inputs required by the assembler for a single gateway call.
pub struct AssemblyInput<'a> {
    /// Maximum number of history turns sent.
    pub context_length: usize,
    /// Personality text appended to the preamble when non-blank.
    pub personality: &'a str,
    /// Memories, already ranked or filtered by the caller.
    pub memories: &'a [Memory],
    /// Recent history entries in `order`.
    pub history: &'a [HistoryEntry],
    pub order: HistoryOrder,
}

impl<'a> AssemblyInput<'a> {
    /// Take `context_length` and `personality` from the current settings.
    pub fn from_settings(
        settings: &'a AppConfig,
        memories: &'a [Memory],
        history: &'a [HistoryEntry],
        order: HistoryOrder,
    ) -> Self {
        Self {
            context_length: settings.context_length,
            personality: &settings.personality,
            memories,
            history,
            order,
        }
    }
}

/// The assembled context, ready for `Gateway::chat` or `chat_stream`.
#[derive(Debug, Clone)]
pub struct AssembledContext {
    /// `[system] + history`, oldest history turn first.
    pub turns: Vec<ChatTurn>,
    pub metadata: AssemblyMetadata,
}

impl AssembledContext {
    pub fn into_turns(self) -> Vec<ChatTurn> {
        self.turns
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyMetadata {
    pub memories_included: usize,
    /// History turns included after the window was applied.
    pub history_included: usize,
    /// History entries handed in.
    pub history_total: usize,
    /// Entries excluded because they precede (or are) the newest reset point.
    pub dropped_by_reset: usize,
    /// Entries excluded by the `context_length` window.
    pub dropped_by_window: usize,
}

/// The context assembler. Stateless.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextAssembler;

impl ContextAssembler {
    pub fn new() -> Self {
        Self
    }

    /// Build `[system turn] + history window`.
    pub fn assemble(&self, input: &AssemblyInput<'_>) -> AssembledContext {
        let system = ChatTurn::system(Self::system_prompt(input.personality, input.memories));

        let mut chronological: Vec<&HistoryEntry> = input.history.iter().collect();
        if input.order == HistoryOrder::NewestFirst {
            chronological.reverse();
        }

        let since_reset = match chronological.iter().rposition(|e| e.is_reset_point) {
            Some(pos) => &chronological[pos + 1..],
            None => &chronological[..],
        };
        let dropped_by_reset = chronological.len() - since_reset.len();

        let start = since_reset.len().saturating_sub(input.context_length);
        let window = &since_reset[start..];

        let mut turns = Vec::with_capacity(window.len() + 1);
        turns.push(system);
        turns.extend(window.iter().map(|e| e.to_turn()));

        AssembledContext {
            turns,
            metadata: AssemblyMetadata {
                memories_included: input.memories.len(),
                history_included: window.len(),
                history_total: input.history.len(),
                dropped_by_reset,
                dropped_by_window: start,
            },
        }
    }

    /// The synthesized system prompt text.
    pub fn system_prompt(personality: &str, memories: &[Memory]) -> String {
        let mut prompt = String::from(SYSTEM_PREAMBLE);

        let personality = personality.trim();
        if !personality.is_empty() {
            prompt.push_str(&format!(" Your personality: {personality}."));
        }

        if !memories.is_empty() {
            prompt.push_str("\nRelevant memories:");
            for memory in memories {
                prompt.push_str("\n- ");
                prompt.push_str(&memory.body);
            }
        }

        prompt
    }
}
