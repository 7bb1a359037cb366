//! Chat orchestration for Sydia.
//!
//! One conversation turn runs as:
//!
//! 1. **Persist** the user message to the history store
//! 2. **Assemble context** (system prompt + memories + history window)
//! 3. **Call the gateway**, blocking or streamed, per the current settings
//! 4. **Persist** the reply, or the error text as a system turn
//! 5. **Form memories** from qualifying user turns in the background path
//!
//! Stores and settings are injected, so the same session runs against the
//! in-memory stores or a platform database.

pub mod context;
pub mod formation;
pub mod session;

pub use context::{
    AssembledContext, AssemblyInput, AssemblyMetadata, ContextAssembler, HistoryOrder, SYSTEM_PREAMBLE,
};
pub use formation::{FormationPolicy, form_memory};
pub use session::{ChatSession, PreparedTurn};
