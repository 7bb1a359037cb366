//! Context assembly: system prompt with memories, followed by the recent
//! conversation window.

pub mod assembler;

pub use assembler::{
    AssembledContext, AssemblyInput, AssemblyMetadata, ContextAssembler, HistoryOrder, SYSTEM_PREAMBLE,
};
