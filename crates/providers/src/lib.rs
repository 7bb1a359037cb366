//! Multi-provider LLM gateway for Sydia.
//!
//! Three vendor formats (OpenAI, Gemini, Claude) sit behind one
//! [`ProviderAdapter`] trait. The [`Gateway`] picks the adapter from the
//! configured provider name, sends the request over the shared
//! [`HttpTransport`], and hands back plain text, a [`DeltaStream`] of text
//! fragments, or an embedding vector.

pub mod adapter;
pub mod claude;
pub mod embedding;
pub mod gateway;
pub mod gemini;
pub mod openai;
pub mod request;
pub mod sse;
pub mod transport;

pub use adapter::{ProviderAdapter, adapter_for};
pub use embedding::EmbeddingClient;
pub use gateway::Gateway;
pub use request::HttpRequest;
pub use sse::{DeltaStream, parse_stream_line};
pub use transport::HttpTransport;
