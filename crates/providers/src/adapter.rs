//! The ProviderAdapter trait, one implementation per vendor wire format.
//!
//! Adapters are stateless and synchronous: they turn provider-agnostic
//! turns into an [`HttpRequest`] and turn response text back into plain
//! text or vectors. All I/O happens in the gateway.

use crate::claude::ClaudeAdapter;
use crate::gemini::GeminiAdapter;
use crate::openai::OpenAiAdapter;
use crate::request::HttpRequest;
use sydia_core::error::GatewayError;
use sydia_core::message::ChatTurn;
use sydia_core::provider::{EmbeddingVector, ProviderConfig, ProviderKind};

/// The capability set every provider implements.
///
/// Adding a provider means adding a [`ProviderKind`] variant and one
/// implementation of this trait; existing adapters stay untouched.
pub trait ProviderAdapter: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Build the chat request. `streaming` asks for an SSE response where
    /// the vendor format has a switch for it.
    fn build_chat_request(
        &self,
        config: &ProviderConfig,
        turns: &[ChatTurn],
        streaming: bool,
    ) -> HttpRequest;

    /// Extract the reply text from a complete response body.
    ///
    /// Missing or empty arrays yield `""`; malformed JSON is a
    /// [`GatewayError::Parse`].
    fn parse_non_stream_body(&self, body: &str) -> Result<String, GatewayError>;

    /// Extract the text fragment from the JSON payload of one `data:` line.
    /// `Ok(None)` when the event carries no text.
    fn parse_stream_payload(&self, payload: &str) -> Result<Option<String>, serde_json::Error>;

    /// Build an embedding request. Providers without an embedding endpoint
    /// keep the default, which fails before any network activity.
    fn build_embedding_request(
        &self,
        _config: &ProviderConfig,
        _text: &str,
    ) -> Result<HttpRequest, GatewayError> {
        Err(self.unsupported("embedding"))
    }

    /// Extract the vector from an embedding response body. Missing arrays
    /// yield an empty vector.
    fn parse_embedding_body(&self, _body: &str) -> Result<EmbeddingVector, GatewayError> {
        Err(self.unsupported("embedding"))
    }

    fn unsupported(&self, operation: &str) -> GatewayError {
        GatewayError::UnsupportedOperation {
            operation: operation.into(),
            provider: self.kind().name().into(),
        }
    }
}

/// Select the adapter for a provider.
pub fn adapter_for(kind: ProviderKind) -> &'static dyn ProviderAdapter {
    match kind {
        ProviderKind::OpenAi => &OpenAiAdapter,
        ProviderKind::Gemini => &GeminiAdapter,
        ProviderKind::Claude => &ClaudeAdapter,
    }
}

/// Map a serde error on a complete body to the gateway taxonomy.
pub(crate) fn parse_error(kind: ProviderKind, err: serde_json::Error) -> GatewayError {
    GatewayError::Parse(format!("{kind}: {err}"))
}
