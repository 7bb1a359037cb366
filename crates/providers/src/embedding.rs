//! Text embedding via the configured embedding provider.

use crate::adapter::adapter_for;
use crate::transport::{HttpTransport, read_body};
use sydia_core::error::GatewayError;
use sydia_core::provider::{EmbeddingVector, ProviderConfig};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct EmbeddingClient {
    transport: HttpTransport,
}

impl EmbeddingClient {
    pub fn new(transport: HttpTransport) -> Self {
        Self { transport }
    }

    /// Embed `text` with the provider named in `config`.
    ///
    /// Unknown providers and providers without an embedding endpoint fail
    /// before any request is sent.
    pub async fn embed(&self, config: &ProviderConfig, text: &str) -> Result<EmbeddingVector, GatewayError> {
        let kind = config.kind()?;
        let adapter = adapter_for(kind);
        let request = adapter.build_embedding_request(config, text)?;

        debug!(provider = %kind, model = %config.model, url = %request.redacted_url(), "Sending embedding request");

        let response = self.transport.send(&request).await?;
        let body = read_body(kind, response).await?;
        let vector = adapter.parse_embedding_body(&body)?;

        debug!(provider = %kind, dimensions = vector.len(), "Embedding received");
        Ok(vector)
    }
}
