//! Shared HTTP transport.
//!
//! One pooled [`reqwest::Client`] serves every provider. Errors are mapped
//! into [`GatewayError`] with the request URL stripped, because Gemini
//! carries its key in the query string.

use crate::request::HttpRequest;
use std::time::Duration;
use sydia_config::HttpConfig;
use sydia_core::error::GatewayError;
use sydia_core::provider::ProviderKind;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &HttpConfig) -> Result<Self, GatewayError> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .read_timeout(Duration::from_secs(config.read_timeout_secs))
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .pool_idle_timeout(Duration::from_secs(config.pool_idle_timeout_secs));

        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let client = builder
            .build()
            .map_err(|e| GatewayError::Configuration(format!("HTTP client: {}", e.without_url())))?;

        Ok(Self { client })
    }

    /// Send a request. A non-2xx status is turned into
    /// [`GatewayError::Transport`] carrying the response body.
    pub async fn send(&self, request: &HttpRequest) -> Result<reqwest::Response, GatewayError> {
        let mut builder = self.client.post(&request.url).json(&request.body);
        for (name, value) in &request.headers {
            builder = builder.header(*name, value);
        }

        let response = builder.send().await.map_err(map_send_error)?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), url = %request.redacted_url(), body = %body, "Provider returned error status");
            return Err(GatewayError::Transport {
                status: status.as_u16(),
                body,
            });
        }

        debug!(status = status.as_u16(), url = %request.redacted_url(), "Provider response received");
        Ok(response)
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport").finish_non_exhaustive()
    }
}

/// Read a complete response body. A body that is empty or only whitespace
/// is [`GatewayError::EmptyBody`].
pub async fn read_body(kind: ProviderKind, response: reqwest::Response) -> Result<String, GatewayError> {
    let body = response.text().await.map_err(map_send_error)?;
    if body.trim().is_empty() {
        return Err(GatewayError::EmptyBody {
            provider: kind.name().into(),
        });
    }
    Ok(body)
}

pub(crate) fn map_send_error(err: reqwest::Error) -> GatewayError {
    let err = err.without_url();
    if err.is_timeout() {
        GatewayError::Timeout(err.to_string())
    } else {
        GatewayError::Network(err.to_string())
    }
}

pub(crate) fn map_stream_error(err: reqwest::Error) -> GatewayError {
    let err = err.without_url();
    if err.is_timeout() {
        GatewayError::Timeout(err.to_string())
    } else {
        GatewayError::StreamInterrupted(err.to_string())
    }
}
