//! Anthropic Messages API adapter.
//!
//! - `POST {base}/messages` with `x-api-key` and `anthropic-version` headers
//! - System prompt goes in the top-level `system` field, not in `messages`
//! - No embedding endpoint

use crate::adapter::{ProviderAdapter, parse_error};
use crate::request::{HttpRequest, join_url};
use serde::{Deserialize, Serialize};
use sydia_core::error::GatewayError;
use sydia_core::message::{ChatTurn, Role};
use sydia_core::provider::{ProviderConfig, ProviderKind};

const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1024;

pub struct ClaudeAdapter;

impl ClaudeAdapter {
    /// Only the first system turn is used; later ones are dropped.
    fn system_prompt(turns: &[ChatTurn]) -> Option<&str> {
        turns
            .iter()
            .find(|t| t.role == Role::System)
            .map(|t| t.content.as_str())
    }

    fn to_api_messages(turns: &[ChatTurn]) -> Vec<ApiMessage<'_>> {
        turns
            .iter()
            .filter(|t| t.role != Role::System)
            .map(|t| ApiMessage {
                role: t.role.as_str(),
                content: &t.content,
            })
            .collect()
    }
}

impl ProviderAdapter for ClaudeAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Claude
    }

    fn build_chat_request(
        &self,
        config: &ProviderConfig,
        turns: &[ChatTurn],
        streaming: bool,
    ) -> HttpRequest {
        let mut body = serde_json::json!({
            "model": config.model,
            "max_tokens": MAX_TOKENS,
            "messages": Self::to_api_messages(turns),
            "stream": streaming,
        });
        if let Some(system) = Self::system_prompt(turns) {
            body["system"] = serde_json::Value::String(system.to_string());
        }

        let request = HttpRequest::post(join_url(&config.base_url, "messages"), body)
            .header("x-api-key", config.api_key.clone())
            .header("anthropic-version", API_VERSION);

        if streaming {
            request.header("Accept", "text/event-stream")
        } else {
            request
        }
    }

    fn parse_non_stream_body(&self, body: &str) -> Result<String, GatewayError> {
        let response: ApiResponse =
            serde_json::from_str(body).map_err(|e| parse_error(self.kind(), e))?;

        Ok(response
            .content
            .into_iter()
            .next()
            .and_then(|block| block.text)
            .unwrap_or_default())
    }

    fn parse_stream_payload(&self, payload: &str) -> Result<Option<String>, serde_json::Error> {
        let event: StreamEvent = serde_json::from_str(payload)?;
        Ok(event.delta.and_then(|d| d.text))
    }
}

// --- Anthropic API types (internal) ---

#[derive(Debug, Serialize)]
struct ApiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

/// Both `content_block_delta` and `message_delta` events carry a `delta`
/// object; only the former has `text`.
#[derive(Debug, Deserialize)]
struct StreamEvent {
    delta: Option<StreamDelta>,
}

#[derive(Debug, Deserialize)]
struct StreamDelta {
    text: Option<String>,
}
