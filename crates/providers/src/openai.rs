//! OpenAI Chat Completions adapter.
//!
//! - `POST {base}/chat/completions`, `Authorization: Bearer` auth
//! - `stream` flag in the body selects SSE
//! - `POST {base}/embeddings` for vectors

use crate::adapter::{ProviderAdapter, parse_error};
use crate::request::{HttpRequest, join_url};
use serde::{Deserialize, Serialize};
use sydia_core::error::GatewayError;
use sydia_core::message::ChatTurn;
use sydia_core::provider::{EmbeddingVector, ProviderConfig, ProviderKind};

pub struct OpenAiAdapter;

impl OpenAiAdapter {
    fn to_api_messages(turns: &[ChatTurn]) -> Vec<ApiMessage<'_>> {
        turns
            .iter()
            .map(|t| ApiMessage {
                role: t.role.as_str(),
                content: &t.content,
            })
            .collect()
    }
}

impl ProviderAdapter for OpenAiAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    fn build_chat_request(
        &self,
        config: &ProviderConfig,
        turns: &[ChatTurn],
        streaming: bool,
    ) -> HttpRequest {
        let body = serde_json::json!({
            "model": config.model,
            "messages": Self::to_api_messages(turns),
            "stream": streaming,
        });

        let request = HttpRequest::post(join_url(&config.base_url, "chat/completions"), body)
            .header("Authorization", format!("Bearer {}", config.api_key));

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
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .unwrap_or_default())
    }

    fn parse_stream_payload(&self, payload: &str) -> Result<Option<String>, serde_json::Error> {
        let chunk: StreamResponse = serde_json::from_str(payload)?;
        Ok(chunk
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.delta)
            .and_then(|d| d.content))
    }

    fn build_embedding_request(
        &self,
        config: &ProviderConfig,
        text: &str,
    ) -> Result<HttpRequest, GatewayError> {
        let body = serde_json::json!({
            "model": config.model,
            "input": text,
        });

        Ok(HttpRequest::post(join_url(&config.base_url, "embeddings"), body)
            .header("Authorization", format!("Bearer {}", config.api_key)))
    }

    fn parse_embedding_body(&self, body: &str) -> Result<EmbeddingVector, GatewayError> {
        let response: EmbeddingApiResponse =
            serde_json::from_str(body).map_err(|e| parse_error(self.kind(), e))?;

        Ok(response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .unwrap_or_default())
    }
}

// --- OpenAI API types (internal) ---

#[derive(Debug, Serialize)]
struct ApiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: Option<ApiResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ApiResponseMessage {
    content: Option<String>,
}

/// A single SSE `data: {...}` chunk from a streaming response.
#[derive(Debug, Deserialize)]
struct StreamResponse {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: Option<StreamDelta>,
}

#[derive(Debug, Deserialize)]
struct StreamDelta {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingApiResponse {
    #[serde(default)]
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    embedding: Vec<f32>,
}
