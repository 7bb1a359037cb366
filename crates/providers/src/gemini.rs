//! Google Gemini `generateContent` adapter.
//!
//! The API key travels in the `key` query parameter. Assistant turns use
//! the role `"model"`; every other role, system included, is sent as
//! `"user"`. There is no streaming switch in the body: streamed reads use
//! the same endpoint.

use crate::adapter::{ProviderAdapter, parse_error};
use crate::request::{HttpRequest, join_url};
use serde::{Deserialize, Serialize};
use sydia_core::error::GatewayError;
use sydia_core::message::{ChatTurn, Role};
use sydia_core::provider::{EmbeddingVector, ProviderConfig, ProviderKind};

pub struct GeminiAdapter;

impl GeminiAdapter {
    fn gemini_role(role: Role) -> &'static str {
        match role {
            Role::Assistant => "model",
            Role::User | Role::System => "user",
        }
    }

    fn to_contents(turns: &[ChatTurn]) -> Vec<Content<'_>> {
        turns
            .iter()
            .map(|t| Content {
                role: Self::gemini_role(t.role),
                parts: vec![Part { text: &t.content }],
            })
            .collect()
    }

    fn model_url(config: &ProviderConfig, method: &str) -> String {
        join_url(
            &config.base_url,
            &format!("models/{}:{method}?key={}", config.model, config.api_key),
        )
    }
}

impl ProviderAdapter for GeminiAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    fn build_chat_request(
        &self,
        config: &ProviderConfig,
        turns: &[ChatTurn],
        _streaming: bool,
    ) -> HttpRequest {
        let body = serde_json::json!({
            "contents": Self::to_contents(turns),
        });
        HttpRequest::post(Self::model_url(config, "generateContent"), body)
    }

    fn parse_non_stream_body(&self, body: &str) -> Result<String, GatewayError> {
        let response: GenerateResponse =
            serde_json::from_str(body).map_err(|e| parse_error(self.kind(), e))?;
        Ok(response.first_text().unwrap_or_default())
    }

    fn parse_stream_payload(&self, payload: &str) -> Result<Option<String>, serde_json::Error> {
        let chunk: GenerateResponse = serde_json::from_str(payload)?;
        Ok(chunk.first_text())
    }

    fn build_embedding_request(
        &self,
        config: &ProviderConfig,
        text: &str,
    ) -> Result<HttpRequest, GatewayError> {
        let body = serde_json::json!({
            "content": {
                "role": "user",
                "parts": [{ "text": text }],
            }
        });
        Ok(HttpRequest::post(Self::model_url(config, "embedContent"), body))
    }

    fn parse_embedding_body(&self, body: &str) -> Result<EmbeddingVector, GatewayError> {
        let response: EmbedResponse =
            serde_json::from_str(body).map_err(|e| parse_error(self.kind(), e))?;
        Ok(response.embedding.map(|e| e.values).unwrap_or_default())
    }
}

// --- Gemini API types (internal) ---

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateResponse {
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
    }
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: Option<EmbedValues>,
}

#[derive(Debug, Deserialize)]
struct EmbedValues {
    #[serde(default)]
    values: Vec<f32>,
}
