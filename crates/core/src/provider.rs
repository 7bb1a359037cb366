//! Provider selection and per-call configuration.
//!
//! A [`ProviderConfig`] is built fresh from the current settings for every
//! request and dropped afterwards. The provider name stays a string until
//! the gateway resolves it with [`ProviderConfig::kind`], so an unknown
//! name surfaces as a [`GatewayError::Configuration`] before any I/O.

use crate::error::GatewayError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// An embedding vector. Its length is model-dependent and never validated.
pub type EmbeddingVector = Vec<f32>;

/// The supported vendor APIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    Gemini,
    Claude,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 3] = [ProviderKind::OpenAi, ProviderKind::Gemini, ProviderKind::Claude];

    /// Canonical lowercase name, as matched by [`FromStr`].
    pub fn name(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Gemini => "gemini",
            ProviderKind::Claude => "claude",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "https://api.openai.com/v1/",
            ProviderKind::Gemini => "https://generativelanguage.googleapis.com/v1beta/",
            ProviderKind::Claude => "https://api.anthropic.com/v1/",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "gpt-3.5-turbo",
            ProviderKind::Gemini => "gemini-1.5-flash",
            ProviderKind::Claude => "claude-3-haiku-20240307",
        }
    }

    /// Host part of the default base URL, used to spot a base URL that was
    /// left pointing at a different provider.
    pub fn default_host(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "api.openai.com",
            ProviderKind::Gemini => "generativelanguage.googleapis.com",
            ProviderKind::Claude => "api.anthropic.com",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = GatewayError;

    /// Case-insensitive: `"OpenAI"`, `"openai"` and `"OPENAI"` are equal.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "gemini" => Ok(ProviderKind::Gemini),
            "claude" => Ok(ProviderKind::Claude),
            _ => Err(GatewayError::Configuration(s.to_string())),
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything a single gateway call needs to reach a provider.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Provider name as stored in settings (e.g. `"OpenAI"`).
    pub provider: String,
    pub model: String,
    pub api_key: String,
    /// Absolute base URL; a trailing slash is optional.
    pub base_url: String,
}

impl ProviderConfig {
    pub fn new(
        provider: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }

    /// Resolve the provider name.
    pub fn kind(&self) -> Result<ProviderKind, GatewayError> {
        self.provider.parse()
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// A non-empty fragment of a streamed assistant reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextDelta(String);

impl TextDelta {
    /// Returns `None` for an empty fragment.
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        if text.is_empty() { None } else { Some(Self(text)) }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for TextDelta {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TextDelta {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
