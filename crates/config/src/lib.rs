//! Configuration loading, validation, and management for Sydia.
//!
//! Loads configuration from `~/.sydia/config.toml` with environment
//! variable overrides. Every field has a default, so a missing file is a
//! valid configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use sydia_core::provider::{ProviderConfig, ProviderKind};

/// The root configuration structure.
///
/// Maps directly to `~/.sydia/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Chat model settings
    #[serde(default)]
    pub chat: ChatSettings,

    /// Embedding model settings (used for memory formation)
    #[serde(default)]
    pub embedding: EmbeddingSettings,

    /// Number of recent history turns sent with each request
    #[serde(default = "default_context_length")]
    pub context_length: usize,

    /// Memory formation runs on every n-th user turn
    #[serde(default = "default_extraction_frequency")]
    pub extraction_frequency: u32,

    /// Personality preset injected into the system prompt
    #[serde(default = "default_personality")]
    pub personality: String,

    /// HTTP transport settings
    #[serde(default)]
    pub http: HttpConfig,
}

fn default_context_length() -> usize {
    10
}
fn default_extraction_frequency() -> u32 {
    3
}
fn default_personality() -> String {
    "Sharp".into()
}
fn default_provider() -> String {
    "OpenAI".into()
}
fn default_chat_model() -> String {
    ProviderKind::OpenAi.default_model().into()
}
fn default_embedding_model() -> String {
    "text-embedding-3-small".into()
}
fn default_base_url() -> String {
    ProviderKind::OpenAi.default_base_url().into()
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ChatSettings {
    #[serde(default = "default_provider")]
    pub provider: String,

    #[serde(default = "default_chat_model")]
    pub model: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Use the streaming endpoint and render deltas as they arrive
    #[serde(default)]
    pub stream_enabled: bool,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_chat_model(),
            api_key: None,
            base_url: default_base_url(),
            stream_enabled: false,
        }
    }
}

impl ChatSettings {
    /// Build the per-request provider configuration.
    pub fn provider_config(&self) -> ProviderConfig {
        build_provider_config(&self.provider, &self.model, &self.api_key, &self.base_url)
    }
}

impl std::fmt::Debug for ChatSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSettings")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("stream_enabled", &self.stream_enabled)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    #[serde(default = "default_provider")]
    pub provider: String,

    #[serde(default = "default_embedding_model")]
    pub model: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_embedding_model(),
            api_key: None,
            base_url: default_base_url(),
        }
    }
}

impl EmbeddingSettings {
    pub fn provider_config(&self) -> ProviderConfig {
        build_provider_config(&self.provider, &self.model, &self.api_key, &self.base_url)
    }
}

impl std::fmt::Debug for EmbeddingSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingSettings")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Maximum idle time between two reads of a response body
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,

    /// Optional cap on a whole request, body included. Unset by default so
    /// long streams are bounded only by the read timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,

    #[serde(default = "default_pool_max_idle")]
    pub pool_max_idle_per_host: usize,

    #[serde(default = "default_pool_idle_timeout")]
    pub pool_idle_timeout_secs: u64,
}

fn default_connect_timeout() -> u64 {
    30
}
fn default_read_timeout() -> u64 {
    60
}
fn default_pool_max_idle() -> usize {
    8
}
fn default_pool_idle_timeout() -> u64 {
    90
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout(),
            read_timeout_secs: default_read_timeout(),
            request_timeout_secs: None,
            pool_max_idle_per_host: default_pool_max_idle(),
            pool_idle_timeout_secs: default_pool_idle_timeout(),
        }
    }
}

/// Pick the base URL actually sent to `kind`.
///
/// A blank base URL, or one still pointing at another provider's default
/// host (the stock OpenAI URL after switching to Gemini), falls back to
/// the provider's own default.
pub fn resolve_base_url(kind: ProviderKind, base_url: &str) -> String {
    let trimmed = base_url.trim();
    if trimmed.is_empty() {
        return kind.default_base_url().into();
    }

    let points_elsewhere = ProviderKind::ALL
        .iter()
        .filter(|other| **other != kind)
        .any(|other| trimmed.contains(other.default_host()));

    if points_elsewhere {
        kind.default_base_url().into()
    } else {
        trimmed.into()
    }
}

fn build_provider_config(
    provider: &str,
    model: &str,
    api_key: &Option<String>,
    base_url: &str,
) -> ProviderConfig {
    // Unknown names pass through untouched; the gateway rejects them.
    let base_url = match provider.parse::<ProviderKind>() {
        Ok(kind) => resolve_base_url(kind, base_url),
        Err(_) => base_url.to_string(),
    };

    ProviderConfig::new(
        provider,
        model,
        api_key.clone().unwrap_or_default(),
        base_url,
    )
}

impl AppConfig {
    /// Load configuration from the default path (~/.sydia/config.toml).
    ///
    /// Environment overrides:
    /// - `SYDIA_API_KEY`, `SYDIA_PROVIDER`, `SYDIA_MODEL`, `SYDIA_BASE_URL`
    ///   (chat settings)
    /// - `SYDIA_EMBEDDING_API_KEY` (embedding settings)
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup("SYDIA_API_KEY") {
            self.chat.api_key = Some(key);
        }
        if let Some(provider) = lookup("SYDIA_PROVIDER") {
            self.chat.provider = provider;
        }
        if let Some(model) = lookup("SYDIA_MODEL") {
            self.chat.model = model;
        }
        if let Some(base_url) = lookup("SYDIA_BASE_URL") {
            self.chat.base_url = base_url;
        }
        if let Some(key) = lookup("SYDIA_EMBEDDING_API_KEY") {
            self.embedding.api_key = Some(key);
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".sydia")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.context_length == 0 {
            return Err(ConfigError::ValidationError(
                "context_length must be at least 1".into(),
            ));
        }

        if self.extraction_frequency == 0 {
            return Err(ConfigError::ValidationError(
                "extraction_frequency must be at least 1".into(),
            ));
        }

        for (section, provider) in [("chat", &self.chat.provider), ("embedding", &self.embedding.provider)] {
            if provider.parse::<ProviderKind>().is_err() {
                return Err(ConfigError::ValidationError(format!(
                    "{section}.provider '{provider}' is not one of openai, gemini, claude"
                )));
            }
        }

        Ok(())
    }

    /// A copy safe to print: API keys replaced with `[REDACTED]`.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.chat.api_key.is_some() {
            copy.chat.api_key = Some("[REDACTED]".into());
        }
        if copy.embedding.api_key.is_some() {
            copy.embedding.api_key = Some("[REDACTED]".into());
        }
        copy
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            chat: ChatSettings::default(),
            embedding: EmbeddingSettings::default(),
            context_length: default_context_length(),
            extraction_frequency: default_extraction_frequency(),
            personality: default_personality(),
            http: HttpConfig::default(),
        }
    }
}

/// Current-value reads of the settings.
///
/// The chat session reads settings once per turn, so edits made between
/// turns take effect on the next request.
pub trait SettingsSource: Send + Sync {
    fn current(&self) -> AppConfig;
}

impl SettingsSource for AppConfig {
    fn current(&self) -> AppConfig {
        self.clone()
    }
}

/// Settings shared between the chat session and whatever edits them.
#[derive(Debug, Default)]
pub struct SharedSettings {
    inner: RwLock<AppConfig>,
}

impl SharedSettings {
    pub fn new(config: AppConfig) -> Self {
        Self {
            inner: RwLock::new(config),
        }
    }

    /// Apply an edit; readers see it on their next `current()`.
    pub fn update(&self, edit: impl FnOnce(&mut AppConfig)) {
        let mut guard = self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        edit(&mut guard);
    }
}

impl SettingsSource for SharedSettings {
    fn current(&self) -> AppConfig {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigError> for sydia_core::Error {
    fn from(err: ConfigError) -> Self {
        sydia_core::Error::Config {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn config_error_becomes_core_config_error() {
        let err: sydia_core::Error = ConfigError::ValidationError("context_length must be at least 1".into()).into();
        assert!(matches!(err, sydia_core::Error::Config { .. }));
        assert_eq!(
            err.to_string(),
            "Configuration error: Configuration validation failed: context_length must be at least 1"
        );
    }

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert_eq!(config.chat.provider, "OpenAI");
        assert_eq!(config.chat.model, "gpt-3.5-turbo");
        assert_eq!(config.embedding.model, "text-embedding-3-small");
        assert_eq!(config.context_length, 10);
        assert_eq!(config.extraction_frequency, 3);
        assert!(!config.chat.stream_enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.chat.base_url, config.chat.base_url);
        assert_eq!(parsed.http.read_timeout_secs, 60);
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.personality, "Sharp");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
context_length = 4

[chat]
provider = "Claude"
api_key = "sk-ant-test"
stream_enabled = true
"#
        )
        .unwrap();

        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.context_length, 4);
        assert_eq!(config.chat.provider, "Claude");
        assert!(config.chat.stream_enabled);
        assert_eq!(config.chat.model, "gpt-3.5-turbo");
        assert_eq!(config.embedding.provider, "OpenAI");
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "context_length = \"many\"").unwrap();
        let err = AppConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn zero_context_length_rejected() {
        let config = AppConfig {
            context_length: 0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_provider_rejected() {
        let mut config = AppConfig::default();
        config.embedding.provider = "foo".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("embedding.provider"));
    }

    #[test]
    fn env_overrides_apply_to_chat() {
        let mut config = AppConfig::default();
        config.apply_env_overrides(|name| match name {
            "SYDIA_API_KEY" => Some("sk-env".into()),
            "SYDIA_PROVIDER" => Some("gemini".into()),
            _ => None,
        });
        assert_eq!(config.chat.api_key.as_deref(), Some("sk-env"));
        assert_eq!(config.chat.provider, "gemini");
        assert!(config.embedding.api_key.is_none());
    }

    #[test]
    fn stock_openai_url_falls_back_for_other_providers() {
        assert_eq!(
            resolve_base_url(ProviderKind::Gemini, "https://api.openai.com/v1/"),
            "https://generativelanguage.googleapis.com/v1beta/"
        );
        assert_eq!(
            resolve_base_url(ProviderKind::Claude, "  "),
            "https://api.anthropic.com/v1/"
        );
        assert_eq!(
            resolve_base_url(ProviderKind::OpenAi, "https://proxy.local/v1"),
            "https://proxy.local/v1"
        );
    }

    #[test]
    fn provider_config_resolves_base_url() {
        let mut settings = ChatSettings::default();
        settings.provider = "Claude".into();
        settings.model = "claude-3-haiku-20240307".into();
        settings.api_key = Some("sk-ant".into());

        let config = settings.provider_config();
        assert_eq!(config.base_url, "https://api.anthropic.com/v1/");
        assert_eq!(config.api_key, "sk-ant");
        assert_eq!(config.provider, "Claude");
    }

    #[test]
    fn debug_and_redacted_hide_keys() {
        let mut config = AppConfig::default();
        config.chat.api_key = Some("sk-secret".into());
        assert!(!format!("{config:?}").contains("sk-secret"));

        let printed = toml::to_string_pretty(&config.redacted()).unwrap();
        assert!(!printed.contains("sk-secret"));
        assert!(printed.contains("[REDACTED]"));
    }

    #[test]
    fn shared_settings_reflect_updates() {
        let shared = SharedSettings::new(AppConfig::default());
        shared.update(|c| c.chat.stream_enabled = true);
        assert!(shared.current().chat.stream_enabled);
    }
}
