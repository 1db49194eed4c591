//! Configuration loading, validation, and management for docent.
//!
//! Loads configuration from `~/.docent/config.toml` (or an explicit path)
//! with environment variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.docent/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key (can be overridden per-provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Default model provider
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Default chat model
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Default temperature
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Default max tokens per model response
    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,

    /// Document retrieval configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// System instructions for each assistant role
    #[serde(default)]
    pub prompts: PromptConfig,

    /// Provider-specific configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

fn default_provider() -> String {
    "openai".into()
}
fn default_model() -> String {
    "gpt-4.1-mini".into()
}
fn default_temperature() -> f32 {
    0.0
}
fn default_max_tokens() -> u32 {
    1024
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("default_provider", &self.default_provider)
            .field("default_model", &self.default_model)
            .field("default_temperature", &self.default_temperature)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("retrieval", &self.retrieval)
            .field("prompts", &self.prompts)
            .field("providers", &self.providers)
            .finish()
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("default_model", &self.default_model)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Document (or directory of documents) to index at startup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_path: Option<String>,

    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Maximum chunk length in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Characters shared between neighbouring chunks
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Passages retrieved per question
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Initial value of the per-session retrieval toggle
    #[serde(default = "default_true")]
    pub use_context: bool,
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".into()
}
fn default_chunk_size() -> usize {
    800
}
fn default_chunk_overlap() -> usize {
    120
}
fn default_top_k() -> usize {
    4
}
fn default_true() -> bool {
    true
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            document_path: None,
            embedding_model: default_embedding_model(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            top_k: default_top_k(),
            use_context: true,
        }
    }
}

/// System instructions. Each assistant role gets its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptConfig {
    /// Used when retrieval is off
    #[serde(default = "default_general_instruction")]
    pub general_instruction: String,

    /// Used when answering from retrieved passages
    #[serde(default = "default_context_instruction")]
    pub context_instruction: String,

    /// Used for the tool-aware first call
    #[serde(default = "default_assistant_instruction")]
    pub assistant_instruction: String,

    /// Used to summarize tool output
    #[serde(default = "default_summary_instruction")]
    pub summary_instruction: String,

    /// Prefix of the user prompt that carries tool output to the summarizer
    #[serde(default = "default_tool_summary_prompt")]
    pub tool_summary_prompt: String,
}

fn default_general_instruction() -> String {
    "You are a helpful assistant. Answer using general knowledge.".into()
}
fn default_context_instruction() -> String {
    "You answer questions only with the provided context. \
     If the context is insufficient, say you don't know."
        .into()
}
fn default_assistant_instruction() -> String {
    "You are a hospital assistant. \
     First, look at the conversation and any prior tool outputs for patient information. \
     Only call the 'generate_patient' tool if the requested patient data is not already in the chat history."
        .into()
}
fn default_summary_instruction() -> String {
    "You summarize patient information using only the data provided. \
     Do not add or infer any missing details."
        .into()
}
fn default_tool_summary_prompt() -> String {
    "Create a simple clinical note from this information only:".into()
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            general_instruction: default_general_instruction(),
            context_instruction: default_context_instruction(),
            assistant_instruction: default_assistant_instruction(),
            summary_instruction: default_summary_instruction(),
            tool_summary_prompt: default_tool_summary_prompt(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
}

impl AppConfig {
    /// Load configuration from `path`, or from the default location
    /// (~/.docent/config.toml) when none is given.
    ///
    /// Also checks environment variables:
    /// - `DOCENT_API_KEY` (highest priority), `OPENAI_API_KEY`, `OPENROUTER_API_KEY`
    /// - `DOCENT_PROVIDER`, `DOCENT_MODEL`
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_dir().join("config.toml"),
        };
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok());
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

    /// Apply environment overrides using `lookup` to read variables.
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup("DOCENT_API_KEY") {
            self.api_key = Some(key);
        } else if self.api_key.is_none() {
            self.api_key = lookup("OPENAI_API_KEY").or_else(|| lookup("OPENROUTER_API_KEY"));
        }

        if let Some(provider) = lookup("DOCENT_PROVIDER") {
            self.default_provider = provider;
        }

        if let Some(model) = lookup("DOCENT_MODEL") {
            self.default_model = model;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".docent")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.default_temperature) {
            return Err(ConfigError::ValidationError(
                "default_temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.retrieval.chunk_size == 0 {
            return Err(ConfigError::ValidationError(
                "retrieval.chunk_size must be > 0".into(),
            ));
        }

        if self.retrieval.chunk_overlap >= self.retrieval.chunk_size {
            return Err(ConfigError::ValidationError(
                "retrieval.chunk_overlap must be smaller than retrieval.chunk_size".into(),
            ));
        }

        if self.retrieval.top_k == 0 {
            return Err(ConfigError::ValidationError(
                "retrieval.top_k must be at least 1".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available for the default provider.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
            || self
                .providers
                .get(&self.default_provider)
                .is_some_and(|p| p.api_key.is_some())
    }

    /// Whether the default provider needs an API key at all. Local servers
    /// (ollama, vllm, llama.cpp, or any `api_url` on localhost) do not.
    pub fn requires_api_key(&self) -> bool {
        if matches!(
            self.default_provider.as_str(),
            "ollama" | "vllm" | "llamacpp" | "llama.cpp"
        ) {
            return false;
        }
        let local_url = self
            .providers
            .get(&self.default_provider)
            .and_then(|p| p.api_url.as_deref())
            .is_some_and(is_local_url);
        !local_url
    }

    /// The effective configuration as TOML, with secrets removed.
    pub fn redacted_toml(&self) -> String {
        let mut config = self.clone();
        config.api_key = config.api_key.map(|_| "[REDACTED]".into());
        for provider in config.providers.values_mut() {
            provider.api_key = provider.api_key.take().map(|_| "[REDACTED]".into());
        }
        toml::to_string_pretty(&config).unwrap_or_default()
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_provider: default_provider(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            default_max_tokens: default_max_tokens(),
            retrieval: RetrievalConfig::default(),
            prompts: PromptConfig::default(),
            providers: HashMap::new(),
        }
    }
}

/// Get the user's home directory.
fn is_local_url(url: &str) -> bool {
    let rest = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"))
        .unwrap_or(url);
    let host = rest.split(['/', ':']).next().unwrap_or_default();
    matches!(host, "localhost" | "127.0.0.1" | "0.0.0.0") || rest.starts_with("[::1]")
}

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

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert_eq!(config.default_provider, "openai");
        assert_eq!(config.default_model, "gpt-4.1-mini");
        assert_eq!(config.retrieval.top_k, 4);
        assert_eq!(config.retrieval.chunk_size, 800);
        assert_eq!(config.retrieval.chunk_overlap, 120);
        assert!(config.retrieval.use_context);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.default_provider, config.default_provider);
        assert_eq!(parsed.prompts.summary_instruction, config.prompts.summary_instruction);
    }

    #[test]
    fn invalid_temperature_rejected() {
        let config = AppConfig {
            default_temperature: 5.0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn nan_temperature_rejected() {
        let config = AppConfig {
            default_temperature: f32::NAN,
            ..AppConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn local_providers_need_no_api_key() {
        let mut config = AppConfig::default();
        assert!(config.requires_api_key());

        config.default_provider = "ollama".into();
        assert!(!config.requires_api_key());

        config.default_provider = "my-gateway".into();
        config.providers.insert(
            "my-gateway".into(),
            ProviderConfig {
                api_key: None,
                api_url: Some("http://localhost:9000/v1".into()),
                default_model: None,
            },
        );
        assert!(!config.requires_api_key());

        config.providers.get_mut("my-gateway").unwrap().api_url =
            Some("https://llm.example.com/v1".into());
        assert!(config.requires_api_key());
    }

    #[test]
    fn overlap_must_be_smaller_than_chunk() {
        let mut config = AppConfig::default();
        config.retrieval.chunk_overlap = 800;
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn zero_top_k_rejected() {
        let mut config = AppConfig::default();
        config.retrieval.top_k = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        assert!(result.is_ok());
        assert_eq!(result.unwrap().default_provider, "openai");
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
default_model = "gpt-4o"

[retrieval]
document_path = "report.txt"
top_k = 2

[providers.openrouter]
api_key = "sk-or-test"
"#
        )
        .unwrap();

        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.default_model, "gpt-4o");
        assert_eq!(config.retrieval.document_path.as_deref(), Some("report.txt"));
        assert_eq!(config.retrieval.top_k, 2);
        assert_eq!(config.retrieval.chunk_size, 800);
        assert_eq!(
            config.providers["openrouter"].api_key.as_deref(),
            Some("sk-or-test")
        );
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "default_model = [").unwrap();
        let err = AppConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn env_overrides_apply_in_priority_order() {
        let env: HashMap<&str, &str> = [
            ("OPENAI_API_KEY", "sk-openai"),
            ("DOCENT_API_KEY", "sk-docent"),
            ("DOCENT_MODEL", "gpt-4o"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_env(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.api_key.as_deref(), Some("sk-docent"));
        assert_eq!(config.default_model, "gpt-4o");
        assert_eq!(config.default_provider, "openai");
    }

    #[test]
    fn file_key_beats_generic_env_key() {
        let mut config = AppConfig {
            api_key: Some("sk-file".into()),
            ..AppConfig::default()
        };
        config.apply_env(|k| (k == "OPENAI_API_KEY").then(|| "sk-env".to_string()));
        assert_eq!(config.api_key.as_deref(), Some("sk-file"));
    }

    #[test]
    fn debug_and_redacted_toml_hide_secrets() {
        let mut config = AppConfig {
            api_key: Some("sk-secret".into()),
            ..AppConfig::default()
        };
        config.providers.insert(
            "openai".into(),
            ProviderConfig {
                api_key: Some("sk-nested".into()),
                api_url: None,
                default_model: None,
            },
        );
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(!debug.contains("sk-nested"));

        let toml_str = config.redacted_toml();
        assert!(!toml_str.contains("sk-secret"));
        assert!(!toml_str.contains("sk-nested"));
        assert!(toml_str.contains("[REDACTED]"));
    }

    #[test]
    fn has_api_key_checks_provider_table() {
        let mut config = AppConfig::default();
        assert!(!config.has_api_key());
        config.providers.insert(
            "openai".into(),
            ProviderConfig {
                api_key: Some("sk".into()),
                api_url: None,
                default_model: None,
            },
        );
        assert!(config.has_api_key());
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("gpt-4.1-mini"));
        assert!(toml_str.contains("text-embedding-3-small"));
    }
}
