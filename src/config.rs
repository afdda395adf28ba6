//! Configuration types for the companion service.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration for the backend and the dashboard client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP API listener settings.
    pub server: ServerConfig,
    /// Dialogue-generation delegate settings.
    pub generation: GenerationConfig,
    /// Emotion-classification delegate settings.
    pub emotion: EmotionConfig,
    /// Keyword override and offensive-term source files.
    pub keywords: KeywordConfig,
    /// Conversation session registry settings.
    pub sessions: SessionConfig,
    /// Dashboard client settings.
    pub dashboard: DashboardConfig,
}

/// HTTP API listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind (e.g. `127.0.0.1`).
    pub host: String,
    /// Port to bind. Use `0` to auto-assign (tests).
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 5000,
        }
    }
}

/// Dialogue-generation delegate configuration.
///
/// The delegate is an opaque HTTP service that continues a token sequence.
/// Sampling parameters are passed through verbatim; the service owns the
/// actual decoding loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Base URL of the generation endpoint.
    pub endpoint: String,
    /// Per-request timeout in seconds.
    pub timeout_seconds: u64,
    /// Path to the `tokenizer.json` matching the delegate's vocabulary.
    pub tokenizer_file: PathBuf,
    /// End-of-turn token appended after each encoded utterance.
    pub end_of_turn_token: String,
    /// Maximum total sequence length (history + new turn) sent to the delegate.
    pub max_context_tokens: usize,
    /// Sampling temperature.
    pub temperature: f64,
    /// Top-k truncation for sampling.
    pub top_k: usize,
    /// Nucleus (top-p) truncation for sampling.
    pub top_p: f64,
    /// N-gram size the delegate must not repeat.
    pub no_repeat_ngram_size: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8600".to_owned(),
            timeout_seconds: 30,
            tokenizer_file: PathBuf::from("tokenizer.json"),
            end_of_turn_token: "<|endoftext|>".to_owned(),
            max_context_tokens: 1000,
            temperature: 0.7,
            top_k: 50,
            top_p: 0.9,
            no_repeat_ngram_size: 3,
        }
    }
}

/// Emotion-classification delegate configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmotionConfig {
    /// Base URL of the classification endpoint.
    pub endpoint: String,
    /// Per-request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for EmotionConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8601".to_owned(),
            timeout_seconds: 10,
        }
    }
}

/// Keyword override and offensive-term source files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordConfig {
    /// TOML file with `[[entry]]` rows (`keyword`, `response`, `helpline`).
    pub keyword_file: PathBuf,
    /// TOML file with a `terms` list.
    pub offensive_file: PathBuf,
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self {
            keyword_file: PathBuf::from("data/keyword_responses.toml"),
            offensive_file: PathBuf::from("data/offensive_terms.toml"),
        }
    }
}

/// Conversation session registry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Maximum number of concurrent sessions before the least-recently-active
    /// one is evicted.
    pub max_sessions: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { max_sessions: 64 }
    }
}

/// Dashboard client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Base URL the client uses to reach the API.
    pub base_url: String,
    /// Fixed typing-simulation delay in milliseconds. Cosmetic only; never
    /// on the correctness path.
    pub typing_delay_ms: u64,
    /// Path the chat-log export overwrites.
    pub export_path: PathBuf,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_owned(),
            typing_delay_ms: 1200,
            export_path: PathBuf::from("chat_logs.json"),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file, falling back to defaults for
    /// missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| crate::error::SolaceError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be
    /// serialized.
    pub fn save_to_file(&self, path: &std::path::Path) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::SolaceError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `~/.config/solace/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("solace").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("solace")
                .join("config.toml")
        } else {
            PathBuf::from("/tmp/solace-config/config.toml")
        }
    }

    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - delegate endpoints must not be empty
    /// - delegate timeouts must be greater than 0
    /// - `max_context_tokens` must be greater than 0
    /// - `temperature` must be positive and `top_p` within `(0, 1]`
    /// - `max_sessions` must be greater than 0
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::SolaceError;

        if self.generation.endpoint.is_empty() {
            return Err(SolaceError::Config(
                "generation.endpoint must not be empty".into(),
            ));
        }
        if self.emotion.endpoint.is_empty() {
            return Err(SolaceError::Config(
                "emotion.endpoint must not be empty".into(),
            ));
        }
        if self.generation.timeout_seconds == 0 || self.emotion.timeout_seconds == 0 {
            return Err(SolaceError::Config(
                "delegate timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.generation.max_context_tokens == 0 {
            return Err(SolaceError::Config(
                "generation.max_context_tokens must be greater than 0".into(),
            ));
        }
        if self.generation.temperature <= 0.0 {
            return Err(SolaceError::Config(
                "generation.temperature must be positive".into(),
            ));
        }
        if self.generation.top_p <= 0.0 || self.generation.top_p > 1.0 {
            return Err(SolaceError::Config(
                "generation.top_p must be within (0, 1]".into(),
            ));
        }
        if self.sessions.max_sessions == 0 {
            return Err(SolaceError::Config(
                "sessions.max_sessions must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.server.host.is_empty());
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.generation.max_context_tokens, 1000);
        assert_eq!(config.generation.top_k, 50);
        assert_eq!(config.generation.no_repeat_ngram_size, 3);
        assert!(config.dashboard.typing_delay_ms > 0);
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = AppConfig::default();
        config.server.port = 8080;
        config.generation.temperature = 1.2;
        config.dashboard.base_url = "http://10.0.0.2:8080".to_owned();

        config.save_to_file(&path).unwrap();
        let loaded = AppConfig::from_file(&path).unwrap();

        assert_eq!(loaded.server.port, 8080);
        assert!((loaded.generation.temperature - 1.2).abs() < f64::EPSILON);
        assert_eq!(loaded.dashboard.base_url, "http://10.0.0.2:8080");
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r#"
            [server]
            port = 9999
        "#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.port, 9999);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.generation.top_k, 50);
        assert_eq!(config.sessions.max_sessions, 64);
    }

    #[test]
    fn zero_timeout_rejected() {
        let mut config = AppConfig::default();
        config.emotion.timeout_seconds = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("timeout_seconds"));
    }

    #[test]
    fn empty_endpoint_rejected() {
        let mut config = AppConfig::default();
        config.generation.endpoint = String::new();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("generation.endpoint"));
    }

    #[test]
    fn out_of_range_top_p_rejected() {
        let mut config = AppConfig::default();
        config.generation.top_p = 1.5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("top_p"));
    }

    #[test]
    fn zero_context_window_rejected() {
        let mut config = AppConfig::default();
        config.generation.max_context_tokens = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_context_tokens"));
    }
}
