//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{ConfigError, ConversationConfig, RecognitionConfig, SynthesisConfig};

/// Runtime environment enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Development mode - relaxed validation, warnings only
    #[default]
    Development,
    /// Staging mode - stricter validation
    Staging,
    /// Production mode - all validations enforced
    Production,
}

impl RuntimeEnvironment {
    /// Check if this is a production environment
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    /// Check if strict validation should be applied
    pub fn is_strict(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Runtime environment (development, staging, production)
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Live recognition configuration
    #[serde(default)]
    pub recognition: RecognitionConfig,

    /// Prediction endpoint configuration
    #[serde(default)]
    pub prediction: PredictionConfig,

    /// Streaming synthesis configuration
    #[serde(default)]
    pub synthesis: SynthesisConfig,

    /// Conversation manager configuration
    #[serde(default)]
    pub conversation: ConversationConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Settings {
    /// Create default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_recognition()?;
        self.validate_prediction()?;
        self.validate_synthesis()?;
        self.validate_conversation()?;

        Ok(())
    }

    /// Validate server configuration
    fn validate_server(&self) -> Result<(), ConfigError> {
        let server = &self.server;

        if server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                message: "Port cannot be 0".to_string(),
            });
        }

        // CORS validation in production
        if self.environment.is_production() && server.cors_enabled && server.cors_origins.is_empty()
        {
            tracing::warn!(
                "CORS is enabled in production but no origins are configured. \
                 All origins will be accepted."
            );
        }

        Ok(())
    }

    /// Validate recognition configuration
    fn validate_recognition(&self) -> Result<(), ConfigError> {
        let recognition = &self.recognition;

        if !recognition.endpoint.starts_with("ws") {
            return Err(ConfigError::InvalidValue {
                field: "recognition.endpoint".to_string(),
                message: format!(
                    "Must be a ws:// or wss:// URL, got '{}'",
                    recognition.endpoint
                ),
            });
        }

        if recognition.sample_rate == 0 {
            return Err(ConfigError::InvalidValue {
                field: "recognition.sample_rate".to_string(),
                message: "Sample rate cannot be 0".to_string(),
            });
        }

        if recognition.channels == 0 {
            return Err(ConfigError::InvalidValue {
                field: "recognition.channels".to_string(),
                message: "Channel count must be at least 1".to_string(),
            });
        }

        if recognition.chunk_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "recognition.chunk_ms".to_string(),
                message: "Microphone frame size must be at least 1ms".to_string(),
            });
        }

        // API keys are enforced at first use, not at startup
        if self.environment.is_strict() && recognition.api_key.is_none() {
            tracing::warn!("recognition.api_key not set; listen phases will fail at first use");
        }

        Ok(())
    }

    /// Validate prediction configuration
    fn validate_prediction(&self) -> Result<(), ConfigError> {
        let prediction = &self.prediction;

        if !prediction.endpoint.starts_with("http") {
            return Err(ConfigError::InvalidValue {
                field: "prediction.endpoint".to_string(),
                message: format!(
                    "Must be an http:// or https:// URL, got '{}'",
                    prediction.endpoint
                ),
            });
        }

        if prediction.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "prediction.max_attempts".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        if prediction.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "prediction.timeout_seconds".to_string(),
                message: "Timeout must be at least 1 second".to_string(),
            });
        }

        Ok(())
    }

    /// Validate synthesis configuration
    fn validate_synthesis(&self) -> Result<(), ConfigError> {
        let synthesis = &self.synthesis;

        if !synthesis.endpoint.starts_with("http") {
            return Err(ConfigError::InvalidValue {
                field: "synthesis.endpoint".to_string(),
                message: format!(
                    "Must be an http:// or https:// URL, got '{}'",
                    synthesis.endpoint
                ),
            });
        }

        if synthesis.sample_rate == 0 {
            return Err(ConfigError::InvalidValue {
                field: "synthesis.sample_rate".to_string(),
                message: "Sample rate cannot be 0".to_string(),
            });
        }

        if synthesis.player.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "synthesis.player".to_string(),
                message: "Playback executable cannot be empty".to_string(),
            });
        }

        if self.environment.is_strict() && synthesis.api_key.is_none() {
            tracing::warn!("synthesis.api_key not set; speaking phases will fail at first use");
        }

        Ok(())
    }

    /// Validate conversation configuration
    fn validate_conversation(&self) -> Result<(), ConfigError> {
        let conversation = &self.conversation;

        if conversation.exit_phrase.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "conversation.exit_phrase".to_string(),
                message: "Exit phrase cannot be empty".to_string(),
            });
        }

        if conversation.max_silent_listens == 0 {
            return Err(ConfigError::InvalidValue {
                field: "conversation.max_silent_listens".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// CORS allowed origins (empty = any origin)
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_enabled: default_true(),
            cors_origins: Vec::new(),
        }
    }
}

/// Prediction endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionConfig {
    /// Prediction API endpoint URL
    #[serde(default = "default_prediction_endpoint")]
    pub endpoint: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_prediction_timeout")]
    pub timeout_seconds: u64,

    /// Total attempts per question, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Sleep before the first re-attempt; doubles per retry (ms)
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
}

fn default_prediction_endpoint() -> String {
    "https://govnamics.onrender.com/api/v1/prediction/55acb087-8f53-4e7d-adf7-3e08463bb88a"
        .to_string()
}
fn default_prediction_timeout() -> u64 {
    30
}
fn default_max_attempts() -> u32 {
    3
}
fn default_initial_backoff_ms() -> u64 {
    1000
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            endpoint: default_prediction_endpoint(),
            timeout_seconds: default_prediction_timeout(),
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub log_json: bool,

    /// Enable metrics
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_true() -> bool {
    true
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            metrics_enabled: true,
        }
    }
}

/// Load settings from files and environment
///
/// Priority (highest to lowest):
/// 1. Environment variables (VOICELINE_ prefix)
/// 2. config/{env}.toml (if env specified)
/// 3. config/default.toml
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    load_settings_from(Path::new("config"), env)
}

/// Load settings rooted at a specific configuration directory
pub fn load_settings_from(dir: &Path, env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    // Load default config
    builder = builder.add_source(File::from(dir.join("default")).required(false));

    // Load environment-specific config; an explicitly requested overlay must exist
    if let Some(env_name) = env {
        let overlay = dir.join(env_name).with_extension("toml");
        if !overlay.is_file() {
            return Err(ConfigError::FileNotFound(overlay.display().to_string()));
        }
        builder = builder.add_source(File::from(overlay));
    }

    // Load from environment variables
    builder = builder.add_source(
        Environment::with_prefix("VOICELINE")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    // Validate
    settings.validate()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.recognition.model, "nova-2");
        assert_eq!(settings.recognition.sample_rate, 16_000);
        assert_eq!(settings.synthesis.model, "aura-stella-en");
        assert_eq!(settings.synthesis.player, "ffplay");
        assert_eq!(settings.prediction.max_attempts, 3);
        assert_eq!(settings.conversation.exit_phrase, "goodbye");
        assert_eq!(settings.conversation.max_silent_listens, 5);
    }

    #[test]
    fn test_server_validation() {
        let mut settings = Settings::default();

        settings.server.port = 0;
        assert!(settings.validate_server().is_err());
        settings.server.port = 8080;

        assert!(settings.validate_server().is_ok());
    }

    #[test]
    fn test_recognition_validation() {
        let mut settings = Settings::default();

        // Endpoint must be a websocket URL
        settings.recognition.endpoint = "https://api.deepgram.com/v1/listen".to_string();
        assert!(settings.validate_recognition().is_err());
        settings.recognition.endpoint = "wss://api.deepgram.com/v1/listen".to_string();

        settings.recognition.sample_rate = 0;
        assert!(settings.validate_recognition().is_err());
        settings.recognition.sample_rate = 16_000;

        settings.recognition.channels = 0;
        assert!(settings.validate_recognition().is_err());
        settings.recognition.channels = 1;

        settings.recognition.chunk_ms = 0;
        assert!(settings.validate_recognition().is_err());
        settings.recognition.chunk_ms = 30;

        assert!(settings.validate_recognition().is_ok());
    }

    #[test]
    fn test_prediction_validation() {
        let mut settings = Settings::default();

        settings.prediction.endpoint = "ftp://example.com".to_string();
        assert!(settings.validate_prediction().is_err());
        settings.prediction.endpoint = "http://127.0.0.1:9000/predict".to_string();

        settings.prediction.max_attempts = 0;
        assert!(settings.validate_prediction().is_err());
        settings.prediction.max_attempts = 3;

        settings.prediction.timeout_seconds = 0;
        assert!(settings.validate_prediction().is_err());
        settings.prediction.timeout_seconds = 30;

        assert!(settings.validate_prediction().is_ok());
    }

    #[test]
    fn test_synthesis_validation() {
        let mut settings = Settings::default();

        settings.synthesis.player = String::new();
        assert!(settings.validate_synthesis().is_err());
        settings.synthesis.player = "ffplay".to_string();

        settings.synthesis.sample_rate = 0;
        assert!(settings.validate_synthesis().is_err());
        settings.synthesis.sample_rate = 24_000;

        assert!(settings.validate_synthesis().is_ok());
    }

    #[test]
    fn test_conversation_validation() {
        let mut settings = Settings::default();

        settings.conversation.exit_phrase = "  ".to_string();
        assert!(settings.validate_conversation().is_err());
        settings.conversation.exit_phrase = "goodbye".to_string();

        settings.conversation.max_silent_listens = 0;
        assert!(settings.validate_conversation().is_err());
        settings.conversation.max_silent_listens = 5;

        assert!(settings.validate_conversation().is_ok());
    }

    #[test]
    fn test_load_settings_missing_files_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();

        let settings = load_settings_from(dir.path(), None).unwrap();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.recognition.language, "en-US");
    }

    #[test]
    fn test_load_settings_from_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("default.toml"),
            "[server]\nport = 9999\n\n[conversation]\nexit_phrase = \"bye\"\n",
        )
        .unwrap();

        let settings = load_settings_from(dir.path(), None).unwrap();
        assert_eq!(settings.server.port, 9999);
        assert_eq!(settings.conversation.exit_phrase, "bye");
        // Untouched sections keep their defaults
        assert_eq!(settings.recognition.model, "nova-2");
    }

    #[test]
    fn test_load_settings_env_overlay_wins() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("default.toml"), "[server]\nport = 9000\n").unwrap();
        std::fs::write(dir.path().join("production.toml"), "[server]\nport = 9443\n").unwrap();

        let settings = load_settings_from(dir.path(), Some("production")).unwrap();
        assert_eq!(settings.server.port, 9443);
    }

    #[test]
    fn test_load_settings_missing_overlay_is_an_error() {
        let dir = tempfile::tempdir().unwrap();

        let err = load_settings_from(dir.path(), Some("staging")).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_load_settings_rejects_invalid_file_values() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("default.toml"),
            "[prediction]\nmax_attempts = 0\n",
        )
        .unwrap();

        let err = load_settings_from(dir.path(), None).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }
}
