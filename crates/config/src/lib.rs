//! Configuration management for the voiceline agent
//!
//! Supports loading configuration from:
//! - TOML files (config/default.toml plus an optional environment overlay)
//! - Environment variables (VOICELINE_ prefix, `__` separator)
//!
//! Service API keys are optional at load time; the component that needs a
//! key raises a configuration error at first use.

pub mod conversation;
pub mod pipeline;
pub mod settings;

pub use conversation::ConversationConfig;
pub use pipeline::{RecognitionConfig, SynthesisConfig};
pub use settings::{
    load_settings, load_settings_from, ObservabilityConfig, PredictionConfig, RuntimeEnvironment,
    ServerConfig, Settings,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
