//! Configuration management for the Korean tutor
//!
//! Supports loading configuration from:
//! - YAML/TOML files under `config/`
//! - Environment variables (`TUTOR__` prefix, `__` between levels)
//!
//! Prompt text for the two model calls lives in [`prompts`] so that the
//! correction policy is reviewed in one place.

pub mod constants;
pub mod prompts;
pub mod settings;

pub use settings::{
    load_settings, CorrectionConfig, KnowledgeConfig, LlmConfig, LlmProvider,
    ObservabilityConfig, ReplyConfig, RuntimeEnvironment, ServerConfig, Settings, SpacingConfig,
    SpacingProvider, SpellingConfig,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
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

impl From<ConfigError> for tutor_core::Error {
    fn from(err: ConfigError) -> Self {
        tutor_core::Error::Config(err.to_string())
    }
}
