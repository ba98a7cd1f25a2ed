//! Language model integration
//!
//! Features:
//! - OpenAI-compatible and Ollama chat backends
//! - Retry with exponential backoff for transient failures (Ollama)
//! - Adapter onto the core [`LanguageModel`](tutor_core::LanguageModel) trait
//! - Configuration-driven factory

pub mod adapter;
pub mod backend;
pub mod factory;

pub use adapter::LanguageModelAdapter;
pub use backend::{
    GenerationOptions, GenerationResult, LlmBackend, OllamaBackend, OllamaConfig, OpenAIBackend,
    OpenAIConfig,
};
pub use factory::{
    create_backend, create_language_model, language_model_or_disabled, DisabledLanguageModel,
};

use thiserror::Error;

/// LLM errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<LlmError> for tutor_core::Error {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Configuration(msg) => tutor_core::Error::Config(msg),
            other => tutor_core::Error::Llm(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        let err: tutor_core::Error = LlmError::Timeout.into();
        assert_eq!(err, tutor_core::Error::Llm("Timeout".to_string()));

        let err: tutor_core::Error = LlmError::Configuration("no key".into()).into();
        assert_eq!(err, tutor_core::Error::Config("no key".to_string()));
    }
}
