//! LLM Factory
//!
//! Builds the configured backend and wraps it in the core trait. When the
//! backend cannot be built (missing API key, bad client config) the server
//! still starts with [`DisabledLanguageModel`]; both model stages then fall
//! back on every request.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tutor_config::constants::endpoints;
use tutor_config::{LlmConfig, LlmProvider};
use tutor_core::{Error, GenerateRequest, GenerateResponse, LanguageModel, Result};

use crate::adapter::LanguageModelAdapter;
use crate::backend::{LlmBackend, OllamaBackend, OllamaConfig, OpenAIBackend, OpenAIConfig};
use crate::LlmError;

/// Create a raw backend for the configured provider
pub fn create_backend(config: &LlmConfig) -> std::result::Result<Arc<dyn LlmBackend>, LlmError> {
    let timeout = Duration::from_secs(config.timeout_secs);

    match config.provider {
        LlmProvider::OpenAI => {
            let api_key = config.api_key.clone().unwrap_or_default();
            let openai_config = OpenAIConfig {
                endpoint: config.endpoint.clone(),
                timeout,
                ..OpenAIConfig::openai(api_key, config.model.clone())
            };
            Ok(Arc::new(OpenAIBackend::new(openai_config)?))
        },

        LlmProvider::Ollama => {
            // The shared endpoint default points at OpenAI
            let endpoint = if config.endpoint == endpoints::OPENAI_DEFAULT {
                endpoints::OLLAMA_DEFAULT.to_string()
            } else {
                config.endpoint.clone()
            };

            let ollama_config = OllamaConfig {
                model: config.model.clone(),
                endpoint,
                timeout,
                ..Default::default()
            };
            Ok(Arc::new(OllamaBackend::new(ollama_config)?))
        },
    }
}

/// Create a LanguageModel from config (implements core trait)
pub fn create_language_model(
    config: &LlmConfig,
) -> std::result::Result<Arc<dyn LanguageModel>, LlmError> {
    let backend = create_backend(config)?;
    tracing::info!(
        provider = ?config.provider,
        model = %backend.model_name(),
        "Language model configured"
    );
    Ok(Arc::new(
        LanguageModelAdapter::from_arc(backend).with_default_max_tokens(config.max_tokens),
    ))
}

/// Configured model, or a disabled one when it cannot be built
pub fn language_model_or_disabled(config: &LlmConfig) -> Arc<dyn LanguageModel> {
    match create_language_model(config) {
        Ok(model) => model,
        Err(e) => {
            tracing::warn!(
                error = %e,
                "Language model unavailable, correction and replies will fall back"
            );
            Arc::new(DisabledLanguageModel::new(e.to_string()))
        },
    }
}

/// Model that refuses every request
pub struct DisabledLanguageModel {
    reason: String,
}

impl DisabledLanguageModel {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl LanguageModel for DisabledLanguageModel {
    async fn generate(&self, _request: GenerateRequest) -> Result<GenerateResponse> {
        Err(Error::Llm(format!("model disabled: {}", self.reason)))
    }

    async fn is_available(&self) -> bool {
        false
    }

    fn model_name(&self) -> &str {
        "disabled"
    }
}
