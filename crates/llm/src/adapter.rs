//! Language Model adapter
//!
//! Bridges the [`LlmBackend`] trait to the core [`LanguageModel`] trait so
//! the correction and reply stages only ever see the core trait.

use std::sync::Arc;

use async_trait::async_trait;
use tutor_config::constants::generation;
use tutor_core::{Error, GenerateRequest, GenerateResponse, LanguageModel, Result};

use crate::backend::{GenerationOptions, LlmBackend};

/// Adapter that wraps an LlmBackend to implement the core LanguageModel trait.
///
/// # Example
///
/// ```ignore
/// let backend = OpenAIBackend::new(OpenAIConfig::openai(key, "gpt-3.5-turbo"))?;
/// let model: Arc<dyn LanguageModel> = Arc::new(LanguageModelAdapter::new(backend));
/// ```
pub struct LanguageModelAdapter {
    backend: Arc<dyn LlmBackend>,
    model_name: String,
    default_max_tokens: u32,
}

impl LanguageModelAdapter {
    /// Create a new adapter wrapping an LlmBackend
    pub fn new<B: LlmBackend + 'static>(backend: B) -> Self {
        Self::from_arc(Arc::new(backend))
    }

    /// Create from an Arc'd backend
    pub fn from_arc(backend: Arc<dyn LlmBackend>) -> Self {
        let model_name = backend.model_name().to_string();
        Self {
            backend,
            model_name,
            default_max_tokens: generation::MAX_TOKENS,
        }
    }

    /// Token cap used when a request does not set one
    pub fn with_default_max_tokens(mut self, max_tokens: u32) -> Self {
        self.default_max_tokens = max_tokens;
        self
    }

    fn options(&self, request: &GenerateRequest) -> GenerationOptions {
        GenerationOptions {
            temperature: request.temperature.unwrap_or(generation::REPLY_TEMPERATURE),
            max_tokens: request.max_tokens.unwrap_or(self.default_max_tokens),
            top_p: request.top_p,
        }
    }
}

#[async_trait]
impl LanguageModel for LanguageModelAdapter {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse> {
        if request.messages.is_empty() {
            return Err(Error::InvalidInput("request has no messages".to_string()));
        }

        let options = self.options(&request);
        let result = self.backend.generate(&request.messages, &options).await?;

        tracing::debug!(
            model = %self.model_name,
            total_time_ms = result.total_time_ms,
            "Generation complete"
        );

        Ok(GenerateResponse {
            text: result.text,
            finish_reason: result.finish_reason,
            usage: result.usage,
        })
    }

    async fn is_available(&self) -> bool {
        self.backend.is_available().await
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::GenerationResult;
    use crate::LlmError;
    use std::sync::Mutex;
    use tutor_core::{FinishReason, Message, TokenUsage};

    /// Records the options it was called with
    struct MockBackend {
        seen: Mutex<Vec<GenerationOptions>>,
        fail: bool,
    }

    impl MockBackend {
        fn new() -> Self {
            Self {
                seen: Mutex::new(Vec::new()),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                seen: Mutex::new(Vec::new()),
                fail: true,
            }
        }
    }

    #[async_trait]
    impl LlmBackend for MockBackend {
        async fn generate(
            &self,
            messages: &[Message],
            options: &GenerationOptions,
        ) -> std::result::Result<GenerationResult, LlmError> {
            self.seen.lock().unwrap().push(*options);
            if self.fail {
                return Err(LlmError::Network("connection refused".to_string()));
            }
            let last = messages.last().map(|m| m.content.clone()).unwrap_or_default();
            Ok(GenerationResult {
                text: format!("echo: {}", last),
                usage: Some(TokenUsage::new(10, 3)),
                total_time_ms: 1,
                finish_reason: FinishReason::Stop,
            })
        }

        async fn is_available(&self) -> bool {
            !self.fail
        }

        fn model_name(&self) -> &str {
            "mock-model"
        }
    }

    #[tokio::test]
    async fn test_adapter_generate() {
        let adapter = LanguageModelAdapter::new(MockBackend::new());
        let request = GenerateRequest::new("system").with_user_message("안녕");

        let response = adapter.generate(request).await.unwrap();
        assert_eq!(response.text, "echo: 안녕");
        assert_eq!(response.usage.unwrap().total_tokens, 13);
        assert_eq!(adapter.model_name(), "mock-model");
        assert!(adapter.is_available().await);
    }

    #[tokio::test]
    async fn test_request_parameters_reach_backend() {
        let backend = Arc::new(MockBackend::new());
        let adapter = LanguageModelAdapter::from_arc(backend.clone()).with_default_max_tokens(64);

        let request = GenerateRequest::new("system")
            .with_user_message("교정")
            .with_temperature(0.1);
        adapter.generate(request).await.unwrap();

        let request = GenerateRequest::new("system")
            .with_user_message("대답")
            .with_max_tokens(200);
        adapter.generate(request).await.unwrap();

        let seen = backend.seen.lock().unwrap();
        assert!((seen[0].temperature - 0.1).abs() < f32::EPSILON);
        assert_eq!(seen[0].max_tokens, 64);
        assert!((seen[1].temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(seen[1].max_tokens, 200);
    }

    #[tokio::test]
    async fn test_backend_error_maps_to_core_error() {
        let adapter = LanguageModelAdapter::new(MockBackend::failing());
        let request = GenerateRequest::new("system").with_user_message("안녕");

        let err = adapter.generate(request).await.unwrap_err();
        assert!(matches!(err, Error::Llm(_)));
        assert!(!adapter.is_available().await);
    }
}
