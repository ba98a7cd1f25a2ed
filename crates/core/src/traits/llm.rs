//! Language Model traits

use crate::{GenerateRequest, GenerateResponse, Result};
use async_trait::async_trait;

/// Language Model interface
///
/// Implementations:
/// - `LanguageModelAdapter` - wraps an OpenAI-compatible or Ollama backend
/// - `DisabledLanguageModel` - always fails, used when no backend is configured
///
/// # Example
///
/// ```ignore
/// let llm: Arc<dyn LanguageModel> = Arc::new(LanguageModelAdapter::new(backend));
/// let request = GenerateRequest::new("당신은 친절한 한국어 선생님입니다.")
///     .with_user_message("안녕하세요")
///     .with_temperature(0.7);
/// let response = llm.generate(request).await?;
/// println!("{}", response.text);
/// ```
#[async_trait]
pub trait LanguageModel: Send + Sync + 'static {
    /// Generate a completion for the request's messages
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse>;

    /// Check if model is available
    ///
    /// Returns false if the backend is unreachable or not configured.
    async fn is_available(&self) -> bool;

    /// Get model name for logging
    fn model_name(&self) -> &str;
}
