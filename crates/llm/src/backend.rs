//! LLM Backend implementations
//!
//! Two chat-completion backends, both non-streaming:
//! - [`OpenAIBackend`]: OpenAI `/chat/completions` and compatible servers
//! - [`OllamaBackend`]: local Ollama `/api/chat`
//!
//! Sampling parameters travel with each call in [`GenerationOptions`]
//! because the rewrite and reply stages use different temperatures
//! against the same backend.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tutor_config::constants::{endpoints, generation};
use tutor_core::{FinishReason, Message, Role, TokenUsage};

use crate::LlmError;

/// Per-call sampling parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: Option<f32>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: generation::REPLY_TEMPERATURE,
            max_tokens: generation::MAX_TOKENS,
            top_p: None,
        }
    }
}

/// LLM generation result
#[derive(Debug, Clone)]
pub struct GenerationResult {
    /// Generated text
    pub text: String,
    /// Token counts, when the backend reports them
    pub usage: Option<TokenUsage>,
    /// Total generation time (ms)
    pub total_time_ms: u64,
    /// Finish reason
    pub finish_reason: FinishReason,
}

fn finish_reason(reason: Option<&str>) -> FinishReason {
    match reason {
        Some("length") => FinishReason::Length,
        Some("content_filter") => FinishReason::ContentFilter,
        _ => FinishReason::Stop,
    }
}

/// LLM Backend trait
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Generate a response
    async fn generate(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<GenerationResult, LlmError>;

    /// Check if model is available
    async fn is_available(&self) -> bool;

    /// Get model name
    fn model_name(&self) -> &str;
}

fn role_name(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

// =============================================================================
// Ollama
// =============================================================================

/// Ollama backend configuration
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Model name/ID
    pub model: String,
    /// API endpoint
    pub endpoint: String,
    /// Request timeout
    pub timeout: Duration,
    /// Maximum retry attempts for transient failures
    pub max_retries: u32,
    /// Initial backoff duration (doubles each retry)
    pub initial_backoff: Duration,
    /// How long Ollama keeps the model loaded after a call ("5m", "-1", ...)
    pub keep_alive: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            model: "qwen2.5:7b-instruct".to_string(),
            endpoint: endpoints::OLLAMA_DEFAULT.to_string(),
            timeout: Duration::from_secs(generation::TIMEOUT_SECS),
            max_retries: 2,
            initial_backoff: Duration::from_millis(200),
            keep_alive: "5m".to_string(),
        }
    }
}

/// Ollama backend
#[derive(Clone)]
pub struct OllamaBackend {
    client: Client,
    config: OllamaConfig,
}

impl OllamaBackend {
    /// Create a new Ollama backend
    pub fn new(config: OllamaConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Build the API URL
    fn api_url(&self, path: &str) -> String {
        format!("{}/api{}", self.config.endpoint.trim_end_matches('/'), path)
    }

    fn build_request(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> OllamaChatRequest {
        OllamaChatRequest {
            model: self.config.model.clone(),
            messages: messages.iter().map(ChatMessage::from).collect(),
            stream: false,
            options: Some(OllamaOptions {
                temperature: Some(options.temperature),
                top_p: options.top_p,
                num_predict: Some(options.max_tokens as i32),
            }),
            keep_alive: Some(self.config.keep_alive.clone()),
        }
    }

    /// Execute a single request (used by retry logic)
    async fn execute_request(
        &self,
        request: &OllamaChatRequest,
    ) -> Result<OllamaChatResponse, LlmError> {
        let response = self
            .client
            .post(self.api_url("/chat"))
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error = response.text().await.unwrap_or_default();
            // 5xx errors are retryable, 4xx are not
            if status.is_server_error() {
                return Err(LlmError::Network(format!("Server error {}: {}", status, error)));
            }
            return Err(LlmError::Api(format!("HTTP {}: {}", status, error)));
        }

        response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))
    }

    /// Check if an error is retryable
    fn is_retryable(error: &LlmError) -> bool {
        matches!(error, LlmError::Network(_) | LlmError::Timeout)
    }
}

#[async_trait]
impl LlmBackend for OllamaBackend {
    /// Generate a response, retrying transient failures with backoff
    async fn generate(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<GenerationResult, LlmError> {
        let start = Instant::now();
        let request = self.build_request(messages, options);

        let mut last_error = None;
        let mut backoff = self.config.initial_backoff;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                tracing::warn!(
                    "LLM request failed, retrying in {:?} (attempt {}/{})",
                    backoff,
                    attempt,
                    self.config.max_retries
                );
                tokio::time::sleep(backoff).await;
                backoff *= 2;
            }

            match self.execute_request(&request).await {
                Ok(result) => {
                    let usage = match (result.prompt_eval_count, result.eval_count) {
                        (None, None) => None,
                        (prompt, completion) => Some(TokenUsage::new(
                            prompt.unwrap_or(0) as u32,
                            completion.unwrap_or(0) as u32,
                        )),
                    };
                    return Ok(GenerationResult {
                        text: result.message.content,
                        usage,
                        total_time_ms: start.elapsed().as_millis() as u64,
                        finish_reason: finish_reason(result.done_reason.as_deref()),
                    });
                },
                Err(e) if Self::is_retryable(&e) => {
                    last_error = Some(e);
                },
                Err(e) => {
                    return Err(e);
                },
            }
        }

        Err(last_error.unwrap_or_else(|| LlmError::Network("Max retries exceeded".to_string())))
    }

    async fn is_available(&self) -> bool {
        self.client
            .get(self.api_url("/tags"))
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

/// Chat message in the wire format shared by both APIs
#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

impl From<&Message> for ChatMessage {
    fn from(msg: &Message) -> Self {
        Self {
            role: role_name(msg.role).to_string(),
            content: msg.content.clone(),
        }
    }
}

// Ollama API types
#[derive(Debug, Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    keep_alive: Option<String>,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: ChatMessage,
    #[serde(default)]
    done_reason: Option<String>,
    #[serde(default)]
    prompt_eval_count: Option<u64>,
    #[serde(default)]
    eval_count: Option<u64>,
}

// =============================================================================
// OpenAI-compatible
// =============================================================================

/// Configuration for OpenAI-compatible backends
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// API endpoint (OpenAI: https://api.openai.com/v1)
    pub endpoint: String,
    /// API key
    pub api_key: String,
    /// Model name (gpt-3.5-turbo, gpt-4o-mini, ...)
    pub model: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            endpoint: endpoints::OPENAI_DEFAULT.to_string(),
            api_key: String::new(),
            model: generation::DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(generation::TIMEOUT_SECS),
        }
    }
}

impl OpenAIConfig {
    /// Create config for OpenAI
    pub fn openai(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            ..Default::default()
        }
    }

}

fn is_local(endpoint: &str) -> bool {
    endpoint.starts_with("http://localhost") || endpoint.starts_with("http://127.0.0.1")
}

/// OpenAI-compatible backend
///
/// Works with:
/// - OpenAI
/// - vLLM
/// - Local servers with OpenAI-compatible APIs
pub struct OpenAIBackend {
    config: OpenAIConfig,
    client: Client,
}

impl OpenAIBackend {
    /// Create new OpenAI backend
    pub fn new(config: OpenAIConfig) -> Result<Self, LlmError> {
        if config.api_key.trim().is_empty() && !is_local(&config.endpoint) {
            return Err(LlmError::Configuration(
                "API key required for remote endpoints".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Get the full API URL for chat completions
    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.config.endpoint.trim_end_matches('/'))
    }

    fn build_request(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> OpenAIChatRequest {
        OpenAIChatRequest {
            model: self.config.model.clone(),
            messages: messages.iter().map(ChatMessage::from).collect(),
            max_tokens: Some(options.max_tokens),
            temperature: Some(options.temperature),
            top_p: options.top_p,
            stream: Some(false),
        }
    }
}

#[async_trait]
impl LlmBackend for OpenAIBackend {
    async fn generate(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<GenerationResult, LlmError> {
        let start = Instant::now();
        let request = self.build_request(messages, options);

        let response = self
            .client
            .post(self.chat_url())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("HTTP {}: {}", status, error_text)));
        }

        let response: OpenAIChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidResponse("No choices in response".to_string()))?;

        let text = choice
            .message
            .content
            .ok_or_else(|| LlmError::InvalidResponse("Choice has no content".to_string()))?;

        Ok(GenerationResult {
            text,
            usage: response
                .usage
                .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens)),
            total_time_ms: start.elapsed().as_millis() as u64,
            finish_reason: finish_reason(choice.finish_reason.as_deref()),
        })
    }

    async fn is_available(&self) -> bool {
        let url = format!("{}/models", self.config.endpoint.trim_end_matches('/'));
        self.client
            .get(&url)
            .bearer_auth(&self.config.api_key)
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

// OpenAI API types
#[derive(Debug, Serialize)]
struct OpenAIChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChatResponse {
    choices: Vec<OpenAIChoice>,
    #[serde(default)]
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages() -> Vec<Message> {
        vec![
            Message::system("당신은 친절한 한국어 선생님입니다."),
            Message::user("안녕하세요"),
        ]
    }

    #[test]
    fn test_openai_config_openai() {
        let config = OpenAIConfig::openai("sk-xxx", "gpt-3.5-turbo");
        assert_eq!(config.api_key, "sk-xxx");
        assert_eq!(config.model, "gpt-3.5-turbo");
        assert_eq!(config.endpoint, "https://api.openai.com/v1");
    }

    fn local(endpoint: &str) -> OpenAIConfig {
        OpenAIConfig {
            endpoint: endpoint.to_string(),
            model: "llama-3".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_openai_backend_creation() {
        // Local endpoint should work without API key
        let config = local("http://localhost:8000");
        assert!(OpenAIBackend::new(config).is_ok());

        // Remote endpoint requires API key
        let config = OpenAIConfig::default();
        assert!(matches!(
            OpenAIBackend::new(config),
            Err(LlmError::Configuration(_))
        ));

        // With API key should work
        let config = OpenAIConfig::openai("sk-xxx", "gpt-3.5-turbo");
        assert!(OpenAIBackend::new(config).is_ok());
    }

    #[test]
    fn test_openai_chat_url() {
        let config = OpenAIConfig::openai("sk-xxx", "gpt-3.5-turbo");
        let backend = OpenAIBackend::new(config).unwrap();
        assert_eq!(backend.chat_url(), "https://api.openai.com/v1/chat/completions");

        let config = local("http://localhost:8000/v1/");
        let backend = OpenAIBackend::new(config).unwrap();
        assert_eq!(backend.chat_url(), "http://localhost:8000/v1/chat/completions");
    }

    #[test]
    fn test_openai_request_serialization() {
        let backend = OpenAIBackend::new(OpenAIConfig::openai("sk-xxx", "gpt-3.5-turbo")).unwrap();
        let options = GenerationOptions {
            temperature: 0.1,
            max_tokens: 256,
            top_p: None,
        };
        let json = serde_json::to_value(backend.build_request(&messages(), &options)).unwrap();

        assert_eq!(json["model"], "gpt-3.5-turbo");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "안녕하세요");
        assert_eq!(json["max_tokens"], 256);
        assert!((json["temperature"].as_f64().unwrap() - 0.1).abs() < 1e-6);
        assert!(json.get("top_p").is_none());
    }

    #[test]
    fn test_openai_response_parsing() {
        let body = r#"{
            "id": "chatcmpl-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "나는 학교에 가요"}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 312, "completion_tokens": 9, "total_tokens": 321}
        }"#;
        let parsed: OpenAIChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("나는 학교에 가요"));
        assert_eq!(parsed.usage.unwrap().prompt_tokens, 312);
        assert_eq!(
            finish_reason(parsed.choices[0].finish_reason.as_deref()),
            FinishReason::Stop
        );
    }

    #[test]
    fn test_ollama_request_serialization() {
        let backend = OllamaBackend::new(OllamaConfig::default()).unwrap();
        let options = GenerationOptions {
            temperature: 0.7,
            max_tokens: 128,
            top_p: Some(0.9),
        };
        let json = serde_json::to_value(backend.build_request(&messages(), &options)).unwrap();

        assert_eq!(json["stream"], false);
        assert_eq!(json["options"]["num_predict"], 128);
        assert_eq!(json["keep_alive"], "5m");
        assert_eq!(json["messages"][0]["role"], "system");
    }

    #[test]
    fn test_ollama_api_url() {
        let config = OllamaConfig {
            endpoint: "http://localhost:11434/".to_string(),
            ..Default::default()
        };
        let backend = OllamaBackend::new(config).unwrap();
        assert_eq!(backend.api_url("/chat"), "http://localhost:11434/api/chat");
    }

    #[test]
    fn test_ollama_response_parsing() {
        let body = r#"{
            "model": "qwen2.5:7b-instruct",
            "message": {"role": "assistant", "content": "안녕하세요!"},
            "done": true,
            "done_reason": "stop",
            "prompt_eval_count": 40,
            "eval_count": 5
        }"#;
        let parsed: OllamaChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.message.content, "안녕하세요!");
        assert_eq!(parsed.eval_count, Some(5));
    }

    #[test]
    fn test_retryable_errors() {
        assert!(OllamaBackend::is_retryable(&LlmError::Network("reset".into())));
        assert!(OllamaBackend::is_retryable(&LlmError::Timeout));
        assert!(!OllamaBackend::is_retryable(&LlmError::Api("bad request".into())));
    }
}
