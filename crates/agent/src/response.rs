//! Tutor reply generation
//!
//! The reply answers the corrected sentence, not the raw input. Failures
//! never propagate: the error text becomes the reply so the learner sees
//! it in the chat.

use std::sync::Arc;

use tutor_config::constants::sentinels;
use tutor_config::prompts::tutor_system_prompt;
use tutor_config::ReplyConfig;
use tutor_core::{preview, ConversationTurn, GenerateRequest, LanguageModel};
use tutor_text_processing::{stage, StageOutcome};

/// Persona-driven reply stage
#[derive(Clone)]
pub struct ReplyGenerator {
    llm: Arc<dyn LanguageModel>,
    persona_name: String,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl ReplyGenerator {
    pub fn new(
        llm: Arc<dyn LanguageModel>,
        persona_name: impl Into<String>,
        temperature: f32,
    ) -> Self {
        Self {
            llm,
            persona_name: persona_name.into(),
            temperature,
            max_tokens: None,
        }
    }

    pub fn from_config(llm: Arc<dyn LanguageModel>, config: &ReplyConfig) -> Self {
        Self::new(llm, config.persona_name.clone(), config.temperature)
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    fn build_request(&self, final_text: &str, knowledge: &str) -> GenerateRequest {
        let request = GenerateRequest::new(tutor_system_prompt(&self.persona_name, knowledge))
            .with_user_message(final_text)
            .with_temperature(self.temperature);

        match self.max_tokens {
            Some(max_tokens) => request.with_max_tokens(max_tokens),
            None => request,
        }
    }

    /// Reply text, or `오류 발생: <error>` when the model call fails
    ///
    /// History is not sent to the model; it is only logged.
    pub async fn generate(
        &self,
        final_text: &str,
        history: &[ConversationTurn],
        knowledge: &str,
    ) -> String {
        self.generate_traced(final_text, history, knowledge).await.text
    }

    /// Like [`generate`](Self::generate), reporting whether the error text was used
    pub async fn generate_traced(
        &self,
        final_text: &str,
        history: &[ConversationTurn],
        knowledge: &str,
    ) -> StageOutcome {
        tracing::debug!(
            input = %preview(final_text),
            history_turns = history.len(),
            "Generating reply"
        );

        match self.llm.generate(self.build_request(final_text, knowledge)).await {
            Ok(response) => {
                if let Some(usage) = response.usage {
                    tracing::info!(
                        stage = stage::REPLY,
                        prompt_tokens = usage.prompt_tokens,
                        completion_tokens = usage.completion_tokens,
                        "Reply token usage"
                    );
                }
                StageOutcome::ok(response.text.trim())
            },
            Err(e) => {
                tracing::error!(
                    stage = stage::REPLY,
                    error = %e,
                    input = %preview(final_text),
                    "Reply generation failed"
                );
                StageOutcome::fallback(format!("{}: {}", sentinels::REPLY_ERROR_PREFIX, e))
            },
        }
    }

    pub fn model_name(&self) -> &str {
        self.llm.model_name()
    }

    pub async fn is_available(&self) -> bool {
        self.llm.is_available().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tutor_core::{Error, GenerateResponse, Result, TokenUsage};

    /// Remembers the last request and answers with a fixed reply
    struct RecordingLlm {
        last: Mutex<Option<GenerateRequest>>,
    }

    #[async_trait]
    impl LanguageModel for RecordingLlm {
        async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse> {
            *self.last.lock().unwrap() = Some(request);
            Ok(GenerateResponse::text("  좋아요! 학교에서 무엇을 배워요?\n")
                .with_usage(TokenUsage::new(80, 12)))
        }

        async fn is_available(&self) -> bool {
            true
        }

        fn model_name(&self) -> &str {
            "recording"
        }
    }

    struct FailingLlm;

    #[async_trait]
    impl LanguageModel for FailingLlm {
        async fn generate(&self, _request: GenerateRequest) -> Result<GenerateResponse> {
            Err(Error::Llm("rate limited".to_string()))
        }

        async fn is_available(&self) -> bool {
            false
        }

        fn model_name(&self) -> &str {
            "failing"
        }
    }

    #[tokio::test]
    async fn test_reply_uses_final_text_and_knowledge() {
        let llm = Arc::new(RecordingLlm {
            last: Mutex::new(None),
        });
        let generator = ReplyGenerator::new(llm.clone(), "무궁화", 0.7);
        let history = vec![ConversationTurn::learner("안녕하세요")];

        let reply = generator
            .generate("나는 학교에 가요", &history, "관련 지식 없음")
            .await;
        assert_eq!(reply, "좋아요! 학교에서 무엇을 배워요?");

        let request = llm.last.lock().unwrap().take().unwrap();
        let system = request.system_prompt().unwrap();
        assert!(system.contains("무궁화"));
        assert!(system.contains("참고 지식: 관련 지식 없음"));
        assert_eq!(request.last_user_message(), Some("나는 학교에 가요"));
        assert_eq!(request.temperature, Some(0.7));
        // History is not part of the prompt
        assert_eq!(request.messages.len(), 2);
    }

    #[tokio::test]
    async fn test_failure_becomes_visible_reply() {
        let generator = ReplyGenerator::new(Arc::new(FailingLlm), "무궁화", 0.7);
        let outcome = generator
            .generate_traced("나는 학교에 가요", &[], "관련 지식 없음")
            .await;
        assert_eq!(outcome.text, "오류 발생: LLM error: rate limited");
        assert!(outcome.fell_back);
    }

    #[test]
    fn test_from_config() {
        let generator = ReplyGenerator::from_config(
            Arc::new(FailingLlm),
            &ReplyConfig {
                temperature: 0.5,
                persona_name: "세종".to_string(),
            },
        );
        let request = generator.build_request("안녕", "지식");
        assert!(request.system_prompt().unwrap().contains("세종"));
        assert_eq!(request.temperature, Some(0.5));
        assert_eq!(generator.model_name(), "failing");
    }
}
