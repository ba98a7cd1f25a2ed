//! LLM-based contextual rewrite

use std::sync::Arc;

use tutor_config::prompts::{correction_user_prompt, CORRECTION_SYSTEM_PROMPT};
use tutor_config::CorrectionConfig;
use tutor_core::{preview, ConversationTurn, GenerateRequest, LanguageModel, ProficiencyLevel};

use super::build_transcript;
use crate::{stage, StageOutcome};

/// Rewrites a sentence through the language model under the strict
/// correction policy. Falls back to its input on any failure.
#[derive(Clone)]
pub struct ContextualRewriter {
    llm: Arc<dyn LanguageModel>,
    temperature: f32,
    history_window: usize,
    max_tokens: Option<u32>,
}

impl ContextualRewriter {
    pub fn new(llm: Arc<dyn LanguageModel>, temperature: f32, history_window: usize) -> Self {
        Self {
            llm,
            temperature,
            history_window,
            max_tokens: None,
        }
    }

    /// Create from the correction settings
    pub fn from_config(llm: Arc<dyn LanguageModel>, config: &CorrectionConfig) -> Self {
        Self::new(llm, config.temperature, config.history_window)
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    fn build_request(
        &self,
        text: &str,
        history: &[ConversationTurn],
        level: &ProficiencyLevel,
    ) -> GenerateRequest {
        let transcript = build_transcript(history, self.history_window);
        let request = GenerateRequest::new(CORRECTION_SYSTEM_PROMPT)
            .with_user_message(correction_user_prompt(&transcript, level.as_str(), text))
            .with_temperature(self.temperature);

        match self.max_tokens {
            Some(max_tokens) => request.with_max_tokens(max_tokens),
            None => request,
        }
    }

    /// Corrected sentence; `text` itself when the model cannot help
    pub async fn rewrite(
        &self,
        text: &str,
        history: &[ConversationTurn],
        level: &ProficiencyLevel,
    ) -> String {
        self.rewrite_traced(text, history, level).await.text
    }

    /// Like [`rewrite`](Self::rewrite), also reporting whether it fell back
    pub async fn rewrite_traced(
        &self,
        text: &str,
        history: &[ConversationTurn],
        level: &ProficiencyLevel,
    ) -> StageOutcome {
        let request = self.build_request(text, history, level);

        let response = match self.llm.generate(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(
                    stage = stage::REWRITE,
                    model = self.llm.model_name(),
                    error = %e,
                    input = %preview(text),
                    "Contextual rewrite failed, keeping mechanical correction"
                );
                return StageOutcome::fallback(text);
            },
        };

        if let Some(usage) = &response.usage {
            tracing::info!(
                stage = stage::REWRITE,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                total_tokens = usage.total_tokens,
                "Token usage"
            );
        }

        let corrected = response.text.trim();
        if corrected.is_empty() {
            tracing::error!(
                stage = stage::REWRITE,
                model = self.llm.model_name(),
                input = %preview(text),
                "Model returned empty correction, keeping mechanical correction"
            );
            return StageOutcome::fallback(text);
        }

        StageOutcome::ok(corrected)
    }
}
