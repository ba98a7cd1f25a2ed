//! Tutor agent
//!
//! Runs one learner turn:
//!
//! ```text
//! raw ─► normalize ─► mechanical ─► rewrite ─► final
//!                                               │
//!                 ┌─────────────────────────────┴───────────────┐
//!                 ▼                                             ▼
//!   render_diff(raw, final) on a blocking worker     retrieve(final) ─► reply
//! ```
//!
//! The two branches share nothing mutable and are joined before the
//! response is assembled.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Deserialize;
use tutor_config::Settings;
use tutor_core::{
    preview, ConversationTurn, CorrectionResult, LanguageModel, ProficiencyLevel, Retriever, Span,
};
use tutor_rag::{load_knowledge, KnowledgeRetriever};
use tutor_text_processing::{
    render_diff, render_html, stage, ContextualRewriter, CorrectionPipeline, MechanicalCorrector,
};

use crate::response::ReplyGenerator;
use crate::AgentError;

/// One learner turn as received from the client
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TutorRequest {
    #[serde(default)]
    pub message: String,
    /// Prior turns, oldest first
    #[serde(default)]
    pub history: Vec<ConversationTurn>,
    #[serde(default)]
    pub level: Option<ProficiencyLevel>,
}

impl TutorRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_history(mut self, history: Vec<ConversationTurn>) -> Self {
        self.history = history;
        self
    }

    pub fn with_level(mut self, level: impl Into<ProficiencyLevel>) -> Self {
        self.level = Some(level.into());
        self
    }
}

/// Wall-clock time spent per stage
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StageTimings {
    pub normalize: Duration,
    pub mechanical: Duration,
    pub rewrite: Duration,
    pub diff: Duration,
    /// Retrieval plus reply generation
    pub reply: Duration,
    pub total: Duration,
}

impl StageTimings {
    /// `(stage, elapsed)` pairs for metrics
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Duration)> {
        [
            (stage::NORMALIZE, self.normalize),
            (stage::MECHANICAL, self.mechanical),
            (stage::REWRITE, self.rewrite),
            (stage::DIFF, self.diff),
            (stage::REPLY, self.reply),
            ("total", self.total),
        ]
        .into_iter()
    }
}

/// Everything produced for one turn
#[derive(Debug, Clone)]
pub struct TutorResponse {
    pub correction: CorrectionResult,
    /// Inline HTML rendering of `correction.markup`
    pub diff_html: String,
    pub reply: String,
    /// Knowledge text handed to the reply stage
    pub knowledge: String,
    pub timings: StageTimings,
    /// Stages that fell back to their input (or to the error reply)
    pub fallbacks: Vec<&'static str>,
}

impl TutorResponse {
    pub fn original(&self) -> &str {
        &self.correction.original
    }

    pub fn corrected(&self) -> &str {
        &self.correction.final_text
    }

    pub fn markup(&self) -> &[Span] {
        &self.correction.markup
    }
}

/// Correction and reply for a learner turn
#[derive(Clone)]
pub struct TutorAgent {
    pipeline: CorrectionPipeline,
    retriever: Arc<dyn Retriever>,
    replies: ReplyGenerator,
    default_level: ProficiencyLevel,
}

impl TutorAgent {
    pub fn new(
        pipeline: CorrectionPipeline,
        retriever: Arc<dyn Retriever>,
        replies: ReplyGenerator,
    ) -> Self {
        Self {
            pipeline,
            retriever,
            replies,
            default_level: ProficiencyLevel::default(),
        }
    }

    /// Level used when a request carries none
    pub fn with_default_level(mut self, level: impl Into<ProficiencyLevel>) -> Self {
        self.default_level = level.into();
        self
    }

    /// Wire the agent from settings
    ///
    /// The mechanical corrector is passed in so the caller decides when the
    /// spacing index is built.
    pub fn from_settings(
        settings: &Settings,
        llm: Arc<dyn LanguageModel>,
        mechanical: MechanicalCorrector,
    ) -> Result<Self, AgentError> {
        let rewriter = ContextualRewriter::from_config(llm.clone(), &settings.correction)
            .with_max_tokens(settings.llm.max_tokens);
        let replies = ReplyGenerator::from_config(llm, &settings.reply)
            .with_max_tokens(settings.llm.max_tokens);
        let retriever = KnowledgeRetriever::new(load_knowledge(&settings.knowledge)?);

        tracing::info!(
            spacer = mechanical.spacer_name(),
            knowledge_entries = retriever.entries().len(),
            model = replies.model_name(),
            "Tutor agent ready"
        );

        Ok(Self::new(
            CorrectionPipeline::new(mechanical, rewriter),
            Arc::new(retriever),
            replies,
        )
        .with_default_level(settings.correction.default_level.as_str()))
    }

    /// Process one learner turn
    ///
    /// Only an empty or whitespace-only message is an error; every
    /// dependency failure degrades to a fallback instead.
    pub async fn handle(&self, request: TutorRequest) -> Result<TutorResponse, AgentError> {
        if request.message.trim().is_empty() {
            return Err(AgentError::InvalidInput("No message".to_string()));
        }

        let started = Instant::now();
        let level = request.level.unwrap_or_else(|| self.default_level.clone());
        let history = request.history;

        tracing::debug!(
            input = %preview(&request.message),
            history_turns = history.len(),
            level = %level,
            "Handling tutor turn"
        );

        let processed = self.pipeline.process(&request.message, &history, &level).await;
        let final_text = processed.final_text.clone();

        let diff_branch = async {
            let diff_started = Instant::now();
            let original = processed.original.clone();
            let corrected = final_text.clone();
            let markup =
                tokio::task::spawn_blocking(move || render_diff(&original, &corrected)).await?;
            let html = render_html(&markup);
            Ok::<_, AgentError>((markup, html, diff_started.elapsed()))
        };

        let reply_branch = async {
            let reply_started = Instant::now();
            let knowledge = self.retriever.retrieve(&final_text);
            let reply = self
                .replies
                .generate_traced(&final_text, &history, &knowledge)
                .await;
            (knowledge, reply, reply_started.elapsed())
        };

        let (diff, (knowledge, reply, reply_elapsed)) = tokio::join!(diff_branch, reply_branch);
        let (markup, diff_html, diff_elapsed) = diff?;

        let elapsed_of = |name: &str| {
            processed
                .step(name)
                .map(|step| step.elapsed)
                .unwrap_or_default()
        };
        let timings = StageTimings {
            normalize: elapsed_of(stage::NORMALIZE),
            mechanical: elapsed_of(stage::MECHANICAL),
            rewrite: elapsed_of(stage::REWRITE),
            diff: diff_elapsed,
            reply: reply_elapsed,
            total: started.elapsed(),
        };

        let mut fallbacks: Vec<&'static str> = processed.fallbacks().collect();
        if reply.fell_back {
            fallbacks.push(stage::REPLY);
        }

        tracing::info!(
            elapsed_ms = timings.total.as_millis() as u64,
            changed = processed.original != processed.final_text,
            fallbacks = ?fallbacks,
            "Tutor turn complete"
        );

        Ok(TutorResponse {
            correction: CorrectionResult {
                original: processed.original,
                final_text: processed.final_text,
                markup,
            },
            diff_html,
            reply: reply.text,
            knowledge,
            timings,
            fallbacks,
        })
    }

    /// Whether the generative model answers
    pub async fn model_available(&self) -> bool {
        self.replies.is_available().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tutor_text_processing::PassthroughSpacer;

    #[test]
    fn test_request_deserialization_defaults() {
        let request: TutorRequest = serde_json::from_str(r#"{"message": "안녕"}"#).unwrap();
        assert_eq!(request.message, "안녕");
        assert!(request.history.is_empty());
        assert!(request.level.is_none());

        let request: TutorRequest = serde_json::from_str(
            r#"{"message": "안녕", "history": [{"role": "user", "content": "hi"}], "level": "beginner"}"#,
        )
        .unwrap();
        assert_eq!(request.history, vec![ConversationTurn::learner("hi")]);
        assert_eq!(request.level, Some(ProficiencyLevel::new("beginner")));
    }

    #[test]
    fn test_timings_iter_names() {
        let names: Vec<&str> = StageTimings::default().iter().map(|(name, _)| name).collect();
        assert_eq!(
            names,
            vec!["normalize", "mechanical", "rewrite", "diff", "reply", "total"]
        );
    }

    #[tokio::test]
    async fn test_blank_message_is_rejected() {
        let llm: Arc<dyn LanguageModel> =
            Arc::new(tutor_llm::DisabledLanguageModel::new("test"));
        let agent = TutorAgent::new(
            CorrectionPipeline::new(
                MechanicalCorrector::new(Arc::new(PassthroughSpacer), None),
                ContextualRewriter::new(llm.clone(), 0.1, 6),
            ),
            Arc::new(KnowledgeRetriever::default()),
            ReplyGenerator::new(llm, "무궁화", 0.7),
        );

        for message in ["", "   ", "\n\t"] {
            let err = agent.handle(TutorRequest::new(message)).await.unwrap_err();
            assert_eq!(err, AgentError::InvalidInput("No message".to_string()));
        }
    }
}
