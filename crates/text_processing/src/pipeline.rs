//! Correction pipeline: normalize, mechanical correction, contextual rewrite

use std::time::{Duration, Instant};

use tutor_core::{preview, ConversationTurn, CorrectionResult, ProficiencyLevel};

use crate::diff::render_diff;
use crate::grammar::ContextualRewriter;
use crate::mechanical::MechanicalCorrector;
use crate::normalizer::normalize;

/// Stage names used in logs, steps and metrics
pub mod stage {
    pub const NORMALIZE: &str = "normalize";
    pub const MECHANICAL: &str = "mechanical";
    pub const REWRITE: &str = "rewrite";
    pub const DIFF: &str = "diff";
    pub const REPLY: &str = "reply";
}

/// Result of a stage that can fall back to its input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageOutcome {
    pub text: String,
    /// True when a dependency failed and earlier text was kept
    pub fell_back: bool,
}

impl StageOutcome {
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            fell_back: false,
        }
    }

    pub fn fallback(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            fell_back: true,
        }
    }
}

/// One executed stage
#[derive(Debug, Clone)]
pub struct ProcessingStep {
    pub name: &'static str,
    pub output: String,
    pub elapsed: Duration,
    pub fell_back: bool,
}

/// Output of the sequential stages for one utterance
#[derive(Debug, Clone)]
pub struct ProcessedText {
    /// Raw learner input
    pub original: String,
    /// Output of the last stage
    pub final_text: String,
    /// Executed stages in order
    pub steps: Vec<ProcessingStep>,
}

impl ProcessedText {
    pub fn step(&self, name: &str) -> Option<&ProcessingStep> {
        self.steps.iter().find(|s| s.name == name)
    }

    /// Names of stages that fell back
    pub fn fallbacks(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.steps.iter().filter(|s| s.fell_back).map(|s| s.name)
    }
}

/// Sequential correction stages
#[derive(Clone)]
pub struct CorrectionPipeline {
    mechanical: MechanicalCorrector,
    rewriter: ContextualRewriter,
}

impl CorrectionPipeline {
    pub fn new(mechanical: MechanicalCorrector, rewriter: ContextualRewriter) -> Self {
        Self {
            mechanical,
            rewriter,
        }
    }

    /// Run normalize, mechanical and rewrite in order
    ///
    /// Never fails. When normalization leaves nothing, the later stages
    /// are skipped.
    pub async fn process(
        &self,
        raw: &str,
        history: &[ConversationTurn],
        level: &ProficiencyLevel,
    ) -> ProcessedText {
        let mut steps = Vec::with_capacity(3);

        let started = Instant::now();
        let normalized = normalize(raw);
        steps.push(record(stage::NORMALIZE, StageOutcome::ok(normalized), started));

        if steps[0].output.is_empty() {
            tracing::debug!(input = %preview(raw), "Nothing left after normalization");
            return ProcessedText {
                original: raw.to_string(),
                final_text: String::new(),
                steps,
            };
        }

        let started = Instant::now();
        let outcome = self.mechanical.correct_traced(&steps[0].output).await;
        steps.push(record(stage::MECHANICAL, outcome, started));

        let started = Instant::now();
        let outcome = self
            .rewriter
            .rewrite_traced(&steps[1].output, history, level)
            .await;
        steps.push(record(stage::REWRITE, outcome, started));

        ProcessedText {
            original: raw.to_string(),
            final_text: steps[2].output.clone(),
            steps,
        }
    }

    /// Full correction including the alignment against the raw input
    pub async fn correct(
        &self,
        raw: &str,
        history: &[ConversationTurn],
        level: &ProficiencyLevel,
    ) -> CorrectionResult {
        let processed = self.process(raw, history, level).await;
        let markup = render_diff(&processed.original, &processed.final_text);
        CorrectionResult {
            original: processed.original,
            final_text: processed.final_text,
            markup,
        }
    }
}

fn record(name: &'static str, outcome: StageOutcome, started: Instant) -> ProcessingStep {
    let elapsed = started.elapsed();
    tracing::info!(
        stage = name,
        elapsed_ms = elapsed.as_millis() as u64,
        fell_back = outcome.fell_back,
        "Stage complete"
    );
    tracing::debug!(stage = name, output = %preview(&outcome.text), "Stage output");
    ProcessingStep {
        name,
        output: outcome.text,
        elapsed,
        fell_back: outcome.fell_back,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mechanical::{PassthroughSpacer, SymSpellSpacer};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tutor_core::{
        reconstruct_final, reconstruct_original, Error, GenerateRequest, GenerateResponse,
        LanguageModel, Result, Span,
    };

    /// Returns the sentence it was asked to correct
    struct EchoLlm {
        calls: AtomicUsize,
    }

    impl EchoLlm {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl LanguageModel for EchoLlm {
        async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let prompt = request.last_user_message().unwrap_or_default();
            let sentence = prompt
                .split("### 현재 문장 (기초 교정됨) ###\n")
                .nth(1)
                .and_then(|rest| rest.split("\n\n").next())
                .unwrap_or_default();
            Ok(GenerateResponse::text(sentence))
        }

        async fn is_available(&self) -> bool {
            true
        }

        fn model_name(&self) -> &str {
            "echo"
        }
    }

    struct FailingLlm;

    #[async_trait]
    impl LanguageModel for FailingLlm {
        async fn generate(&self, _request: GenerateRequest) -> Result<GenerateResponse> {
            Err(Error::Llm("connection refused".to_string()))
        }

        async fn is_available(&self) -> bool {
            false
        }

        fn model_name(&self) -> &str {
            "failing"
        }
    }

    fn spacer() -> Arc<SymSpellSpacer> {
        Arc::new(SymSpellSpacer::from_lines(["나는,9000", "학교에,5000", "가요,8000"]).unwrap())
    }

    fn pipeline(llm: Arc<dyn LanguageModel>) -> CorrectionPipeline {
        CorrectionPipeline::new(
            MechanicalCorrector::new(spacer(), None),
            ContextualRewriter::new(llm, 0.1, 6),
        )
    }

    #[tokio::test]
    async fn test_end_to_end_filler_and_spacing() {
        let pipeline = pipeline(Arc::new(EchoLlm::new()));
        let processed = pipeline
            .process("음 나는 학교에가요", &[], &ProficiencyLevel::default())
            .await;

        assert_eq!(processed.step(stage::NORMALIZE).unwrap().output, "나는 학교에가요");
        assert_eq!(processed.step(stage::MECHANICAL).unwrap().output, "나는 학교에 가요");
        assert_eq!(processed.final_text, "나는 학교에 가요");
        assert_eq!(processed.fallbacks().count(), 0);

        let result = pipeline
            .correct("음 나는 학교에가요", &[], &ProficiencyLevel::default())
            .await;
        assert_eq!(
            result.markup,
            vec![
                Span::deleted("음 "),
                Span::unchanged("나는 학교에"),
                Span::inserted(" "),
                Span::unchanged("가요"),
            ]
        );
        assert_eq!(reconstruct_original(&result.markup), result.original);
        assert_eq!(reconstruct_final(&result.markup), result.final_text);
    }

    #[tokio::test]
    async fn test_rewrite_failure_keeps_mechanical_text() {
        let pipeline = pipeline(Arc::new(FailingLlm));
        let processed = pipeline
            .process("음 나는 학교에가요", &[], &ProficiencyLevel::default())
            .await;

        assert_eq!(processed.final_text, "나는 학교에 가요");
        assert_eq!(processed.fallbacks().collect::<Vec<_>>(), vec![stage::REWRITE]);
    }

    #[tokio::test]
    async fn test_filler_only_input_skips_model() {
        let llm = Arc::new(EchoLlm::new());
        let pipeline = CorrectionPipeline::new(
            MechanicalCorrector::new(Arc::new(PassthroughSpacer), None),
            ContextualRewriter::new(llm.clone(), 0.1, 6),
        );
        let processed = pipeline
            .process("음 어", &[], &ProficiencyLevel::default())
            .await;

        assert_eq!(processed.final_text, "");
        assert_eq!(processed.steps.len(), 1);
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
    }
}
