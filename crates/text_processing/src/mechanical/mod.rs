//! Mechanical correction: word spacing, then optional spelling
//!
//! Neither capability may fail the request. A spacing failure falls back
//! to the input, a spelling failure falls back to the spaced text.

mod dictionary;
mod http;
mod passthrough;

pub use dictionary::{SymSpellSpacer, SymSpellSpeller};
pub use http::HttpSpacer;
pub use passthrough::PassthroughSpacer;

use std::sync::Arc;
use std::time::Duration;
use tutor_config::{SpacingConfig, SpacingProvider, SpellingConfig};
use tutor_core::{preview, SpacingCorrector, SpellCorrector};

use crate::{stage, StageOutcome};

/// Spacing then spelling, with fallbacks
#[derive(Clone)]
pub struct MechanicalCorrector {
    spacer: Arc<dyn SpacingCorrector>,
    speller: Option<Arc<dyn SpellCorrector>>,
}

impl MechanicalCorrector {
    pub fn new(
        spacer: Arc<dyn SpacingCorrector>,
        speller: Option<Arc<dyn SpellCorrector>>,
    ) -> Self {
        Self { spacer, speller }
    }

    /// Build from settings
    pub fn from_config(spacing: &SpacingConfig, spelling: &SpellingConfig) -> Self {
        Self::new(create_spacer(spacing), create_speller(spelling))
    }

    /// Corrected text; never fails
    pub async fn correct(&self, text: &str) -> String {
        self.correct_traced(text).await.text
    }

    /// Corrected text plus whether any capability had to be skipped
    pub async fn correct_traced(&self, text: &str) -> StageOutcome {
        let spaced = match self.spacer.correct_spacing(text).await {
            Ok(spaced) => spaced,
            Err(e) => {
                tracing::error!(
                    stage = stage::MECHANICAL,
                    spacer = self.spacer.name(),
                    error = %e,
                    input = %preview(text),
                    "Spacing correction failed, keeping input"
                );
                return StageOutcome::fallback(text);
            },
        };

        let Some(speller) = &self.speller else {
            return StageOutcome::ok(spaced);
        };

        match speller.correct_spelling(&spaced).await {
            Ok(spelled) => StageOutcome::ok(spelled),
            Err(e) => {
                tracing::warn!(
                    stage = stage::MECHANICAL,
                    speller = speller.name(),
                    error = %e,
                    input = %preview(&spaced),
                    "Spelling correction failed, keeping spaced text"
                );
                StageOutcome::fallback(spaced)
            },
        }
    }

    pub fn spacer_name(&self) -> &str {
        self.spacer.name()
    }
}

/// Create the spacing capability selected in settings
///
/// A dictionary that cannot be loaded degrades to pass-through so the
/// service still starts.
pub fn create_spacer(config: &SpacingConfig) -> Arc<dyn SpacingCorrector> {
    match config.provider {
        SpacingProvider::SymSpell => match SymSpellSpacer::from_file(&config.dictionary_path) {
            Ok(spacer) => {
                tracing::info!(
                    path = %config.dictionary_path,
                    words = spacer.word_count(),
                    "Loaded spacing dictionary"
                );
                Arc::new(spacer)
            },
            Err(e) => {
                tracing::warn!(
                    path = %config.dictionary_path,
                    error = %e,
                    "Spacing dictionary not available, using pass-through spacer"
                );
                Arc::new(PassthroughSpacer)
            },
        },
        SpacingProvider::Http => Arc::new(HttpSpacer::new(
            &config.endpoint,
            Duration::from_secs(config.timeout_secs),
        )),
        SpacingProvider::Disabled => Arc::new(PassthroughSpacer),
    }
}

/// Create the spelling capability, if enabled
pub fn create_speller(config: &SpellingConfig) -> Option<Arc<dyn SpellCorrector>> {
    if !config.enabled {
        return None;
    }

    match SymSpellSpeller::from_file(&config.dictionary_path, config.max_edit_distance) {
        Ok(speller) => Some(Arc::new(speller)),
        Err(e) => {
            tracing::warn!(
                path = %config.dictionary_path,
                error = %e,
                "Spelling dictionary not available, spelling disabled"
            );
            None
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tutor_core::{Error, Result};

    struct FixedSpacer(&'static str);

    #[async_trait]
    impl SpacingCorrector for FixedSpacer {
        async fn correct_spacing(&self, _text: &str) -> Result<String> {
            Ok(self.0.to_string())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    struct FailingSpacer;

    #[async_trait]
    impl SpacingCorrector for FailingSpacer {
        async fn correct_spacing(&self, _text: &str) -> Result<String> {
            Err(Error::Spacing("model not loaded".to_string()))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    struct FailingSpeller;

    #[async_trait]
    impl SpellCorrector for FailingSpeller {
        async fn correct_spelling(&self, _text: &str) -> Result<String> {
            Err(Error::Spelling("dictionary missing".to_string()))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    struct SuffixSpeller;

    #[async_trait]
    impl SpellCorrector for SuffixSpeller {
        async fn correct_spelling(&self, text: &str) -> Result<String> {
            Ok(format!("{}!", text))
        }

        fn name(&self) -> &str {
            "suffix"
        }
    }

    #[tokio::test]
    async fn test_spacing_only() {
        let corrector = MechanicalCorrector::new(Arc::new(FixedSpacer("나는 학교에 가요")), None);
        assert_eq!(corrector.correct("나는 학교에가요").await, "나는 학교에 가요");
    }

    #[tokio::test]
    async fn test_spacing_feeds_spelling() {
        let corrector = MechanicalCorrector::new(
            Arc::new(FixedSpacer("나는 학교에 가요")),
            Some(Arc::new(SuffixSpeller)),
        );
        assert_eq!(corrector.correct("나는 학교에가요").await, "나는 학교에 가요!");
    }

    #[tokio::test]
    async fn test_spacing_failure_keeps_input() {
        let corrector =
            MechanicalCorrector::new(Arc::new(FailingSpacer), Some(Arc::new(SuffixSpeller)));
        let outcome = corrector.correct_traced("나는 학교에가요").await;
        assert_eq!(outcome.text, "나는 학교에가요");
        assert!(outcome.fell_back);
    }

    #[tokio::test]
    async fn test_spelling_failure_keeps_spaced_text() {
        let corrector = MechanicalCorrector::new(
            Arc::new(FixedSpacer("나는 학교에 가요")),
            Some(Arc::new(FailingSpeller)),
        );
        let outcome = corrector.correct_traced("나는 학교에가요").await;
        assert_eq!(outcome.text, "나는 학교에 가요");
        assert!(outcome.fell_back);
    }

    #[test]
    fn test_missing_dictionary_degrades_to_passthrough() {
        let config = SpacingConfig {
            dictionary_path: "/nonexistent/dictionary.txt".to_string(),
            ..SpacingConfig::default()
        };
        assert_eq!(create_spacer(&config).name(), "passthrough");
    }

    #[test]
    fn test_speller_disabled_by_default() {
        assert!(create_speller(&SpellingConfig::default()).is_none());
    }
}
