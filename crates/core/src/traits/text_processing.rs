//! Mechanical text-correction capabilities
//!
//! Both capabilities are black boxes from the pipeline's point of view:
//! they take a sentence and return a corrected one, or fail.

use crate::Result;
use async_trait::async_trait;

/// Word-spacing correction
///
/// Implementations:
/// - `SymSpellSpacer` - dictionary-driven re-segmentation of each token
/// - `HttpSpacer` - remote spacing model behind an HTTP endpoint
/// - `PassthroughSpacer` - returns the input unchanged
///
/// # Example
///
/// ```ignore
/// let spacer: Arc<dyn SpacingCorrector> = Arc::new(SymSpellSpacer::from_file(path)?);
/// let spaced = spacer.correct_spacing("나는 학교에가요").await?;
/// assert_eq!(spaced, "나는 학교에 가요");
/// ```
#[async_trait]
pub trait SpacingCorrector: Send + Sync + 'static {
    /// Return `text` with word spacing corrected
    async fn correct_spacing(&self, text: &str) -> Result<String>;

    /// Name for logging
    fn name(&self) -> &str;
}

/// Spelling correction
///
/// Implementations:
/// - `SymSpellSpeller` - per-token dictionary lookup within an edit distance
#[async_trait]
pub trait SpellCorrector: Send + Sync + 'static {
    /// Return `text` with misspelled words corrected
    async fn correct_spelling(&self, text: &str) -> Result<String>;

    /// Name for logging
    fn name(&self) -> &str;
}
