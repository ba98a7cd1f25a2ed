//! Pass-through spacer

use async_trait::async_trait;
use tutor_core::{Result, SpacingCorrector};

/// Spacer that returns its input
pub struct PassthroughSpacer;

#[async_trait]
impl SpacingCorrector for PassthroughSpacer {
    async fn correct_spacing(&self, text: &str) -> Result<String> {
        Ok(text.to_string())
    }

    fn name(&self) -> &str {
        "passthrough"
    }
}
