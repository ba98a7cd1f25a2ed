//! Log previews of learner text
//!
//! Log lines carry only the head of an utterance so failures can be
//! diagnosed without writing the whole message to the logs.

use std::borrow::Cow;
use unicode_segmentation::UnicodeSegmentation;

/// Default preview length in grapheme clusters
pub const PREVIEW_LEN: usize = 80;

/// First `max_graphemes` grapheme clusters of `text`, with `…` appended
/// when anything was cut.
pub fn truncate_for_log(text: &str, max_graphemes: usize) -> Cow<'_, str> {
    match text.grapheme_indices(true).nth(max_graphemes) {
        Some((byte_idx, _)) => Cow::Owned(format!("{}…", &text[..byte_idx])),
        None => Cow::Borrowed(text),
    }
}

/// [`truncate_for_log`] with the default length
pub fn preview(text: &str) -> Cow<'_, str> {
    truncate_for_log(text, PREVIEW_LEN)
}
