//! Character-level alignment between what the learner wrote and the
//! corrected sentence
//!
//! [`SequenceMatcher`] follows the classic Ratcliff/Obershelp matcher
//! (the one behind Python's `difflib`): find the longest common run,
//! recurse on both sides, then turn the matching blocks into opcodes.
//! Identical inputs therefore produce identical spans in both
//! implementations.

mod matcher;
mod render;

pub use matcher::{Opcode, OpcodeTag, SequenceMatcher};
pub use render::render_html;

use tutor_core::Span;

/// Align `original` against `corrected` and label every segment
///
/// Equal strings yield a single unchanged span, or none when both are
/// empty.
pub fn render_diff(original: &str, corrected: &str) -> Vec<Span> {
    let a: Vec<char> = original.chars().collect();
    let b: Vec<char> = corrected.chars().collect();
    let slice = |chars: &[char], lo: usize, hi: usize| chars[lo..hi].iter().collect::<String>();

    SequenceMatcher::new(&a, &b)
        .opcodes()
        .into_iter()
        .map(|op| match op.tag {
            OpcodeTag::Equal => Span::unchanged(slice(&a, op.a_start, op.a_end)),
            OpcodeTag::Insert => Span::inserted(slice(&b, op.b_start, op.b_end)),
            OpcodeTag::Delete => Span::deleted(slice(&a, op.a_start, op.a_end)),
            OpcodeTag::Replace => Span::replaced(
                slice(&a, op.a_start, op.a_end),
                slice(&b, op.b_start, op.b_end),
            ),
        })
        .collect()
}
