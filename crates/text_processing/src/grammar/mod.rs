//! Context-aware grammar correction
//!
//! The rewrite stage asks the language model to fix only objective errors
//! in the mechanically corrected sentence, with the recent conversation as
//! context.

mod contextual;

pub use contextual::ContextualRewriter;

use tutor_config::constants::sentinels;
use tutor_core::{recent_turns, ConversationTurn};

/// Render the last `window` turns as a `label: content` transcript
pub fn build_transcript(history: &[ConversationTurn], window: usize) -> String {
    let recent = recent_turns(history, window);
    if recent.is_empty() {
        return sentinels::EMPTY_HISTORY.to_string();
    }

    recent
        .iter()
        .map(|turn| format!("{}: {}", turn.role.label(), turn.content))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_history_marker() {
        assert_eq!(build_transcript(&[], 6), "(대화 시작)");
    }

    #[test]
    fn test_transcript_labels() {
        let history = vec![
            ConversationTurn::learner("안녕하세요"),
            ConversationTurn::tutor("안녕하세요! 오늘 기분이 어때요?"),
        ];
        assert_eq!(
            build_transcript(&history, 6),
            "학생: 안녕하세요\n선생님: 안녕하세요! 오늘 기분이 어때요?"
        );
    }

    #[test]
    fn test_transcript_window() {
        let history: Vec<_> = (0..8)
            .map(|i| ConversationTurn::learner(format!("문장 {}", i)))
            .collect();
        let transcript = build_transcript(&history, 6);
        assert_eq!(transcript.lines().count(), 6);
        assert!(transcript.starts_with("학생: 문장 2"));
        assert!(transcript.ends_with("학생: 문장 7"));
    }
}
