//! Conversation types: turns, roles and the learner's proficiency tag

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default number of prior turns the rewriter looks at
pub const DEFAULT_HISTORY_WINDOW: usize = 6;

/// Who spoke a turn
///
/// `learner` and the OpenAI-style `user` are the learner; any other role
/// (`tutor`, `assistant`, `system`, ...) is read as the tutor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    #[serde(alias = "user")]
    Learner,
    #[serde(other)]
    Tutor,
}

impl TurnRole {
    /// Label used when rendering a transcript for the model
    pub fn label(&self) -> &'static str {
        match self {
            TurnRole::Learner => "학생",
            TurnRole::Tutor => "선생님",
        }
    }
}

/// A single turn of the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub content: String,
}

impl ConversationTurn {
    pub fn learner(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Learner,
            content: content.into(),
        }
    }

    pub fn tutor(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Tutor,
            content: content.into(),
        }
    }
}

/// The most recent `window` turns, oldest first.
///
/// Older turns are skipped, never removed from the caller's history.
pub fn recent_turns(history: &[ConversationTurn], window: usize) -> &[ConversationTurn] {
    &history[history.len().saturating_sub(window)..]
}

/// Learner proficiency tag, passed through to the rewrite prompt
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProficiencyLevel(String);

impl ProficiencyLevel {
    pub fn new(level: impl Into<String>) -> Self {
        Self(level.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ProficiencyLevel {
    fn default() -> Self {
        Self("intermediate".to_string())
    }
}

impl fmt::Display for ProficiencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProficiencyLevel {
    fn from(level: &str) -> Self {
        Self::new(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_aliases() {
        let turn: ConversationTurn =
            serde_json::from_str(r#"{"role": "user", "content": "안녕하세요"}"#).unwrap();
        assert_eq!(turn.role, TurnRole::Learner);

        let turn: ConversationTurn =
            serde_json::from_str(r#"{"role": "assistant", "content": "네"}"#).unwrap();
        assert_eq!(turn.role, TurnRole::Tutor);

        let turn: ConversationTurn =
            serde_json::from_str(r#"{"role": "tutor", "content": "네"}"#).unwrap();
        assert_eq!(turn.role, TurnRole::Tutor);
    }

    #[test]
    fn test_unknown_role_reads_as_tutor() {
        for role in ["system", "bot", "Learner"] {
            let json = format!(r#"{{"role": "{}", "content": "네"}}"#, role);
            let turn: ConversationTurn = serde_json::from_str(&json).unwrap();
            assert_eq!(turn.role, TurnRole::Tutor, "role: {}", role);
        }

        let json = serde_json::to_value(ConversationTurn::tutor("네")).unwrap();
        assert_eq!(json["role"], "tutor");
    }

    #[test]
    fn test_recent_turns_window() {
        let history: Vec<_> = (0..10)
            .map(|i| ConversationTurn::learner(format!("turn {}", i)))
            .collect();

        let recent = recent_turns(&history, DEFAULT_HISTORY_WINDOW);
        assert_eq!(recent.len(), 6);
        assert_eq!(recent[0].content, "turn 4");
        assert_eq!(recent[5].content, "turn 9");
        // Caller's history is untouched
        assert_eq!(history.len(), 10);
    }

    #[test]
    fn test_recent_turns_short_history() {
        let history = vec![ConversationTurn::tutor("안녕하세요")];
        assert_eq!(recent_turns(&history, 6).len(), 1);
        assert!(recent_turns(&[], 6).is_empty());
    }

    #[test]
    fn test_default_level() {
        assert_eq!(ProficiencyLevel::default().as_str(), "intermediate");
        let level: ProficiencyLevel = serde_json::from_str(r#""beginner""#).unwrap();
        assert_eq!(level.as_str(), "beginner");
    }
}
