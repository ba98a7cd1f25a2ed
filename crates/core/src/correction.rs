//! Correction result types: the aligned spans between what the learner
//! wrote and the corrected sentence.

use serde::{Deserialize, Serialize};

/// How a span of the alignment changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanKind {
    Unchanged,
    Inserted,
    Deleted,
    Replaced,
}

/// One labelled segment of the alignment
///
/// `original_text` is empty for insertions, `final_text` is empty for
/// deletions. Unchanged spans carry the same text on both sides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Span {
    pub kind: SpanKind,
    pub original_text: String,
    pub final_text: String,
}

impl Span {
    pub fn unchanged(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            kind: SpanKind::Unchanged,
            original_text: text.clone(),
            final_text: text,
        }
    }

    pub fn inserted(text: impl Into<String>) -> Self {
        Self {
            kind: SpanKind::Inserted,
            original_text: String::new(),
            final_text: text.into(),
        }
    }

    pub fn deleted(text: impl Into<String>) -> Self {
        Self {
            kind: SpanKind::Deleted,
            original_text: text.into(),
            final_text: String::new(),
        }
    }

    pub fn replaced(original: impl Into<String>, corrected: impl Into<String>) -> Self {
        Self {
            kind: SpanKind::Replaced,
            original_text: original.into(),
            final_text: corrected.into(),
        }
    }

    /// Whether this span is part of the original string
    pub fn covers_original(&self) -> bool {
        !matches!(self.kind, SpanKind::Inserted)
    }

    /// Whether this span is part of the final string
    pub fn covers_final(&self) -> bool {
        !matches!(self.kind, SpanKind::Deleted)
    }
}

/// Rebuild the original string from a span sequence
pub fn reconstruct_original(spans: &[Span]) -> String {
    spans
        .iter()
        .filter(|s| s.covers_original())
        .map(|s| s.original_text.as_str())
        .collect()
}

/// Rebuild the final string from a span sequence
pub fn reconstruct_final(spans: &[Span]) -> String {
    spans
        .iter()
        .filter(|s| s.covers_final())
        .map(|s| s.final_text.as_str())
        .collect()
}

/// Output of the correction pipeline for one utterance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionResult {
    /// Raw learner input
    pub original: String,
    /// Fully corrected sentence
    #[serde(rename = "final")]
    pub final_text: String,
    /// Alignment of `original` against `final_text`
    pub markup: Vec<Span>,
}

impl CorrectionResult {
    /// True when the pipeline changed nothing
    pub fn is_unchanged(&self) -> bool {
        self.original == self.final_text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reconstruction() {
        let spans = vec![
            Span::deleted("음 "),
            Span::unchanged("나는 학교에"),
            Span::inserted(" "),
            Span::unchanged("가요"),
        ];
        assert_eq!(reconstruct_original(&spans), "음 나는 학교에가요");
        assert_eq!(reconstruct_final(&spans), "나는 학교에 가요");
    }

    #[test]
    fn test_span_serialization() {
        let json = serde_json::to_value(Span::replaced("나", "저")).unwrap();
        assert_eq!(json["kind"], "replaced");
        assert_eq!(json["originalText"], "나");
        assert_eq!(json["finalText"], "저");
    }

    #[test]
    fn test_result_serializes_final_field() {
        let result = CorrectionResult {
            original: "가요".to_string(),
            final_text: "가요".to_string(),
            markup: vec![Span::unchanged("가요")],
        };
        assert!(result.is_unchanged());
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["final"], "가요");
    }
}
