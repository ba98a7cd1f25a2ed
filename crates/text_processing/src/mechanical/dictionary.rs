//! SymSpell-backed spacing and spelling
//!
//! Both load a `word,count` frequency list of eojeol (space-delimited
//! words). The spacer re-segments each token with zero edit distance and
//! only accepts a split when every piece is a dictionary word, so unknown
//! vocabulary is never broken apart.

use std::path::Path;

use async_trait::async_trait;
use symspell::{SymSpell, SymSpellBuilder, UnicodeStringStrategy, Verbosity};
use tutor_core::{SpacingCorrector, SpellCorrector};

use crate::{Result, TextProcessingError};

type Index = SymSpell<UnicodeStringStrategy>;

/// Build an index from dictionary lines, returning it with the entry count
fn build_index<'a>(
    lines: impl IntoIterator<Item = &'a str>,
    max_edit_distance: i64,
) -> Result<(Index, usize)> {
    let mut index: Index = SymSpellBuilder::default()
        .max_dictionary_edit_distance(max_edit_distance)
        .prefix_length(7)
        .build()
        .map_err(|e| TextProcessingError::Dictionary(e.to_string()))?;

    let mut words = 0;
    for line in lines {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if index.load_dictionary_line(line, 0, 1, ",") {
            words += 1;
        }
    }

    if words == 0 {
        return Err(TextProcessingError::Dictionary(
            "dictionary has no entries".to_string(),
        ));
    }

    Ok((index, words))
}

/// Split a token into leading punctuation, word and trailing punctuation
fn split_punctuation(token: &str) -> (&str, &str, &str) {
    let is_punct = |c: char| !c.is_alphanumeric();
    let start = token.len() - token.trim_start_matches(is_punct).len();
    let word = token[start..].trim_end_matches(is_punct);
    let end = start + word.len();
    (&token[..start], word, &token[end..])
}

fn is_known(index: &Index, word: &str) -> bool {
    !index.lookup(word, Verbosity::Top, 0).is_empty()
}

/// Dictionary-driven word spacing
pub struct SymSpellSpacer {
    index: Index,
    words: usize,
}

impl SymSpellSpacer {
    /// Load a `word,count` dictionary file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_lines(content.lines())
    }

    /// Build from in-memory `word,count` lines
    pub fn from_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        let (index, words) = build_index(lines, 1)?;
        Ok(Self { index, words })
    }

    pub fn word_count(&self) -> usize {
        self.words
    }

    /// Re-space every whitespace-delimited token
    pub fn space(&self, text: &str) -> String {
        text.split_whitespace()
            .map(|token| self.space_token(token))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn space_token(&self, token: &str) -> String {
        let (lead, word, trail) = split_punctuation(token);
        match self.segment(word) {
            Some(segmented) => format!("{}{}{}", lead, segmented, trail),
            None => token.to_string(),
        }
    }

    /// Segmentation of `word` into known words, if it needs one
    fn segment(&self, word: &str) -> Option<String> {
        if word.chars().count() < 2 || is_known(&self.index, word) {
            return None;
        }

        let composition = self.index.word_segmentation(word, 0);
        let pieces: Vec<&str> = composition.segmented_string.split_whitespace().collect();

        if pieces.len() < 2
            || pieces.concat() != word
            || !pieces.iter().all(|piece| is_known(&self.index, piece))
        {
            return None;
        }

        Some(pieces.join(" "))
    }
}

#[async_trait]
impl SpacingCorrector for SymSpellSpacer {
    async fn correct_spacing(&self, text: &str) -> tutor_core::Result<String> {
        Ok(self.space(text))
    }

    fn name(&self) -> &str {
        "symspell"
    }
}

/// Per-token dictionary spelling correction
pub struct SymSpellSpeller {
    index: Index,
    max_edit_distance: i64,
}

impl SymSpellSpeller {
    /// Load a `word,count` dictionary file
    pub fn from_file(path: impl AsRef<Path>, max_edit_distance: i64) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_lines(content.lines(), max_edit_distance)
    }

    /// Build from in-memory `word,count` lines
    pub fn from_lines<'a>(
        lines: impl IntoIterator<Item = &'a str>,
        max_edit_distance: i64,
    ) -> Result<Self> {
        if max_edit_distance < 1 {
            return Err(TextProcessingError::Spelling(format!(
                "max_edit_distance must be at least 1, got {}",
                max_edit_distance
            )));
        }
        let (index, _) = build_index(lines, max_edit_distance)?;
        Ok(Self {
            index,
            max_edit_distance,
        })
    }

    /// Correct every whitespace-delimited token
    pub fn spell(&self, text: &str) -> String {
        text.split_whitespace()
            .map(|token| self.spell_token(token))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn spell_token(&self, token: &str) -> String {
        let (lead, word, trail) = split_punctuation(token);
        // Single syllables have too many neighbours to correct safely
        if word.chars().count() < 2 {
            return token.to_string();
        }

        let suggestions = self
            .index
            .lookup(word, Verbosity::Top, self.max_edit_distance);
        match suggestions.first() {
            Some(best) if best.term != word => format!("{}{}{}", lead, best.term, trail),
            _ => token.to_string(),
        }
    }
}

#[async_trait]
impl SpellCorrector for SymSpellSpeller {
    async fn correct_spelling(&self, text: &str) -> tutor_core::Result<String> {
        Ok(self.spell(text))
    }

    fn name(&self) -> &str {
        "symspell"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const DICTIONARY: &[&str] = &[
        "나는,9000",
        "저는,9000",
        "학교에,5000",
        "학교,6000",
        "가요,8000",
        "밥을,6000",
        "먹어요,5000",
        "친구를,3500",
        "만나요,3500",
    ];

    fn spacer() -> SymSpellSpacer {
        SymSpellSpacer::from_lines(DICTIONARY.iter().copied()).unwrap()
    }

    #[test]
    fn test_split_punctuation() {
        assert_eq!(split_punctuation("가요?"), ("", "가요", "?"));
        assert_eq!(split_punctuation("\"학교에가요!\""), ("\"", "학교에가요", "!\""));
        assert_eq!(split_punctuation("..."), ("...", "", ""));
        assert_eq!(split_punctuation("나는"), ("", "나는", ""));
    }

    #[test]
    fn test_spacing_fix() {
        let spacer = spacer();
        assert_eq!(spacer.word_count(), DICTIONARY.len());
        assert_eq!(spacer.space("나는 학교에가요"), "나는 학교에 가요");
        assert_eq!(spacer.space("밥을먹어요"), "밥을 먹어요");
    }

    #[test]
    fn test_spacing_keeps_punctuation() {
        assert_eq!(spacer().space("학교에가요?"), "학교에 가요?");
    }

    #[test]
    fn test_unknown_words_are_not_split() {
        let spacer = spacer();
        assert_eq!(spacer.space("도서관에갔어요"), "도서관에갔어요");
        assert_eq!(spacer.space("학교에갔어요"), "학교에갔어요");
    }

    #[test]
    fn test_correct_text_is_unchanged() {
        assert_eq!(spacer().space("나는 학교에 가요"), "나는 학교에 가요");
    }

    #[test]
    fn test_empty_dictionary_is_rejected() {
        assert!(SymSpellSpacer::from_lines(["# comment only", ""]).is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for line in DICTIONARY {
            writeln!(file, "{}", line).unwrap();
        }
        let spacer = SymSpellSpacer::from_file(file.path()).unwrap();
        assert_eq!(spacer.space("저는학교에가요"), "저는 학교에 가요");
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            SymSpellSpacer::from_file("/nonexistent/dictionary.txt"),
            Err(TextProcessingError::Io(_))
        ));
    }

    #[tokio::test]
    async fn test_spacer_trait() {
        let spacer = spacer();
        let spaced = spacer.correct_spacing("친구를만나요").await.unwrap();
        assert_eq!(spaced, "친구를 만나요");
    }

    #[test]
    fn test_speller_fixes_single_edit() {
        let speller = SymSpellSpeller::from_lines(DICTIONARY.iter().copied(), 1).unwrap();
        assert_eq!(speller.spell("밥을 먹어yo"), "밥을 먹어yo");
        assert_eq!(speller.spell("친구를 만나오"), "친구를 만나요");
        assert_eq!(speller.spell("학교에 가요."), "학교에 가요.");
    }

    #[test]
    fn test_speller_rejects_zero_distance() {
        assert!(SymSpellSpeller::from_lines(DICTIONARY.iter().copied(), 0).is_err());
    }
}
