//! Knowledge Table Loader
//!
//! Loads the keyword table from a YAML file holding a list of
//! `{key, text}` entries. Entry order is file order and is the order in
//! which matches are reported.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tutor_config::KnowledgeConfig;

use crate::RagError;

/// One keyword and the explanation shown when it matches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    /// Literal substring to look for in the corrected sentence
    pub key: String,
    /// Knowledge text handed to the reply stage
    pub text: String,
}

impl KnowledgeEntry {
    pub fn new(key: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            text: text.into(),
        }
    }
}

/// Table used when no knowledge file is configured
pub fn builtin_knowledge() -> Vec<KnowledgeEntry> {
    vec![
        KnowledgeEntry::new(
            "학습 단계 정보",
            "학습 단계 정보는 홈페이지 메뉴의 [자기 학습 정보 보기]메뉴로 들어가면 확인할 수 있습니다.",
        ),
        KnowledgeEntry::new(
            "다음 학습 단계",
            "다음 단계 학습은 현재 단계를 완료해야만 넘어갈 수 있습니다.",
        ),
    ]
}

/// Knowledge table for the configured source
pub fn load_knowledge(config: &KnowledgeConfig) -> Result<Vec<KnowledgeEntry>, RagError> {
    match config.path.as_deref() {
        Some(path) => KnowledgeLoader::load_file(Path::new(path)),
        None => {
            tracing::debug!("No knowledge file configured, using built-in table");
            Ok(builtin_knowledge())
        },
    }
}

/// Reads knowledge files
pub struct KnowledgeLoader;

impl KnowledgeLoader {
    /// Load a single knowledge file
    pub fn load_file(path: &Path) -> Result<Vec<KnowledgeEntry>, RagError> {
        let content = std::fs::read_to_string(path).map_err(|e| RagError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let entries = Self::parse(&content).map_err(|e| match e {
            RagError::Parse { message, .. } => RagError::Parse {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })?;

        if entries.is_empty() {
            tracing::warn!(
                file = %path.display(),
                "Knowledge file has no entries, every lookup will miss"
            );
        }

        tracing::info!(
            file = %path.display(),
            entries = entries.len(),
            "Loaded knowledge file"
        );

        Ok(entries)
    }

    /// Parse YAML text into entries
    pub fn parse(content: &str) -> Result<Vec<KnowledgeEntry>, RagError> {
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let entries: Vec<KnowledgeEntry> =
            serde_yaml::from_str(content).map_err(|e| RagError::Parse {
                path: "<inline>".to_string(),
                message: e.to_string(),
            })?;

        // An empty key would match every sentence
        if let Some(position) = entries.iter().position(|e| e.key.trim().is_empty()) {
            return Err(RagError::InvalidEntry(format!(
                "entry {} has an empty key",
                position + 1
            )));
        }

        Ok(entries)
    }
}
