//! Keyword retriever
//!
//! Every entry whose key occurs literally in the query contributes its
//! text. Matches keep table order and are joined by newlines.

use std::sync::Arc;

use tutor_config::constants::sentinels;
use tutor_core::{preview, Retriever};

use crate::knowledge_loader::{builtin_knowledge, KnowledgeEntry};

/// Read-only keyword table lookup
#[derive(Debug, Clone)]
pub struct KnowledgeRetriever {
    entries: Arc<[KnowledgeEntry]>,
}

impl KnowledgeRetriever {
    pub fn new(entries: Vec<KnowledgeEntry>) -> Self {
        Self {
            entries: entries.into(),
        }
    }

    pub fn entries(&self) -> &[KnowledgeEntry] {
        &self.entries
    }

    /// Entries whose key appears in `query`, in table order
    pub fn matches<'a>(&'a self, query: &'a str) -> impl Iterator<Item = &'a KnowledgeEntry> + 'a {
        self.entries
            .iter()
            .filter(move |entry| query.contains(entry.key.as_str()))
    }
}

impl Default for KnowledgeRetriever {
    fn default() -> Self {
        Self::new(builtin_knowledge())
    }
}

impl Retriever for KnowledgeRetriever {
    fn retrieve(&self, query: &str) -> String {
        let matched: Vec<&KnowledgeEntry> = self.matches(query).collect();

        if matched.is_empty() {
            tracing::debug!(query = %preview(query), "No knowledge matched");
            return sentinels::NO_KNOWLEDGE.to_string();
        }

        let keys: Vec<&str> = matched.iter().map(|e| e.key.as_str()).collect();
        tracing::info!(keys = ?keys, "Knowledge matched");

        matched
            .iter()
            .map(|e| e.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn name(&self) -> &str {
        "keyword"
    }
}
