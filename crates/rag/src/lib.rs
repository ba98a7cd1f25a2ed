//! Knowledge retrieval for tutor replies
//!
//! Features:
//! - Ordered keyword table, built in or loaded from YAML at startup
//! - Literal substring matching against the corrected sentence
//! - Core [`Retriever`](tutor_core::Retriever) trait implementation

pub mod knowledge_loader;
pub mod retriever;

pub use knowledge_loader::{builtin_knowledge, load_knowledge, KnowledgeEntry, KnowledgeLoader};
pub use retriever::KnowledgeRetriever;

use thiserror::Error;

/// RAG errors
#[derive(Error, Debug)]
pub enum RagError {
    #[error("Failed to read knowledge file {path}: {message}")]
    Io { path: String, message: String },

    #[error("Failed to parse knowledge file {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Invalid knowledge entry: {0}")]
    InvalidEntry(String),
}

impl From<RagError> for tutor_core::Error {
    fn from(err: RagError) -> Self {
        tutor_core::Error::Retrieval(err.to_string())
    }
}
