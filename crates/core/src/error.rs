//! Error types shared across the tutor crates

use thiserror::Error;

/// Result alias using the core error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Spacing correction error: {0}")]
    Spacing(String),

    #[error("Spelling correction error: {0}")]
    Spelling(String),

    #[error("Text processing error: {0}")]
    TextProcessing(String),

    #[error("Retrieval error: {0}")]
    Retrieval(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
