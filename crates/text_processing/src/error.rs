//! Text processing errors

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TextProcessingError>;

#[derive(Error, Debug)]
pub enum TextProcessingError {
    #[error("Dictionary error: {0}")]
    Dictionary(String),

    #[error("Spacing service error: {0}")]
    SpacingService(String),

    #[error("Spelling error: {0}")]
    Spelling(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl From<TextProcessingError> for tutor_core::Error {
    fn from(err: TextProcessingError) -> Self {
        match err {
            TextProcessingError::Spelling(msg) => tutor_core::Error::Spelling(msg),
            TextProcessingError::SpacingService(msg) => tutor_core::Error::Spacing(msg),
            TextProcessingError::Http(e) => tutor_core::Error::Spacing(e.to_string()),
            other => tutor_core::Error::TextProcessing(other.to_string()),
        }
    }
}
