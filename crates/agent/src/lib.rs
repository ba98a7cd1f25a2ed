//! Tutor turn orchestration
//!
//! One learner message goes through the sequential correction stages,
//! then the diff explanation and the knowledge-grounded reply run
//! concurrently.

pub mod response;
pub mod tutor;

pub use response::ReplyGenerator;
pub use tutor::{StageTimings, TutorAgent, TutorRequest, TutorResponse};

use thiserror::Error;

/// Agent errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgentError {
    /// The caller sent nothing to correct
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<tokio::task::JoinError> for AgentError {
    fn from(err: tokio::task::JoinError) -> Self {
        AgentError::Internal(format!("worker task failed: {}", err))
    }
}

impl From<tutor_rag::RagError> for AgentError {
    fn from(err: tutor_rag::RagError) -> Self {
        AgentError::Configuration(err.to_string())
    }
}

impl From<AgentError> for tutor_core::Error {
    fn from(err: AgentError) -> Self {
        match err {
            AgentError::InvalidInput(msg) => tutor_core::Error::InvalidInput(msg),
            AgentError::Internal(msg) => tutor_core::Error::Internal(msg),
            AgentError::Configuration(msg) => tutor_core::Error::Config(msg),
        }
    }
}
