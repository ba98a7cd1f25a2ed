//! Core traits and types for the Korean tutor
//!
//! This crate provides foundational types used across all other crates:
//! - Capability traits (language model, spacing, spelling, retrieval)
//! - Conversation turns and the proficiency tag
//! - Correction spans and results
//! - LLM request/response types
//! - Error types

pub mod conversation;
pub mod correction;
pub mod error;
pub mod llm_types;
pub mod preview;
pub mod traits;

pub use conversation::{
    recent_turns, ConversationTurn, ProficiencyLevel, TurnRole, DEFAULT_HISTORY_WINDOW,
};
pub use correction::{reconstruct_final, reconstruct_original, CorrectionResult, Span, SpanKind};
pub use error::{Error, Result};
pub use llm_types::{FinishReason, GenerateRequest, GenerateResponse, Message, Role, TokenUsage};
pub use preview::{preview, truncate_for_log};

pub use traits::{LanguageModel, Retriever, SpacingCorrector, SpellCorrector};
