//! Core traits for the tutor
//!
//! Every external capability the pipeline touches sits behind one of
//! these traits so backends can be swapped by configuration and replaced
//! by mocks in tests.
//!
//! ```text
//! Language Models:
//!   - LanguageModel: chat completion (rewrite and reply stages)
//!
//! Text Processing:
//!   - SpacingCorrector: fix word spacing
//!   - SpellCorrector: fix misspelled words
//!
//! Retrieval:
//!   - Retriever: keyword lookup of tutor knowledge
//! ```

mod llm;
mod retriever;
mod text_processing;

pub use llm::LanguageModel;
pub use retriever::Retriever;
pub use text_processing::{SpacingCorrector, SpellCorrector};
