//! Text correction for the Korean tutor
//!
//! This crate turns a learner's raw sentence into a corrected one and
//! explains the difference:
//! - **Normalizer**: strips fillers and shortens repeated characters
//! - **Mechanical correction**: word spacing and optional spelling
//! - **Contextual rewrite**: language-model correction under a strict policy
//! - **Diff**: character-level alignment rendered as labelled spans
//!
//! # Example
//!
//! ```ignore
//! use tutor_text_processing::{CorrectionPipeline, ContextualRewriter, MechanicalCorrector};
//!
//! let pipeline = CorrectionPipeline::new(
//!     MechanicalCorrector::from_config(&settings.spacing, &settings.spelling),
//!     ContextualRewriter::from_config(llm, &settings.correction),
//! );
//! let result = pipeline.correct("음 나는 학교에가요", &[], &level).await;
//! assert_eq!(result.final_text, "나는 학교에 가요");
//! ```

pub mod diff;
pub mod grammar;
pub mod mechanical;
pub mod normalizer;

mod error;
mod pipeline;

pub use error::{Result, TextProcessingError};
pub use pipeline::{
    stage, CorrectionPipeline, ProcessedText, ProcessingStep, StageOutcome,
};

pub use diff::{render_diff, render_html};
pub use grammar::{build_transcript, ContextualRewriter};
pub use mechanical::{
    create_spacer, create_speller, HttpSpacer, MechanicalCorrector, PassthroughSpacer,
    SymSpellSpacer, SymSpellSpeller,
};
pub use normalizer::normalize;
