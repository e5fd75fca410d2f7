//! Surveyup Domain Layer
//!
//! Core value types and trait seams shared by every other crate.
//!
//! ## Key Concepts
//!
//! - **Question record**: one questionnaire item in the upload layout
//! - **Console number**: the sequential `Q1, Q2, ...` numbering assigned for the
//!   hosting platform, independent of the survey's own item numbering
//! - **Chunk**: a bounded, contiguous slice of source text sent to the oracle
//! - **Oracle**: the external LLM that turns questionnaire text into records
//!
//! Infrastructure (HTTP oracle clients, file readers, spreadsheet writers)
//! lives in other crates and plugs in through the traits in [`traits`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod chunk;
pub mod question;
pub mod survey;
pub mod traits;

// Re-exports for convenience
pub use chunk::Chunk;
pub use question::{console_id, OptionStyle, QuestionRecord, QuestionType, MAX_RENDERED_OPTIONS};
pub use survey::SurveyResult;
pub use traits::{LlmProvider, OracleRequest};
