//! Surveyup Extractor
//!
//! Converts free-form survey text into numbered question records using an LLM.
//!
//! # Overview
//!
//! Survey documents are often longer than one oracle call can answer in full,
//! so the Extractor splits them at question boundaries, sends the chunks one
//! at a time, and stitches the answers back into a single list whose console
//! numbers (`Q1, Q2, ...`) run without gaps across the whole document.
//!
//! # Architecture
//!
//! ```text
//! Text → Chunker → (per chunk) Prompt → LLM → Parser → renumber → SurveyResult
//! ```
//!
//! # Key Features
//!
//! - **Boundary-aware chunking**: cuts land on question or section markers
//! - **Continuation context**: each chunk after the first is told where
//!   numbering left off
//! - **Tolerant parsing**: fenced, prose-wrapped and truncated JSON is repaired
//! - **Fault isolation**: a failed chunk is recorded and skipped
//!
//! # Example Usage
//!
//! ```
//! use surveyup_extractor::{Extractor, ExtractorConfig};
//! use surveyup_llm::MockProvider;
//!
//! # tokio_test::block_on(async {
//! let llm = MockProvider::new(r#"{"questions": [
//!     {"item_id": "SQ1", "prompt": "SQ1. Gender", "options": ["Male", "Female"]}
//! ]}"#);
//! let extractor = Extractor::new(llm, ExtractorConfig::default());
//!
//! let result = extractor.process("SQ1. Gender\n1) Male\n2) Female").await.unwrap();
//!
//! assert_eq!(result.survey.len(), 1);
//! assert_eq!(result.survey.questions()[0].console_id, "Q1");
//! # });
//! ```

#![warn(missing_docs)]

mod chunking;
mod config;
mod error;
mod extractor;
mod parser;
mod prompt;
mod types;


pub use chunking::SurveyChunker;
pub use config::ExtractorConfig;
pub use error::ExtractorError;
pub use extractor::Extractor;
pub use parser::parse_response;
pub use prompt::{PromptBuilder, SYSTEM_PROMPT};
pub use types::{ChunkFailure, ExtractionMetadata, ExtractionResult, FailureKind};
