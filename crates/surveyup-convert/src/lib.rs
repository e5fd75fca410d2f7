//! Surveyup Convert
//!
//! Everything around the extraction core that turns a file on disk into an
//! upload spreadsheet.
//!
//! ```text
//! .txt/.docx/.xlsx/.pdf → text → Extractor → SurveyResult → 설문지.xlsx
//! ```
//!
//! - [`text`]: plain text out of supported document formats
//! - [`sheet`]: the fixed web-upload spreadsheet layout
//! - [`Converter`]: the whole pipeline, with format checks up front

#![warn(missing_docs)]

mod error;
mod format;
mod pipeline;
pub mod sheet;
pub mod text;

pub use error::ConvertError;
pub use format::SourceFormat;
pub use pipeline::{cap_text, default_output_path, ConvertConfig, Converter, TRUNCATION_NOTICE};
