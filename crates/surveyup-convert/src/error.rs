//! Error types for document conversion

use surveyup_extractor::ExtractorError;
use thiserror::Error;

/// Errors that can occur while converting a document
#[derive(Error, Debug)]
pub enum ConvertError {
    /// The file extension is not one of the supported formats
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// The document contained no text
    #[error("No text could be extracted from the document")]
    EmptyExtraction,

    /// The oracle returned no question for any chunk
    #[error("No questions found in the document")]
    NoQuestionsFound,

    /// Reading text out of the source document failed
    #[error("Text extraction failed: {0}")]
    Extraction(String),

    /// Writing the spreadsheet failed
    #[error("Spreadsheet generation failed: {0}")]
    Emit(String),

    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Any other extractor error
    #[error(transparent)]
    Extractor(ExtractorError),
}

impl From<ExtractorError> for ConvertError {
    fn from(e: ExtractorError) -> Self {
        match e {
            ExtractorError::EmptyExtraction => ConvertError::EmptyExtraction,
            ExtractorError::NoQuestionsFound => ConvertError::NoQuestionsFound,
            other => ConvertError::Extractor(other),
        }
    }
}

impl ConvertError {
    /// Whether the caller sent something that cannot be converted
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ConvertError::UnsupportedFormat(_) | ConvertError::EmptyExtraction
        )
    }
}
