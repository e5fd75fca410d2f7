//! Error types for the Extractor

use thiserror::Error;

/// Longest decoder message kept in a [`ExtractorError::Parse`]
pub(crate) const PARSE_EXCERPT_LIMIT: usize = 100;

/// Errors that can occur during extraction
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractorError {
    /// The oracle call for a chunk failed
    #[error("Oracle invocation failed: {0}")]
    OracleInvocation(String),

    /// The oracle response could not be decoded, even after repair
    #[error("JSON parse error: {0}")]
    Parse(String),

    /// The document contained no text
    #[error("No text could be extracted from the document")]
    EmptyExtraction,

    /// Every chunk was processed but no question came back
    #[error("No questions found in the document")]
    NoQuestionsFound,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ExtractorError {
    /// Whether this error only affects one chunk
    pub fn is_chunk_local(&self) -> bool {
        matches!(
            self,
            ExtractorError::OracleInvocation(_) | ExtractorError::Parse(_)
        )
    }

    pub(crate) fn parse(message: impl AsRef<str>) -> Self {
        ExtractorError::Parse(excerpt(message.as_ref(), PARSE_EXCERPT_LIMIT))
    }
}

impl From<serde_json::Error> for ExtractorError {
    fn from(e: serde_json::Error) -> Self {
        ExtractorError::parse(e.to_string())
    }
}

/// First `limit` characters of `text`
pub(crate) fn excerpt(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}
