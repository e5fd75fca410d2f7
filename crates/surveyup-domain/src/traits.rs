//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the conversion core and
//! infrastructure. Implementations live in other crates.

use async_trait::async_trait;

/// A single request to the analysis oracle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleRequest {
    /// Fixed system instruction (output shape, numbering rules)
    pub system: String,

    /// User turn: optional continuation preamble followed by the chunk text
    pub prompt: String,
}

/// Trait for LLM provider operations
///
/// Implemented by the infrastructure layer (surveyup-llm)
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Error type for LLM operations
    type Error: std::fmt::Display + Send;

    /// Send one request and return the raw text output
    async fn generate(&self, request: &OracleRequest) -> Result<String, Self::Error>;

    /// Model identifier reported in metadata
    fn model_name(&self) -> &str;
}
