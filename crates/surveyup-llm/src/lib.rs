//! Surveyup LLM Provider Layer
//!
//! Implementations of the `LlmProvider` trait from `surveyup-domain`.
//!
//! # Providers
//!
//! - `MockProvider`: Scripted fake oracle for tests
//! - `AnthropicProvider`: Anthropic Messages API integration
//!
//! # Examples
//!
//! ```
//! use surveyup_domain::{LlmProvider, OracleRequest};
//! use surveyup_llm::MockProvider;
//!
//! # tokio_test::block_on(async {
//! let provider = MockProvider::new(r#"{"questions": []}"#);
//! let request = OracleRequest { system: "sys".into(), prompt: "text".into() };
//! let result = provider.generate(&request).await.unwrap();
//! assert_eq!(result, r#"{"questions": []}"#);
//! # });
//! ```

#![warn(missing_docs)]

pub mod anthropic;

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use surveyup_domain::{LlmProvider, OracleRequest};
use thiserror::Error;

pub use anthropic::{AnthropicConfig, AnthropicProvider};

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// No API key configured
    #[error("Missing API key: set {0}")]
    MissingApiKey(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

/// One scripted reply of the [`MockProvider`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockReply {
    /// Return this raw text
    Text(String),

    /// Fail the call with this message
    Error(String),
}

/// Mock LLM provider for deterministic testing
///
/// Scripted replies are handed out in call order; once the script runs dry
/// every call gets the default response. Every request is recorded so tests
/// can inspect the prompts that were sent.
///
/// # Examples
///
/// ```
/// use surveyup_domain::{LlmProvider, OracleRequest};
/// use surveyup_llm::MockProvider;
///
/// # tokio_test::block_on(async {
/// let provider = MockProvider::default()
///     .with_response("first")
///     .with_error("boom");
/// let request = OracleRequest { system: String::new(), prompt: String::new() };
///
/// assert_eq!(provider.generate(&request).await.unwrap(), "first");
/// assert!(provider.generate(&request).await.is_err());
/// assert_eq!(provider.call_count(), 2);
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    script: Arc<Mutex<VecDeque<MockReply>>>,
    requests: Arc<Mutex<Vec<OracleRequest>>>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all requests
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            script: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a MockProvider that replays `replies` in order
    pub fn scripted(replies: impl IntoIterator<Item = MockReply>) -> Self {
        let provider = Self::default();
        provider.script.lock().unwrap().extend(replies);
        provider
    }

    /// Queue a successful reply
    pub fn with_response(self, response: impl Into<String>) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(MockReply::Text(response.into()));
        self
    }

    /// Queue a failing reply
    pub fn with_error(self, message: impl Into<String>) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(MockReply::Error(message.into()));
        self
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Requests received so far, in call order
    pub fn requests(&self) -> Vec<OracleRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new(r#"{"questions": []}"#)
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    type Error = LlmError;

    async fn generate(&self, request: &OracleRequest) -> Result<String, Self::Error> {
        self.requests.lock().unwrap().push(request.clone());

        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(MockReply::Text(text)) => Ok(text),
            Some(MockReply::Error(message)) => Err(LlmError::Other(message)),
            None => Ok(self.default_response.clone()),
        }
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(prompt: &str) -> OracleRequest {
        OracleRequest {
            system: "system".to_string(),
            prompt: prompt.to_string(),
        }
    }

    #[tokio::test]
    async fn test_mock_provider_default() {
        let provider = MockProvider::new("Test response");
        let result = provider.generate(&request("any prompt")).await;
        assert_eq!(result.unwrap(), "Test response");
    }

    #[tokio::test]
    async fn test_mock_provider_script_then_default() {
        let provider = MockProvider::scripted(vec![
            MockReply::Text("one".to_string()),
            MockReply::Text("two".to_string()),
        ]);

        assert_eq!(provider.generate(&request("a")).await.unwrap(), "one");
        assert_eq!(provider.generate(&request("b")).await.unwrap(), "two");
        assert_eq!(
            provider.generate(&request("c")).await.unwrap(),
            r#"{"questions": []}"#
        );
    }

    #[tokio::test]
    async fn test_mock_provider_error() {
        let provider = MockProvider::default().with_error("offline");

        let result = provider.generate(&request("bad prompt")).await;
        assert!(matches!(result, Err(LlmError::Other(msg)) if msg == "offline"));
    }

    #[tokio::test]
    async fn test_mock_provider_records_requests() {
        let provider = MockProvider::default();
        provider.generate(&request("first")).await.unwrap();
        provider.generate(&request("second")).await.unwrap();

        let prompts: Vec<_> = provider.requests().into_iter().map(|r| r.prompt).collect();
        assert_eq!(prompts, vec!["first", "second"]);
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn test_mock_provider_clone_shares_state() {
        let provider1 = MockProvider::new("test");
        let provider2 = provider1.clone();

        provider1.generate(&request("test")).await.unwrap();

        assert_eq!(provider1.call_count(), 1);
        assert_eq!(provider2.call_count(), 1);
    }
}
