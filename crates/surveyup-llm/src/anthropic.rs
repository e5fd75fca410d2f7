//! Anthropic Provider Implementation
//!
//! Sends survey analysis requests to the Anthropic Messages API.
//!
//! # Features
//!
//! - Async HTTP communication via `reqwest`
//! - Configurable endpoint, model and output budget
//! - Retry logic with exponential backoff for rate limits and server errors
//! - Client-side request deadline
//!
//! # Examples
//!
//! ```no_run
//! use surveyup_llm::{AnthropicConfig, AnthropicProvider};
//!
//! let provider = AnthropicProvider::from_env(AnthropicConfig::default()).unwrap();
//! ```

use crate::LlmError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use surveyup_domain::{LlmProvider, OracleRequest};
use tracing::{debug, warn};

/// Default Anthropic API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.anthropic.com";

/// Default model
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Longest error body kept in error messages
const ERROR_BODY_LIMIT: usize = 200;

/// Settings for the Anthropic provider
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnthropicConfig {
    /// API base URL
    pub endpoint: String,

    /// Model identifier
    pub model: String,

    /// Output token budget per request
    pub max_tokens: u32,

    /// Per-request deadline (seconds)
    pub timeout_secs: u64,

    /// Attempts before giving up on retryable failures
    pub max_retries: u32,

    /// Value of the `anthropic-version` header
    pub api_version: String,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 16_000,
            timeout_secs: 300,
            max_retries: 3,
            api_version: "2023-06-01".to_string(),
        }
    }
}

impl AnthropicConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("model must not be empty".to_string());
        }
        if self.max_tokens == 0 {
            return Err("max_tokens must be greater than 0".to_string());
        }
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }
        if self.max_retries == 0 {
            return Err("max_retries must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// Anthropic Messages API provider
pub struct AnthropicProvider {
    config: AnthropicConfig,
    api_key: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: [Message<'a>; 1],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl AnthropicProvider {
    /// Create a new provider with an explicit API key
    pub fn new(api_key: impl Into<String>, config: AnthropicConfig) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::MissingApiKey(API_KEY_ENV.to_string()));
        }
        config.validate().map_err(LlmError::Other)?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Other(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config,
            api_key,
            client,
        })
    }

    /// Create a provider using the key from `ANTHROPIC_API_KEY`
    pub fn from_env(config: AnthropicConfig) -> Result<Self, LlmError> {
        let api_key = std::env::var(API_KEY_ENV)
            .map_err(|_| LlmError::MissingApiKey(API_KEY_ENV.to_string()))?;
        Self::new(api_key, config)
    }

    /// Active configuration
    pub fn config(&self) -> &AnthropicConfig {
        &self.config
    }

    async fn send_once(&self, request: &OracleRequest) -> Result<String, Attempt> {
        let url = format!("{}/v1/messages", self.config.endpoint.trim_end_matches('/'));
        let body = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            system: &request.system,
            messages: [Message {
                role: "user",
                content: &request.prompt,
            }],
        };

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.config.api_version)
            .json(&body)
            .send()
            .await
            .map_err(|e| Attempt::Retry(LlmError::Communication(format!("Request failed: {}", e))))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(Attempt::Retry(LlmError::RateLimitExceeded));
        }
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let error = LlmError::Communication(format!(
                "HTTP {}: {}",
                status,
                truncate(&text, ERROR_BODY_LIMIT)
            ));
            return Err(if status.is_server_error() {
                Attempt::Retry(error)
            } else {
                Attempt::Fatal(error)
            });
        }

        let parsed: MessagesResponse = response.json().await.map_err(|e| {
            Attempt::Fatal(LlmError::InvalidResponse(format!(
                "Failed to parse response: {}",
                e
            )))
        })?;

        if parsed.stop_reason.as_deref() == Some("max_tokens") {
            warn!(
                "Response hit the {} token output limit and is likely truncated",
                self.config.max_tokens
            );
        }

        parsed
            .content
            .into_iter()
            .find(|block| block.kind == "text")
            .and_then(|block| block.text)
            .ok_or_else(|| {
                Attempt::Fatal(LlmError::InvalidResponse(
                    "Response contained no text block".to_string(),
                ))
            })
    }
}

/// Outcome of one failed attempt
enum Attempt {
    Retry(LlmError),
    Fatal(LlmError),
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    type Error = LlmError;

    async fn generate(&self, request: &OracleRequest) -> Result<String, Self::Error> {
        let mut attempts = 0;
        let mut last_error = None;

        while attempts < self.config.max_retries {
            match self.send_once(request).await {
                Ok(text) => {
                    debug!("Received {} chars from {}", text.len(), self.config.model);
                    return Ok(text);
                }
                Err(Attempt::Fatal(e)) => return Err(e),
                Err(Attempt::Retry(e)) => {
                    warn!("Attempt {} failed: {}", attempts + 1, e);
                    last_error = Some(e);
                }
            }

            attempts += 1;
            if attempts < self.config.max_retries {
                // Exponential backoff: 1s, 2s, 4s, etc.
                let delay = Duration::from_secs(2u64.pow(attempts - 1));
                tokio::time::sleep(delay).await;
            }
        }

        Err(last_error
            .unwrap_or_else(|| LlmError::Communication("Max retries exceeded".to_string())))
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

fn truncate(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AnthropicConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_tokens, 16_000);
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_invalid_config() {
        let mut config = AnthropicConfig::default();
        config.max_tokens = 0;
        assert!(config.validate().is_err());

        let mut config = AnthropicConfig::default();
        config.model = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_provider_requires_key() {
        let result = AnthropicProvider::new("", AnthropicConfig::default());
        assert!(matches!(result, Err(LlmError::MissingApiKey(_))));
    }

    #[test]
    fn test_provider_creation() {
        let provider = AnthropicProvider::new("sk-test", AnthropicConfig::default()).unwrap();
        assert_eq!(provider.model_name(), DEFAULT_MODEL);
        assert_eq!(provider.config().max_retries, 3);
    }

    #[test]
    fn test_config_fills_missing_fields() {
        let config: AnthropicConfig = serde_json::from_str(r#"{"model": "claude-test"}"#).unwrap();
        assert_eq!(config.model, "claude-test");
        assert_eq!(config.max_tokens, 16_000);
    }

    #[test]
    fn test_request_body_shape() {
        let body = MessagesRequest {
            model: "m",
            max_tokens: 10,
            system: "sys",
            messages: [Message {
                role: "user",
                content: "hello",
            }],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["system"], "sys");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hello");
    }

    #[tokio::test]
    async fn test_connection_error_is_reported() {
        let config = AnthropicConfig {
            endpoint: "http://127.0.0.1:9".to_string(),
            max_retries: 1,
            timeout_secs: 2,
            ..AnthropicConfig::default()
        };
        let provider = AnthropicProvider::new("sk-test", config).unwrap();
        let request = OracleRequest {
            system: "sys".to_string(),
            prompt: "text".to_string(),
        };

        let result = provider.generate(&request).await;
        assert!(matches!(result, Err(LlmError::Communication(_))));
    }
}
