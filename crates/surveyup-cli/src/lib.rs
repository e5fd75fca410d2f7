//! Surveyup CLI library.
//!
//! Turns survey documents into web-upload spreadsheets from the command
//! line.

#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;

use surveyup_convert::Converter;
use surveyup_extractor::Extractor;
use surveyup_llm::{anthropic::API_KEY_ENV, AnthropicProvider, LlmError};
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber on stderr (`RUST_LOG`, default `info`)
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Build the Anthropic-backed converter from the loaded configuration
pub fn build_converter(
    config: &Config,
    api_key: Option<&str>,
) -> Result<Converter<AnthropicProvider>> {
    let api_key = api_key.ok_or_else(|| LlmError::MissingApiKey(API_KEY_ENV.to_string()))?;
    let provider = AnthropicProvider::new(api_key, config.llm.clone())?;
    let extractor = Extractor::new(provider, config.extractor.clone());
    Ok(Converter::new(extractor, config.convert.clone()))
}
