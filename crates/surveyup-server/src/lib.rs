//! Surveyup Server
//!
//! HTTP front end for the survey converter: upload a questionnaire, get the
//! web-upload spreadsheet (`POST /convert`) or the analyzed structure as
//! JSON (`POST /analyze`) back.

#![warn(missing_docs)]

pub mod config;
pub mod handlers;

use config::ServerConfig;
use handlers::{create_router, AppState};
use std::sync::Arc;
use surveyup_convert::Converter;
use surveyup_extractor::Extractor;
use surveyup_llm::{AnthropicProvider, LlmError};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Oracle client could not be created
    #[error("LLM provider error: {0}")]
    Llm(#[from] LlmError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Install the global tracing subscriber (`RUST_LOG`, default `info`)
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // A subscriber may already be installed (tests, embedding)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Start the HTTP server
///
/// Validates configuration, creates the Anthropic provider from
/// `ANTHROPIC_API_KEY`, and starts the axum server.
pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    init_tracing();
    config.validate()?;

    info!("Starting Surveyup server");
    info!("Bind address: {}", config.bind_addr());
    info!("Model: {}", config.llm.model);
    info!(
        "Chunk size: {} chars (lookback {})",
        config.extractor.max_chunk_size, config.extractor.lookback
    );

    let provider = AnthropicProvider::from_env(config.llm.clone())?;
    let extractor = Extractor::new(provider, config.extractor.clone());
    let converter = Converter::new(extractor, config.convert.clone());

    let state = AppState {
        converter: Arc::new(converter),
        max_upload_bytes: config.max_upload_bytes,
    };

    let app = create_router(state);

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Server listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    Ok(())
}
