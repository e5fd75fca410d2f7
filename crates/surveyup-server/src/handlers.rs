//! HTTP request handlers for the conversion service.
//!
//! Implements upload conversion, analysis and health check endpoints using axum.

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router as AxumRouter,
};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use surveyup_convert::{ConvertError, Converter, SourceFormat};
use surveyup_domain::{LlmProvider, QuestionRecord};
use surveyup_extractor::{ChunkFailure, ExtractionMetadata};
use tempfile::NamedTempFile;
use tracing::{info, warn};

/// Longest error message returned to clients
pub const ERROR_MESSAGE_LIMIT: usize = 200;

const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Shared application state
pub struct AppState<L: LlmProvider> {
    /// Conversion pipeline
    pub converter: Arc<Converter<L>>,
    /// Largest accepted request body in bytes
    pub max_upload_bytes: usize,
}

// Manual impl: deriving would require `L: Clone`
impl<L: LlmProvider> Clone for AppState<L> {
    fn clone(&self) -> Self {
        Self {
            converter: Arc::clone(&self.converter),
            max_upload_bytes: self.max_upload_bytes,
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall health status
    pub status: String,
    /// Model behind the oracle
    pub model: String,
}

/// Analysis response
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    /// Numbered question records
    pub questions: Vec<QuestionRecord>,
    /// Chunks that were skipped
    pub failures: Vec<ChunkFailure>,
    /// Run metadata
    pub metadata: ExtractionMetadata,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Malformed upload
    BadRequest(String),
    /// Conversion failure
    Convert(ConvertError),
    /// Internal server error
    InternalError(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Convert(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            AppError::Convert(ConvertError::NoQuestionsFound) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Convert(_) | AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::BadRequest(msg) | AppError::InternalError(msg) => msg,
            AppError::Convert(e) => e.to_string(),
        };
        if status.is_server_error() {
            warn!("Request failed: {}", message);
        }

        let body = Json(ErrorResponse {
            error: message.chars().take(ERROR_MESSAGE_LIMIT).collect(),
        });
        (status, body).into_response()
    }
}

impl From<ConvertError> for AppError {
    fn from(e: ConvertError) -> Self {
        AppError::Convert(e)
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::InternalError(format!("Failed to store upload: {}", e))
    }
}

/// An uploaded file held in a temporary file
///
/// The temporary file is deleted when this value is dropped, on every exit
/// path of the handler.
pub struct Upload {
    file_name: String,
    file: NamedTempFile,
}

impl Upload {
    /// Store `bytes` in a temporary file carrying the format's extension
    pub async fn store(
        file_name: String,
        format: SourceFormat,
        bytes: &[u8],
    ) -> Result<Self, AppError> {
        let file = tempfile::Builder::new()
            .prefix("surveyup-")
            .suffix(&format!(".{}", format.extension()))
            .tempfile()?;
        tokio::fs::write(file.path(), bytes).await?;
        Ok(Self { file_name, file })
    }

    /// Path of the temporary copy
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Name the client gave the file
    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

/// Read the `file` field of a multipart request into a temporary file
async fn receive_upload(mut multipart: Multipart) -> Result<Upload, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        // Reject before reading the body
        let format = SourceFormat::from_path(Path::new(&file_name))?;

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {}", e)))?;

        info!("Received '{}' ({} bytes)", file_name, bytes.len());
        return Upload::store(file_name, format, &bytes).await;
    }

    Err(AppError::BadRequest("Missing multipart field 'file'".to_string()))
}

/// `<stem>_webup.xlsx` for the uploaded name
pub fn output_file_name(upload_name: &str) -> String {
    let stem = Path::new(upload_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("survey");
    format!("{}_webup.xlsx", stem)
}

/// `Content-Disposition` value with an ASCII fallback and an RFC 5987 name
pub fn content_disposition(file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let mut encoded = String::new();
    for byte in file_name.bytes() {
        if byte.is_ascii_alphanumeric() || b"-._~".contains(&byte) {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{:02X}", byte));
        }
    }

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback, encoded
    )
}

/// POST /convert - Convert an uploaded survey into the upload spreadsheet
async fn convert<L: LlmProvider + 'static>(
    State(state): State<AppState<L>>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let upload = receive_upload(multipart).await?;
    let (result, bytes) = state.converter.convert_to_bytes(upload.path()).await?;

    let output_name = output_file_name(upload.file_name());
    info!(
        "Converted '{}': {} question(s), {} failed chunk(s)",
        upload.file_name(),
        result.survey.len(),
        result.failures.len()
    );

    let disposition = HeaderValue::from_str(&content_disposition(&output_name))
        .map_err(|e| AppError::InternalError(format!("Invalid file name header: {}", e)))?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(XLSX_MIME)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

/// POST /analyze - Return the analyzed structure as JSON
async fn analyze<L: LlmProvider + 'static>(
    State(state): State<AppState<L>>,
    multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let upload = receive_upload(multipart).await?;
    let result = state.converter.convert_file(upload.path()).await?;

    Ok(Json(AnalyzeResponse {
        questions: result.survey.into_questions(),
        failures: result.failures,
        metadata: result.metadata,
    }))
}

/// GET /health - Service health and the active model
async fn health_check<L: LlmProvider + 'static>(
    State(state): State<AppState<L>>,
) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        model: state.converter.extractor().model_name().to_string(),
    })
}

/// Create the axum router with all routes
pub fn create_router<L: LlmProvider + 'static>(state: AppState<L>) -> AxumRouter {
    let body_limit = state.max_upload_bytes;
    AxumRouter::new()
        .route("/convert", post(convert::<L>))
        .route("/analyze", post(analyze::<L>))
        .route("/health", get(health_check::<L>))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
