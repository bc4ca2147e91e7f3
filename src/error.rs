use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use thiserror::Error;

use crate::subprocess::ProcessError;

/// Errors a forecast request can resolve to. Every variant is terminal: it is
/// converted into exactly one HTTP response and never retried.
#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("No file uploaded")]
    NoFile,

    /// The model process exited non-zero, timed out, or could not be spawned.
    /// Carries the diagnostic text surfaced to the caller.
    #[error("{0}")]
    ModelFailed(String),

    #[error("Failed to parse model output")]
    UnparseableOutput,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ProcessError> for ForecastError {
    fn from(err: ProcessError) -> Self {
        ForecastError::ModelFailed(err.to_string())
    }
}

impl IntoResponse for ForecastError {
    fn into_response(self) -> Response {
        let status = match self {
            ForecastError::NoFile => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ForecastError>;
