//! # Application Error
//!
//! Maps pipeline errors to the gateway's wire contract: a flat JSON body
//! with an `error` message and optional `details` carrying the engine's
//! captured diagnostics.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use zkml_prover::PipelineError;

/// Application-level error type that maps to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// The multipart form had no file field.
    #[error("No file uploaded")]
    MissingFile,

    /// The request was malformed (bad multipart, unparsable input).
    #[error("{0}")]
    BadRequest(String),

    /// A fatal pipeline stage failed; `details` is the engine output.
    #[error("{error}")]
    StageFailure {
        /// Which stage failed, as a user-facing message.
        error: String,
        /// Captured engine diagnostics.
        details: String,
    },

    /// On-chain verification is not configured on this server.
    #[error("on-chain verification is not configured")]
    ChainUnavailable,

    /// Anything unexpected; surfaced with its message, never silently.
    #[error("{0}")]
    Internal(String),
}

impl From<PipelineError> for AppError {
    fn from(e: PipelineError) -> Self {
        match e {
            PipelineError::MalformedInput(_) => AppError::BadRequest(e.to_string()),
            PipelineError::Witness { details } => AppError::StageFailure {
                error: "Failed to generate witness".to_string(),
                details,
            },
            PipelineError::Prove { details } => AppError::StageFailure {
                error: "Failed to generate proof".to_string(),
                details,
            },
            PipelineError::Artifact(e) => AppError::Internal(e.to_string()),
            PipelineError::Runner(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::MissingFile | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::ChainUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            AppError::StageFailure { .. } | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = match &self {
            AppError::StageFailure { error, details } => serde_json::json!({
                "error": error,
                "details": details,
            }),
            other => serde_json::json!({ "error": other.to_string() }),
        };
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn witness_failure_maps_to_500_with_details() {
        let err: AppError = PipelineError::Witness {
            details: "model mismatch".to_string(),
        }
        .into();
        match &err {
            AppError::StageFailure { error, details } => {
                assert_eq!(error, "Failed to generate witness");
                assert_eq!(details, "model mismatch");
            }
            other => panic!("expected StageFailure, got {other:?}"),
        }
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn malformed_input_maps_to_400() {
        let parse_err = serde_json::from_slice::<serde_json::Value>(b"{nope").unwrap_err();
        let err: AppError = PipelineError::MalformedInput(parse_err).into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn missing_file_message_matches_contract() {
        assert_eq!(AppError::MissingFile.to_string(), "No file uploaded");
    }
}
