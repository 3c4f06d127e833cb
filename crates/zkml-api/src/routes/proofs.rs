//! # Proof Pipeline API
//!
//! `POST /v1/proofs` accepts a multipart upload with one `file` field
//! holding the input vector JSON, runs the witness → prove → verify
//! pipeline, and returns the normalized response: the proof artifact is
//! included whenever the prove stage produced one, even if local
//! verification failed.
//!
//! `POST /v1/proofs/onchain` re-verifies a returned proof artifact
//! against the verifier contract, when the server has chain credentials.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

use zkml_chain::{VerifyOutcome, VerificationOutcome};
use zkml_core::ProofArtifact;

use crate::error::AppError;
use crate::state::AppState;

/// Multipart field carrying the input vector.
const FILE_FIELD: &str = "file";

/// Build the proofs router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/proofs", post(generate_proof))
        .route("/v1/proofs/onchain", post(verify_onchain))
}

/// Pipeline response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProofResponse {
    /// Whether local verification succeeded.
    pub success: bool,
    /// Human message on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Failure label when verification did not pass.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Verifier diagnostics when verification did not pass.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// The proof artifact, verbatim as the engine wrote it.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub proof: Option<serde_json::Value>,
    /// Verify-stage output on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification: Option<String>,
}

/// POST /v1/proofs — run the proving pipeline for an uploaded input.
///
/// Witness or prove failure aborts with a 500-equivalent carrying the
/// engine diagnostics; a verify failure still returns the proof with a
/// 500 status so callers can inspect or re-verify it on-chain.
#[utoipa::path(
    post,
    path = "/v1/proofs",
    request_body(content = String, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Proof generated and verified", body = ProofResponse),
        (status = 400, description = "Missing or unparsable upload"),
        (status = 500, description = "A pipeline stage failed", body = ProofResponse),
    ),
    tag = "proofs"
)]
pub async fn generate_proof(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let mut input = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() == Some(FILE_FIELD) {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            input = Some(bytes);
            break;
        }
    }
    let input = input.ok_or(AppError::MissingFile)?;

    let report = state.pipeline.run(&input).await?;

    if report.verified {
        let body = ProofResponse {
            success: true,
            message: Some("Proof generated and verified successfully".to_string()),
            error: None,
            details: None,
            proof: report.proof,
            verification: Some(report.verification),
        };
        Ok((StatusCode::OK, Json(body)).into_response())
    } else {
        let body = ProofResponse {
            success: false,
            message: None,
            error: Some("Verification failed".to_string()),
            details: Some(report.verification),
            proof: report.proof,
            verification: None,
        };
        Ok((StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response())
    }
}

/// On-chain verification response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct OnchainResponse {
    /// Whether the contract accepted the proof.
    pub verified: bool,
    /// Classified outcome of the attempt.
    #[schema(value_type = Object)]
    pub result: VerifyOutcome,
    /// User-facing message for the outcome.
    pub message: String,
    /// Hash of the submitted transaction, if submission happened.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
    /// Block-explorer link for the transaction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explorer_url: Option<String>,
}

impl OnchainResponse {
    fn from_outcome(outcome: VerificationOutcome, state: &AppState) -> Self {
        let transaction_hash = outcome.transaction_hash.map(|h| format!("{h:?}"));
        OnchainResponse {
            verified: outcome.result == VerifyOutcome::Verified,
            message: outcome.result.message(),
            explorer_url: transaction_hash
                .as_deref()
                .map(|tx| state.network.tx_url(tx)),
            transaction_hash,
            result: outcome.result,
        }
    }
}

/// POST /v1/proofs/onchain — verify a proof artifact on-chain.
///
/// Returns 503 when the server has no chain credentials configured.
#[utoipa::path(
    post,
    path = "/v1/proofs/onchain",
    request_body(content = Object, description = "Proof artifact as returned by POST /v1/proofs"),
    responses(
        (status = 200, description = "Attempt finished; see `result`", body = OnchainResponse),
        (status = 400, description = "Body is not a proof artifact"),
        (status = 503, description = "On-chain verification not configured"),
    ),
    tag = "proofs"
)]
pub async fn verify_onchain(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<OnchainResponse>, AppError> {
    let verifier = state.chain.clone().ok_or(AppError::ChainUnavailable)?;
    let artifact =
        ProofArtifact::from_value(&body).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let outcome = verifier.verify(&artifact).await;
    Ok(Json(OnchainResponse::from_outcome(outcome, &state)))
}
