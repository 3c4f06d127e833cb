//! # OpenAPI Specification Assembly
//!
//! Assembles the utoipa-documented routes into a single spec, served at
//! `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the gateway surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "zkML Proof Gateway",
        version = "0.2.0",
        description = "HTTP gateway over a Halo2 proving pipeline: multipart input upload, witness/prove/verify orchestration, and on-chain proof verification against the Mantle Sepolia verifier contract.",
        license(name = "MIT")
    ),
    paths(
        crate::routes::proofs::generate_proof,
        crate::routes::proofs::verify_onchain,
        crate::routes::health::health,
    ),
    components(schemas(
        crate::routes::proofs::ProofResponse,
        crate::routes::proofs::OnchainResponse,
    )),
    tags(
        (name = "proofs", description = "Proof pipeline and on-chain verification"),
        (name = "health", description = "Liveness probe"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json — the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
