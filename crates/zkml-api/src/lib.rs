//! # zkml-api — HTTP Gateway for the Proving Pipeline
//!
//! Axum service exposing the zkML proof pipeline:
//!
//! | Route                    | Module              | Purpose                         |
//! |--------------------------|---------------------|---------------------------------|
//! | `POST /v1/proofs`        | [`routes::proofs`]  | Upload input, run the pipeline  |
//! | `POST /v1/proofs/onchain`| [`routes::proofs`]  | Verify a proof on-chain         |
//! | `GET /health`            | [`routes::health`]  | Liveness probe                  |
//! | `GET /openapi.json`      | [`openapi`]         | Generated OpenAPI spec          |
//!
//! ## Middleware Stack
//!
//! TraceLayer → CorsLayer → Handler. The health probe is mounted outside
//! the middleware stack.
//!
//! ## Crate Policy
//!
//! - No pipeline or chain logic in handlers — delegates to `zkml-prover`
//!   and `zkml-chain`.
//! - All errors map to structured HTTP responses via [`AppError`].

pub mod error;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use error::AppError;
pub use state::{AppConfig, AppState};

/// Assemble the full application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(routes::proofs::router())
        .merge(openapi::router())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    Router::new()
        .merge(routes::health::router())
        .merge(api)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use zkml_chain::HALO2_VERIFIER_ADDRESS;
    use zkml_core::Stage;
    use zkml_prover::{MockRunner, StageRunner};

    use super::*;

    const BOUNDARY: &str = "X-BOUNDARY";

    fn test_config(tmp: &tempfile::TempDir) -> AppConfig {
        AppConfig {
            port: 0,
            artifact_dir: tmp.path().join("zkfiles"),
            scratch_dir: tmp.path().join("scratch"),
            prover_bin: PathBuf::from("ezkl"),
            chain_rpc_url: None,
            chain_private_key: None,
            verifier_address: HALO2_VERIFIER_ADDRESS.to_string(),
        }
    }

    fn test_app(tmp: &tempfile::TempDir, runner: Arc<dyn StageRunner>) -> Router {
        let state = AppState::with_runner(&test_config(tmp), runner).unwrap();
        app(state)
    }

    fn multipart_upload(field: &str, payload: &str) -> Request<Body> {
        let body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"{field}\"; filename=\"input.json\"\r\n\
             Content-Type: application/json\r\n\r\n\
             {payload}\r\n\
             --{BOUNDARY}--\r\n"
        );
        Request::builder()
            .method("POST")
            .uri("/v1/proofs")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn successful_pipeline_returns_proof_and_verification() {
        let tmp = tempfile::tempdir().unwrap();
        let runner = Arc::new(
            MockRunner::new().with_proof(serde_json::json!({
                "hex_proof": "1a2b",
                "pretty_public_inputs": { "inputs": [["0x1"]], "outputs": [["0x2"]] }
            })),
        );
        let app = test_app(&tmp, runner);

        let response = app
            .oneshot(multipart_upload("file", r#"{"input_data": [[1.0, 2.0]]}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Proof generated and verified successfully");
        assert_eq!(body["proof"]["hex_proof"], "1a2b");
        assert!(body["verification"].is_string());
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn missing_file_field_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let runner = Arc::new(MockRunner::new());
        let app = test_app(&tmp, runner.clone());

        let response = app
            .oneshot(multipart_upload("attachment", r#"{"input_data": []}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"], "No file uploaded");
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn malformed_input_never_reaches_the_engine() {
        let tmp = tempfile::tempdir().unwrap();
        let runner = Arc::new(MockRunner::new());
        let app = test_app(&tmp, runner.clone());

        let response = app
            .oneshot(multipart_upload("file", "{not json"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn witness_failure_surfaces_engine_diagnostics() {
        let tmp = tempfile::tempdir().unwrap();
        let runner = Arc::new(MockRunner::new().failing(Stage::Witness, "model mismatch"));
        let app = test_app(&tmp, runner.clone());

        let response = app
            .oneshot(multipart_upload("file", r#"{"input_data": [[1.0]]}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Failed to generate witness");
        assert_eq!(body["details"], "model mismatch");
        assert_eq!(runner.calls(), vec![Stage::Witness]);
    }

    #[tokio::test]
    async fn verify_failure_still_returns_the_proof() {
        let tmp = tempfile::tempdir().unwrap();
        let runner = Arc::new(
            MockRunner::new()
                .failing(Stage::Verify, "constraint unsatisfied")
                .with_proof(serde_json::json!({ "hex_proof": "deadbeef" })),
        );
        let app = test_app(&tmp, runner);

        let response = app
            .oneshot(multipart_upload("file", r#"{"input_data": [[1.0]]}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Verification failed");
        assert_eq!(body["details"], "constraint unsatisfied");
        assert_eq!(body["proof"]["hex_proof"], "deadbeef");
    }

    #[tokio::test]
    async fn onchain_route_returns_503_without_chain_credentials() {
        let tmp = tempfile::tempdir().unwrap();
        let app = test_app(&tmp, Arc::new(MockRunner::new()));

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/v1/proofs/onchain")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"hex_proof": "0x1a"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn health_probe_is_alive() {
        let tmp = tempfile::tempdir().unwrap();
        let app = test_app(&tmp, Arc::new(MockRunner::new()));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn openapi_spec_is_served() {
        let tmp = tempfile::tempdir().unwrap();
        let app = test_app(&tmp, Arc::new(MockRunner::new()));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/openapi.json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert!(body["paths"].get("/v1/proofs").is_some());
        assert!(body["paths"].get("/v1/proofs/onchain").is_some());
    }
}
