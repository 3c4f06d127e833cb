//! # zkml-api — Binary Entry Point
//!
//! Starts the Axum HTTP server for the proof gateway. Binds to a
//! configurable port (default 8080).

use zkml_api::{app, AppConfig, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env();
    let state = AppState::from_config(&config).map_err(|e| {
        tracing::error!("state initialization failed: {e}");
        e
    })?;

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(artifact_dir = %config.artifact_dir.display(), "zkML gateway listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}
