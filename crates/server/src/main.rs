// crates/server/src/main.rs
//! Churnboard server binary.
//!
//! Wires the upload poller to the real status endpoint and notification
//! channel, then serves the dashboard API.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use churnboard_server::{create_app, AppState};
use churnboard_uploads::HttpStatusClient;
use tracing_subscriber::EnvFilter;

/// Default port for the server.
const DEFAULT_PORT: u16 = 47310;

/// Default base URL of the backend that owns the upload status endpoint.
const DEFAULT_STATUS_API: &str = "http://127.0.0.1:8000/api";

/// Get the server port from environment or use default.
fn get_port() -> u16 {
    std::env::var("CHURNBOARD_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT)
}

/// Get the upload status API base URL from environment or use default.
fn get_status_api() -> String {
    std::env::var("CHURNBOARD_STATUS_API").unwrap_or_else(|_| DEFAULT_STATUS_API.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .compact()
        .init();

    let status_api = get_status_api();
    let client = Arc::new(HttpStatusClient::new(status_api.clone()));
    let state = AppState::new(client);
    let app = create_app(state);

    let port = get_port();
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, status_api = %status_api, "churnboard server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
