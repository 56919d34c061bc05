//! HTTP server for prism (axum).
//!
//! Listens on http://127.0.0.1:8080 and serves `POST /research`:
//!
//! | request | response |
//! |---------|----------|
//! | `{"question": "..."}` | 200 `{"answer": "..."}` |
//! | run completed without an answer | 200 `{"answer": null, "message": "no answer generated"}` |
//! | blank question or bad JSON | 400 `{"error": "..."}` |
//! | run failed | 500 `{"error": "..."}` |
//!
//! **Public API**: [`router`], [`run_serve`], [`run_serve_on_listener`].

mod app;
mod response;

use std::sync::Arc;

use axum::Router;
use prism::ResearchRunner;
use tokio::net::TcpListener;
use tracing::info;

use app::AppState;

pub const DEFAULT_HTTP_ADDR: &str = "127.0.0.1:8080";

/// The router with `runner` as shared state. Useful for embedding in a larger app.
pub fn router(runner: ResearchRunner) -> Router {
    app::router(AppState {
        runner: Arc::new(runner),
    })
}

/// Serves on an existing listener. Used by tests (bind to 127.0.0.1:0 then pass listener).
pub async fn run_serve_on_listener(
    listener: TcpListener,
    runner: ResearchRunner,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr = listener.local_addr()?;
    info!("HTTP server listening on http://{}", addr);
    axum::serve(listener, router(runner)).await?;
    Ok(())
}

/// Serves on `addr` (default 127.0.0.1:8080).
pub async fn run_serve(
    addr: Option<&str>,
    runner: ResearchRunner,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr = addr.unwrap_or(DEFAULT_HTTP_ADDR);
    let listener = TcpListener::bind(addr).await?;
    run_serve_on_listener(listener, runner).await
}
