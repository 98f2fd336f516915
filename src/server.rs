// src/server.rs
// =============================================================================
// The `serve` subcommand: link checking over HTTP.
//
// Endpoint:
//   POST /check-links   body: { "url": "https://example.com" }
//
// Responses:
//   200  { "linkStatuses": [...], "metaTags": [...] }
//        (broken links are listed inside, they don't fail the request)
//   400  { "error": "Invalid page URL" }
//   500  { "error": "Error fetching page content" }
//   504  { "error": "Timed out checking page" }
//
// If the client disconnects, axum drops the handler future, and with it
// every probe still in flight for that page.
// =============================================================================

use crate::checker::{Checker, LinkReport};
use crate::error::CheckError;
use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{error, info, warn, Level};

#[derive(Debug, Deserialize)]
pub struct CheckLinksRequest {
    pub url: String,
}

// Binds to `addr` and serves until Ctrl+C / SIGTERM
pub async fn run_server(addr: SocketAddr, checker: Checker) -> Result<()> {
    let app = create_app(Arc::new(checker));

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind TCP listener to address {}", addr))?;
    info!("Server running on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Server shutdown complete");
    Ok(())
}

fn create_app(checker: Arc<Checker>) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::default())
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/check-links", post(check_links))
        .with_state(checker)
        .layer(
            ServiceBuilder::new()
                .layer(trace_layer)
                .layer(CorsLayer::permissive()),
        )
}

async fn check_links(
    State(checker): State<Arc<Checker>>,
    Json(request): Json<CheckLinksRequest>,
) -> Result<Json<LinkReport>, CheckError> {
    let report = checker.check_page(&request.url).await?;
    Ok(Json(report))
}

// Page-level failures become an error status with a short JSON body.
// The details go to the log, not to the client.
impl IntoResponse for CheckError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            CheckError::InvalidPageUrl { .. } => (StatusCode::BAD_REQUEST, "Invalid page URL"),
            CheckError::PageTimeout { .. } => {
                (StatusCode::GATEWAY_TIMEOUT, "Timed out checking page")
            }
            CheckError::PageFetch { .. } | CheckError::PageStatus { .. } | CheckError::Client(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Error fetching page content")
            }
        };
        warn!("{}", self);
        (status, Json(json!({ "error": message }))).into_response()
    }
}

// Resolves when Ctrl+C (or SIGTERM on Unix) is received
async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
                info!("Received SIGTERM, shutting down");
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
