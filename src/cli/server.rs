//! HTTP server mode: the endpoint Fivetran invokes

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::engine::{ErrorResponse, SyncEngine, SyncRequest};
use crate::error::{Error, Result};

/// App state shared across handlers
#[derive(Clone)]
struct AppState {
    engine: Arc<SyncEngine>,
}

/// Build the router: `POST /` runs one sync invocation, `GET /_health`
/// answers `OK`
pub fn router(engine: Arc<SyncEngine>) -> Router {
    let state = AppState { engine };

    Router::new()
        .route("/", post(sync))
        .route("/_health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server
pub async fn serve(engine: Arc<SyncEngine>, port: u16) -> Result<()> {
    let app = router(engine);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Server listening on port {}", port);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::config(format!("Failed to bind to port {port}: {e}")))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::config(format!("Server error: {e}")))?;

    Ok(())
}

/// Health check endpoint
async fn health() -> &'static str {
    "OK"
}

/// Run one sync invocation.
///
/// The body is parsed here rather than with the `Json` extractor so that
/// malformed requests get the same error shape as sync failures.
async fn sync(State(state): State<AppState>, body: Bytes) -> Response {
    let result = match SyncRequest::from_slice(&body) {
        Ok(request) => state.engine.sync(&request).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => {
            error!(
                error_type = e.error_type(),
                resource = e.resource().map_or("-", |r| r.as_str()),
                "Sync invocation failed: {e}"
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::from(&e)),
            )
                .into_response()
        }
    }
}
