//! Router, handlers and the listen loop

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use super::error::ApiError;
use crate::error::{Error, Result};
use crate::models::{FeedbackInput, FeedbackRecord};
use crate::service::FeedbackService;
use crate::storage::FeedbackStore;

pub const LIVENESS_MESSAGE: &str = "File-based Feedback API running";

#[derive(Clone)]
struct AppState {
    service: FeedbackService,
}

/// Build the application router around a service.
pub fn router(service: FeedbackService) -> Router {
    Router::new()
        .route("/", get(health_handler))
        .route("/feedbacks", get(list_handler).post(create_handler))
        .with_state(AppState { service })
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(addr: SocketAddr, store: Arc<dyn FeedbackStore>) -> anyhow::Result<()> {
    let app = router(FeedbackService::new(store));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server running on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            warn!("Unable to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    }
}

async fn health_handler() -> &'static str {
    LIVENESS_MESSAGE
}

async fn list_handler(
    State(state): State<AppState>,
) -> std::result::Result<Json<Vec<FeedbackRecord>>, ApiError> {
    let service = state.service.clone();
    let records = run_blocking(move || service.list()).await?;
    Ok(Json(records))
}

async fn create_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<FeedbackInput>, JsonRejection>,
) -> std::result::Result<(StatusCode, Json<FeedbackRecord>), ApiError> {
    // No Content-Type means no parsed fields; validation then reports each one.
    let input = match payload {
        Ok(Json(input)) => input,
        Err(JsonRejection::MissingJsonContentType(_)) => FeedbackInput::default(),
        Err(e) => return Err(e.into()),
    };
    let service = state.service.clone();
    let record = run_blocking(move || service.create(input)).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// File I/O runs off the async workers.
async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::internal(format!("blocking task failed: {e}")))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_handler() {
        assert_eq!(health_handler().await, "File-based Feedback API running");
    }
}
