//! Application builder and server loop.

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;

use coursehub_core::error::{AppError, ErrorKind};

use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
}

/// Serve `state` until `shutdown` flips to `true`.
pub async fn serve(state: AppState, mut shutdown: watch::Receiver<bool>) -> Result<(), AppError> {
    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        AppError::with_source(ErrorKind::Internal, format!("Failed to bind {addr}"), e)
    })?;

    info!(addr = %addr, "CourseHub commerce API listening");

    axum::serve(listener, build_app(state))
        .with_graceful_shutdown(async move {
            while shutdown.changed().await.is_ok() {
                if *shutdown.borrow() {
                    break;
                }
            }
        })
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Internal, "Server error", e))
}
