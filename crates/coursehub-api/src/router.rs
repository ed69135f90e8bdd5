//! Route definitions for the CourseHub commerce API.
//!
//! All routes are mounted under `/api`. The router receives `AppState` and
//! passes it to all handlers via Axum's `State` extractor.

use std::time::Duration;

use axum::{
    Router,
    http::StatusCode,
    middleware as axum_middleware,
    routing::{get, post},
};
use coursehub_core::config::ServerConfig;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(checkout_routes())
        .merge(payment_routes())
        .merge(group_routes())
        .merge(health_routes());

    let cors = middleware::cors::build_cors_layer(&state.config.server);

    Router::new()
        .nest("/api", api_routes)
        .layer(timeout_layer(&state.config.server))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Requests running past the configured timeout answer 408.
fn timeout_layer(config: &ServerConfig) -> TimeoutLayer {
    TimeoutLayer::with_status_code(
        StatusCode::REQUEST_TIMEOUT,
        Duration::from_secs(config.request_timeout_seconds),
    )
}

/// Single checkout and promo preview
fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/checkout", post(handlers::checkout::checkout))
        .route("/promo/validate", post(handlers::checkout::validate_promo))
}

/// Gateway return flow
fn payment_routes() -> Router<AppState> {
    Router::new().route(
        "/payments/verify/{reference}",
        get(handlers::payment::verify_payment),
    )
}

/// Group purchases
fn group_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/courses/{course_id}/groups",
            post(handlers::group::create_group),
        )
        .route("/groups/{invite_code}", get(handlers::group::get_group))
        .route(
            "/groups/{invite_code}/join",
            post(handlers::group::join_group),
        )
}

/// Liveness
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn slow_router(handler_secs: u64) -> Router {
        let config = ServerConfig {
            request_timeout_seconds: 2,
            ..ServerConfig::default()
        };
        Router::new()
            .route(
                "/slow",
                get(move || async move {
                    tokio::time::sleep(Duration::from_secs(handler_secs)).await;
                    "done"
                }),
            )
            .layer(timeout_layer(&config))
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_request_times_out_with_408() {
        let response = slow_router(30)
            .oneshot(Request::get("/slow").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fast_request_passes_through() {
        let response = slow_router(1)
            .oneshot(Request::get("/slow").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
