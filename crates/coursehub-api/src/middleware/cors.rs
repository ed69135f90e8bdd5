//! CORS layer configuration.

use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};

use coursehub_core::config::ServerConfig;

use crate::extractors::auth::{USER_EMAIL_HEADER, USER_ID_HEADER};

/// Builds a CORS tower layer from configuration.
pub fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .max_age(std::time::Duration::from_secs(3600));

    if config.allowed_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any).allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();
    layer.allow_origin(origins).allow_headers([
        axum::http::header::CONTENT_TYPE,
        HeaderName::from_static(USER_ID_HEADER),
        HeaderName::from_static(USER_EMAIL_HEADER),
    ])
}
