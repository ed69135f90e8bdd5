//! # coursehub-api
//!
//! HTTP API layer for the CourseHub commerce engine built on Axum.
//!
//! Provides the checkout, promo, payment and group-purchase endpoints, the
//! identity extractor, request logging, CORS and timeout layers, DTOs, and
//! the mapping from [`AppError`](coursehub_core::AppError) to HTTP responses.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, serve};
pub use error::ApiError;
pub use state::AppState;
