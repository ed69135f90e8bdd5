//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use coursehub_core::config::AppConfig;
use coursehub_database::DatabasePool;
use coursehub_service::CommerceServices;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Commerce services.
    pub services: Arc<CommerceServices>,
    /// PostgreSQL pool; `None` when running on the in-memory store.
    pub database: Option<DatabasePool>,
}

impl AppState {
    /// Creates the state.
    pub fn new(
        config: AppConfig,
        services: CommerceServices,
        database: Option<DatabasePool>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            services: Arc::new(services),
            database,
        }
    }
}
