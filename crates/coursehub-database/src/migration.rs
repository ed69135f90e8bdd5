//! Embedded schema migrations.

use sqlx::migrate::Migrator;
use sqlx::PgPool;
use tracing::info;

use coursehub_core::error::{AppError, ErrorKind};

/// Migrations compiled into the binary from the workspace `migrations/` directory.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Run all pending database migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    info!(
        available = MIGRATOR.iter().count(),
        "Running commerce schema migrations"
    );

    MIGRATOR.run(pool).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Database,
            format!("Failed to run migrations: {e}"),
            e,
        )
    })?;

    info!("Commerce schema is up to date");
    Ok(())
}
