//! Outbox access.

use async_trait::async_trait;

use coursehub_core::error::{AppError, ErrorKind};
use coursehub_core::result::AppResult;
use coursehub_core::types::EventId;
use coursehub_entity::outbox::CommerceEventRecord;

use super::PgCommerceStore;
use crate::store::OutboxStore;

#[async_trait]
impl OutboxStore for PgCommerceStore {
    async fn pending_events(
        &self,
        limit: i64,
        max_attempts: i32,
    ) -> AppResult<Vec<CommerceEventRecord>> {
        sqlx::query_as::<_, CommerceEventRecord>(
            "SELECT * FROM commerce_events \
             WHERE dispatched_at IS NULL AND attempts < $2 \
             ORDER BY created_at ASC LIMIT $1",
        )
        .bind(limit)
        .bind(max_attempts)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load outbox events", e))
    }

    async fn mark_dispatched(&self, id: EventId) -> AppResult<()> {
        sqlx::query(
            "UPDATE commerce_events SET dispatched_at = NOW(), attempts = attempts + 1, \
             last_error = NULL WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark event dispatched", e))?;
        Ok(())
    }

    async fn mark_failed(&self, id: EventId, error: &str) -> AppResult<()> {
        sqlx::query(
            "UPDATE commerce_events SET attempts = attempts + 1, last_error = $2 WHERE id = $1",
        )
        .bind(id)
        .bind(error)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to record event failure", e))?;
        Ok(())
    }
}
