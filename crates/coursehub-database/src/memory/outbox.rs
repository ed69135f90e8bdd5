use async_trait::async_trait;
use chrono::Utc;

use coursehub_core::result::AppResult;
use coursehub_core::types::EventId;
use coursehub_entity::outbox::CommerceEventRecord;

use super::MemoryCommerceStore;
use crate::store::OutboxStore;

#[async_trait]
impl OutboxStore for MemoryCommerceStore {
    async fn pending_events(
        &self,
        limit: i64,
        max_attempts: i32,
    ) -> AppResult<Vec<CommerceEventRecord>> {
        let state = self.state.read().await;
        Ok(state
            .events
            .iter()
            .filter(|e| e.dispatched_at.is_none() && e.attempts < max_attempts)
            .take(usize::try_from(limit).unwrap_or(0))
            .cloned()
            .collect())
    }

    async fn mark_dispatched(&self, id: EventId) -> AppResult<()> {
        let mut state = self.state.write().await;
        if let Some(record) = state.events.iter_mut().find(|e| e.id == id) {
            record.dispatched_at = Some(Utc::now());
            record.attempts += 1;
            record.last_error = None;
        }
        Ok(())
    }

    async fn mark_failed(&self, id: EventId, error: &str) -> AppResult<()> {
        let mut state = self.state.write().await;
        if let Some(record) = state.events.iter_mut().find(|e| e.id == id) {
            record.attempts += 1;
            record.last_error = Some(error.to_string());
        }
        Ok(())
    }
}
