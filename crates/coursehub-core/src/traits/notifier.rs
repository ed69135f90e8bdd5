//! Notification dispatcher fed from the commerce outbox.

use async_trait::async_trait;
use tracing::info;

use crate::events::DomainEvent;
use crate::result::AppResult;

/// Delivers commerce events to whatever notifies users (email, push, chat).
///
/// Dispatch failures are recorded on the outbox row and retried; they never
/// roll back or alter commerce state.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync + std::fmt::Debug + 'static {
    /// Deliver one event.
    async fn dispatch(&self, event: &DomainEvent) -> AppResult<()>;
}

/// Dispatcher that writes each event to the log.
#[derive(Debug, Default, Clone)]
pub struct LogNotificationDispatcher;

#[async_trait]
impl NotificationDispatcher for LogNotificationDispatcher {
    async fn dispatch(&self, event: &DomainEvent) -> AppResult<()> {
        let payload = serde_json::to_string(&event.payload)?;
        info!(
            event_id = %event.id,
            event = event.name(),
            actor_id = ?event.actor_id,
            payload = %payload,
            "Commerce notification"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::GroupEvent;
    use crate::types::id::{GroupPurchaseId, UserId};

    #[tokio::test]
    async fn test_log_dispatcher_accepts_events() {
        let creator = UserId::new();
        let event = DomainEvent::new(
            Some(creator),
            GroupEvent::Activated {
                group_id: GroupPurchaseId::new(),
                creator_id: creator,
            }
            .into(),
        );
        assert_eq!(event.name(), "group.activated");
        assert!(LogNotificationDispatcher.dispatch(&event).await.is_ok());
    }
}
