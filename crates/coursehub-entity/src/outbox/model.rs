//! Outbox row model.

use chrono::{DateTime, Utc};
use coursehub_core::events::DomainEvent;
use coursehub_core::types::EventId;
use coursehub_core::AppResult;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A domain event written in the same atomic unit as the change it
/// describes, waiting to be relayed to the notification dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CommerceEventRecord {
    /// Same as the wrapped event's ID.
    pub id: EventId,
    /// Event name, e.g. `group.completed`.
    pub event_type: String,
    /// Serialized [`DomainEvent`].
    pub payload: serde_json::Value,
    /// When the event was recorded.
    pub created_at: DateTime<Utc>,
    /// When the dispatcher accepted the event.
    pub dispatched_at: Option<DateTime<Utc>>,
    /// Delivery attempts so far.
    pub attempts: i32,
    /// Last dispatcher error.
    pub last_error: Option<String>,
}

impl CommerceEventRecord {
    /// Wrap an event for the outbox.
    pub fn from_event(event: &DomainEvent) -> AppResult<Self> {
        Ok(Self {
            id: event.id,
            event_type: event.name().to_string(),
            payload: serde_json::to_value(event)?,
            created_at: event.timestamp,
            dispatched_at: None,
            attempts: 0,
            last_error: None,
        })
    }

    /// Decode the stored event.
    pub fn event(&self) -> AppResult<DomainEvent> {
        Ok(serde_json::from_value(self.payload.clone())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coursehub_core::events::CheckoutEvent;
    use coursehub_core::types::{TransactionId, UserId};

    #[test]
    fn test_record_round_trips_event() {
        let user_id = UserId::new();
        let event = DomainEvent::new(
            Some(user_id),
            CheckoutEvent::Failed {
                transaction_id: TransactionId::new(),
                reference: "ps_0123".to_string(),
                user_id,
            }
            .into(),
        );
        let record = CommerceEventRecord::from_event(&event).unwrap();
        assert_eq!(record.id, event.id);
        assert_eq!(record.event_type, "checkout.failed");
        assert_eq!(record.event().unwrap(), event);
    }
}
