//! Domain events emitted by commerce operations.
//!
//! Events are written to the outbox inside the same atomic unit as the
//! state change they describe, then relayed to the notification dispatcher.

pub mod checkout;
pub mod group;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use checkout::CheckoutEvent;
pub use group::GroupEvent;

use crate::types::id::{EventId, UserId};

/// Wrapper for all domain events with metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Unique event ID.
    pub id: EventId,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// The user who caused the event (if applicable).
    pub actor_id: Option<UserId>,
    /// The event payload.
    pub payload: EventPayload,
}

/// Union of all domain event types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event")]
pub enum EventPayload {
    /// A checkout or payment event.
    Checkout(CheckoutEvent),
    /// A group-purchase lifecycle event.
    Group(GroupEvent),
}

impl DomainEvent {
    /// Create a new domain event.
    pub fn new(actor_id: Option<UserId>, payload: EventPayload) -> Self {
        Self {
            id: EventId::new(),
            timestamp: Utc::now(),
            actor_id,
            payload,
        }
    }

    /// Short dotted name used in logs, e.g. `group.completed`.
    pub fn name(&self) -> &'static str {
        match &self.payload {
            EventPayload::Checkout(e) => e.name(),
            EventPayload::Group(e) => e.name(),
        }
    }
}

impl From<CheckoutEvent> for EventPayload {
    fn from(event: CheckoutEvent) -> Self {
        Self::Checkout(event)
    }
}

impl From<GroupEvent> for EventPayload {
    fn from(event: GroupEvent) -> Self {
        Self::Group(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::id::GroupPurchaseId;

    #[test]
    fn test_payload_is_tagged_by_domain_and_type() {
        let user_id = UserId::new();
        let event = DomainEvent::new(
            Some(user_id),
            GroupEvent::MemberJoined {
                group_id: GroupPurchaseId::new(),
                user_id,
                member_count: 3,
                member_limit: 5,
            }
            .into(),
        );
        let json = serde_json::to_value(&event).expect("serialize");
        assert_eq!(json["payload"]["domain"], "Group");
        assert_eq!(json["payload"]["event"]["type"], "MemberJoined");
        assert_eq!(json["payload"]["event"]["member_count"], 3);

        let back: DomainEvent = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, event);
    }
}
