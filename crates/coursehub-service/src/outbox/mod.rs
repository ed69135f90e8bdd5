//! Outbox relay: drains `commerce_events` into the notification dispatcher.

pub mod relay;

pub use relay::{OutboxRelay, RelayStats};
