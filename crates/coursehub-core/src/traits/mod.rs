//! Collaborator traits defined in `coursehub-core` and implemented elsewhere.

pub mod notifier;

pub use notifier::{LogNotificationDispatcher, NotificationDispatcher};
