//! Commerce outbox rows.

pub mod model;

pub use model::CommerceEventRecord;
