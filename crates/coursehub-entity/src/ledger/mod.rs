//! Checkout ledger entities: one transaction per attempt, one line item per course.

pub mod line_item;
pub mod status;
pub mod transaction;

pub use line_item::LineItem;
pub use status::TransactionStatus;
pub use transaction::Transaction;
