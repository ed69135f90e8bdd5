//! Group purchases: creation, activation, joining and completion fan-out.

pub mod coordinator;
pub mod invite;

pub use coordinator::{GroupCheckout, GroupDetails, GroupPurchaseCoordinator, JoinReceipt, JoinStatus};
pub use invite::{generate_invite_code, is_valid_invite_code};
