//! Payment sessions and payment verification.

pub mod session;
pub mod verify;

pub use session::PaymentSessions;
pub use verify::{PaymentService, PaymentVerification};
