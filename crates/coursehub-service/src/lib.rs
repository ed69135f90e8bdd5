//! # coursehub-service
//!
//! Commerce use cases for CourseHub. Each service orchestrates the store
//! traits, the payment gateway and the pure pricing rules.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references. Every operation acting for a
//! user takes an explicit [`RequestContext`].

pub mod checkout;
pub mod context;
pub mod group;
pub mod outbox;
pub mod payment;
pub mod pricing;
pub mod promo;
pub mod services;

pub use checkout::{CheckoutQuote, CheckoutReceipt, CheckoutRequest, CheckoutService};
pub use context::RequestContext;
pub use group::{GroupCheckout, GroupDetails, GroupPurchaseCoordinator, JoinReceipt, JoinStatus};
pub use outbox::{OutboxRelay, RelayStats};
pub use payment::{PaymentService, PaymentSessions, PaymentVerification};
pub use pricing::{CheckoutTotals, LineBreakdown, PricingEngine};
pub use promo::{PromoDecision, PromoRejection, PromoValidator};
pub use services::CommerceServices;
