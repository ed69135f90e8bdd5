//! Group-purchase entities and their pure state transitions.

pub mod member;
pub mod purchase;
pub mod tier;
pub mod transition;

pub use member::{GroupMember, MemberRole};
pub use purchase::{GroupPurchase, GroupStatus};
pub use tier::GroupTier;
pub use transition::{CashbackTerms, JoinOutcome, JoinPlan};
