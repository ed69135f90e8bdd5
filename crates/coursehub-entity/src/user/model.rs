//! User and student profile models.

use chrono::{DateTime, Utc};
use coursehub_core::types::UserId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::role::UserRole;

/// A marketplace user. Only the fields commerce touches are modelled.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// Email address used for gateway receipts.
    pub email: String,
    /// Marketplace role.
    pub role: UserRole,
    /// Wallet balance in major units. A tutor funding cashback may go negative.
    pub wallet_balance: Decimal,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a user with an empty wallet.
    pub fn new(email: impl Into<String>, role: UserRole) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new(),
            email: email.into(),
            role,
            wallet_balance: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Student profile, created the first time a user buys a course.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Student {
    /// Owning user (unique).
    pub user_id: UserId,
    /// When the profile was created.
    pub created_at: DateTime<Utc>,
}
