//! Request context carrying the identity forwarded by the identity provider.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use coursehub_core::types::UserId;

/// Who is acting on the current request.
///
/// Built at the API edge and passed into every service call; services never
/// look identity up from ambient state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: UserId,
    /// The user's email, used for gateway receipts.
    pub email: String,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context stamped now.
    pub fn new(user_id: UserId, email: impl Into<String>) -> Self {
        Self {
            user_id,
            email: email.into(),
            request_time: Utc::now(),
        }
    }
}
