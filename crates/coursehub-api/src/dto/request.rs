//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use coursehub_core::types::{CourseId, GroupTierId};
use coursehub_service::CheckoutRequest;

/// `POST /api/checkout` body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CheckoutBody {
    /// Courses to buy.
    #[validate(length(min = 1, max = 50, message = "Select between 1 and 50 courses"))]
    pub course_ids: Vec<CourseId>,
    /// Optional promo code.
    #[validate(length(max = 64, message = "Promo code is too long"))]
    pub promo_code: Option<String>,
}

impl From<CheckoutBody> for CheckoutRequest {
    fn from(body: CheckoutBody) -> Self {
        Self {
            course_ids: body.course_ids,
            promo_code: body.promo_code,
        }
    }
}

/// `POST /api/promo/validate` body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PromoValidateBody {
    /// Code to check.
    #[validate(length(min = 1, max = 64, message = "Promo code is required"))]
    pub code: String,
    /// Courses in the cart.
    #[validate(length(min = 1, max = 50, message = "Select between 1 and 50 courses"))]
    pub course_ids: Vec<CourseId>,
}

/// `POST /api/courses/{course_id}/groups` body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateGroupBody {
    /// Tier to open the group on.
    pub tier_id: GroupTierId,
}
