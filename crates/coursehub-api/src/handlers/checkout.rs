//! Checkout and promo preview handlers.

use axum::Json;
use axum::extract::State;

use coursehub_service::CheckoutRequest;

use crate::dto::request::{CheckoutBody, PromoValidateBody};
use crate::dto::response::PromoValidationResponse;
use crate::error::ApiError;
use crate::extractors::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// POST /api/checkout
pub async fn checkout(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(body): ValidatedJson<CheckoutBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let receipt = state
        .services
        .checkout
        .checkout(&auth, body.into())
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": receipt })))
}

/// POST /api/promo/validate
pub async fn validate_promo(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(body): ValidatedJson<PromoValidateBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let quote = state
        .services
        .checkout
        .quote(
            &auth,
            CheckoutRequest {
                course_ids: body.course_ids,
                promo_code: Some(body.code),
            },
        )
        .await?;
    let result = PromoValidationResponse::from(quote);
    Ok(Json(serde_json::json!({ "success": true, "data": result })))
}
