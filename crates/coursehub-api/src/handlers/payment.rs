//! Payment verification handler.

use axum::Json;
use axum::extract::{Path, State};

use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/payments/verify/{reference}
///
/// Called after the gateway redirects the payer back. Safe to repeat.
pub async fn verify_payment(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let verification = state.services.payments.verify_payment(&reference).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": verification })))
}
