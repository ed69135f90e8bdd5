//! Group purchase handlers.

use axum::Json;
use axum::extract::{Path, State};

use coursehub_core::types::CourseId;

use crate::dto::request::CreateGroupBody;
use crate::error::ApiError;
use crate::extractors::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// POST /api/courses/{course_id}/groups
pub async fn create_group(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(course_id): Path<CourseId>,
    ValidatedJson(body): ValidatedJson<CreateGroupBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let checkout = state
        .services
        .groups
        .create_group(&auth, course_id, body.tier_id)
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": checkout })))
}

/// GET /api/groups/{invite_code}
pub async fn get_group(
    State(state): State<AppState>,
    Path(invite_code): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let details = state
        .services
        .groups
        .find_by_invite_code(&invite_code)
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": details })))
}

/// POST /api/groups/{invite_code}/join
pub async fn join_group(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(invite_code): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let receipt = state
        .services
        .groups
        .join_group(&auth, &invite_code)
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": receipt })))
}
