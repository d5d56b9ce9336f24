use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::auth::{CurrentUser, Reviewer, SessionId};
use crate::error::{ApiResult, CreatedResult};
use crate::models::user::{
    CreateUserRequest, UpdateProfileRequest, UpdateVerificationRequest, UserResponse,
};
use crate::services::users;
use crate::AppState;

/// POST /api/users - profile row for the signed-in identity
pub async fn create_user(
    State(state): State<AppState>,
    SessionId(id): SessionId,
    Json(request): Json<CreateUserRequest>,
) -> CreatedResult<UserResponse> {
    let user = users::create_profile(state.store.as_ref(), id, request).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

pub async fn get_me(current: CurrentUser) -> ApiResult<UserResponse> {
    Ok(Json(current.user.into()))
}

pub async fn update_me(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(request): Json<UpdateProfileRequest>,
) -> ApiResult<UserResponse> {
    let user = users::update_profile(state.store.as_ref(), current.id(), request).await?;
    Ok(Json(user.into()))
}

/// PUT /api/users/{id}/verification - reviewers only
pub async fn update_verification(
    State(state): State<AppState>,
    Reviewer(reviewer_id): Reviewer,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateVerificationRequest>,
) -> ApiResult<UserResponse> {
    tracing::debug!("Reviewer {} updating verification of {}", reviewer_id, id);
    let user = users::set_verification_status(state.store.as_ref(), id, request.status).await?;
    Ok(Json(user.into()))
}
