use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::models::notification::{
    MarkAllReadResponse, NotificationResponse, NotificationsQuery, UnreadCountResponse,
};
use crate::models::ErrorResponse;
use crate::services::notifications;
use crate::AppState;

/// GET /api/notifications?limit=N - newest first, limit defaults to 20 (max 100)
pub async fn list_notifications(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(query): Query<NotificationsQuery>,
) -> ApiResult<Vec<NotificationResponse>> {
    let list =
        notifications::list_notifications(state.store.as_ref(), current.id(), query.limit).await?;
    Ok(Json(list.into_iter().map(Into::into).collect()))
}

pub async fn unread_count(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ApiResult<UnreadCountResponse> {
    let count = notifications::unread_count(state.store.as_ref(), current.id()).await?;
    Ok(Json(UnreadCountResponse { count }))
}

pub async fn mark_read(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<NotificationResponse> {
    let notification = notifications::mark_read(state.store.as_ref(), current.id(), id).await?;
    Ok(Json(notification.into()))
}

pub async fn mark_all_read(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ApiResult<MarkAllReadResponse> {
    let updated = notifications::mark_all_read(state.store.as_ref(), current.id()).await?;
    Ok(Json(MarkAllReadResponse { updated }))
}

pub async fn delete_notification(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    notifications::delete_notification(state.store.as_ref(), current.id(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
