use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::auth::SessionId;
use crate::error::CreatedResult;
use crate::models::ErrorResponse;
use crate::services::storage::{Bucket, StoredObject};
use crate::AppState;

/// PUT /api/storage/{bucket}/{*path}
pub async fn put_object(
    State(state): State<AppState>,
    SessionId(user_id): SessionId,
    Path((bucket, path)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> CreatedResult<StoredObject> {
    let bucket: Bucket = bucket.parse()?;
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    let stored = state
        .storage
        .put(bucket, &path, content_type, &body, user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

/// GET /api/storage/{bucket}/{*path} - anonymous reads only reach public buckets
pub async fn get_object(
    State(state): State<AppState>,
    session: Option<SessionId>,
    Path((bucket, path)): Path<(String, String)>,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let bucket: Bucket = bucket.parse()?;
    let (bytes, content_type) = state
        .storage
        .get(bucket, &path, session.map(|SessionId(id)| id))
        .await?;

    Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response())
}
