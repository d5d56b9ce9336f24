use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::error::{ApiResult, CreatedResult};
use crate::models::garden::{
    CreateGardenRequest, GardenResponse, GardenSearchQuery, UpdateGardenRequest,
};
use crate::models::ErrorResponse;
use crate::services::gardens;
use crate::AppState;

pub async fn create_garden(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(request): Json<CreateGardenRequest>,
) -> CreatedResult<GardenResponse> {
    let garden = gardens::create_garden(state.store.as_ref(), &current.user, request).await?;
    Ok((StatusCode::CREATED, Json(garden.into())))
}

pub async fn list_gardens(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ApiResult<Vec<GardenResponse>> {
    let list = gardens::list_gardens(state.store.as_ref(), current.id()).await?;
    Ok(Json(list.into_iter().map(Into::into).collect()))
}

/// GET /api/gardens/search - active gardens of every owner
pub async fn search_gardens(
    State(state): State<AppState>,
    _current: CurrentUser,
    Query(query): Query<GardenSearchQuery>,
) -> ApiResult<Vec<GardenResponse>> {
    let list = gardens::search_gardens(state.store.as_ref(), query).await?;
    Ok(Json(list.into_iter().map(Into::into).collect()))
}

pub async fn get_garden(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<GardenResponse> {
    let garden = gardens::get_owned_garden(state.store.as_ref(), current.id(), id).await?;
    Ok(Json(garden.into()))
}

pub async fn update_garden(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateGardenRequest>,
) -> ApiResult<GardenResponse> {
    let garden = gardens::update_garden(state.store.as_ref(), current.id(), id, request).await?;
    Ok(Json(garden.into()))
}

pub async fn delete_garden(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    gardens::delete_garden(state.store.as_ref(), current.id(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
