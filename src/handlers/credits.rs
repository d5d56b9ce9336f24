use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::error::{ApiResult, CreatedResult};
use crate::models::credit::{CreditResponse, PurchaseCreditRequest};
use crate::models::transaction::TransactionResponse;
use crate::services::{credit_issuer, settlement};
use crate::AppState;

pub async fn list_credits(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ApiResult<Vec<CreditResponse>> {
    let credits = credit_issuer::list_own_credits(state.store.as_ref(), current.id()).await?;
    Ok(Json(credits.into_iter().map(Into::into).collect()))
}

/// GET /api/credits/marketplace - available, unexpired credits
pub async fn list_marketplace(
    State(state): State<AppState>,
    _current: CurrentUser,
) -> ApiResult<Vec<CreditResponse>> {
    let credits = credit_issuer::list_marketplace(state.store.as_ref()).await?;
    Ok(Json(credits.into_iter().map(Into::into).collect()))
}

/// POST /api/credits/{id}/purchase - reserves the credit behind a pending sale
pub async fn purchase_credit(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    Json(request): Json<PurchaseCreditRequest>,
) -> CreatedResult<TransactionResponse> {
    let sale = settlement::purchase_credit(state.store.as_ref(), &current.user, id, request).await?;
    Ok((StatusCode::CREATED, Json(sale.into())))
}
