use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::auth::{CurrentUser, Reviewer};
use crate::error::{ApiResult, CreatedResult};
use crate::models::transaction::{
    BalanceResponse, TransactionResponse, TransactionStatsResponse, WithdrawalRequest,
};
use crate::services::settlement;
use crate::AppState;

pub async fn list_transactions(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ApiResult<Vec<TransactionResponse>> {
    let list = settlement::list_transactions(state.store.as_ref(), current.id()).await?;
    Ok(Json(list.into_iter().map(Into::into).collect()))
}

pub async fn get_transaction(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<TransactionResponse> {
    let transaction = settlement::get_transaction(state.store.as_ref(), current.id(), id).await?;
    Ok(Json(transaction.into()))
}

pub async fn get_balance(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ApiResult<BalanceResponse> {
    let balance = settlement::balance(state.store.as_ref(), current.id()).await?;

    Ok(Json(BalanceResponse {
        total_earnings: balance.total_earnings,
        pending_withdrawals: balance.pending_withdrawals,
        available_balance: balance.available(),
    }))
}

pub async fn get_stats(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ApiResult<TransactionStatsResponse> {
    let stats = settlement::transaction_stats(state.store.as_ref(), current.id()).await?;
    Ok(Json(stats))
}

/// POST /api/transactions/{id}/complete - payment confirmed, seller credited
pub async fn complete_transaction(
    State(state): State<AppState>,
    Reviewer(reviewer_id): Reviewer,
    Path(id): Path<Uuid>,
) -> ApiResult<TransactionResponse> {
    tracing::info!("Reviewer {} completing sale {}", reviewer_id, id);
    let transaction = settlement::complete_sale(state.store.as_ref(), &state.notifier, id).await?;
    Ok(Json(transaction.into()))
}

/// POST /api/transactions/{id}/fail - payment failed, credit released
pub async fn fail_transaction(
    State(state): State<AppState>,
    Reviewer(reviewer_id): Reviewer,
    Path(id): Path<Uuid>,
) -> ApiResult<TransactionResponse> {
    tracing::info!("Reviewer {} failing sale {}", reviewer_id, id);
    let transaction = settlement::fail_sale(state.store.as_ref(), id).await?;
    Ok(Json(transaction.into()))
}

/// POST /api/withdrawals
pub async fn request_withdrawal(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(request): Json<WithdrawalRequest>,
) -> CreatedResult<TransactionResponse> {
    let record =
        settlement::request_withdrawal(state.store.as_ref(), &state.notifier, current.id(), request)
            .await?;
    Ok((StatusCode::CREATED, Json(record.transaction.into())))
}
