use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::auth::{CurrentUser, Reviewer, SessionId};
use crate::error::{ApiResult, CreatedResult};
use crate::models::submission::{
    CreateSubmissionRequest, SubmissionResponse, UpdateSubmissionStatusRequest,
};
use crate::services::submission_lifecycle;
use crate::AppState;

pub async fn create_submission(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(request): Json<CreateSubmissionRequest>,
) -> CreatedResult<SubmissionResponse> {
    let submission = submission_lifecycle::create_submission(
        state.store.as_ref(),
        &state.notifier,
        current.id(),
        request,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(submission.into())))
}

/// GET /api/submissions - own submissions with their credit, newest first
pub async fn list_submissions(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ApiResult<Vec<SubmissionResponse>> {
    let list = submission_lifecycle::list_own_submissions(state.store.as_ref(), current.id()).await?;

    Ok(Json(
        list.into_iter()
            .map(|(submission, credit)| {
                SubmissionResponse::from(submission).with_credit(credit.map(Into::into))
            })
            .collect(),
    ))
}

/// GET /api/submissions/pending - review queue, oldest first
pub async fn list_pending_submissions(
    State(state): State<AppState>,
    _reviewer: Reviewer,
) -> ApiResult<Vec<SubmissionResponse>> {
    let list = submission_lifecycle::list_pending_submissions(state.store.as_ref()).await?;
    Ok(Json(list.into_iter().map(Into::into).collect()))
}

pub async fn get_submission(
    State(state): State<AppState>,
    SessionId(viewer): SessionId,
    Path(id): Path<Uuid>,
) -> ApiResult<SubmissionResponse> {
    let is_reviewer = state.reviewers.contains(&viewer);
    let (submission, credit) =
        submission_lifecycle::get_submission(state.store.as_ref(), viewer, is_reviewer, id).await?;

    Ok(Json(
        SubmissionResponse::from(submission).with_credit(credit.map(Into::into)),
    ))
}

/// POST /api/submissions/{id}/status
///
/// Approval issues the carbon credit in the same step; the response carries
/// it alongside the updated submission.
pub async fn update_submission_status(
    State(state): State<AppState>,
    Reviewer(reviewer_id): Reviewer,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateSubmissionStatusRequest>,
) -> ApiResult<SubmissionResponse> {
    tracing::info!(
        "Reviewer {} moving submission {} to {}",
        reviewer_id,
        id,
        request.status
    );

    let record = submission_lifecycle::transition(
        state.store.as_ref(),
        &state.notifier,
        id,
        request.status,
        request.reviewer_notes,
    )
    .await?;

    Ok(Json(
        SubmissionResponse::from(record.submission).with_credit(record.credit.map(Into::into)),
    ))
}
