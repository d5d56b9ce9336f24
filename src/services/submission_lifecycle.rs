//! Submission review state machine.
//!
//! ```text
//! submitted ──► under_review ──► approved
//!     │               └────────► rejected
//!     ├──────────────────────────► approved
//!     └──────────────────────────► rejected
//! ```
//!
//! `approved` and `rejected` are terminal. Each accepted transition is one
//! atomic store operation: status compare-and-set, owner notification and,
//! for approvals, the issued credit.

use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde_json::json;
use uuid::Uuid;

use crate::entities::{carbon_credits, gardens, submissions};
use crate::error::{AppError, AppResult, ValidationError};
use crate::models::garden::GardenStatus;
use crate::models::notification::NotificationType;
use crate::models::submission::{CreateSubmissionRequest, SubmissionStatus};
use crate::repositories::{NewNotification, NewSubmission, ReviewCommand, ReviewRecord, Store};
use crate::services::credit_estimator;
use crate::services::credit_issuer;
use crate::services::notifications::{self, NotificationBroadcaster};

pub fn can_transition(from: SubmissionStatus, to: SubmissionStatus) -> bool {
    use SubmissionStatus::*;

    matches!(
        (from, to),
        (Submitted, UnderReview | Approved | Rejected) | (UnderReview, Approved | Rejected)
    )
}

pub fn ensure_transition(from: SubmissionStatus, to: SubmissionStatus) -> AppResult<()> {
    if can_transition(from, to) {
        Ok(())
    } else {
        Err(AppError::InvalidTransition { from, to })
    }
}

/// Message sent to the garden owner when a submission enters `status`.
/// `submitted` is never a target, so it has no message.
pub fn status_notification(
    owner_id: Uuid,
    submission_id: Uuid,
    status: SubmissionStatus,
) -> Option<NewNotification> {
    let (message, notification_type) = match status {
        SubmissionStatus::Approved => (
            "Your garden submission has been approved! Carbon credits are now being generated.",
            NotificationType::Success,
        ),
        SubmissionStatus::Rejected => (
            "Your garden submission has been rejected. Please review the notes and resubmit if needed.",
            NotificationType::Error,
        ),
        SubmissionStatus::UnderReview => (
            "Your garden submission is now under detailed review by our team.",
            NotificationType::Info,
        ),
        SubmissionStatus::Submitted => return None,
    };

    Some(NewNotification {
        user_id: owner_id,
        title: format!(
            "Submission {}",
            status.as_str().replace('_', " ").to_uppercase()
        ),
        message: message.to_string(),
        notification_type,
        related_id: Some(submission_id),
    })
}

fn stored_status(submission: &submissions::Model) -> AppResult<SubmissionStatus> {
    submission.status.parse::<SubmissionStatus>().map_err(|e| {
        tracing::error!("Submission {} has unreadable status: {}", submission.id, e);
        AppError::Conflict(e)
    })
}

async fn find_garden(store: &dyn Store, garden_id: Uuid) -> AppResult<gardens::Model> {
    store
        .find_garden(garden_id)
        .await?
        .ok_or_else(|| AppError::NotFound("garden".to_string()))
}

pub async fn create_submission(
    store: &dyn Store,
    broadcaster: &NotificationBroadcaster,
    submitter_id: Uuid,
    request: CreateSubmissionRequest,
) -> AppResult<submissions::Model> {
    let garden = find_garden(store, request.garden_id).await?;
    if garden.owner_id != submitter_id {
        return Err(AppError::NotFound("garden".to_string()));
    }
    if garden.status != GardenStatus::Active.as_str() {
        return Err(ValidationError::new("garden_id", "garden is not active").into());
    }
    if request.trees.is_empty() {
        return Err(ValidationError::new("trees", "at least one tree is required").into());
    }

    let trees = credit_estimator::validate_trees(&request.trees)?;
    let equipment = credit_estimator::validate_equipment(&request.equipment)?;
    let estimate = credit_estimator::estimate(&trees, &equipment);

    let tree_count = i32::try_from(estimate.tree_count)
        .map_err(|_| ValidationError::new("trees", "total tree count is too large"))?;

    let submission = store
        .create_submission(NewSubmission {
            garden_id: garden.id,
            submitter_id,
            tree_count,
            tree_types: json!(trees),
            equipment: json!(equipment),
            estimated_co2_offset: estimate.total,
            impact_note: estimate.impact_note,
            verification_photos: request.verification_photos,
            additional_data: request.additional_data,
        })
        .await?;

    tracing::info!(
        "Submission {} created for garden {} ({} t CO2)",
        submission.id,
        garden.id,
        submission.estimated_co2_offset
    );

    let receipt = NewNotification {
        user_id: submitter_id,
        title: "Submission Received".to_string(),
        message: "Your garden submission has been received and is pending review.".to_string(),
        notification_type: NotificationType::Info,
        related_id: Some(submission.id),
    };
    if let Err(e) = notifications::notify(store, broadcaster, receipt).await {
        tracing::warn!("Failed to notify submitter for {}: {}", submission.id, e);
    }

    Ok(submission)
}

/// Moves a submission to `target`, issuing the credit on approval.
///
/// The status read here is the compare-and-set expectation, so a
/// concurrent review that got there first makes this call fail with
/// `Conflict` instead of applying twice.
pub async fn transition(
    store: &dyn Store,
    broadcaster: &NotificationBroadcaster,
    submission_id: Uuid,
    target: SubmissionStatus,
    reviewer_notes: Option<String>,
) -> AppResult<ReviewRecord> {
    let submission = store
        .find_submission(submission_id)
        .await?
        .ok_or_else(|| AppError::NotFound("submission".to_string()))?;

    let current = stored_status(&submission)?;
    ensure_transition(current, target)?;

    let garden = find_garden(store, submission.garden_id).await?;
    let notification = status_notification(garden.owner_id, submission.id, target)
        .ok_or(AppError::InvalidTransition {
            from: current,
            to: target,
        })?;

    let reviewed_at: DateTimeWithTimeZone = Utc::now().into();
    let credit = match target {
        SubmissionStatus::Approved => Some(credit_issuer::issue_credit(&submission, reviewed_at)?),
        _ => None,
    };

    let record = store
        .apply_review(ReviewCommand {
            submission_id,
            expected: current,
            target,
            reviewer_notes: reviewer_notes
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            reviewed_at,
            notification,
            credit,
        })
        .await?;

    broadcaster.broadcast(&record.notification);

    tracing::info!("Submission {} moved {} -> {}", submission_id, current, target);
    if let Some(credit) = &record.credit {
        tracing::info!(
            "Issued credit {} ({} t, value {}) for submission {}",
            credit.id,
            credit.credit_amount,
            credit.total_value,
            submission_id
        );
    }

    Ok(record)
}

/// Readable by the submitter, the garden owner and reviewers
pub async fn get_submission(
    store: &dyn Store,
    viewer_id: Uuid,
    is_reviewer: bool,
    id: Uuid,
) -> AppResult<(submissions::Model, Option<carbon_credits::Model>)> {
    let submission = store
        .find_submission(id)
        .await?
        .ok_or_else(|| AppError::NotFound("submission".to_string()))?;

    if !is_reviewer && submission.submitter_id != viewer_id {
        let garden = store.find_garden(submission.garden_id).await?;
        if garden.map(|g| g.owner_id) != Some(viewer_id) {
            return Err(AppError::NotFound("submission".to_string()));
        }
    }

    let credit = store.find_credit_by_submission(submission.id).await?;
    Ok((submission, credit))
}

pub async fn list_own_submissions(
    store: &dyn Store,
    submitter_id: Uuid,
) -> AppResult<Vec<(submissions::Model, Option<carbon_credits::Model>)>> {
    let submissions = store.list_submissions_by_submitter(submitter_id).await?;

    let mut result = Vec::with_capacity(submissions.len());
    for submission in submissions {
        let credit = store.find_credit_by_submission(submission.id).await?;
        result.push((submission, credit));
    }
    Ok(result)
}

pub async fn list_pending_submissions(store: &dyn Store) -> AppResult<Vec<submissions::Model>> {
    Ok(store.list_pending_submissions().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::users;
    use crate::models::estimate::TreeEntry;
    use crate::models::garden::GardenType;
    use crate::models::user::UserRole;
    use crate::repositories::{
        CreditRepository, GardenRepository, InMemoryStore, NewGarden, NewUser,
        NotificationRepository, SubmissionRepository, UserRepository,
    };
    use rust_decimal_macros::dec;

    struct Fixture {
        store: InMemoryStore,
        broadcaster: NotificationBroadcaster,
        owner: users::Model,
        garden: gardens::Model,
    }

    async fn fixture() -> Fixture {
        let store = InMemoryStore::new();
        let owner = store
            .create_user(NewUser {
                id: Uuid::new_v4(),
                email: "owner@example.org".to_string(),
                full_name: None,
                role: UserRole::GardenOwner,
                organization_name: None,
                phone: None,
            })
            .await
            .unwrap();
        let garden = store
            .create_garden(NewGarden {
                owner_id: owner.id,
                name: "Backyard".to_string(),
                description: None,
                location: json!({"address": "1 Main St"}),
                garden_type: GardenType::Residential,
                size_sqm: None,
                image_urls: vec![],
            })
            .await
            .unwrap();

        Fixture {
            store,
            broadcaster: NotificationBroadcaster::new(),
            owner,
            garden,
        }
    }

    fn oak_request(garden_id: Uuid) -> CreateSubmissionRequest {
        CreateSubmissionRequest {
            garden_id,
            trees: vec![TreeEntry {
                species_name: Some("Oak".to_string()),
                count: Some(10),
                age_years: Some(dec!(10)),
                diameter_cm: Some(dec!(30)),
            }],
            equipment: vec![],
            verification_photos: vec![],
            additional_data: None,
        }
    }

    #[test]
    fn test_transition_table() {
        use SubmissionStatus::*;

        assert!(can_transition(Submitted, UnderReview));
        assert!(can_transition(Submitted, Approved));
        assert!(can_transition(Submitted, Rejected));
        assert!(can_transition(UnderReview, Approved));
        assert!(can_transition(UnderReview, Rejected));

        assert!(!can_transition(UnderReview, UnderReview));
        assert!(!can_transition(UnderReview, Submitted));
        for target in SubmissionStatus::ALL {
            assert!(!can_transition(Approved, *target));
            assert!(!can_transition(Rejected, *target));
            assert!(!can_transition(*target, Submitted));
        }
    }

    #[test]
    fn test_status_notification_titles() {
        let owner = Uuid::new_v4();
        let sub = Uuid::new_v4();

        let n = status_notification(owner, sub, SubmissionStatus::UnderReview).unwrap();
        assert_eq!(n.title, "Submission UNDER REVIEW");
        assert_eq!(n.notification_type, NotificationType::Info);

        let n = status_notification(owner, sub, SubmissionStatus::Approved).unwrap();
        assert_eq!(n.title, "Submission APPROVED");
        assert_eq!(n.notification_type, NotificationType::Success);
        assert_eq!(n.related_id, Some(sub));

        let n = status_notification(owner, sub, SubmissionStatus::Rejected).unwrap();
        assert_eq!(n.notification_type, NotificationType::Error);

        assert!(status_notification(owner, sub, SubmissionStatus::Submitted).is_none());
    }

    #[tokio::test]
    async fn test_create_submission_computes_offset() {
        let f = fixture().await;

        let submission = create_submission(&f.store, &f.broadcaster, f.owner.id, oak_request(f.garden.id))
            .await
            .unwrap();

        assert_eq!(submission.status, "submitted");
        assert_eq!(submission.tree_count, 10);
        assert_eq!(submission.estimated_co2_offset, dec!(0.48));

        let inbox = f.store.list_notifications(f.owner.id, 10).await.unwrap();
        assert_eq!(inbox[0].title, "Submission Received");
    }

    #[tokio::test]
    async fn test_create_submission_requires_trees_and_own_garden() {
        let f = fixture().await;

        let mut empty = oak_request(f.garden.id);
        empty.trees.clear();
        let err = create_submission(&f.store, &f.broadcaster, f.owner.id, empty)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(ref v) if v.field == "trees"));

        let err = create_submission(&f.store, &f.broadcaster, Uuid::new_v4(), oak_request(f.garden.id))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_approval_issues_exactly_one_credit() {
        let f = fixture().await;
        let submission = create_submission(&f.store, &f.broadcaster, f.owner.id, oak_request(f.garden.id))
            .await
            .unwrap();
        let mut rx = f.broadcaster.subscribe();

        let record = transition(
            &f.store,
            &f.broadcaster,
            submission.id,
            SubmissionStatus::Approved,
            Some("Looks good".to_string()),
        )
        .await
        .unwrap();

        let credit = record.credit.unwrap();
        assert_eq!(credit.credit_amount, dec!(0.48));
        assert_eq!(credit.total_value, dec!(12.00));
        assert_eq!(credit.status, "available");
        assert_eq!(record.submission.status, "approved");
        assert!(record.submission.reviewed_at.is_some());
        assert_eq!(record.submission.reviewer_notes.as_deref(), Some("Looks good"));
        assert_eq!(rx.recv().await.unwrap().title, "Submission APPROVED");

        let err = transition(&f.store, &f.broadcaster, submission.id, SubmissionStatus::Approved, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::InvalidTransition {
                from: SubmissionStatus::Approved,
                to: SubmissionStatus::Approved
            }
        ));

        let credits = f.store.list_credits_by_owner(f.owner.id).await.unwrap();
        assert_eq!(credits.len(), 1);
    }

    #[tokio::test]
    async fn test_rejected_is_terminal() {
        let f = fixture().await;
        let submission = create_submission(&f.store, &f.broadcaster, f.owner.id, oak_request(f.garden.id))
            .await
            .unwrap();

        transition(&f.store, &f.broadcaster, submission.id, SubmissionStatus::UnderReview, None)
            .await
            .unwrap();
        let record = transition(&f.store, &f.broadcaster, submission.id, SubmissionStatus::Rejected, None)
            .await
            .unwrap();
        assert!(record.credit.is_none());

        for target in [
            SubmissionStatus::UnderReview,
            SubmissionStatus::Approved,
            SubmissionStatus::Submitted,
        ] {
            let err = transition(&f.store, &f.broadcaster, submission.id, target, None)
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::InvalidTransition { .. }));
        }
        assert!(f.store.find_credit_by_submission(submission.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_stale_review_loses_compare_and_set() {
        let f = fixture().await;
        let submission = create_submission(&f.store, &f.broadcaster, f.owner.id, oak_request(f.garden.id))
            .await
            .unwrap();
        transition(&f.store, &f.broadcaster, submission.id, SubmissionStatus::Approved, None)
            .await
            .unwrap();

        // A reviewer that still believes the submission is `submitted`
        let notification =
            status_notification(f.owner.id, submission.id, SubmissionStatus::Approved).unwrap();
        let err = f
            .store
            .apply_review(ReviewCommand {
                submission_id: submission.id,
                expected: SubmissionStatus::Submitted,
                target: SubmissionStatus::Approved,
                reviewer_notes: None,
                reviewed_at: Utc::now().into(),
                notification,
                credit: Some(credit_issuer::issue_credit(&submission, Utc::now().into()).unwrap()),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, crate::repositories::RepositoryError::Conflict(_)));
        assert_eq!(f.store.list_credits_by_owner(f.owner.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_submission_visibility() {
        let f = fixture().await;
        let submission = create_submission(&f.store, &f.broadcaster, f.owner.id, oak_request(f.garden.id))
            .await
            .unwrap();

        assert!(get_submission(&f.store, f.owner.id, false, submission.id).await.is_ok());
        assert!(get_submission(&f.store, Uuid::new_v4(), true, submission.id).await.is_ok());
        let err = get_submission(&f.store, Uuid::new_v4(), false, submission.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let pending = list_pending_submissions(&f.store).await.unwrap();
        assert_eq!(pending.len(), 1);
    }
}
