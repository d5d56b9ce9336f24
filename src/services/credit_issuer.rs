use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::prelude::DateTimeWithTimeZone;
use uuid::Uuid;

use crate::entities::{carbon_credits, submissions};
use crate::error::{AppResult, ValidationError};
use crate::repositories::{NewCredit, Store};

/// Fixed issuance price in USD per tonne CO2
pub const PRICE_PER_TONNE: Decimal = dec!(25.00);

pub const CREDIT_VALIDITY_DAYS: i64 = 365;

/// Builds the credit minted when `submission` is approved.
///
/// The credit belongs to the submitter. `total_value` is the exact product
/// of amount and price; the column is wide enough that no rounding occurs.
/// A submission without a positive offset cannot be turned into a credit.
pub fn issue_credit(
    submission: &submissions::Model,
    issued_at: DateTimeWithTimeZone,
) -> Result<NewCredit, ValidationError> {
    let credit_amount = submission.estimated_co2_offset;
    if credit_amount <= Decimal::ZERO {
        return Err(ValidationError::new(
            "estimated_co2_offset",
            "must be greater than zero to issue a credit",
        ));
    }

    Ok(NewCredit {
        submission_id: submission.id,
        owner_id: submission.submitter_id,
        credit_amount,
        price_per_tonne: PRICE_PER_TONNE,
        total_value: credit_amount * PRICE_PER_TONNE,
        issued_at,
        expires_at: issued_at + Duration::days(CREDIT_VALIDITY_DAYS),
    })
}

pub async fn list_own_credits(
    store: &dyn Store,
    owner_id: Uuid,
) -> AppResult<Vec<carbon_credits::Model>> {
    Ok(store.list_credits_by_owner(owner_id).await?)
}

/// Credits a buyer can purchase right now
pub async fn list_marketplace(store: &dyn Store) -> AppResult<Vec<carbon_credits::Model>> {
    let now: DateTimeWithTimeZone = Utc::now().into();
    Ok(store.list_available_credits(now).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use uuid::Uuid;

    fn submission(offset: Decimal) -> submissions::Model {
        let now: DateTimeWithTimeZone = Utc::now().into();
        submissions::Model {
            id: Uuid::new_v4(),
            garden_id: Uuid::new_v4(),
            submitter_id: Uuid::new_v4(),
            tree_count: 1,
            tree_types: json!([]),
            equipment: json!([]),
            estimated_co2_offset: offset,
            impact_note: None,
            verification_photos: json!([]),
            additional_data: None,
            status: "approved".to_string(),
            reviewer_notes: None,
            submitted_at: now,
            reviewed_at: Some(now),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_issue_credit_values() {
        let sub = submission(dec!(2.5));
        let issued_at: DateTimeWithTimeZone = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap().into();

        let credit = issue_credit(&sub, issued_at).unwrap();

        assert_eq!(credit.credit_amount, dec!(2.5));
        assert_eq!(credit.price_per_tonne, dec!(25.00));
        assert_eq!(credit.total_value, dec!(62.50));
        assert_eq!(credit.owner_id, sub.submitter_id);
        assert_eq!(credit.submission_id, sub.id);
        assert_eq!(credit.expires_at - credit.issued_at, Duration::days(365));
        assert_eq!(
            credit.expires_at,
            DateTimeWithTimeZone::from(Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_total_value_is_exact_product() {
        let credit = issue_credit(&submission(dec!(0.137)), Utc::now().into()).unwrap();
        assert_eq!(credit.total_value, credit.credit_amount * credit.price_per_tonne);
        assert_eq!(credit.total_value, dec!(3.425));
    }

    #[test]
    fn test_zero_offset_is_refused() {
        let err = issue_credit(&submission(Decimal::ZERO), Utc::now().into()).unwrap_err();
        assert_eq!(err.field, "estimated_co2_offset");
    }
}
