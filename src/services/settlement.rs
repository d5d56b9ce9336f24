//! Credit sales, seller payouts and withdrawals.
//!
//! Money moves only through the store's atomic operations: `create_sale`
//! reserves the credit, `complete_sale` credits the seller, and
//! `request_withdrawal` checks the balance and inserts in one step.

use chrono::{DateTime, Datelike, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use uuid::Uuid;

use crate::entities::{transactions, users};
use crate::error::{AppError, AppResult, ValidationError};
use crate::models::credit::{CreditStatus, PurchaseCreditRequest};
use crate::models::notification::NotificationType;
use crate::models::transaction::{
    TransactionStatsResponse, TransactionStatus, TransactionType, WithdrawalRequest,
};
use crate::models::user::UserRole;
use crate::repositories::{
    Balance, NewNotification, NewSale, NewWithdrawal, RepositoryError, SaleCompletion, Store,
    WithdrawalRecord,
};
use crate::services::notifications::NotificationBroadcaster;

/// Processing fee withheld from every withdrawal
pub const WITHDRAWAL_FEE_RATE: Decimal = dec!(0.03);

const CENTS: u32 = 2;

fn to_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(CENTS, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns `(fees, net_amount)` for a withdrawal of `amount`.
///
/// Fees are rounded to cents and the net is the remainder, so
/// `fees + net_amount == amount` always holds.
pub fn withdrawal_breakdown(amount: Decimal) -> (Decimal, Decimal) {
    let fees = to_cents(amount * WITHDRAWAL_FEE_RATE);
    (fees, amount - fees)
}

fn validate_amount(amount: Decimal) -> Result<Decimal, ValidationError> {
    if amount <= Decimal::ZERO {
        return Err(ValidationError::new("amount", "must be greater than zero"));
    }
    if amount.normalize().scale() > CENTS {
        return Err(ValidationError::new("amount", "must not have more than 2 decimals"));
    }
    Ok(amount)
}

/// Opens a pending sale of `credit_id` to `buyer`, reserving the credit.
pub async fn purchase_credit(
    store: &dyn Store,
    buyer: &users::Model,
    credit_id: Uuid,
    request: PurchaseCreditRequest,
) -> AppResult<transactions::Model> {
    if buyer.role != UserRole::Ngo.as_str() {
        return Err(AppError::Forbidden(
            "only NGO accounts can purchase credits".to_string(),
        ));
    }

    let credit = store
        .find_credit(credit_id)
        .await?
        .ok_or_else(|| AppError::NotFound("credit".to_string()))?;

    if credit.owner_id == buyer.id {
        return Err(ValidationError::new("credit_id", "cannot purchase your own credit").into());
    }
    if credit.status != CreditStatus::Available.as_str() {
        return Err(AppError::Conflict(format!(
            "credit {} is {}",
            credit.id, credit.status
        )));
    }
    if credit.expires_at <= Utc::now() {
        return Err(AppError::Conflict(format!("credit {} has expired", credit.id)));
    }

    // Sales settle in cents; the credit's total_value keeps full precision
    let amount = to_cents(credit.total_value);
    let fees = request.fees.unwrap_or(Decimal::ZERO);
    if fees < Decimal::ZERO || fees > amount {
        return Err(ValidationError::new("fees", "must be between zero and the sale amount").into());
    }
    if fees.normalize().scale() > CENTS {
        return Err(ValidationError::new("fees", "must not have more than 2 decimals").into());
    }

    let transaction = store
        .create_sale(NewSale {
            credit_id,
            seller_id: credit.owner_id,
            buyer_id: buyer.id,
            amount,
            fees,
            net_amount: amount - fees,
            payment_method: request.payment_method,
            payment_reference: request.payment_reference,
        })
        .await?;

    tracing::info!(
        "Sale {} opened: credit {} reserved for buyer {} ({})",
        transaction.id,
        credit_id,
        buyer.id,
        amount
    );
    Ok(transaction)
}

/// Completes a pending sale and pays the seller.
pub async fn complete_sale(
    store: &dyn Store,
    broadcaster: &NotificationBroadcaster,
    transaction_id: Uuid,
) -> AppResult<transactions::Model> {
    let transaction = store
        .find_transaction(transaction_id)
        .await?
        .ok_or_else(|| AppError::NotFound("transaction".to_string()))?;

    if transaction.transaction_type != TransactionType::Sale.as_str()
        || transaction.status != TransactionStatus::Pending.as_str()
    {
        return Err(AppError::Conflict(format!(
            "transaction {} is not a pending sale",
            transaction.id
        )));
    }

    let buyer_id = transaction
        .buyer_id
        .ok_or_else(|| AppError::Conflict(format!("sale {} has no buyer", transaction.id)))?;
    let credit_id = transaction
        .credit_id
        .ok_or_else(|| AppError::Conflict(format!("sale {} has no credit", transaction.id)))?;
    let credit = store
        .find_credit(credit_id)
        .await?
        .ok_or_else(|| AppError::NotFound("credit".to_string()))?;

    let notifications = vec![
        NewNotification {
            user_id: transaction.seller_id,
            title: "Payment Received".to_string(),
            message: format!(
                "You received ${} from the sale of your carbon credits.",
                to_cents(transaction.net_amount)
            ),
            notification_type: NotificationType::Success,
            related_id: Some(transaction.id),
        },
        NewNotification {
            user_id: buyer_id,
            title: "Purchase Completed".to_string(),
            message: format!(
                "Your purchase of {}t CO2 credits has been completed.",
                credit.credit_amount.normalize()
            ),
            notification_type: NotificationType::Success,
            related_id: Some(transaction.id),
        },
    ];

    let completed = store
        .complete_sale(SaleCompletion {
            transaction_id,
            processed_at: Utc::now().into(),
            notifications,
        })
        .await?;

    broadcaster.broadcast_all(&completed.notifications);

    tracing::info!(
        "Sale {} completed: credit {} sold, seller {} credited {}",
        transaction_id,
        completed.credit.id,
        completed.transaction.seller_id,
        completed.transaction.net_amount
    );
    Ok(completed.transaction)
}

/// Marks a pending sale failed and puts the credit back on the market.
pub async fn fail_sale(store: &dyn Store, transaction_id: Uuid) -> AppResult<transactions::Model> {
    let transaction = store.fail_sale(transaction_id, Utc::now().into()).await?;
    tracing::warn!(
        "Sale {} failed, credit {:?} released",
        transaction_id,
        transaction.credit_id
    );
    Ok(transaction)
}

pub async fn request_withdrawal(
    store: &dyn Store,
    broadcaster: &NotificationBroadcaster,
    user_id: Uuid,
    request: WithdrawalRequest,
) -> AppResult<WithdrawalRecord> {
    let amount = validate_amount(request.amount)?;
    let (fees, net_amount) = withdrawal_breakdown(amount);

    let record = store
        .request_withdrawal(NewWithdrawal {
            user_id,
            amount,
            fees,
            net_amount,
            payment_method: request.payment_method,
            payment_reference: request.payment_details.map(|d| d.to_string()),
            notification: NewNotification {
                user_id,
                title: "Withdrawal Requested".to_string(),
                message: format!(
                    "Your withdrawal request for ${} has been submitted and is being processed.",
                    amount
                ),
                notification_type: NotificationType::Info,
                related_id: None,
            },
        })
        .await
        .map_err(|e| {
            if let RepositoryError::InsufficientBalance { requested, available } = &e {
                tracing::debug!(
                    "Withdrawal of {} refused for {}: available {}",
                    requested,
                    user_id,
                    available
                );
            }
            AppError::from(e)
        })?;

    broadcaster.broadcast(&record.notification);

    tracing::info!(
        "Withdrawal {} requested by {}: amount {}, fees {}, net {}",
        record.transaction.id,
        user_id,
        amount,
        fees,
        net_amount
    );
    Ok(record)
}

pub async fn balance(store: &dyn Store, user_id: Uuid) -> AppResult<Balance> {
    Ok(store.balance(user_id).await?)
}

/// Aggregates over completed transactions only. Sales count towards
/// `total_sales` for the seller and `total_purchases` for the buyer;
/// `monthly_earnings` is the seller's sales in the month of `now` (UTC).
pub fn summarize(
    user_id: Uuid,
    transactions: &[transactions::Model],
    now: DateTime<Utc>,
) -> TransactionStatsResponse {
    let mut stats = TransactionStatsResponse::default();

    for tx in transactions
        .iter()
        .filter(|t| t.status == TransactionStatus::Completed.as_str())
    {
        stats.transaction_count += 1;

        if tx.transaction_type == TransactionType::Sale.as_str() {
            if tx.seller_id == user_id {
                stats.total_sales += tx.amount;

                let created = tx.created_at.with_timezone(&Utc);
                if created.year() == now.year() && created.month() == now.month() {
                    stats.monthly_earnings += tx.amount;
                }
            }
            if tx.buyer_id == Some(user_id) {
                stats.total_purchases += tx.amount;
            }
        } else if tx.transaction_type == TransactionType::Withdrawal.as_str() {
            stats.total_withdrawals += tx.amount;
        }
    }

    stats
}

pub async fn transaction_stats(
    store: &dyn Store,
    user_id: Uuid,
) -> AppResult<TransactionStatsResponse> {
    let transactions = store.list_user_transactions(user_id).await?;
    Ok(summarize(user_id, &transactions, Utc::now()))
}

pub async fn list_transactions(
    store: &dyn Store,
    user_id: Uuid,
) -> AppResult<Vec<transactions::Model>> {
    Ok(store.list_user_transactions(user_id).await?)
}

/// Only the seller or buyer may see a transaction
pub async fn get_transaction(
    store: &dyn Store,
    user_id: Uuid,
    id: Uuid,
) -> AppResult<transactions::Model> {
    match store.find_transaction(id).await? {
        Some(t) if t.seller_id == user_id || t.buyer_id == Some(user_id) => Ok(t),
        _ => Err(AppError::NotFound("transaction".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::carbon_credits;
    use crate::models::submission::SubmissionStatus;
    use crate::models::garden::GardenType;
    use crate::repositories::{
        CreditRepository, GardenRepository, InMemoryStore, NewCredit, NewGarden, NewSubmission,
        NewUser, NotificationRepository, ReviewCommand, SubmissionRepository, UserRepository,
    };
    use chrono::{Duration, TimeZone};
    use sea_orm::prelude::DateTimeWithTimeZone;
    use serde_json::json;
    use std::sync::Arc;

    async fn user(store: &InMemoryStore, role: UserRole) -> users::Model {
        let id = Uuid::new_v4();
        store
            .create_user(NewUser {
                id,
                email: format!("{id}@example.org"),
                full_name: None,
                role,
                organization_name: None,
                phone: None,
            })
            .await
            .unwrap()
    }

    /// Approves a fresh submission of `owner` and returns the minted credit
    async fn credit_for(store: &InMemoryStore, owner: &users::Model, offset: Decimal) -> carbon_credits::Model {
        let garden = store
            .create_garden(NewGarden {
                owner_id: owner.id,
                name: "Plot".to_string(),
                description: None,
                location: json!({"address": "2 Side St"}),
                garden_type: GardenType::Community,
                size_sqm: None,
                image_urls: vec![],
            })
            .await
            .unwrap();
        let submission = store
            .create_submission(NewSubmission {
                garden_id: garden.id,
                submitter_id: owner.id,
                tree_count: 1,
                tree_types: json!([]),
                equipment: json!([]),
                estimated_co2_offset: offset,
                impact_note: None,
                verification_photos: vec![],
                additional_data: None,
            })
            .await
            .unwrap();
        let now: DateTimeWithTimeZone = Utc::now().into();
        let record = store
            .apply_review(ReviewCommand {
                submission_id: submission.id,
                expected: SubmissionStatus::Submitted,
                target: SubmissionStatus::Approved,
                reviewer_notes: None,
                reviewed_at: now,
                notification: NewNotification {
                    user_id: owner.id,
                    title: "Submission APPROVED".to_string(),
                    message: String::new(),
                    notification_type: NotificationType::Success,
                    related_id: Some(submission.id),
                },
                credit: Some(NewCredit {
                    submission_id: submission.id,
                    owner_id: owner.id,
                    credit_amount: offset,
                    price_per_tonne: dec!(25.00),
                    total_value: offset * dec!(25.00),
                    issued_at: now,
                    expires_at: now + Duration::days(365),
                }),
            })
            .await
            .unwrap();
        record.credit.unwrap()
    }

    /// Seller with `earnings` already paid out through a completed sale
    async fn seller_with_earnings(
        store: &InMemoryStore,
        broadcaster: &NotificationBroadcaster,
        earnings: Decimal,
    ) -> users::Model {
        let seller = user(store, UserRole::GardenOwner).await;
        let buyer = user(store, UserRole::Ngo).await;
        let credit = credit_for(store, &seller, earnings / dec!(25)).await;
        let sale = purchase_credit(store, &buyer, credit.id, PurchaseCreditRequest::default())
            .await
            .unwrap();
        complete_sale(store, broadcaster, sale.id).await.unwrap();
        seller
    }

    #[test]
    fn test_withdrawal_breakdown() {
        assert_eq!(withdrawal_breakdown(dec!(50)), (dec!(1.50), dec!(48.50)));
        assert_eq!(withdrawal_breakdown(dec!(1.50)), (dec!(0.05), dec!(1.45)));
        let (fees, net) = withdrawal_breakdown(dec!(33.33));
        assert_eq!(fees + net, dec!(33.33));
        assert_eq!(fees, dec!(1.00));
    }

    #[test]
    fn test_withdrawal_amount_validation() {
        assert!(validate_amount(dec!(0)).is_err());
        assert!(validate_amount(dec!(-5)).is_err());
        assert!(validate_amount(dec!(1.005)).is_err());
        assert!(validate_amount(dec!(10.50)).is_ok());
        assert!(validate_amount(dec!(10.500)).is_ok());
    }

    #[tokio::test]
    async fn test_purchase_and_complete_sale() {
        let store = InMemoryStore::new();
        let broadcaster = NotificationBroadcaster::new();
        let seller = user(&store, UserRole::GardenOwner).await;
        let buyer = user(&store, UserRole::Ngo).await;
        let credit = credit_for(&store, &seller, dec!(2.5)).await;

        let sale = purchase_credit(
            &store,
            &buyer,
            credit.id,
            PurchaseCreditRequest {
                fees: Some(dec!(2.50)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(sale.amount, dec!(62.50));
        assert_eq!(sale.net_amount, sale.amount - sale.fees);
        assert_eq!(
            store.find_credit(credit.id).await.unwrap().unwrap().status,
            "reserved"
        );

        let completed = complete_sale(&store, &broadcaster, sale.id).await.unwrap();
        assert_eq!(completed.status, "completed");
        assert!(completed.processed_at.is_some());
        assert_eq!(store.find_credit(credit.id).await.unwrap().unwrap().status, "sold");

        let seller_after = store.find_user(seller.id).await.unwrap().unwrap();
        assert_eq!(seller_after.total_earnings, dec!(60.00));

        let seller_inbox = store.list_notifications(seller.id, 10).await.unwrap();
        assert_eq!(seller_inbox[0].title, "Payment Received");
        assert_eq!(
            seller_inbox[0].message,
            "You received $60.00 from the sale of your carbon credits."
        );
        let buyer_inbox = store.list_notifications(buyer.id, 10).await.unwrap();
        assert_eq!(
            buyer_inbox[0].message,
            "Your purchase of 2.5t CO2 credits has been completed."
        );

        let err = complete_sale(&store, &broadcaster, sale.id).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_fractional_offset_settles_in_cents() {
        let store = InMemoryStore::new();
        let broadcaster = NotificationBroadcaster::new();
        let seller = user(&store, UserRole::GardenOwner).await;
        let buyer = user(&store, UserRole::Ngo).await;
        let credit = credit_for(&store, &seller, dec!(0.137)).await;
        assert_eq!(credit.total_value, dec!(3.425));

        let err = purchase_credit(
            &store,
            &buyer,
            credit.id,
            PurchaseCreditRequest {
                fees: Some(dec!(0.000005)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(ref e) if e.field == "fees"));

        let sale = purchase_credit(&store, &buyer, credit.id, PurchaseCreditRequest::default())
            .await
            .unwrap();
        assert_eq!(sale.amount, dec!(3.43));
        assert_eq!(sale.net_amount, dec!(3.43));

        complete_sale(&store, &broadcaster, sale.id).await.unwrap();
        let earned = balance(&store, seller.id).await.unwrap();
        assert_eq!(earned.total_earnings, sale.net_amount);

        let request = WithdrawalRequest {
            amount: dec!(3.43),
            payment_method: None,
            payment_details: None,
        };
        request_withdrawal(&store, &broadcaster, seller.id, request)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_purchase_rules() {
        let store = InMemoryStore::new();
        let seller = user(&store, UserRole::GardenOwner).await;
        let buyer = user(&store, UserRole::Ngo).await;
        let other_buyer = user(&store, UserRole::Ngo).await;
        let credit = credit_for(&store, &seller, dec!(1)).await;

        let err = purchase_credit(&store, &seller, credit.id, PurchaseCreditRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        purchase_credit(&store, &buyer, credit.id, PurchaseCreditRequest::default())
            .await
            .unwrap();
        let err = purchase_credit(&store, &other_buyer, credit.id, PurchaseCreditRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_failed_sale_releases_credit() {
        let store = InMemoryStore::new();
        let seller = user(&store, UserRole::GardenOwner).await;
        let buyer = user(&store, UserRole::Ngo).await;
        let credit = credit_for(&store, &seller, dec!(1)).await;
        let sale = purchase_credit(&store, &buyer, credit.id, PurchaseCreditRequest::default())
            .await
            .unwrap();

        let failed = fail_sale(&store, sale.id).await.unwrap();
        assert_eq!(failed.status, "failed");
        assert_eq!(
            store.find_credit(credit.id).await.unwrap().unwrap().status,
            "available"
        );
        assert_eq!(
            store.find_user(seller.id).await.unwrap().unwrap().total_earnings,
            Decimal::ZERO
        );
    }

    #[tokio::test]
    async fn test_withdrawal_against_balance() {
        let store = InMemoryStore::new();
        let broadcaster = NotificationBroadcaster::new();
        let seller = seller_with_earnings(&store, &broadcaster, dec!(100)).await;

        let err = request_withdrawal(
            &store,
            &broadcaster,
            seller.id,
            WithdrawalRequest {
                amount: dec!(150),
                payment_method: None,
                payment_details: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            AppError::InsufficientBalance { requested, available }
                if requested == dec!(150) && available == dec!(100)
        ));

        let record = request_withdrawal(
            &store,
            &broadcaster,
            seller.id,
            WithdrawalRequest {
                amount: dec!(50),
                payment_method: Some("bank_transfer".to_string()),
                payment_details: Some(json!({"iban": "DE00 0000"})),
            },
        )
        .await
        .unwrap();
        assert_eq!(record.transaction.fees, dec!(1.50));
        assert_eq!(record.transaction.net_amount, dec!(48.50));
        assert_eq!(record.transaction.status, "pending");
        assert_eq!(record.transaction.credit_id, None);
        assert_eq!(record.notification.related_id, Some(record.transaction.id));

        let balance = balance(&store, seller.id).await.unwrap();
        assert_eq!(balance.total_earnings, dec!(100));
        assert_eq!(balance.pending_withdrawals, dec!(50));
        assert_eq!(balance.available(), dec!(50));
    }

    #[tokio::test]
    async fn test_concurrent_withdrawals_cannot_overdraw() {
        let store = Arc::new(InMemoryStore::new());
        let broadcaster = NotificationBroadcaster::new();
        let seller_id = seller_with_earnings(&store, &broadcaster, dec!(100)).await.id;

        let attempts = (0..8).map(|_| {
            let store = store.clone();
            let broadcaster = broadcaster.clone();
            tokio::spawn(async move {
                request_withdrawal(
                    store.as_ref(),
                    &broadcaster,
                    seller_id,
                    WithdrawalRequest {
                        amount: dec!(60),
                        payment_method: None,
                        payment_details: None,
                    },
                )
                .await
            })
        });

        let mut succeeded = 0;
        for handle in attempts.collect::<Vec<_>>() {
            if handle.await.unwrap().is_ok() {
                succeeded += 1;
            }
        }

        assert_eq!(succeeded, 1);
        let balance = balance(store.as_ref(), seller_id).await.unwrap();
        assert_eq!(balance.pending_withdrawals, dec!(60));
    }

    #[test]
    fn test_summarize_counts_completed_only() {
        let me = Uuid::new_v4();
        let other = Uuid::new_v4();
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 0, 0, 0).unwrap();
        let this_month: DateTimeWithTimeZone = Utc.with_ymd_and_hms(2025, 6, 2, 0, 0, 0).unwrap().into();
        let last_month: DateTimeWithTimeZone = Utc.with_ymd_and_hms(2025, 5, 30, 0, 0, 0).unwrap().into();

        let tx = |seller: Uuid,
                  buyer: Option<Uuid>,
                  kind: TransactionType,
                  status: TransactionStatus,
                  amount: Decimal,
                  created_at: DateTimeWithTimeZone| {
            transactions::Model {
                id: Uuid::new_v4(),
                credit_id: None,
                seller_id: seller,
                buyer_id: buyer,
                amount,
                transaction_type: kind.to_string(),
                status: status.to_string(),
                payment_method: None,
                payment_reference: None,
                fees: Decimal::ZERO,
                net_amount: amount,
                processed_at: None,
                created_at,
            }
        };

        let history = vec![
            tx(me, Some(other), TransactionType::Sale, TransactionStatus::Completed, dec!(40), this_month),
            tx(me, Some(other), TransactionType::Sale, TransactionStatus::Completed, dec!(25), last_month),
            tx(me, Some(other), TransactionType::Sale, TransactionStatus::Pending, dec!(99), this_month),
            tx(other, Some(me), TransactionType::Sale, TransactionStatus::Completed, dec!(10), this_month),
            tx(me, None, TransactionType::Withdrawal, TransactionStatus::Completed, dec!(30), this_month),
            tx(me, None, TransactionType::Withdrawal, TransactionStatus::Failed, dec!(5), this_month),
        ];

        let stats = summarize(me, &history, now);
        assert_eq!(stats.transaction_count, 4);
        assert_eq!(stats.total_sales, dec!(65));
        assert_eq!(stats.monthly_earnings, dec!(40));
        assert_eq!(stats.total_purchases, dec!(10));
        assert_eq!(stats.total_withdrawals, dec!(30));
    }
}
