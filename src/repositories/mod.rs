//! Persistence ports, one repository trait per entity.
//!
//! Services only talk to these traits. [`SeaOrmStore`] backs them with
//! Postgres; [`InMemoryStore`] keeps everything behind a single mutex and is
//! used when no database is configured and in tests.
//!
//! Operations that must be indivisible (review transitions, sale
//! settlement, withdrawal requests) are single trait methods so each
//! adapter can make them atomic in its own way.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde_json::Value as Json;
use thiserror::Error;
use uuid::Uuid;

use crate::entities::{carbon_credits, gardens, notifications, submissions, transactions, users};
use crate::models::garden::{GardenStatus, GardenType};
use crate::models::notification::NotificationType;
use crate::models::submission::SubmissionStatus;
use crate::models::user::{UserRole, VerificationStatus};

pub mod memory;
pub mod seaorm;

pub use memory::InMemoryStore;
pub use seaorm::SeaOrmStore;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A conditional write lost against a concurrent change or a uniqueness rule
    #[error("{0}")]
    Conflict(String),

    #[error("insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance {
        requested: Decimal,
        available: Decimal,
    },

    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

pub type RepoResult<T> = Result<T, RepositoryError>;

#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub role: UserRole,
    pub organization_name: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub organization_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<Json>,
    pub verification_document_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewGarden {
    pub owner_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub location: Json,
    pub garden_type: GardenType,
    pub size_sqm: Option<Decimal>,
    pub image_urls: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct GardenUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<Json>,
    pub garden_type: Option<GardenType>,
    pub size_sqm: Option<Decimal>,
    pub image_urls: Option<Vec<String>>,
    pub status: Option<GardenStatus>,
}

/// Filters for the public garden search; only active gardens are returned.
#[derive(Debug, Clone, Default)]
pub struct GardenSearch {
    pub garden_type: Option<GardenType>,
    /// Case-insensitive substring of `location.address`
    pub location: Option<String>,
    pub min_size: Option<Decimal>,
    pub max_size: Option<Decimal>,
}

#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub garden_id: Uuid,
    pub submitter_id: Uuid,
    pub tree_count: i32,
    pub tree_types: Json,
    pub equipment: Json,
    pub estimated_co2_offset: Decimal,
    pub impact_note: Option<String>,
    pub verification_photos: Vec<String>,
    pub additional_data: Option<Json>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    pub notification_type: NotificationType,
    pub related_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCredit {
    pub submission_id: Uuid,
    pub owner_id: Uuid,
    pub credit_amount: Decimal,
    pub price_per_tonne: Decimal,
    pub total_value: Decimal,
    pub issued_at: DateTimeWithTimeZone,
    pub expires_at: DateTimeWithTimeZone,
}

/// One submission status change, applied all-or-nothing.
///
/// The status only changes if it still equals `expected`; otherwise the
/// command fails with [`RepositoryError::Conflict`] and nothing is written.
#[derive(Debug, Clone)]
pub struct ReviewCommand {
    pub submission_id: Uuid,
    pub expected: SubmissionStatus,
    pub target: SubmissionStatus,
    pub reviewer_notes: Option<String>,
    pub reviewed_at: DateTimeWithTimeZone,
    pub notification: NewNotification,
    /// Present only for transitions into `approved`
    pub credit: Option<NewCredit>,
}

#[derive(Debug, Clone)]
pub struct ReviewRecord {
    pub submission: submissions::Model,
    pub credit: Option<carbon_credits::Model>,
    pub notification: notifications::Model,
}

/// A buyer's pending purchase; the credit is reserved in the same write.
#[derive(Debug, Clone)]
pub struct NewSale {
    pub credit_id: Uuid,
    pub seller_id: Uuid,
    pub buyer_id: Uuid,
    pub amount: Decimal,
    pub fees: Decimal,
    pub net_amount: Decimal,
    pub payment_method: Option<String>,
    pub payment_reference: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SaleCompletion {
    pub transaction_id: Uuid,
    pub processed_at: DateTimeWithTimeZone,
    pub notifications: Vec<NewNotification>,
}

#[derive(Debug, Clone)]
pub struct CompletedSale {
    pub transaction: transactions::Model,
    pub credit: carbon_credits::Model,
    pub notifications: Vec<notifications::Model>,
}

/// Withdrawal checked against the available balance and inserted as one
/// operation. The notification's `related_id` is set to the new transaction.
#[derive(Debug, Clone)]
pub struct NewWithdrawal {
    pub user_id: Uuid,
    pub amount: Decimal,
    pub fees: Decimal,
    pub net_amount: Decimal,
    pub payment_method: Option<String>,
    pub payment_reference: Option<String>,
    pub notification: NewNotification,
}

#[derive(Debug, Clone)]
pub struct WithdrawalRecord {
    pub transaction: transactions::Model,
    pub notification: notifications::Model,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Balance {
    pub total_earnings: Decimal,
    pub pending_withdrawals: Decimal,
}

impl Balance {
    /// Earnings not already claimed by a pending withdrawal, floored at zero
    pub fn available(&self) -> Decimal {
        (self.total_earnings - self.pending_withdrawals).max(Decimal::ZERO)
    }
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_user(&self, user: NewUser) -> RepoResult<users::Model>;
    async fn find_user(&self, id: Uuid) -> RepoResult<Option<users::Model>>;
    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> RepoResult<users::Model>;
    async fn set_verification_status(
        &self,
        id: Uuid,
        status: VerificationStatus,
    ) -> RepoResult<users::Model>;
}

#[async_trait]
pub trait GardenRepository: Send + Sync {
    async fn create_garden(&self, garden: NewGarden) -> RepoResult<gardens::Model>;
    async fn find_garden(&self, id: Uuid) -> RepoResult<Option<gardens::Model>>;
    /// Newest first
    async fn list_gardens_by_owner(&self, owner_id: Uuid) -> RepoResult<Vec<gardens::Model>>;
    async fn update_garden(&self, id: Uuid, update: GardenUpdate) -> RepoResult<gardens::Model>;
    /// Removes the garden with its submissions and their credits. Returns
    /// false when no garden had this id.
    ///
    /// Fails with `Conflict` while any of those credits is reserved or sold,
    /// or is referenced by a transaction.
    async fn delete_garden(&self, id: Uuid) -> RepoResult<bool>;
    async fn search_gardens(&self, search: GardenSearch) -> RepoResult<Vec<gardens::Model>>;
}

#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    async fn create_submission(&self, submission: NewSubmission) -> RepoResult<submissions::Model>;
    async fn find_submission(&self, id: Uuid) -> RepoResult<Option<submissions::Model>>;
    /// Newest first
    async fn list_submissions_by_submitter(
        &self,
        submitter_id: Uuid,
    ) -> RepoResult<Vec<submissions::Model>>;
    /// `submitted` and `under_review`, oldest first
    async fn list_pending_submissions(&self) -> RepoResult<Vec<submissions::Model>>;
    async fn apply_review(&self, command: ReviewCommand) -> RepoResult<ReviewRecord>;
}

#[async_trait]
pub trait CreditRepository: Send + Sync {
    async fn find_credit(&self, id: Uuid) -> RepoResult<Option<carbon_credits::Model>>;
    async fn find_credit_by_submission(
        &self,
        submission_id: Uuid,
    ) -> RepoResult<Option<carbon_credits::Model>>;
    async fn list_credits_by_owner(&self, owner_id: Uuid) -> RepoResult<Vec<carbon_credits::Model>>;
    /// Available credits that have not expired at `now`, oldest issue first
    async fn list_available_credits(
        &self,
        now: DateTimeWithTimeZone,
    ) -> RepoResult<Vec<carbon_credits::Model>>;
}

#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Moves the credit `available → reserved` and inserts a pending sale.
    /// Fails with `Conflict` if the credit is no longer available.
    async fn create_sale(&self, sale: NewSale) -> RepoResult<transactions::Model>;
    /// Completes a pending sale: transaction `completed`, credit `sold`,
    /// seller earnings credited with the net amount, notifications stored.
    async fn complete_sale(&self, completion: SaleCompletion) -> RepoResult<CompletedSale>;
    /// Marks a pending sale `failed` and releases its credit.
    async fn fail_sale(
        &self,
        transaction_id: Uuid,
        processed_at: DateTimeWithTimeZone,
    ) -> RepoResult<transactions::Model>;
    async fn request_withdrawal(&self, withdrawal: NewWithdrawal) -> RepoResult<WithdrawalRecord>;
    async fn find_transaction(&self, id: Uuid) -> RepoResult<Option<transactions::Model>>;
    /// Transactions where the user is seller or buyer, newest first
    async fn list_user_transactions(&self, user_id: Uuid) -> RepoResult<Vec<transactions::Model>>;
    async fn balance(&self, user_id: Uuid) -> RepoResult<Balance>;
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn create_notification(
        &self,
        notification: NewNotification,
    ) -> RepoResult<notifications::Model>;
    async fn find_notification(&self, id: Uuid) -> RepoResult<Option<notifications::Model>>;
    /// Newest first
    async fn list_notifications(
        &self,
        user_id: Uuid,
        limit: u64,
    ) -> RepoResult<Vec<notifications::Model>>;
    async fn unread_count(&self, user_id: Uuid) -> RepoResult<u64>;
    async fn mark_read(
        &self,
        id: Uuid,
        read_at: DateTimeWithTimeZone,
    ) -> RepoResult<notifications::Model>;
    /// Returns the number of notifications that changed
    async fn mark_all_read(&self, user_id: Uuid, read_at: DateTimeWithTimeZone) -> RepoResult<u64>;
    async fn delete_notification(&self, id: Uuid) -> RepoResult<bool>;
}

/// Everything the services need from persistence
pub trait Store:
    UserRepository
    + GardenRepository
    + SubmissionRepository
    + CreditRepository
    + TransactionRepository
    + NotificationRepository
{
}

impl<T> Store for T where
    T: UserRepository
        + GardenRepository
        + SubmissionRepository
        + CreditRepository
        + TransactionRepository
        + NotificationRepository
{
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_available_balance_subtracts_pending() {
        let balance = Balance {
            total_earnings: dec!(100),
            pending_withdrawals: dec!(30),
        };
        assert_eq!(balance.available(), dec!(70));
    }

    #[test]
    fn test_available_balance_never_negative() {
        let balance = Balance {
            total_earnings: dec!(10),
            pending_withdrawals: dec!(30),
        };
        assert_eq!(balance.available(), Decimal::ZERO);
    }
}
