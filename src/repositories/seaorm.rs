//! Postgres adapter built on SeaORM.
//!
//! Multi-row operations run inside a database transaction and take a row
//! lock (`SELECT ... FOR UPDATE`) on the row whose state decides whether the
//! write is allowed, so concurrent callers serialise on that row.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};
use serde_json::json;
use uuid::Uuid;

use super::*;
use crate::models::credit::CreditStatus;
use crate::models::transaction::{TransactionStatus, TransactionType};

#[derive(Debug, Clone)]
pub struct SeaOrmStore {
    db: DatabaseConnection,
}

impl SeaOrmStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn now() -> DateTimeWithTimeZone {
    Utc::now().into()
}

/// `%term%` for ILIKE, with the term's own wildcards matched literally
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Unique violations become conflicts; everything else stays a database error
fn map_db_err(err: DbErr) -> RepositoryError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => RepositoryError::Conflict(detail),
        _ => RepositoryError::Database(err),
    }
}

async fn insert_notification<C: ConnectionTrait>(
    conn: &C,
    notification: NewNotification,
) -> Result<notifications::Model, DbErr> {
    notifications::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(notification.user_id),
        title: Set(notification.title),
        message: Set(notification.message),
        notification_type: Set(notification.notification_type.to_string()),
        related_id: Set(notification.related_id),
        read_at: Set(None),
        created_at: Set(now()),
    }
    .insert(conn)
    .await
}

async fn pending_withdrawals<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> Result<Decimal, DbErr> {
    let total: Option<Option<Decimal>> = transactions::Entity::find()
        .select_only()
        .column_as(transactions::Column::Amount.sum(), "total")
        .filter(transactions::Column::SellerId.eq(user_id))
        .filter(transactions::Column::TransactionType.eq(TransactionType::Withdrawal.as_str()))
        .filter(transactions::Column::Status.eq(TransactionStatus::Pending.as_str()))
        .into_tuple()
        .one(conn)
        .await?;

    Ok(total.flatten().unwrap_or(Decimal::ZERO))
}

#[async_trait]
impl UserRepository for SeaOrmStore {
    async fn create_user(&self, user: NewUser) -> RepoResult<users::Model> {
        if users::Entity::find_by_id(user.id).one(&self.db).await?.is_some() {
            return Err(RepositoryError::Conflict("user profile already exists".to_string()));
        }

        let created = now();
        users::ActiveModel {
            id: Set(user.id),
            email: Set(user.email),
            full_name: Set(user.full_name),
            role: Set(user.role.to_string()),
            organization_name: Set(user.organization_name),
            phone: Set(user.phone),
            address: Set(None),
            verification_status: Set(VerificationStatus::Pending.to_string()),
            verification_document_url: Set(None),
            total_earnings: Set(Decimal::ZERO),
            created_at: Set(created),
            updated_at: Set(created),
        }
        .insert(&self.db)
        .await
        .map_err(|e| match map_db_err(e) {
            RepositoryError::Conflict(_) => {
                RepositoryError::Conflict("email already registered".to_string())
            }
            other => other,
        })
    }

    async fn find_user(&self, id: Uuid) -> RepoResult<Option<users::Model>> {
        Ok(users::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> RepoResult<users::Model> {
        let user = users::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(RepositoryError::NotFound("user"))?;

        let mut active: users::ActiveModel = user.into();
        if let Some(full_name) = update.full_name {
            active.full_name = Set(Some(full_name));
        }
        if let Some(organization_name) = update.organization_name {
            active.organization_name = Set(Some(organization_name));
        }
        if let Some(phone) = update.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(address) = update.address {
            active.address = Set(Some(address));
        }
        if let Some(url) = update.verification_document_url {
            active.verification_document_url = Set(Some(url));
        }
        active.updated_at = Set(now());

        Ok(active.update(&self.db).await?)
    }

    async fn set_verification_status(
        &self,
        id: Uuid,
        status: VerificationStatus,
    ) -> RepoResult<users::Model> {
        let user = users::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(RepositoryError::NotFound("user"))?;

        let mut active: users::ActiveModel = user.into();
        active.verification_status = Set(status.to_string());
        active.updated_at = Set(now());

        Ok(active.update(&self.db).await?)
    }
}

#[async_trait]
impl GardenRepository for SeaOrmStore {
    async fn create_garden(&self, garden: NewGarden) -> RepoResult<gardens::Model> {
        let created = now();
        Ok(gardens::ActiveModel {
            id: Set(Uuid::new_v4()),
            owner_id: Set(garden.owner_id),
            name: Set(garden.name),
            description: Set(garden.description),
            location: Set(garden.location),
            garden_type: Set(garden.garden_type.to_string()),
            size_sqm: Set(garden.size_sqm),
            image_urls: Set(json!(garden.image_urls)),
            status: Set(GardenStatus::Active.to_string()),
            created_at: Set(created),
            updated_at: Set(created),
        }
        .insert(&self.db)
        .await?)
    }

    async fn find_garden(&self, id: Uuid) -> RepoResult<Option<gardens::Model>> {
        Ok(gardens::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn list_gardens_by_owner(&self, owner_id: Uuid) -> RepoResult<Vec<gardens::Model>> {
        Ok(gardens::Entity::find()
            .filter(gardens::Column::OwnerId.eq(owner_id))
            .order_by_desc(gardens::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    async fn update_garden(&self, id: Uuid, update: GardenUpdate) -> RepoResult<gardens::Model> {
        let garden = gardens::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(RepositoryError::NotFound("garden"))?;

        let mut active: gardens::ActiveModel = garden.into();
        if let Some(name) = update.name {
            active.name = Set(name);
        }
        if let Some(description) = update.description {
            active.description = Set(Some(description));
        }
        if let Some(location) = update.location {
            active.location = Set(location);
        }
        if let Some(garden_type) = update.garden_type {
            active.garden_type = Set(garden_type.to_string());
        }
        if let Some(size) = update.size_sqm {
            active.size_sqm = Set(Some(size));
        }
        if let Some(urls) = update.image_urls {
            active.image_urls = Set(json!(urls));
        }
        if let Some(status) = update.status {
            active.status = Set(status.to_string());
        }
        active.updated_at = Set(now());

        Ok(active.update(&self.db).await?)
    }

    async fn delete_garden(&self, id: Uuid) -> RepoResult<bool> {
        let txn = self.db.begin().await?;

        let submission_ids: Vec<Uuid> = submissions::Entity::find()
            .select_only()
            .column(submissions::Column::Id)
            .filter(submissions::Column::GardenId.eq(id))
            .into_tuple()
            .all(&txn)
            .await?;

        // Same row locks create_sale takes, so a sale cannot slip in
        let credits = carbon_credits::Entity::find()
            .filter(carbon_credits::Column::SubmissionId.is_in(submission_ids))
            .lock_exclusive()
            .all(&txn)
            .await?;

        if let Some(credit) = credits
            .iter()
            .find(|c| c.status != CreditStatus::Available.as_str())
        {
            return Err(RepositoryError::Conflict(format!(
                "credit {} is {}",
                credit.id, credit.status
            )));
        }

        let referenced = transactions::Entity::find()
            .filter(transactions::Column::CreditId.is_in(credits.iter().map(|c| c.id)))
            .count(&txn)
            .await?;
        if referenced > 0 {
            return Err(RepositoryError::Conflict(
                "garden credits have transactions".to_string(),
            ));
        }

        let result = gardens::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(result.rows_affected > 0)
    }

    async fn search_gardens(&self, search: GardenSearch) -> RepoResult<Vec<gardens::Model>> {
        let mut query = gardens::Entity::find()
            .filter(gardens::Column::Status.eq(GardenStatus::Active.as_str()));

        if let Some(garden_type) = search.garden_type {
            query = query.filter(gardens::Column::GardenType.eq(garden_type.as_str()));
        }
        if let Some(location) = search.location {
            query = query.filter(Expr::cust_with_values(
                "location->>'address' ILIKE $1",
                [contains_pattern(&location)],
            ));
        }
        if let Some(min) = search.min_size {
            query = query.filter(gardens::Column::SizeSqm.gte(min));
        }
        if let Some(max) = search.max_size {
            query = query.filter(gardens::Column::SizeSqm.lte(max));
        }

        Ok(query
            .order_by_desc(gardens::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }
}

#[async_trait]
impl SubmissionRepository for SeaOrmStore {
    async fn create_submission(&self, submission: NewSubmission) -> RepoResult<submissions::Model> {
        let created = now();
        Ok(submissions::ActiveModel {
            id: Set(Uuid::new_v4()),
            garden_id: Set(submission.garden_id),
            submitter_id: Set(submission.submitter_id),
            tree_count: Set(submission.tree_count),
            tree_types: Set(submission.tree_types),
            equipment: Set(submission.equipment),
            estimated_co2_offset: Set(submission.estimated_co2_offset),
            impact_note: Set(submission.impact_note),
            verification_photos: Set(json!(submission.verification_photos)),
            additional_data: Set(submission.additional_data),
            status: Set(SubmissionStatus::Submitted.to_string()),
            reviewer_notes: Set(None),
            submitted_at: Set(created),
            reviewed_at: Set(None),
            created_at: Set(created),
            updated_at: Set(created),
        }
        .insert(&self.db)
        .await?)
    }

    async fn find_submission(&self, id: Uuid) -> RepoResult<Option<submissions::Model>> {
        Ok(submissions::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn list_submissions_by_submitter(
        &self,
        submitter_id: Uuid,
    ) -> RepoResult<Vec<submissions::Model>> {
        Ok(submissions::Entity::find()
            .filter(submissions::Column::SubmitterId.eq(submitter_id))
            .order_by_desc(submissions::Column::SubmittedAt)
            .all(&self.db)
            .await?)
    }

    async fn list_pending_submissions(&self) -> RepoResult<Vec<submissions::Model>> {
        Ok(submissions::Entity::find()
            .filter(submissions::Column::Status.is_in([
                SubmissionStatus::Submitted.as_str(),
                SubmissionStatus::UnderReview.as_str(),
            ]))
            .order_by_asc(submissions::Column::SubmittedAt)
            .all(&self.db)
            .await?)
    }

    async fn apply_review(&self, command: ReviewCommand) -> RepoResult<ReviewRecord> {
        let txn = self.db.begin().await?;

        let submission = submissions::Entity::find_by_id(command.submission_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(RepositoryError::NotFound("submission"))?;

        if submission.status != command.expected.as_str() {
            return Err(RepositoryError::Conflict(format!(
                "submission {} is no longer {}",
                command.submission_id, command.expected
            )));
        }

        let mut active: submissions::ActiveModel = submission.into();
        active.status = Set(command.target.to_string());
        active.reviewed_at = Set(Some(command.reviewed_at));
        active.updated_at = Set(command.reviewed_at);
        if let Some(notes) = command.reviewer_notes {
            active.reviewer_notes = Set(Some(notes));
        }
        let submission = active.update(&txn).await?;

        let credit = match command.credit {
            Some(credit) => Some(
                carbon_credits::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    submission_id: Set(credit.submission_id),
                    owner_id: Set(credit.owner_id),
                    credit_amount: Set(credit.credit_amount),
                    price_per_tonne: Set(credit.price_per_tonne),
                    total_value: Set(credit.total_value),
                    status: Set(CreditStatus::Available.to_string()),
                    certificate_url: Set(None),
                    issued_at: Set(credit.issued_at),
                    expires_at: Set(credit.expires_at),
                    created_at: Set(credit.issued_at),
                    updated_at: Set(credit.issued_at),
                }
                .insert(&txn)
                .await
                .map_err(map_db_err)?,
            ),
            None => None,
        };

        let notification = insert_notification(&txn, command.notification).await?;

        txn.commit().await?;

        Ok(ReviewRecord {
            submission,
            credit,
            notification,
        })
    }
}

#[async_trait]
impl CreditRepository for SeaOrmStore {
    async fn find_credit(&self, id: Uuid) -> RepoResult<Option<carbon_credits::Model>> {
        Ok(carbon_credits::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn find_credit_by_submission(
        &self,
        submission_id: Uuid,
    ) -> RepoResult<Option<carbon_credits::Model>> {
        Ok(carbon_credits::Entity::find()
            .filter(carbon_credits::Column::SubmissionId.eq(submission_id))
            .one(&self.db)
            .await?)
    }

    async fn list_credits_by_owner(&self, owner_id: Uuid) -> RepoResult<Vec<carbon_credits::Model>> {
        Ok(carbon_credits::Entity::find()
            .filter(carbon_credits::Column::OwnerId.eq(owner_id))
            .order_by_desc(carbon_credits::Column::IssuedAt)
            .all(&self.db)
            .await?)
    }

    async fn list_available_credits(
        &self,
        now: DateTimeWithTimeZone,
    ) -> RepoResult<Vec<carbon_credits::Model>> {
        Ok(carbon_credits::Entity::find()
            .filter(carbon_credits::Column::Status.eq(CreditStatus::Available.as_str()))
            .filter(carbon_credits::Column::ExpiresAt.gt(now))
            .order_by_asc(carbon_credits::Column::IssuedAt)
            .all(&self.db)
            .await?)
    }
}

#[async_trait]
impl TransactionRepository for SeaOrmStore {
    async fn create_sale(&self, sale: NewSale) -> RepoResult<transactions::Model> {
        let txn = self.db.begin().await?;

        let credit = carbon_credits::Entity::find_by_id(sale.credit_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(RepositoryError::NotFound("credit"))?;

        if credit.status != CreditStatus::Available.as_str() {
            return Err(RepositoryError::Conflict(format!(
                "credit {} is {}",
                credit.id, credit.status
            )));
        }

        let mut active: carbon_credits::ActiveModel = credit.into();
        active.status = Set(CreditStatus::Reserved.to_string());
        active.updated_at = Set(now());
        active.update(&txn).await?;

        let transaction = transactions::ActiveModel {
            id: Set(Uuid::new_v4()),
            credit_id: Set(Some(sale.credit_id)),
            seller_id: Set(sale.seller_id),
            buyer_id: Set(Some(sale.buyer_id)),
            amount: Set(sale.amount),
            transaction_type: Set(TransactionType::Sale.to_string()),
            status: Set(TransactionStatus::Pending.to_string()),
            payment_method: Set(sale.payment_method),
            payment_reference: Set(sale.payment_reference),
            fees: Set(sale.fees),
            net_amount: Set(sale.net_amount),
            processed_at: Set(None),
            created_at: Set(now()),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok(transaction)
    }

    async fn complete_sale(&self, completion: SaleCompletion) -> RepoResult<CompletedSale> {
        let txn = self.db.begin().await?;

        let tx = transactions::Entity::find_by_id(completion.transaction_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(RepositoryError::NotFound("transaction"))?;

        if tx.transaction_type != TransactionType::Sale.as_str()
            || tx.status != TransactionStatus::Pending.as_str()
        {
            return Err(RepositoryError::Conflict(format!(
                "transaction {} is not a pending sale",
                tx.id
            )));
        }
        let credit_id = tx.credit_id.ok_or(RepositoryError::NotFound("credit"))?;
        let seller_id = tx.seller_id;
        let net_amount = tx.net_amount;

        let credit = carbon_credits::Entity::find_by_id(credit_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(RepositoryError::NotFound("credit"))?;

        let mut active: transactions::ActiveModel = tx.into();
        active.status = Set(TransactionStatus::Completed.to_string());
        active.processed_at = Set(Some(completion.processed_at));
        let transaction = active.update(&txn).await?;

        let mut active: carbon_credits::ActiveModel = credit.into();
        active.status = Set(CreditStatus::Sold.to_string());
        active.updated_at = Set(completion.processed_at);
        let credit = active.update(&txn).await?;

        let updated = users::Entity::update_many()
            .col_expr(
                users::Column::TotalEarnings,
                Expr::col(users::Column::TotalEarnings).add(net_amount),
            )
            .col_expr(users::Column::UpdatedAt, Expr::value(completion.processed_at))
            .filter(users::Column::Id.eq(seller_id))
            .exec(&txn)
            .await?;
        if updated.rows_affected == 0 {
            return Err(RepositoryError::NotFound("user"));
        }

        let mut notifications = Vec::with_capacity(completion.notifications.len());
        for notification in completion.notifications {
            notifications.push(insert_notification(&txn, notification).await?);
        }

        txn.commit().await?;

        Ok(CompletedSale {
            transaction,
            credit,
            notifications,
        })
    }

    async fn fail_sale(
        &self,
        transaction_id: Uuid,
        processed_at: DateTimeWithTimeZone,
    ) -> RepoResult<transactions::Model> {
        let txn = self.db.begin().await?;

        let tx = transactions::Entity::find_by_id(transaction_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(RepositoryError::NotFound("transaction"))?;

        if tx.transaction_type != TransactionType::Sale.as_str()
            || tx.status != TransactionStatus::Pending.as_str()
        {
            return Err(RepositoryError::Conflict(format!(
                "transaction {} is not a pending sale",
                tx.id
            )));
        }
        let credit_id = tx.credit_id;

        let mut active: transactions::ActiveModel = tx.into();
        active.status = Set(TransactionStatus::Failed.to_string());
        active.processed_at = Set(Some(processed_at));
        let transaction = active.update(&txn).await?;

        if let Some(credit_id) = credit_id {
            carbon_credits::Entity::update_many()
                .col_expr(
                    carbon_credits::Column::Status,
                    Expr::value(CreditStatus::Available.as_str()),
                )
                .col_expr(carbon_credits::Column::UpdatedAt, Expr::value(processed_at))
                .filter(carbon_credits::Column::Id.eq(credit_id))
                .filter(carbon_credits::Column::Status.eq(CreditStatus::Reserved.as_str()))
                .exec(&txn)
                .await?;
        }

        txn.commit().await?;
        Ok(transaction)
    }

    async fn request_withdrawal(&self, withdrawal: NewWithdrawal) -> RepoResult<WithdrawalRecord> {
        let txn = self.db.begin().await?;

        // Serialises concurrent withdrawals for the same user
        let user = users::Entity::find_by_id(withdrawal.user_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(RepositoryError::NotFound("user"))?;

        let balance = Balance {
            total_earnings: user.total_earnings,
            pending_withdrawals: pending_withdrawals(&txn, user.id).await?,
        };
        let available = balance.available();
        if withdrawal.amount > available {
            return Err(RepositoryError::InsufficientBalance {
                requested: withdrawal.amount,
                available,
            });
        }

        let transaction = transactions::ActiveModel {
            id: Set(Uuid::new_v4()),
            credit_id: Set(None),
            seller_id: Set(withdrawal.user_id),
            buyer_id: Set(None),
            amount: Set(withdrawal.amount),
            transaction_type: Set(TransactionType::Withdrawal.to_string()),
            status: Set(TransactionStatus::Pending.to_string()),
            payment_method: Set(withdrawal.payment_method),
            payment_reference: Set(withdrawal.payment_reference),
            fees: Set(withdrawal.fees),
            net_amount: Set(withdrawal.net_amount),
            processed_at: Set(None),
            created_at: Set(now()),
        }
        .insert(&txn)
        .await?;

        let notification = insert_notification(
            &txn,
            NewNotification {
                related_id: Some(transaction.id),
                ..withdrawal.notification
            },
        )
        .await?;

        txn.commit().await?;

        Ok(WithdrawalRecord {
            transaction,
            notification,
        })
    }

    async fn find_transaction(&self, id: Uuid) -> RepoResult<Option<transactions::Model>> {
        Ok(transactions::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn list_user_transactions(&self, user_id: Uuid) -> RepoResult<Vec<transactions::Model>> {
        Ok(transactions::Entity::find()
            .filter(
                transactions::Column::SellerId
                    .eq(user_id)
                    .or(transactions::Column::BuyerId.eq(user_id)),
            )
            .order_by_desc(transactions::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    async fn balance(&self, user_id: Uuid) -> RepoResult<Balance> {
        let user = users::Entity::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or(RepositoryError::NotFound("user"))?;

        Ok(Balance {
            total_earnings: user.total_earnings,
            pending_withdrawals: pending_withdrawals(&self.db, user_id).await?,
        })
    }
}

#[async_trait]
impl NotificationRepository for SeaOrmStore {
    async fn create_notification(
        &self,
        notification: NewNotification,
    ) -> RepoResult<notifications::Model> {
        Ok(insert_notification(&self.db, notification).await?)
    }

    async fn find_notification(&self, id: Uuid) -> RepoResult<Option<notifications::Model>> {
        Ok(notifications::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn list_notifications(
        &self,
        user_id: Uuid,
        limit: u64,
    ) -> RepoResult<Vec<notifications::Model>> {
        Ok(notifications::Entity::find()
            .filter(notifications::Column::UserId.eq(user_id))
            .order_by_desc(notifications::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await?)
    }

    async fn unread_count(&self, user_id: Uuid) -> RepoResult<u64> {
        Ok(notifications::Entity::find()
            .filter(notifications::Column::UserId.eq(user_id))
            .filter(notifications::Column::ReadAt.is_null())
            .count(&self.db)
            .await?)
    }

    async fn mark_read(
        &self,
        id: Uuid,
        read_at: DateTimeWithTimeZone,
    ) -> RepoResult<notifications::Model> {
        let notification = notifications::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(RepositoryError::NotFound("notification"))?;

        let mut active: notifications::ActiveModel = notification.into();
        active.read_at = Set(Some(read_at));
        Ok(active.update(&self.db).await?)
    }

    async fn mark_all_read(&self, user_id: Uuid, read_at: DateTimeWithTimeZone) -> RepoResult<u64> {
        let result = notifications::Entity::update_many()
            .col_expr(notifications::Column::ReadAt, Expr::value(read_at))
            .filter(notifications::Column::UserId.eq(user_id))
            .filter(notifications::Column::ReadAt.is_null())
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }

    async fn delete_notification(&self, id: Uuid) -> RepoResult<bool> {
        let result = notifications::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }
}
