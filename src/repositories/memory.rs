//! In-process store.
//!
//! All tables live behind one `parking_lot::Mutex`, so every trait method
//! (including the multi-row ones) runs as a single critical section. Guards
//! are never held across an await point.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde_json::json;
use uuid::Uuid;

use super::*;
use crate::models::credit::CreditStatus;
use crate::models::transaction::{TransactionStatus, TransactionType};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<users::Model>,
    gardens: Vec<gardens::Model>,
    submissions: Vec<submissions::Model>,
    credits: Vec<carbon_credits::Model>,
    transactions: Vec<transactions::Model>,
    notifications: Vec<notifications::Model>,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn now() -> DateTimeWithTimeZone {
    Utc::now().into()
}

fn build_notification(notification: NewNotification) -> notifications::Model {
    notifications::Model {
        id: Uuid::new_v4(),
        user_id: notification.user_id,
        title: notification.title,
        message: notification.message,
        notification_type: notification.notification_type.to_string(),
        related_id: notification.related_id,
        read_at: None,
        created_at: now(),
    }
}

fn pending_withdrawals(tables: &Tables, user_id: Uuid) -> Decimal {
    tables
        .transactions
        .iter()
        .filter(|t| {
            t.seller_id == user_id
                && t.transaction_type == TransactionType::Withdrawal.as_str()
                && t.status == TransactionStatus::Pending.as_str()
        })
        .map(|t| t.amount)
        .sum()
}

fn balance_of(tables: &Tables, user_id: Uuid) -> RepoResult<Balance> {
    let user = tables
        .users
        .iter()
        .find(|u| u.id == user_id)
        .ok_or(RepositoryError::NotFound("user"))?;

    Ok(Balance {
        total_earnings: user.total_earnings,
        pending_withdrawals: pending_withdrawals(tables, user_id),
    })
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create_user(&self, user: NewUser) -> RepoResult<users::Model> {
        let mut tables = self.tables.lock();

        if tables.users.iter().any(|u| u.id == user.id) {
            return Err(RepositoryError::Conflict("user profile already exists".to_string()));
        }
        if tables.users.iter().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
            return Err(RepositoryError::Conflict("email already registered".to_string()));
        }

        let created = now();
        let model = users::Model {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            role: user.role.to_string(),
            organization_name: user.organization_name,
            phone: user.phone,
            address: None,
            verification_status: VerificationStatus::Pending.to_string(),
            verification_document_url: None,
            total_earnings: Decimal::ZERO,
            created_at: created,
            updated_at: created,
        };
        tables.users.push(model.clone());
        Ok(model)
    }

    async fn find_user(&self, id: Uuid) -> RepoResult<Option<users::Model>> {
        Ok(self.tables.lock().users.iter().find(|u| u.id == id).cloned())
    }

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> RepoResult<users::Model> {
        let mut tables = self.tables.lock();
        let user = tables
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(RepositoryError::NotFound("user"))?;

        if let Some(full_name) = update.full_name {
            user.full_name = Some(full_name);
        }
        if let Some(organization_name) = update.organization_name {
            user.organization_name = Some(organization_name);
        }
        if let Some(phone) = update.phone {
            user.phone = Some(phone);
        }
        if let Some(address) = update.address {
            user.address = Some(address);
        }
        if let Some(url) = update.verification_document_url {
            user.verification_document_url = Some(url);
        }
        user.updated_at = now();

        Ok(user.clone())
    }

    async fn set_verification_status(
        &self,
        id: Uuid,
        status: VerificationStatus,
    ) -> RepoResult<users::Model> {
        let mut tables = self.tables.lock();
        let user = tables
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(RepositoryError::NotFound("user"))?;

        user.verification_status = status.to_string();
        user.updated_at = now();
        Ok(user.clone())
    }
}

#[async_trait]
impl GardenRepository for InMemoryStore {
    async fn create_garden(&self, garden: NewGarden) -> RepoResult<gardens::Model> {
        let created = now();
        let model = gardens::Model {
            id: Uuid::new_v4(),
            owner_id: garden.owner_id,
            name: garden.name,
            description: garden.description,
            location: garden.location,
            garden_type: garden.garden_type.to_string(),
            size_sqm: garden.size_sqm,
            image_urls: json!(garden.image_urls),
            status: GardenStatus::Active.to_string(),
            created_at: created,
            updated_at: created,
        };
        self.tables.lock().gardens.push(model.clone());
        Ok(model)
    }

    async fn find_garden(&self, id: Uuid) -> RepoResult<Option<gardens::Model>> {
        Ok(self.tables.lock().gardens.iter().find(|g| g.id == id).cloned())
    }

    async fn list_gardens_by_owner(&self, owner_id: Uuid) -> RepoResult<Vec<gardens::Model>> {
        Ok(self
            .tables
            .lock()
            .gardens
            .iter()
            .rev()
            .filter(|g| g.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn update_garden(&self, id: Uuid, update: GardenUpdate) -> RepoResult<gardens::Model> {
        let mut tables = self.tables.lock();
        let garden = tables
            .gardens
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or(RepositoryError::NotFound("garden"))?;

        if let Some(name) = update.name {
            garden.name = name;
        }
        if let Some(description) = update.description {
            garden.description = Some(description);
        }
        if let Some(location) = update.location {
            garden.location = location;
        }
        if let Some(garden_type) = update.garden_type {
            garden.garden_type = garden_type.to_string();
        }
        if let Some(size) = update.size_sqm {
            garden.size_sqm = Some(size);
        }
        if let Some(urls) = update.image_urls {
            garden.image_urls = json!(urls);
        }
        if let Some(status) = update.status {
            garden.status = status.to_string();
        }
        garden.updated_at = now();

        Ok(garden.clone())
    }

    async fn delete_garden(&self, id: Uuid) -> RepoResult<bool> {
        let mut tables = self.tables.lock();
        if !tables.gardens.iter().any(|g| g.id == id) {
            return Ok(false);
        }

        let removed: Vec<Uuid> = tables
            .submissions
            .iter()
            .filter(|s| s.garden_id == id)
            .map(|s| s.id)
            .collect();

        for credit in tables.credits.iter().filter(|c| removed.contains(&c.submission_id)) {
            if credit.status != CreditStatus::Available.as_str() {
                return Err(RepositoryError::Conflict(format!(
                    "credit {} is {}",
                    credit.id, credit.status
                )));
            }
            if tables.transactions.iter().any(|t| t.credit_id == Some(credit.id)) {
                return Err(RepositoryError::Conflict(format!(
                    "credit {} has transactions",
                    credit.id
                )));
            }
        }

        // ON DELETE CASCADE
        tables.gardens.retain(|g| g.id != id);
        tables.submissions.retain(|s| s.garden_id != id);
        tables.credits.retain(|c| !removed.contains(&c.submission_id));

        Ok(true)
    }

    async fn search_gardens(&self, search: GardenSearch) -> RepoResult<Vec<gardens::Model>> {
        let needle = search.location.map(|l| l.to_lowercase());

        Ok(self
            .tables
            .lock()
            .gardens
            .iter()
            .rev()
            .filter(|g| g.status == GardenStatus::Active.as_str())
            .filter(|g| {
                search
                    .garden_type
                    .map(|t| g.garden_type == t.as_str())
                    .unwrap_or(true)
            })
            .filter(|g| match &needle {
                Some(needle) => g
                    .location
                    .get("address")
                    .and_then(|a| a.as_str())
                    .map(|a| a.to_lowercase().contains(needle))
                    .unwrap_or(false),
                None => true,
            })
            .filter(|g| match search.min_size {
                Some(min) => g.size_sqm.map(|s| s >= min).unwrap_or(false),
                None => true,
            })
            .filter(|g| match search.max_size {
                Some(max) => g.size_sqm.map(|s| s <= max).unwrap_or(false),
                None => true,
            })
            .cloned()
            .collect())
    }
}

#[async_trait]
impl SubmissionRepository for InMemoryStore {
    async fn create_submission(&self, submission: NewSubmission) -> RepoResult<submissions::Model> {
        let created = now();
        let model = submissions::Model {
            id: Uuid::new_v4(),
            garden_id: submission.garden_id,
            submitter_id: submission.submitter_id,
            tree_count: submission.tree_count,
            tree_types: submission.tree_types,
            equipment: submission.equipment,
            estimated_co2_offset: submission.estimated_co2_offset,
            impact_note: submission.impact_note,
            verification_photos: json!(submission.verification_photos),
            additional_data: submission.additional_data,
            status: SubmissionStatus::Submitted.to_string(),
            reviewer_notes: None,
            submitted_at: created,
            reviewed_at: None,
            created_at: created,
            updated_at: created,
        };
        self.tables.lock().submissions.push(model.clone());
        Ok(model)
    }

    async fn find_submission(&self, id: Uuid) -> RepoResult<Option<submissions::Model>> {
        Ok(self.tables.lock().submissions.iter().find(|s| s.id == id).cloned())
    }

    async fn list_submissions_by_submitter(
        &self,
        submitter_id: Uuid,
    ) -> RepoResult<Vec<submissions::Model>> {
        Ok(self
            .tables
            .lock()
            .submissions
            .iter()
            .rev()
            .filter(|s| s.submitter_id == submitter_id)
            .cloned()
            .collect())
    }

    async fn list_pending_submissions(&self) -> RepoResult<Vec<submissions::Model>> {
        Ok(self
            .tables
            .lock()
            .submissions
            .iter()
            .filter(|s| {
                s.status == SubmissionStatus::Submitted.as_str()
                    || s.status == SubmissionStatus::UnderReview.as_str()
            })
            .cloned()
            .collect())
    }

    async fn apply_review(&self, command: ReviewCommand) -> RepoResult<ReviewRecord> {
        let mut tables = self.tables.lock();

        let index = tables
            .submissions
            .iter()
            .position(|s| s.id == command.submission_id)
            .ok_or(RepositoryError::NotFound("submission"))?;

        if tables.submissions[index].status != command.expected.as_str() {
            return Err(RepositoryError::Conflict(format!(
                "submission {} is no longer {}",
                command.submission_id, command.expected
            )));
        }
        if command.credit.is_some()
            && tables
                .credits
                .iter()
                .any(|c| c.submission_id == command.submission_id)
        {
            return Err(RepositoryError::Conflict(format!(
                "submission {} already has a credit",
                command.submission_id
            )));
        }

        // Every check passed; from here on nothing can fail
        let credit = command.credit.map(|credit| carbon_credits::Model {
            id: Uuid::new_v4(),
            submission_id: credit.submission_id,
            owner_id: credit.owner_id,
            credit_amount: credit.credit_amount,
            price_per_tonne: credit.price_per_tonne,
            total_value: credit.total_value,
            status: CreditStatus::Available.to_string(),
            certificate_url: None,
            issued_at: credit.issued_at,
            expires_at: credit.expires_at,
            created_at: credit.issued_at,
            updated_at: credit.issued_at,
        });
        if let Some(credit) = &credit {
            tables.credits.push(credit.clone());
        }

        let submission = &mut tables.submissions[index];
        submission.status = command.target.to_string();
        submission.reviewed_at = Some(command.reviewed_at);
        submission.updated_at = command.reviewed_at;
        if let Some(notes) = command.reviewer_notes {
            submission.reviewer_notes = Some(notes);
        }
        let submission = submission.clone();

        let notification = build_notification(command.notification);
        tables.notifications.push(notification.clone());

        Ok(ReviewRecord {
            submission,
            credit,
            notification,
        })
    }
}

#[async_trait]
impl CreditRepository for InMemoryStore {
    async fn find_credit(&self, id: Uuid) -> RepoResult<Option<carbon_credits::Model>> {
        Ok(self.tables.lock().credits.iter().find(|c| c.id == id).cloned())
    }

    async fn find_credit_by_submission(
        &self,
        submission_id: Uuid,
    ) -> RepoResult<Option<carbon_credits::Model>> {
        Ok(self
            .tables
            .lock()
            .credits
            .iter()
            .find(|c| c.submission_id == submission_id)
            .cloned())
    }

    async fn list_credits_by_owner(&self, owner_id: Uuid) -> RepoResult<Vec<carbon_credits::Model>> {
        Ok(self
            .tables
            .lock()
            .credits
            .iter()
            .rev()
            .filter(|c| c.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn list_available_credits(
        &self,
        now: DateTimeWithTimeZone,
    ) -> RepoResult<Vec<carbon_credits::Model>> {
        Ok(self
            .tables
            .lock()
            .credits
            .iter()
            .filter(|c| c.status == CreditStatus::Available.as_str() && c.expires_at > now)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl TransactionRepository for InMemoryStore {
    async fn create_sale(&self, sale: NewSale) -> RepoResult<transactions::Model> {
        let mut tables = self.tables.lock();

        let credit = tables
            .credits
            .iter_mut()
            .find(|c| c.id == sale.credit_id)
            .ok_or(RepositoryError::NotFound("credit"))?;
        if credit.status != CreditStatus::Available.as_str() {
            return Err(RepositoryError::Conflict(format!(
                "credit {} is {}",
                credit.id, credit.status
            )));
        }
        credit.status = CreditStatus::Reserved.to_string();
        credit.updated_at = now();

        let model = transactions::Model {
            id: Uuid::new_v4(),
            credit_id: Some(sale.credit_id),
            seller_id: sale.seller_id,
            buyer_id: Some(sale.buyer_id),
            amount: sale.amount,
            transaction_type: TransactionType::Sale.to_string(),
            status: TransactionStatus::Pending.to_string(),
            payment_method: sale.payment_method,
            payment_reference: sale.payment_reference,
            fees: sale.fees,
            net_amount: sale.net_amount,
            processed_at: None,
            created_at: now(),
        };
        tables.transactions.push(model.clone());
        Ok(model)
    }

    async fn complete_sale(&self, completion: SaleCompletion) -> RepoResult<CompletedSale> {
        let mut tables = self.tables.lock();

        let tx_index = tables
            .transactions
            .iter()
            .position(|t| t.id == completion.transaction_id)
            .ok_or(RepositoryError::NotFound("transaction"))?;
        let tx = &tables.transactions[tx_index];
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

        let credit_index = tables
            .credits
            .iter()
            .position(|c| c.id == credit_id)
            .ok_or(RepositoryError::NotFound("credit"))?;
        let seller_index = tables
            .users
            .iter()
            .position(|u| u.id == seller_id)
            .ok_or(RepositoryError::NotFound("user"))?;

        let tx = &mut tables.transactions[tx_index];
        tx.status = TransactionStatus::Completed.to_string();
        tx.processed_at = Some(completion.processed_at);
        let transaction = tx.clone();

        let credit = &mut tables.credits[credit_index];
        credit.status = CreditStatus::Sold.to_string();
        credit.updated_at = completion.processed_at;
        let credit = credit.clone();

        let seller = &mut tables.users[seller_index];
        seller.total_earnings += net_amount;
        seller.updated_at = completion.processed_at;

        let notifications: Vec<notifications::Model> = completion
            .notifications
            .into_iter()
            .map(build_notification)
            .collect();
        tables.notifications.extend(notifications.iter().cloned());

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
        let mut tables = self.tables.lock();

        let tx = tables
            .transactions
            .iter_mut()
            .find(|t| t.id == transaction_id)
            .ok_or(RepositoryError::NotFound("transaction"))?;
        if tx.transaction_type != TransactionType::Sale.as_str()
            || tx.status != TransactionStatus::Pending.as_str()
        {
            return Err(RepositoryError::Conflict(format!(
                "transaction {} is not a pending sale",
                tx.id
            )));
        }
        tx.status = TransactionStatus::Failed.to_string();
        tx.processed_at = Some(processed_at);
        let transaction = tx.clone();

        if let Some(credit) = tables
            .credits
            .iter_mut()
            .find(|c| Some(c.id) == transaction.credit_id)
        {
            if credit.status == CreditStatus::Reserved.as_str() {
                credit.status = CreditStatus::Available.to_string();
                credit.updated_at = processed_at;
            }
        }

        Ok(transaction)
    }

    async fn request_withdrawal(&self, withdrawal: NewWithdrawal) -> RepoResult<WithdrawalRecord> {
        let mut tables = self.tables.lock();

        let available = balance_of(&tables, withdrawal.user_id)?.available();
        if withdrawal.amount > available {
            return Err(RepositoryError::InsufficientBalance {
                requested: withdrawal.amount,
                available,
            });
        }

        let transaction = transactions::Model {
            id: Uuid::new_v4(),
            credit_id: None,
            seller_id: withdrawal.user_id,
            buyer_id: None,
            amount: withdrawal.amount,
            transaction_type: TransactionType::Withdrawal.to_string(),
            status: TransactionStatus::Pending.to_string(),
            payment_method: withdrawal.payment_method,
            payment_reference: withdrawal.payment_reference,
            fees: withdrawal.fees,
            net_amount: withdrawal.net_amount,
            processed_at: None,
            created_at: now(),
        };
        tables.transactions.push(transaction.clone());

        let notification = build_notification(NewNotification {
            related_id: Some(transaction.id),
            ..withdrawal.notification
        });
        tables.notifications.push(notification.clone());

        Ok(WithdrawalRecord {
            transaction,
            notification,
        })
    }

    async fn find_transaction(&self, id: Uuid) -> RepoResult<Option<transactions::Model>> {
        Ok(self.tables.lock().transactions.iter().find(|t| t.id == id).cloned())
    }

    async fn list_user_transactions(&self, user_id: Uuid) -> RepoResult<Vec<transactions::Model>> {
        Ok(self
            .tables
            .lock()
            .transactions
            .iter()
            .rev()
            .filter(|t| t.seller_id == user_id || t.buyer_id == Some(user_id))
            .cloned()
            .collect())
    }

    async fn balance(&self, user_id: Uuid) -> RepoResult<Balance> {
        balance_of(&self.tables.lock(), user_id)
    }
}

#[async_trait]
impl NotificationRepository for InMemoryStore {
    async fn create_notification(
        &self,
        notification: NewNotification,
    ) -> RepoResult<notifications::Model> {
        let model = build_notification(notification);
        self.tables.lock().notifications.push(model.clone());
        Ok(model)
    }

    async fn find_notification(&self, id: Uuid) -> RepoResult<Option<notifications::Model>> {
        Ok(self
            .tables
            .lock()
            .notifications
            .iter()
            .find(|n| n.id == id)
            .cloned())
    }

    async fn list_notifications(
        &self,
        user_id: Uuid,
        limit: u64,
    ) -> RepoResult<Vec<notifications::Model>> {
        Ok(self
            .tables
            .lock()
            .notifications
            .iter()
            .rev()
            .filter(|n| n.user_id == user_id)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn unread_count(&self, user_id: Uuid) -> RepoResult<u64> {
        Ok(self
            .tables
            .lock()
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id && n.read_at.is_none())
            .count() as u64)
    }

    async fn mark_read(
        &self,
        id: Uuid,
        read_at: DateTimeWithTimeZone,
    ) -> RepoResult<notifications::Model> {
        let mut tables = self.tables.lock();
        let notification = tables
            .notifications
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or(RepositoryError::NotFound("notification"))?;

        notification.read_at = Some(read_at);
        Ok(notification.clone())
    }

    async fn mark_all_read(&self, user_id: Uuid, read_at: DateTimeWithTimeZone) -> RepoResult<u64> {
        let mut tables = self.tables.lock();
        let mut updated = 0;
        for notification in tables
            .notifications
            .iter_mut()
            .filter(|n| n.user_id == user_id && n.read_at.is_none())
        {
            notification.read_at = Some(read_at);
            updated += 1;
        }
        Ok(updated)
    }

    async fn delete_notification(&self, id: Uuid) -> RepoResult<bool> {
        let mut tables = self.tables.lock();
        let before = tables.notifications.len();
        tables.notifications.retain(|n| n.id != id);
        Ok(tables.notifications.len() != before)
    }
}
