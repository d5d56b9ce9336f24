use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::transactions;

db_enum! {
    pub enum TransactionType {
        Sale => "sale",
        Withdrawal => "withdrawal",
        Fee => "fee",
    }
}

db_enum! {
    pub enum TransactionStatus {
        Pending => "pending",
        Completed => "completed",
        Failed => "failed",
    }
}

/// Body of POST /api/withdrawals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawalRequest {
    pub amount: Decimal,
    #[serde(default)]
    pub payment_method: Option<String>,
    /// Free-form payout details, stored serialized as the payment reference
    #[serde(default)]
    pub payment_details: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionResponse {
    pub id: Uuid,
    pub credit_id: Option<Uuid>,
    pub seller_id: Uuid,
    pub buyer_id: Option<Uuid>,
    pub amount: Decimal,
    pub transaction_type: String,
    pub status: String,
    pub payment_method: Option<String>,
    pub payment_reference: Option<String>,
    pub fees: Decimal,
    pub net_amount: Decimal,
    pub processed_at: Option<DateTime<FixedOffset>>,
    pub created_at: DateTime<FixedOffset>,
}

impl From<transactions::Model> for TransactionResponse {
    fn from(model: transactions::Model) -> Self {
        Self {
            id: model.id,
            credit_id: model.credit_id,
            seller_id: model.seller_id,
            buyer_id: model.buyer_id,
            amount: model.amount,
            transaction_type: model.transaction_type,
            status: model.status,
            payment_method: model.payment_method,
            payment_reference: model.payment_reference,
            fees: model.fees,
            net_amount: model.net_amount,
            processed_at: model.processed_at,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub total_earnings: Decimal,
    pub pending_withdrawals: Decimal,
    pub available_balance: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionStatsResponse {
    pub total_sales: Decimal,
    pub total_purchases: Decimal,
    pub total_withdrawals: Decimal,
    pub transaction_count: usize,
    pub monthly_earnings: Decimal,
}
