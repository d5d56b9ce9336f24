use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::carbon_credits;

db_enum! {
    pub enum CreditStatus {
        Available => "available",
        Sold => "sold",
        Reserved => "reserved",
    }
}

/// Body of POST /api/credits/{id}/purchase
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PurchaseCreditRequest {
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub payment_reference: Option<String>,
    /// Marketplace fee passed through to the seller's net amount
    #[serde(default)]
    pub fees: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditResponse {
    pub id: Uuid,
    pub submission_id: Uuid,
    pub owner_id: Uuid,
    pub credit_amount: Decimal,
    pub price_per_tonne: Decimal,
    pub total_value: Decimal,
    pub status: String,
    pub certificate_url: Option<String>,
    pub issued_at: DateTime<FixedOffset>,
    pub expires_at: DateTime<FixedOffset>,
}

impl From<carbon_credits::Model> for CreditResponse {
    fn from(model: carbon_credits::Model) -> Self {
        Self {
            id: model.id,
            submission_id: model.submission_id,
            owner_id: model.owner_id,
            credit_amount: model.credit_amount,
            price_per_tonne: model.price_per_tonne,
            total_value: model.total_value,
            status: model.status,
            certificate_url: model.certificate_url,
            issued_at: model.issued_at,
            expires_at: model.expires_at,
        }
    }
}
