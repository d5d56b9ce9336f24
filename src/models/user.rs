use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::users;

db_enum! {
    pub enum UserRole {
        GardenOwner => "garden_owner",
        Ngo => "ngo",
    }
}

db_enum! {
    pub enum VerificationStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
}

/// Profile row created right after the identity provider registers the user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    pub role: UserRole,
    #[serde(default)]
    pub organization_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Partial profile update; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub organization_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<serde_json::Value>,
    #[serde(default)]
    pub verification_document_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateVerificationRequest {
    pub status: VerificationStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub role: String,
    pub organization_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<serde_json::Value>,
    pub verification_status: String,
    pub verification_document_url: Option<String>,
    pub total_earnings: Decimal,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

impl From<users::Model> for UserResponse {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            full_name: model.full_name,
            role: model.role,
            organization_name: model.organization_name,
            phone: model.phone,
            address: model.address,
            verification_status: model.verification_status,
            verification_document_url: model.verification_document_url,
            total_earnings: model.total_earnings,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
