use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::submissions;
use crate::models::credit::CreditResponse;
use crate::models::estimate::{EquipmentEntry, TreeEntry};

db_enum! {
    /// Review progress of a submission.
    /// submitted → under_review → approved | rejected, with submitted → approved | rejected
    /// also allowed. approved and rejected are terminal.
    pub enum SubmissionStatus {
        Submitted => "submitted",
        UnderReview => "under_review",
        Approved => "approved",
        Rejected => "rejected",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSubmissionRequest {
    pub garden_id: Uuid,
    pub trees: Vec<TreeEntry>,
    #[serde(default)]
    pub equipment: Vec<EquipmentEntry>,
    #[serde(default)]
    pub verification_photos: Vec<String>,
    #[serde(default)]
    pub additional_data: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSubmissionStatusRequest {
    pub status: SubmissionStatus,
    #[serde(default)]
    pub reviewer_notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionResponse {
    pub id: Uuid,
    pub garden_id: Uuid,
    pub submitter_id: Uuid,
    pub tree_count: i32,
    pub tree_types: serde_json::Value,
    pub equipment: serde_json::Value,
    pub estimated_co2_offset: Decimal,
    pub impact_note: Option<String>,
    pub verification_photos: serde_json::Value,
    pub additional_data: Option<serde_json::Value>,
    pub status: String,
    pub reviewer_notes: Option<String>,
    pub submitted_at: DateTime<FixedOffset>,
    pub reviewed_at: Option<DateTime<FixedOffset>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit: Option<CreditResponse>,
}

impl From<submissions::Model> for SubmissionResponse {
    fn from(model: submissions::Model) -> Self {
        Self {
            id: model.id,
            garden_id: model.garden_id,
            submitter_id: model.submitter_id,
            tree_count: model.tree_count,
            tree_types: model.tree_types,
            equipment: model.equipment,
            estimated_co2_offset: model.estimated_co2_offset,
            impact_note: model.impact_note,
            verification_photos: model.verification_photos,
            additional_data: model.additional_data,
            status: model.status,
            reviewer_notes: model.reviewer_notes,
            submitted_at: model.submitted_at,
            reviewed_at: model.reviewed_at,
            credit: None,
        }
    }
}

impl SubmissionResponse {
    pub fn with_credit(mut self, credit: Option<CreditResponse>) -> Self {
        self.credit = credit;
        self
    }
}
