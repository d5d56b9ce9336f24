//! Raw tree/equipment entries as sent by clients.
//!
//! Every field is optional at the wire level so that a missing value is
//! reported as a validation error naming the entry instead of a generic
//! deserialization failure.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeEntry {
    #[serde(default, alias = "name", alias = "species")]
    pub species_name: Option<String>,
    #[serde(default)]
    pub count: Option<i64>,
    #[serde(default)]
    pub age_years: Option<Decimal>,
    #[serde(default)]
    pub diameter_cm: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EquipmentEntry {
    #[serde(default, alias = "type")]
    pub equipment_type: Option<String>,
    #[serde(default)]
    pub quantity: Option<i64>,
}

/// Body of POST /api/estimates
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EstimateRequest {
    pub trees: Vec<TreeEntry>,
    #[serde(default)]
    pub equipment: Vec<EquipmentEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeContributionResponse {
    pub species_name: String,
    pub rate: Decimal,
    pub contribution: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateResponse {
    pub estimated_co2_offset: Decimal,
    pub tree_count: i64,
    pub impact_note: Option<String>,
    pub trees: Vec<TreeContributionResponse>,
}
