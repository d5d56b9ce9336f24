use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::gardens;

db_enum! {
    pub enum GardenType {
        Residential => "residential",
        Community => "community",
        Commercial => "commercial",
    }
}

db_enum! {
    pub enum GardenStatus {
        Active => "active",
        Inactive => "inactive",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GardenLocation {
    pub address: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGardenRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub location: GardenLocation,
    pub garden_type: GardenType,
    #[serde(default)]
    pub size_sqm: Option<Decimal>,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateGardenRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<GardenLocation>,
    #[serde(default)]
    pub garden_type: Option<GardenType>,
    #[serde(default)]
    pub size_sqm: Option<Decimal>,
    #[serde(default)]
    pub image_urls: Option<Vec<String>>,
    #[serde(default)]
    pub status: Option<GardenStatus>,
}

/// Query parameters for GET /api/gardens/search
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GardenSearchQuery {
    pub garden_type: Option<GardenType>,
    pub location: Option<String>,
    pub min_size: Option<Decimal>,
    pub max_size: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GardenResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub location: serde_json::Value,
    pub garden_type: String,
    pub size_sqm: Option<Decimal>,
    pub image_urls: serde_json::Value,
    pub status: String,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

impl From<gardens::Model> for GardenResponse {
    fn from(model: gardens::Model) -> Self {
        Self {
            id: model.id,
            owner_id: model.owner_id,
            name: model.name,
            description: model.description,
            location: model.location,
            garden_type: model.garden_type,
            size_sqm: model.size_sqm,
            image_urls: model.image_urls,
            status: model.status,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
