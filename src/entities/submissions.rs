//! `SeaORM` Entity for submissions table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "submissions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub garden_id: Uuid,
    pub submitter_id: Uuid,
    pub tree_count: i32,
    #[sea_orm(column_type = "JsonBinary")]
    pub tree_types: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub equipment: Json,
    #[sea_orm(column_type = "Decimal(Some((12, 3)))")]
    pub estimated_co2_offset: Decimal,
    #[sea_orm(column_type = "Text", nullable)]
    pub impact_note: Option<String>,
    #[sea_orm(column_type = "JsonBinary")]
    pub verification_photos: Json,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub additional_data: Option<Json>,
    pub status: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub reviewer_notes: Option<String>,
    pub submitted_at: DateTimeWithTimeZone,
    pub reviewed_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
