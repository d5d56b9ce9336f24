//! `SeaORM` Entity for carbon_credits table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "carbon_credits")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub submission_id: Uuid,
    pub owner_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((12, 3)))")]
    pub credit_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub price_per_tonne: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 5)))")]
    pub total_value: Decimal,
    pub status: String,
    pub certificate_url: Option<String>,
    pub issued_at: DateTimeWithTimeZone,
    pub expires_at: DateTimeWithTimeZone,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
