//! `SeaORM` Entity for transactions table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub credit_id: Option<Uuid>,
    pub seller_id: Uuid,
    pub buyer_id: Option<Uuid>,
    #[sea_orm(column_type = "Decimal(Some((16, 5)))")]
    pub amount: Decimal,
    pub transaction_type: String,
    pub status: String,
    pub payment_method: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub payment_reference: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((16, 5)))")]
    pub fees: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 5)))")]
    pub net_amount: Decimal,
    pub processed_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
