use sea_orm_migration::{prelude::*, schema::*};

use crate::m20250601_000001_create_users::Users;
use crate::m20250601_000004_create_carbon_credits::CarbonCredits;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(uuid(Transactions::Id).primary_key())
                    // NULL for withdrawals
                    .col(uuid_null(Transactions::CreditId))
                    .col(uuid(Transactions::SellerId))
                    .col(uuid_null(Transactions::BuyerId))
                    .col(decimal_len(Transactions::Amount, 16, 5))
                    .col(string(Transactions::TransactionType))
                    .col(string(Transactions::Status).default("pending"))
                    .col(string_null(Transactions::PaymentMethod))
                    .col(text_null(Transactions::PaymentReference))
                    .col(decimal_len(Transactions::Fees, 16, 5).default(0))
                    .col(decimal_len(Transactions::NetAmount, 16, 5))
                    .col(timestamp_with_time_zone_null(Transactions::ProcessedAt))
                    .col(
                        timestamp_with_time_zone(Transactions::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_credit")
                            .from(Transactions::Table, Transactions::CreditId)
                            .to(CarbonCredits::Table, CarbonCredits::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_seller")
                            .from(Transactions::Table, Transactions::SellerId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_buyer")
                            .from(Transactions::Table, Transactions::BuyerId)
                            .to(Users::Table, Users::Id),
                    )
                    .check(
                        Expr::col(Transactions::TransactionType)
                            .is_in(["sale", "withdrawal", "fee"]),
                    )
                    .check(
                        Expr::col(Transactions::Status).is_in(["pending", "completed", "failed"]),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_transactions_seller")
                    .table(Transactions::Table)
                    .col(Transactions::SellerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_transactions_buyer")
                    .table(Transactions::Table)
                    .col(Transactions::BuyerId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Transactions {
    Table,
    Id,
    CreditId,
    SellerId,
    BuyerId,
    Amount,
    TransactionType,
    Status,
    PaymentMethod,
    PaymentReference,
    Fees,
    NetAmount,
    ProcessedAt,
    CreatedAt,
}
