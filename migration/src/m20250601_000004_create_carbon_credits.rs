//! Credits minted from approved submissions.
//!
//! `idx_carbon_credits_submission` is unique: a submission can back at most
//! one credit, so a repeated approval can never mint twice.

use sea_orm_migration::{prelude::*, schema::*};

use crate::m20250601_000001_create_users::Users;
use crate::m20250601_000003_create_submissions::Submissions;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CarbonCredits::Table)
                    .if_not_exists()
                    .col(uuid(CarbonCredits::Id).primary_key())
                    .col(uuid(CarbonCredits::SubmissionId))
                    .col(uuid(CarbonCredits::OwnerId))
                    // tonnes CO2
                    .col(decimal_len(CarbonCredits::CreditAmount, 12, 3))
                    .col(decimal_len(CarbonCredits::PricePerTonne, 12, 2))
                    .col(decimal_len(CarbonCredits::TotalValue, 16, 5))
                    .col(string(CarbonCredits::Status).default("available"))
                    .col(string_null(CarbonCredits::CertificateUrl))
                    .col(
                        timestamp_with_time_zone(CarbonCredits::IssuedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(timestamp_with_time_zone(CarbonCredits::ExpiresAt))
                    .col(
                        timestamp_with_time_zone(CarbonCredits::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(CarbonCredits::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_carbon_credits_submission")
                            .from(CarbonCredits::Table, CarbonCredits::SubmissionId)
                            .to(Submissions::Table, Submissions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_carbon_credits_owner")
                            .from(CarbonCredits::Table, CarbonCredits::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .check(
                        Expr::col(CarbonCredits::Status).is_in(["available", "sold", "reserved"]),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_carbon_credits_submission")
                    .table(CarbonCredits::Table)
                    .col(CarbonCredits::SubmissionId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_carbon_credits_owner")
                    .table(CarbonCredits::Table)
                    .col(CarbonCredits::OwnerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_carbon_credits_status")
                    .table(CarbonCredits::Table)
                    .col(CarbonCredits::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CarbonCredits::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum CarbonCredits {
    Table,
    Id,
    SubmissionId,
    OwnerId,
    CreditAmount,
    PricePerTonne,
    TotalValue,
    Status,
    CertificateUrl,
    IssuedAt,
    ExpiresAt,
    CreatedAt,
    UpdatedAt,
}
