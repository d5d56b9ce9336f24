//! Profiles for garden owners and NGOs.
//!
//! `total_earnings` is only ever changed by sale settlement.

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(uuid(Users::Id).primary_key())
                    .col(string(Users::Email).unique_key())
                    .col(string_null(Users::FullName))
                    .col(string(Users::Role))
                    .col(string_null(Users::OrganizationName))
                    .col(string_null(Users::Phone))
                    .col(json_binary_null(Users::Address))
                    .col(string(Users::VerificationStatus).default("pending"))
                    .col(string_null(Users::VerificationDocumentUrl))
                    .col(decimal_len(Users::TotalEarnings, 14, 2).default(0))
                    .col(
                        timestamp_with_time_zone(Users::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Users::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .check(Expr::col(Users::Role).is_in(["garden_owner", "ngo"]))
                    .check(
                        Expr::col(Users::VerificationStatus)
                            .is_in(["pending", "approved", "rejected"]),
                    )
                    .check(Expr::col(Users::TotalEarnings).gte(0))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_users_role")
                    .table(Users::Table)
                    .col(Users::Role)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Users {
    Table,
    Id,
    Email,
    FullName,
    Role,
    OrganizationName,
    Phone,
    Address,
    VerificationStatus,
    VerificationDocumentUrl,
    TotalEarnings,
    CreatedAt,
    UpdatedAt,
}
