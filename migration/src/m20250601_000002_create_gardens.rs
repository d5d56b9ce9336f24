use sea_orm_migration::{prelude::*, schema::*};

use crate::m20250601_000001_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Gardens::Table)
                    .if_not_exists()
                    .col(uuid(Gardens::Id).primary_key())
                    .col(uuid(Gardens::OwnerId))
                    .col(string(Gardens::Name))
                    .col(text_null(Gardens::Description))
                    // {address, latitude, longitude}
                    .col(json_binary(Gardens::Location))
                    .col(string(Gardens::GardenType))
                    .col(decimal_len_null(Gardens::SizeSqm, 12, 2))
                    .col(json_binary(Gardens::ImageUrls))
                    .col(string(Gardens::Status).default("active"))
                    .col(
                        timestamp_with_time_zone(Gardens::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Gardens::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_gardens_owner")
                            .from(Gardens::Table, Gardens::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .check(
                        Expr::col(Gardens::GardenType)
                            .is_in(["residential", "community", "commercial"]),
                    )
                    .check(Expr::col(Gardens::Status).is_in(["active", "inactive"]))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_gardens_owner")
                    .table(Gardens::Table)
                    .col(Gardens::OwnerId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Gardens::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Gardens {
    Table,
    Id,
    OwnerId,
    Name,
    Description,
    Location,
    GardenType,
    SizeSqm,
    ImageUrls,
    Status,
    CreatedAt,
    UpdatedAt,
}
