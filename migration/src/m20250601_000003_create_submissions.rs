//! Tree/equipment claims awaiting review.
//!
//! `estimated_co2_offset` and `impact_note` are computed by the backend,
//! never taken from the client.

use sea_orm_migration::{prelude::*, schema::*};

use crate::m20250601_000001_create_users::Users;
use crate::m20250601_000002_create_gardens::Gardens;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Submissions::Table)
                    .if_not_exists()
                    .col(uuid(Submissions::Id).primary_key())
                    .col(uuid(Submissions::GardenId))
                    .col(uuid(Submissions::SubmitterId))
                    .col(integer(Submissions::TreeCount))
                    // [{species_name, count, age_years, diameter_cm}]
                    .col(json_binary(Submissions::TreeTypes))
                    // [{equipment_type, quantity}]
                    .col(json_binary(Submissions::Equipment))
                    .col(decimal_len(Submissions::EstimatedCo2Offset, 12, 3))
                    .col(text_null(Submissions::ImpactNote))
                    .col(json_binary(Submissions::VerificationPhotos))
                    .col(json_binary_null(Submissions::AdditionalData))
                    .col(string(Submissions::Status).default("submitted"))
                    .col(text_null(Submissions::ReviewerNotes))
                    .col(
                        timestamp_with_time_zone(Submissions::SubmittedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(timestamp_with_time_zone_null(Submissions::ReviewedAt))
                    .col(
                        timestamp_with_time_zone(Submissions::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Submissions::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_submissions_garden")
                            .from(Submissions::Table, Submissions::GardenId)
                            .to(Gardens::Table, Gardens::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_submissions_submitter")
                            .from(Submissions::Table, Submissions::SubmitterId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .check(Expr::col(Submissions::Status).is_in([
                        "submitted",
                        "under_review",
                        "approved",
                        "rejected",
                    ]))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_submissions_garden")
                    .table(Submissions::Table)
                    .col(Submissions::GardenId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_submissions_status")
                    .table(Submissions::Table)
                    .col(Submissions::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Submissions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Submissions {
    Table,
    Id,
    GardenId,
    SubmitterId,
    TreeCount,
    TreeTypes,
    Equipment,
    #[sea_orm(iden = "estimated_co2_offset")]
    EstimatedCo2Offset,
    ImpactNote,
    VerificationPhotos,
    AdditionalData,
    Status,
    ReviewerNotes,
    SubmittedAt,
    ReviewedAt,
    CreatedAt,
    UpdatedAt,
}
