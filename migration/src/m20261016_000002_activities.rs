use sea_orm_migration::prelude::*;

use crate::m20261016_000001_accounts::{Customer, Petsitter};

#[derive(DeriveIden)]
enum Activity {
    Table,
    Id,
    Title,
    Detail,
    StartDateTime,
    EndDateTime,
    PickupPoint,
    Price,
    State,
    CustomerId,
    PetsitterId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Request {
    Table,
    Id,
    ActivityId,
    PetsitterId,
    Price,
    Message,
    State,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Activity::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Activity::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Activity::Title).string_len(256).not_null())
                    .col(ColumnDef::new(Activity::Detail).text())
                    .col(
                        ColumnDef::new(Activity::StartDateTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Activity::EndDateTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Activity::PickupPoint)
                            .string_len(512)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Activity::Price).integer().not_null())
                    .col(
                        ColumnDef::new(Activity::State)
                            .string_len(16)
                            .not_null()
                            .default("OPEN"),
                    )
                    .col(ColumnDef::new(Activity::CustomerId).uuid().not_null())
                    .col(ColumnDef::new(Activity::PetsitterId).uuid())
                    .col(
                        ColumnDef::new(Activity::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Activity::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_activity_customer")
                            .from(Activity::Table, Activity::CustomerId)
                            .to(Customer::Table, Customer::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_activity_petsitter")
                            .from(Activity::Table, Activity::PetsitterId)
                            .to(Petsitter::Table, Petsitter::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_activity_customer")
                    .table(Activity::Table)
                    .col(Activity::CustomerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_activity_petsitter_state")
                    .table(Activity::Table)
                    .col(Activity::PetsitterId)
                    .col(Activity::State)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_activity_state_start")
                    .table(Activity::Table)
                    .col(Activity::State)
                    .col(Activity::StartDateTime)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Request::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Request::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Request::ActivityId).uuid().not_null())
                    .col(ColumnDef::new(Request::PetsitterId).uuid().not_null())
                    .col(ColumnDef::new(Request::Price).integer().not_null())
                    .col(ColumnDef::new(Request::Message).text())
                    .col(
                        ColumnDef::new(Request::State)
                            .string_len(16)
                            .not_null()
                            .default("PENDING"),
                    )
                    .col(
                        ColumnDef::new(Request::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Request::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_request_activity")
                            .from(Request::Table, Request::ActivityId)
                            .to(Activity::Table, Activity::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_request_petsitter")
                            .from(Request::Table, Request::PetsitterId)
                            .to(Petsitter::Table, Petsitter::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Non-unique: duplicates are rejected by the service, not the schema.
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_request_activity_petsitter")
                    .table(Request::Table)
                    .col(Request::ActivityId)
                    .col(Request::PetsitterId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Request::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Activity::Table).to_owned())
            .await
    }
}
