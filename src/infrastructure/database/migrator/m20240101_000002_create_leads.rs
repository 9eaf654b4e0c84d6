//! Create leads table

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Leads::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Leads::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Leads::UserId).integer().not_null())
                    .col(ColumnDef::new(Leads::FirstName).string_len(100).not_null())
                    .col(ColumnDef::new(Leads::LastName).string_len(100).not_null())
                    .col(ColumnDef::new(Leads::Email).string_len(255).not_null())
                    .col(ColumnDef::new(Leads::Phone).string_len(20))
                    .col(ColumnDef::new(Leads::Company).string_len(255))
                    .col(ColumnDef::new(Leads::City).string_len(100))
                    .col(ColumnDef::new(Leads::State).string_len(100))
                    .col(ColumnDef::new(Leads::Source).string_len(20).not_null())
                    .col(
                        ColumnDef::new(Leads::Status)
                            .string_len(20)
                            .not_null()
                            .default("new"),
                    )
                    .col(
                        ColumnDef::new(Leads::Score)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Leads::LeadValueCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Leads::IsQualified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Leads::LastActivityAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Leads::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Leads::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_leads_user")
                            .from(Leads::Table, Leads::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Email is unique per owner, not globally
        manager
            .create_index(
                Index::create()
                    .name("idx_leads_user_email")
                    .table(Leads::Table)
                    .col(Leads::UserId)
                    .col(Leads::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        for (name, col) in [
            ("idx_leads_status", Leads::Status),
            ("idx_leads_source", Leads::Source),
            ("idx_leads_created_at", Leads::CreatedAt),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(Leads::Table)
                        .col(col)
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Leads::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Leads {
    Table,
    Id,
    UserId,
    FirstName,
    LastName,
    Email,
    Phone,
    Company,
    City,
    State,
    Source,
    Status,
    Score,
    LeadValueCents,
    IsQualified,
    LastActivityAt,
    CreatedAt,
    UpdatedAt,
}
