use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Identifiers for the `profiles` table and its columns.
///
/// Holds the availability flag (written by the external profile service) and
/// the per-user reputation aggregates maintained by this core.
#[derive(DeriveIden)]
enum Profiles {
    Table,
    UserId,
    Availability,
    RatingSum,
    RatingCount,
    RatingAvg,
    ReviewCount,
    CreatedAt,
    UpdatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Profiles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Profiles::UserId)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Profiles::Availability).string().not_null())
                    .col(ColumnDef::new(Profiles::RatingSum).double().not_null())
                    .col(ColumnDef::new(Profiles::RatingCount).integer().not_null())
                    .col(ColumnDef::new(Profiles::RatingAvg).double().not_null())
                    .col(ColumnDef::new(Profiles::ReviewCount).integer().not_null())
                    .col(
                        ColumnDef::new(Profiles::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Profiles::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Profiles::Table).to_owned())
            .await
    }
}
