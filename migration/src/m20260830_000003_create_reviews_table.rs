use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Identifiers for the `reviews` table and its columns — the append-only
/// review log, one row per applied reputation contribution.
#[derive(DeriveIden)]
enum Reviews {
    Table,
    Id,
    TargetUserId,
    FromUserId,
    JobId,
    Rating,
    Comment,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Reviews::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Reviews::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Reviews::TargetUserId).uuid().not_null())
                    .col(ColumnDef::new(Reviews::FromUserId).uuid().not_null())
                    .col(ColumnDef::new(Reviews::JobId).uuid().not_null())
                    .col(ColumnDef::new(Reviews::Rating).double())
                    .col(ColumnDef::new(Reviews::Comment).text().not_null())
                    .col(
                        ColumnDef::new(Reviews::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // At most one contribution per job per direction.
        manager
            .create_index(
                Index::create()
                    .name("uq_reviews_job_id_from_user_id")
                    .table(Reviews::Table)
                    .col(Reviews::JobId)
                    .col(Reviews::FromUserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Review-log display is per target user, newest first.
        manager
            .create_index(
                Index::create()
                    .name("idx_reviews_target_user_id")
                    .table(Reviews::Table)
                    .col(Reviews::TargetUserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Reviews::Table).to_owned())
            .await
    }
}
