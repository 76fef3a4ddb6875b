use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Identifiers for the `jobs` table and its columns.
///
/// The lifecycle sub-objects are nullable JSONB; `status` is the single
/// source of truth for which of them may be present.
#[derive(DeriveIden)]
enum Jobs {
    Table,
    Id,
    ClientId,
    ProviderId,
    CategoryId,
    ServiceId,
    Title,
    Status,
    Acceptance,
    Decline,
    EndRequest,
    CounterRequest,
    Closure,
    Dispute,
    CreatedAt,
    UpdatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Jobs::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Jobs::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Jobs::ClientId).uuid().not_null())
                    .col(ColumnDef::new(Jobs::ProviderId).uuid().not_null())
                    .col(ColumnDef::new(Jobs::CategoryId).string().not_null())
                    .col(ColumnDef::new(Jobs::ServiceId).string().not_null())
                    .col(ColumnDef::new(Jobs::Title).string().not_null())
                    .col(ColumnDef::new(Jobs::Status).string().not_null())
                    .col(ColumnDef::new(Jobs::Acceptance).json_binary())
                    .col(ColumnDef::new(Jobs::Decline).json_binary())
                    .col(ColumnDef::new(Jobs::EndRequest).json_binary())
                    .col(ColumnDef::new(Jobs::CounterRequest).json_binary())
                    .col(ColumnDef::new(Jobs::Closure).json_binary())
                    .col(ColumnDef::new(Jobs::Dispute).json_binary())
                    .col(
                        ColumnDef::new(Jobs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Jobs::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // listJobs filters by participant and sorts by last activity.
        manager
            .create_index(
                Index::create()
                    .name("idx_jobs_client_id")
                    .table(Jobs::Table)
                    .col(Jobs::ClientId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_jobs_provider_id")
                    .table(Jobs::Table)
                    .col(Jobs::ProviderId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_jobs_updated_at")
                    .table(Jobs::Table)
                    .col(Jobs::UpdatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Jobs::Table).to_owned())
            .await
    }
}
