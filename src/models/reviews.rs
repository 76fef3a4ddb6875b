use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// SeaORM entity for the `reviews` table — the append-only review log.
///
/// One row per applied reputation contribution. The unique index on
/// `(job_id, from_user_id)` is the at-most-once-per-job-per-direction
/// backstop: the client→provider and provider→client contributions of one
/// job are two distinct rows, a replay of either one is not.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reviews")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub target_user_id: Uuid,
    pub from_user_id: Uuid,
    pub job_id: Uuid,
    #[sea_orm(column_type = "Double", nullable)]
    pub rating: Option<f64>,
    #[sea_orm(column_type = "Text")]
    pub comment: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
