use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Provider availability flag, stored as a lowercase string.
///
/// Written by the external profile service; this core only reads it, at
/// hire-request time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    #[sea_orm(string_value = "available")]
    Available,
    #[sea_orm(string_value = "busy")]
    Busy,
    #[sea_orm(string_value = "away")]
    Away,
}

/// SeaORM entity for the `profiles` table.
///
/// Holds the per-user Reputation Record: running totals plus the derived
/// average. `rating_avg` is always `round(rating_sum / rating_count, 1)` when
/// `rating_count > 0` and `0.0` ("unrated") otherwise — it is recomputed from
/// the totals on every write, never updated independently.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: Uuid,
    pub availability: Availability,
    #[sea_orm(column_type = "Double")]
    pub rating_sum: f64,
    pub rating_count: i32,
    #[sea_orm(column_type = "Double")]
    pub rating_avg: f64,
    /// Free-text comments received, independent of whether a numeric rating
    /// accompanied them.
    pub review_count: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs ──

/// Public reputation summary for GET /api/profiles/{id}/reputation.
/// A user who was never rated gets all zeroes.
#[derive(Debug, Clone, Serialize)]
pub struct ReputationResponse {
    pub user_id: Uuid,
    pub rating_avg: f64,
    pub rating_count: i32,
    pub review_count: i32,
}

impl ReputationResponse {
    pub fn unrated(user_id: Uuid) -> Self {
        Self {
            user_id,
            rating_avg: 0.0,
            rating_count: 0,
            review_count: 0,
        }
    }
}

impl From<Model> for ReputationResponse {
    fn from(m: Model) -> Self {
        Self {
            user_id: m.user_id,
            rating_avg: m.rating_avg,
            rating_count: m.rating_count,
            review_count: m.review_count,
        }
    }
}
