use sea_orm::*;
use uuid::Uuid;

use crate::db::profiles::ensure_profile_row;
use crate::models::profiles::{self, ReputationResponse};
use crate::models::reviews;

/// One rating/comment submission from one participant about the other,
/// applied to the target's Reputation Record exactly once per job per
/// direction.
#[derive(Debug, Clone, PartialEq)]
pub struct Contribution {
    pub target_user_id: Uuid,
    pub from_user_id: Uuid,
    pub job_id: Uuid,
    /// Already cleaned: clamped to [0.0, 5.0] and rounded to one decimal.
    pub rating: Option<f64>,
    pub comment: String,
}

impl Contribution {
    /// A contribution with neither a rating nor a comment is a no-op.
    pub fn is_empty(&self) -> bool {
        self.rating.is_none() && self.comment.is_empty()
    }
}

/// Round to one decimal, the precision every rating figure is kept at.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

const MAX_CONTENTION_RETRIES: usize = 5;

/// Apply one reputation contribution atomically relative to concurrent
/// contributions for the same target user.
///
/// Compare-and-swap loop: read the aggregates, recompute them in memory,
/// then write back conditioned on the observed `(rating_count, review_count)`
/// pair, appending the review-log row in the same transaction. Any
/// concurrent contribution for the same user bumps at least one of the two
/// counters, so the loser's conditional update matches zero rows, rolls back
/// and retries against fresh state. Two jobs closing for the same target at
/// nearly the same instant therefore never lose a contribution to a
/// lost-update race.
pub async fn apply_contribution(
    db: &DatabaseConnection,
    input: &Contribution,
) -> Result<(), DbErr> {
    if input.is_empty() {
        return Ok(());
    }

    for _ in 0..MAX_CONTENTION_RETRIES {
        ensure_profile_row(db, input.target_user_id).await?;

        let current = profiles::Entity::find_by_id(input.target_user_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                DbErr::RecordNotFound(format!(
                    "profile {} vanished mid-contribution",
                    input.target_user_id
                ))
            })?;

        let rating_sum = current.rating_sum + input.rating.unwrap_or(0.0);
        let rating_count = current.rating_count + i32::from(input.rating.is_some());
        let review_count = current.review_count + i32::from(!input.comment.is_empty());
        let rating_avg = if rating_count > 0 {
            round1(rating_sum / f64::from(rating_count))
        } else {
            0.0
        };
        let now = chrono::Utc::now();

        let txn = db.begin().await?;

        let res = profiles::Entity::update_many()
            .set(profiles::ActiveModel {
                rating_sum: Set(rating_sum),
                rating_count: Set(rating_count),
                rating_avg: Set(rating_avg),
                review_count: Set(review_count),
                updated_at: Set(now),
                ..Default::default()
            })
            .filter(profiles::Column::UserId.eq(input.target_user_id))
            .filter(profiles::Column::RatingCount.eq(current.rating_count))
            .filter(profiles::Column::ReviewCount.eq(current.review_count))
            .exec(&txn)
            .await?;

        if res.rows_affected == 0 {
            // Lost the race; retry against fresh aggregates.
            txn.rollback().await?;
            continue;
        }

        let log_entry = reviews::ActiveModel {
            id: Set(Uuid::new_v4()),
            target_user_id: Set(input.target_user_id),
            from_user_id: Set(input.from_user_id),
            job_id: Set(input.job_id),
            rating: Set(input.rating),
            comment: Set(input.comment.clone()),
            created_at: Set(now),
        };

        match log_entry.insert(&txn).await {
            Ok(_) => {}
            // Unique (job_id, from_user_id) hit: this job/direction was
            // already recorded, so the whole contribution is a replay and the
            // aggregate bump must not stand.
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                txn.rollback().await?;
                return Ok(());
            }
            Err(e) => return Err(e),
        }

        txn.commit().await?;
        return Ok(());
    }

    Err(DbErr::Custom(format!(
        "reputation contribution for {} still contended after {MAX_CONTENTION_RETRIES} attempts",
        input.target_user_id
    )))
}

/// Public reputation summary: `{rating_avg, rating_count, review_count}`.
/// A user who was never rated gets all zeroes, not an error.
pub async fn get_reputation(
    db: &DatabaseConnection,
    user_id: Uuid,
) -> Result<ReputationResponse, DbErr> {
    Ok(profiles::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .map(ReputationResponse::from)
        .unwrap_or_else(|| ReputationResponse::unrated(user_id)))
}

/// Review log for one user, newest first.
pub async fn list_reviews_for_user(
    db: &DatabaseConnection,
    user_id: Uuid,
) -> Result<Vec<reviews::Model>, DbErr> {
    reviews::Entity::find()
        .filter(reviews::Column::TargetUserId.eq(user_id))
        .order_by_desc(reviews::Column::CreatedAt)
        .all(db)
        .await
}
