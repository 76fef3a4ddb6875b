use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use uuid::Uuid;

use crate::models::profiles::{self, Availability};

/// Read a provider's availability flag. `None` when no profile exists — the
/// profile service has never seen this user.
pub async fn get_availability(
    db: &DatabaseConnection,
    user_id: Uuid,
) -> Result<Option<Availability>, DbErr> {
    Ok(profiles::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .map(|p| p.availability))
}

/// Make sure a profile row exists so a reputation contribution has something
/// to update. Reputation records are created lazily on first contribution;
/// two concurrent first contributions race here and ON CONFLICT DO NOTHING
/// makes the race harmless.
///
/// A lazily created row carries `available`, the same default a fresh signup
/// gets. The profile service owns that flag from then on, so a user who is
/// known here only through ratings can be hired before they ever touch their
/// own profile.
pub(crate) async fn ensure_profile_row<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
) -> Result<(), DbErr> {
    let now = chrono::Utc::now();
    let blank = profiles::ActiveModel {
        user_id: Set(user_id),
        availability: Set(Availability::Available),
        rating_sum: Set(0.0),
        rating_count: Set(0),
        rating_avg: Set(0.0),
        review_count: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
    };

    profiles::Entity::insert(blank)
        .on_conflict(
            OnConflict::column(profiles::Column::UserId)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    Ok(())
}
