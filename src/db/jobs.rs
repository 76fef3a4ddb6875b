use sea_orm::*;
use uuid::Uuid;

use crate::models::jobs::{self, HireRequest, JobStatus, RoleFilter};

/// Insert a freshly hired job in `pending_provider_accept`. This is the sole
/// creation path — no other operation may fabricate a job.
pub async fn insert_job(
    db: &DatabaseConnection,
    client_id: Uuid,
    input: HireRequest,
) -> Result<jobs::Model, DbErr> {
    let now = chrono::Utc::now();
    let new_job = jobs::ActiveModel {
        id: Set(Uuid::new_v4()),
        client_id: Set(client_id),
        provider_id: Set(input.provider_id),
        category_id: Set(input.category_id),
        service_id: Set(input.service_id),
        title: Set(input.title),
        status: Set(JobStatus::PendingProviderAccept),
        acceptance: Set(None),
        decline: Set(None),
        end_request: Set(None),
        counter_request: Set(None),
        closure: Set(None),
        dispute: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    };

    new_job.insert(db).await
}

/// Fetch a single job by ID.
pub async fn get_job_by_id(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<Option<jobs::Model>, DbErr> {
    jobs::Entity::find_by_id(id).one(db).await
}

/// Jobs where the user is a participant, optionally narrowed by role and
/// status, most recently touched first.
pub async fn list_jobs_for_user(
    db: &DatabaseConnection,
    user_id: Uuid,
    role: RoleFilter,
    statuses: Option<Vec<JobStatus>>,
) -> Result<Vec<jobs::Model>, DbErr> {
    let mut query = match role {
        RoleFilter::Any => jobs::Entity::find().filter(
            Condition::any()
                .add(jobs::Column::ClientId.eq(user_id))
                .add(jobs::Column::ProviderId.eq(user_id)),
        ),
        RoleFilter::Client => jobs::Entity::find().filter(jobs::Column::ClientId.eq(user_id)),
        RoleFilter::Provider => jobs::Entity::find().filter(jobs::Column::ProviderId.eq(user_id)),
    };

    if let Some(wanted) = statuses {
        query = query.filter(jobs::Column::Status.is_in(wanted));
    }

    query.order_by_desc(jobs::Column::UpdatedAt).all(db).await
}

/// Outcome of a conditional update against the job ledger.
#[derive(Debug)]
pub enum UpdateOutcome {
    /// The status precondition held and the patch was applied.
    Updated(jobs::Model),
    /// The row exists but a concurrent writer moved its status first; the
    /// current row is returned so the caller can report what it lost to.
    Stale(jobs::Model),
    /// The row is gone.
    Missing,
}

/// Apply `patch` to a job only while its status still equals `expected`.
///
/// Two near-simultaneous transitions against the same job both read the same
/// state, but only one can match the `status = expected` predicate; the
/// loser affects zero rows instead of silently overwriting the winner.
pub async fn update_job_in_status(
    db: &DatabaseConnection,
    id: Uuid,
    expected: JobStatus,
    patch: jobs::ActiveModel,
) -> Result<UpdateOutcome, DbErr> {
    let res = jobs::Entity::update_many()
        .set(patch)
        .filter(jobs::Column::Id.eq(id))
        .filter(jobs::Column::Status.eq(expected))
        .exec(db)
        .await?;

    if res.rows_affected == 0 {
        return Ok(match jobs::Entity::find_by_id(id).one(db).await? {
            Some(current) => UpdateOutcome::Stale(current),
            None => UpdateOutcome::Missing,
        });
    }

    jobs::Entity::find_by_id(id)
        .one(db)
        .await?
        .map(UpdateOutcome::Updated)
        .ok_or_else(|| DbErr::RecordNotFound(format!("job {id} vanished after update")))
}
