//! The engagement state machine — the only code allowed to move a job
//! through its lifecycle or touch the reputation aggregates.
//!
//! Each operation is one logical unit of work: read the job, let
//! `transitions` validate what the actor wants, then write the result through
//! the conditional-update contract so that concurrent actions against the
//! same job cannot double-apply a transition.

pub mod transitions;

use chrono::Utc;
use sea_orm::{DatabaseConnection, Set};
use uuid::Uuid;

use crate::db::jobs::{self as job_db, UpdateOutcome};
use crate::db::profiles as profile_db;
use crate::db::reputation as reputation_db;
use crate::error::EngagementError;
use crate::models::jobs::{
    self, EndJobRequest, HireRequest, InvitationAction, JobStatus, RespondRequest, RoleFilter,
};
use crate::models::profiles::Availability;
use self::transitions::{Change, Transition};

/// A client hires a pre-selected provider. The provider must currently be
/// `available`; otherwise nothing is created.
pub async fn request_hire(
    db: &DatabaseConnection,
    client_id: Uuid,
    input: HireRequest,
) -> Result<jobs::Model, EngagementError> {
    if input.provider_id == client_id {
        return Err(EngagementError::Validation(
            "you cannot hire yourself".to_string(),
        ));
    }

    match profile_db::get_availability(db, input.provider_id).await? {
        Some(Availability::Available) => {}
        _ => return Err(EngagementError::ProviderUnavailable(input.provider_id)),
    }

    Ok(job_db::insert_job(db, client_id, input).await?)
}

/// The provider accepts or refuses a pending invitation. No reputation
/// impact either way — a declined invitation never got off the ground.
pub async fn decide_invitation(
    db: &DatabaseConnection,
    job_id: Uuid,
    actor_id: Uuid,
    action: InvitationAction,
) -> Result<jobs::Model, EngagementError> {
    let job = fetch(db, job_id).await?;
    let transition = transitions::decide_invitation(&job, actor_id, action, Utc::now())?;
    apply(db, &job, transition).await
}

/// Either participant proposes ending an in-progress job.
pub async fn request_end(
    db: &DatabaseConnection,
    job_id: Uuid,
    actor_id: Uuid,
    input: EndJobRequest,
) -> Result<jobs::Model, EngagementError> {
    let job = fetch(db, job_id).await?;
    let transition = transitions::request_end(&job, actor_id, &input, Utc::now())?;
    apply(db, &job, transition).await
}

/// The counterparty to a pending end request accepts, counters, or
/// escalates. Accepting closes the job and — only then — applies the due
/// reputation contributions, one per direction.
pub async fn respond(
    db: &DatabaseConnection,
    job_id: Uuid,
    actor_id: Uuid,
    input: RespondRequest,
) -> Result<jobs::Model, EngagementError> {
    let job = fetch(db, job_id).await?;
    let transition = transitions::respond(&job, actor_id, &input, Utc::now())?;
    apply(db, &job, transition).await
}

/// Participant-only read of a single job.
pub async fn get_job(
    db: &DatabaseConnection,
    job_id: Uuid,
    actor_id: Uuid,
) -> Result<jobs::Model, EngagementError> {
    let job = fetch(db, job_id).await?;
    if job.role_of(actor_id).is_none() {
        return Err(EngagementError::Forbidden(
            "only job participants may view this job",
        ));
    }
    Ok(job)
}

/// Jobs where the user is a participant, newest activity first.
pub async fn list_jobs(
    db: &DatabaseConnection,
    user_id: Uuid,
    role: RoleFilter,
    statuses: Option<Vec<JobStatus>>,
) -> Result<Vec<jobs::Model>, EngagementError> {
    Ok(job_db::list_jobs_for_user(db, user_id, role, statuses).await?)
}

async fn fetch(db: &DatabaseConnection, job_id: Uuid) -> Result<jobs::Model, EngagementError> {
    job_db::get_job_by_id(db, job_id)
        .await?
        .ok_or(EngagementError::NotFound(job_id))
}

/// Write a validated transition through the conditional update, then settle
/// any contributions it produced.
///
/// If a concurrent writer moved the job first, the conditional update
/// matches nothing and the whole operation fails `ConcurrentUpdateConflict`
/// with no reputation side effects — a retry will simply re-evaluate current
/// state (and find, say, an already-closed job).
async fn apply(
    db: &DatabaseConnection,
    job: &jobs::Model,
    transition: Transition,
) -> Result<jobs::Model, EngagementError> {
    let mut patch = jobs::ActiveModel {
        status: Set(transition.next),
        updated_at: Set(Utc::now()),
        ..Default::default()
    };

    let mut contributions = Vec::new();
    match transition.change {
        Change::Accepted(acceptance) => patch.acceptance = Set(Some(acceptance)),
        Change::Declined(decline) => patch.decline = Set(Some(decline)),
        Change::EndRequested(end_request) => patch.end_request = Set(Some(end_request)),
        Change::Countered(counter) => patch.counter_request = Set(Some(counter)),
        Change::Closed { closure, contributions: due } => {
            patch.closure = Set(Some(closure));
            contributions = due;
        }
        Change::Disputed(dispute) => patch.dispute = Set(Some(dispute)),
    }

    let updated = match job_db::update_job_in_status(db, job.id, transition.expected, patch).await? {
        UpdateOutcome::Updated(updated) => updated,
        UpdateOutcome::Stale(_) => return Err(EngagementError::ConcurrentUpdateConflict(job.id)),
        UpdateOutcome::Missing => return Err(EngagementError::NotFound(job.id)),
    };

    // Contributions happen strictly after the job is closed; the conditional
    // update above guarantees only one closer ever reaches this point, and
    // the review-log unique index backstops a replay.
    for contribution in &contributions {
        reputation_db::apply_contribution(db, contribution).await?;
    }

    Ok(updated)
}
