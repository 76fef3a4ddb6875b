//! Pure transition logic for the engagement lifecycle.
//!
//! Everything here is a function of (job row, actor, input, now) — no I/O.
//! `engagement` reads the job, asks this module what the transition means,
//! then writes it back through the conditional-update contract in `db::jobs`.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::db::reputation::{Contribution, round1};
use crate::error::EngagementError;
use crate::models::jobs::{
    Acceptance, Closure, Decline, Dispute, EndJobRequest, EndReason, EndRequest, InvitationAction,
    JobStatus, Model as Job, RespondAction, RespondRequest, Role,
};

/// A job row narrowed to exactly the fields legal in its status.
///
/// Deciding a transition starts by proving the row is coherent: a row whose
/// sub-objects contradict its status (a `closed` job without a `closure`, a
/// `pending_provider` job whose end request came from the provider) is
/// rejected instead of being acted on.
#[derive(Debug, Clone, PartialEq)]
pub enum JobState {
    PendingProviderAccept,
    InProgress,
    PendingProvider {
        end_request: EndRequest,
    },
    PendingClient {
        end_request: EndRequest,
        counter_request: Option<EndRequest>,
    },
    Closed {
        closure: Closure,
    },
    Disputed {
        dispute: Dispute,
    },
    Declined {
        decline: Decline,
    },
}

fn corrupt() -> EngagementError {
    EngagementError::InvalidState("job record does not match its status")
}

impl JobState {
    pub fn of(job: &Job) -> Result<Self, EngagementError> {
        match job.status {
            JobStatus::PendingProviderAccept => {
                if job.acceptance.is_some()
                    || job.decline.is_some()
                    || job.end_request.is_some()
                    || job.counter_request.is_some()
                    || job.closure.is_some()
                    || job.dispute.is_some()
                {
                    return Err(corrupt());
                }
                Ok(Self::PendingProviderAccept)
            }
            JobStatus::InProgress => {
                if job.acceptance.is_none()
                    || job.decline.is_some()
                    || job.end_request.is_some()
                    || job.counter_request.is_some()
                    || job.closure.is_some()
                    || job.dispute.is_some()
                {
                    return Err(corrupt());
                }
                Ok(Self::InProgress)
            }
            JobStatus::PendingProvider => {
                let end_request = job.end_request.clone().ok_or_else(corrupt)?;
                if end_request.by != Role::Client
                    || job.counter_request.is_some()
                    || job.closure.is_some()
                    || job.dispute.is_some()
                {
                    return Err(corrupt());
                }
                Ok(Self::PendingProvider { end_request })
            }
            JobStatus::PendingClient => {
                let end_request = job.end_request.clone().ok_or_else(corrupt)?;
                let counter_request = job.counter_request.clone();
                // Two ways in: the provider asked to end (no counter yet), or
                // the provider countered the client's end request.
                let coherent = match (end_request.by, &counter_request) {
                    (Role::Provider, None) => true,
                    (Role::Client, Some(counter)) => counter.by == Role::Provider,
                    _ => false,
                };
                if !coherent || job.closure.is_some() || job.dispute.is_some() {
                    return Err(corrupt());
                }
                Ok(Self::PendingClient {
                    end_request,
                    counter_request,
                })
            }
            JobStatus::Closed => {
                let closure = job.closure.clone().ok_or_else(corrupt)?;
                if job.dispute.is_some() {
                    return Err(corrupt());
                }
                Ok(Self::Closed { closure })
            }
            JobStatus::Disputed => {
                let dispute = job.dispute.clone().ok_or_else(corrupt)?;
                if job.closure.is_some() {
                    return Err(corrupt());
                }
                Ok(Self::Disputed { dispute })
            }
            JobStatus::Declined => {
                let decline = job.decline.clone().ok_or_else(corrupt)?;
                if job.acceptance.is_some() || job.closure.is_some() || job.dispute.is_some() {
                    return Err(corrupt());
                }
                Ok(Self::Declined { decline })
            }
        }
    }
}

/// What a transition writes: one sub-object, set exactly once.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Accepted(Acceptance),
    Declined(Decline),
    EndRequested(EndRequest),
    Countered(EndRequest),
    Closed {
        closure: Closure,
        /// Due reputation contributions, at most one per direction. Empty
        /// when neither side supplied a rating or comment.
        contributions: Vec<Contribution>,
    },
    Disputed(Dispute),
}

/// A validated transition, ready for the conditional update: the status the
/// row must still be in, the status it moves to, and the payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub expected: JobStatus,
    pub next: JobStatus,
    pub change: Change,
}

/// Clamp a submitted rating to [0.0, 5.0] and round it to one decimal.
///
/// Absent, `null` and the empty string all mean "no rating", which is
/// distinct from a rating of zero. Numeric strings are accepted the way the
/// web clients send them; anything else is a validation error.
pub fn clean_rating(raw: Option<&serde_json::Value>) -> Result<Option<f64>, EngagementError> {
    let value = match raw {
        None | Some(serde_json::Value::Null) => return Ok(None),
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => return Ok(None),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().map_err(|_| {
            EngagementError::Validation(format!("rating {s:?} is not a number"))
        })?,
        Some(serde_json::Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| EngagementError::Validation("rating is out of range".to_string()))?,
        Some(other) => {
            return Err(EngagementError::Validation(format!(
                "rating must be a number, got {other}"
            )));
        }
    };

    if !value.is_finite() {
        return Err(EngagementError::Validation("rating must be finite".to_string()));
    }

    Ok(Some(round1(value.clamp(0.0, 5.0))))
}

fn coerce_reason(raw: Option<&str>) -> Option<EndReason> {
    raw.map(EndReason::coerce)
}

fn participant_role(job: &Job, actor_id: Uuid) -> Result<Role, EngagementError> {
    job.role_of(actor_id)
        .ok_or(EngagementError::Forbidden("only job participants may act on this job"))
}

/// The provider accepts or refuses the invitation.
pub fn decide_invitation(
    job: &Job,
    actor_id: Uuid,
    action: InvitationAction,
    now: DateTime<Utc>,
) -> Result<Transition, EngagementError> {
    let role = participant_role(job, actor_id)?;
    let state = JobState::of(job)?;

    if state != JobState::PendingProviderAccept {
        return Err(EngagementError::InvalidState(
            "job is not awaiting the provider's decision",
        ));
    }
    if role != Role::Provider {
        return Err(EngagementError::Forbidden(
            "only the hired provider may accept or refuse the invitation",
        ));
    }

    Ok(match action {
        InvitationAction::Accept => Transition {
            expected: JobStatus::PendingProviderAccept,
            next: JobStatus::InProgress,
            change: Change::Accepted(Acceptance {
                by: Role::Provider,
                at: now,
            }),
        },
        InvitationAction::Refuse => Transition {
            expected: JobStatus::PendingProviderAccept,
            next: JobStatus::Declined,
            change: Change::Declined(Decline {
                by: Role::Provider,
                at: now,
            }),
        },
    })
}

/// Either participant proposes ending an in-progress job. The rating captured
/// here is provisional — it reaches the Reputation Store only at closure.
pub fn request_end(
    job: &Job,
    actor_id: Uuid,
    input: &EndJobRequest,
    now: DateTime<Utc>,
) -> Result<Transition, EngagementError> {
    let role = participant_role(job, actor_id)?;
    let state = JobState::of(job)?;

    if state != JobState::InProgress {
        return Err(EngagementError::InvalidState("job is not in progress"));
    }

    let rating = clean_rating(input.rating.as_ref())?;
    let reason = coerce_reason(input.reason.as_deref()).unwrap_or(EndReason::Other);

    // The counterparty gets to respond, so the job moves to *their* waiting
    // state.
    let next = match role {
        Role::Client => JobStatus::PendingProvider,
        Role::Provider => JobStatus::PendingClient,
    };

    Ok(Transition {
        expected: JobStatus::InProgress,
        next,
        change: Change::EndRequested(EndRequest {
            by: role,
            reason,
            comment: input.comment.clone(),
            rating,
            at: now,
        }),
    })
}

/// The counterparty to the pending end request accepts, rejects with a
/// counter-offer, or escalates into a dispute.
///
/// Legality is exactly the enumerated table: from `pending_provider` only the
/// provider may `accept`/`reject`; from `pending_client` only the client may
/// `accept`/`escalate`. Every other combination is `InvalidState` — there is
/// no generic "anyone can close" path.
pub fn respond(
    job: &Job,
    actor_id: Uuid,
    input: &RespondRequest,
    now: DateTime<Utc>,
) -> Result<Transition, EngagementError> {
    let role = participant_role(job, actor_id)?;
    let state = JobState::of(job)?;
    let rating = clean_rating(input.rating.as_ref())?;

    match (state, role, input.action) {
        (JobState::PendingProvider { end_request }, Role::Provider, RespondAction::Accept) => {
            let closure = build_closure(&end_request, None, input, rating, now);
            Ok(close(job, JobStatus::PendingProvider, closure))
        }
        (JobState::PendingProvider { .. }, Role::Provider, RespondAction::Reject) => {
            Ok(Transition {
                expected: JobStatus::PendingProvider,
                next: JobStatus::PendingClient,
                change: Change::Countered(EndRequest {
                    by: Role::Provider,
                    reason: coerce_reason(input.reason.as_deref()).unwrap_or(EndReason::Other),
                    comment: input.comment.clone(),
                    rating,
                    at: now,
                }),
            })
        }
        (
            JobState::PendingClient {
                end_request,
                counter_request,
            },
            Role::Client,
            RespondAction::Accept,
        ) => {
            let closure = build_closure(&end_request, counter_request.as_ref(), input, rating, now);
            Ok(close(job, JobStatus::PendingClient, closure))
        }
        (JobState::PendingClient { .. }, Role::Client, RespondAction::Escalate) => Ok(Transition {
            expected: JobStatus::PendingClient,
            next: JobStatus::Disputed,
            change: Change::Disputed(Dispute {
                by: Role::Client,
                reason: coerce_reason(input.reason.as_deref()).unwrap_or(EndReason::Other),
                comment: input.comment.clone(),
                at: now,
            }),
        }),
        _ => Err(EngagementError::InvalidState(
            "this action is not legal for this actor in the job's current state",
        )),
    }
}

/// Assemble the final closure record.
///
/// The original end request's author keeps their own-side rating/comment; the
/// responder's payload fills the other side. When the responder is accepting
/// a counter-offer, the counter's values stand in wherever the responder did
/// not explicitly override them.
fn build_closure(
    end_request: &EndRequest,
    counter_request: Option<&EndRequest>,
    input: &RespondRequest,
    responder_rating: Option<f64>,
    now: DateTime<Utc>,
) -> Closure {
    let fallback = counter_request.map(|c| c.reason).unwrap_or(end_request.reason);
    let reason = coerce_reason(input.reason.as_deref()).unwrap_or(fallback);

    let mut other_rating = responder_rating;
    let mut other_comment = input.comment.clone();
    if let Some(counter) = counter_request {
        other_rating = other_rating.or(counter.rating);
        if other_comment.is_empty() {
            other_comment = counter.comment.clone();
        }
    }

    let (client_rating, client_comment, provider_rating, provider_comment) = match end_request.by {
        Role::Client => (
            end_request.rating,
            end_request.comment.clone(),
            other_rating,
            other_comment,
        ),
        Role::Provider => (
            other_rating,
            other_comment,
            end_request.rating,
            end_request.comment.clone(),
        ),
    };

    Closure {
        reason,
        client_rating,
        client_comment,
        provider_rating,
        provider_comment,
        closed_at: now,
    }
}

fn close(job: &Job, expected: JobStatus, closure: Closure) -> Transition {
    let contributions = contributions_for(job, &closure);
    Transition {
        expected,
        next: JobStatus::Closed,
        change: Change::Closed {
            closure,
            contributions,
        },
    }
}

/// The reputation contributions a closure gives rise to: client→provider
/// from the client-side rating/comment, provider→client from the provider
/// side. A side with nothing in it contributes nothing.
fn contributions_for(job: &Job, closure: &Closure) -> Vec<Contribution> {
    let mut due = Vec::new();

    let from_client = Contribution {
        target_user_id: job.provider_id,
        from_user_id: job.client_id,
        job_id: job.id,
        rating: closure.client_rating,
        comment: closure.client_comment.clone(),
    };
    if !from_client.is_empty() {
        due.push(from_client);
    }

    let from_provider = Contribution {
        target_user_id: job.client_id,
        from_user_id: job.provider_id,
        job_id: job.id,
        rating: closure.provider_rating,
        comment: closure.provider_comment.clone(),
    };
    if !from_provider.is_empty() {
        due.push(from_provider);
    }

    due
}
