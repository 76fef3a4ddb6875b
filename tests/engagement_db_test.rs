///! Integration tests for the concurrency-sensitive parts of the engagement
///! core, run against a real database.
///!
///! The real migrations are applied to an in-memory SQLite database on a
///! single-connection pool, then the engagement and db layers are exercised
///! where the pure transition tests cannot reach: the availability gate on
///! hire, the conditional-update contract on the job ledger, and at-most-once
///! reputation contributions.
///!
///! Run with: `cargo test --test engagement_db_test`
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use serde_json::json;
use uuid::Uuid;

use migration::{Migrator, MigratorTrait};
use proserve_backend::db::jobs::{self as job_db, UpdateOutcome};
use proserve_backend::db::reputation::{self as reputation_db, Contribution};
use proserve_backend::engagement;
use proserve_backend::error::EngagementError;
use proserve_backend::models::jobs::{
    self as jobs, Closure, EndJobRequest, EndReason, EndRequest, HireRequest, InvitationAction,
    JobStatus, RespondAction, RespondRequest, Role, RoleFilter,
};
use proserve_backend::models::profiles::{self, Availability};

/// Fresh schema per test. A single connection keeps every statement on the
/// same in-memory database.
async fn setup() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1);
    let db = Database::connect(options)
        .await
        .expect("Failed to open in-memory database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

async fn seed_profile(db: &DatabaseConnection, user_id: Uuid, availability: Availability) {
    let now = Utc::now();
    profiles::ActiveModel {
        user_id: Set(user_id),
        availability: Set(availability),
        rating_sum: Set(0.0),
        rating_count: Set(0),
        rating_avg: Set(0.0),
        review_count: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("Failed to seed profile");
}

fn hire(provider_id: Uuid) -> HireRequest {
    HireRequest {
        provider_id,
        category_id: "home-repair".to_string(),
        service_id: "plumbing".to_string(),
        title: "Fix the kitchen sink".to_string(),
    }
}

/// Drive a job to `pending_provider`: hire, provider accepts, client asks to
/// end. Returns the job id.
async fn job_pending_provider(db: &DatabaseConnection, client: Uuid, provider: Uuid) -> Uuid {
    seed_profile(db, provider, Availability::Available).await;
    let job = engagement::request_hire(db, client, hire(provider))
        .await
        .unwrap();
    engagement::decide_invitation(db, job.id, provider, InvitationAction::Accept)
        .await
        .unwrap();
    let end = EndJobRequest {
        reason: Some("completed".to_string()),
        comment: "quick and tidy".to_string(),
        rating: Some(json!(4.5)),
    };
    let pending = engagement::request_end(db, job.id, client, end).await.unwrap();
    assert_eq!(pending.status, JobStatus::PendingProvider);
    job.id
}

#[tokio::test]
async fn unavailable_provider_gets_no_job() {
    let db = setup().await;
    let client = Uuid::new_v4();

    let busy = Uuid::new_v4();
    seed_profile(&db, busy, Availability::Busy).await;
    let err = engagement::request_hire(&db, client, hire(busy))
        .await
        .unwrap_err();
    assert!(matches!(err, EngagementError::ProviderUnavailable(id) if id == busy));

    // A provider the profile service has never seen is unavailable too.
    let unknown = Uuid::new_v4();
    let err = engagement::request_hire(&db, client, hire(unknown))
        .await
        .unwrap_err();
    assert!(matches!(err, EngagementError::ProviderUnavailable(id) if id == unknown));

    // Neither rejection left a row behind.
    let ledger = engagement::list_jobs(&db, client, RoleFilter::Any, None)
        .await
        .unwrap();
    assert!(ledger.is_empty());
}

#[tokio::test]
async fn closing_settles_reputation_exactly_once() {
    let db = setup().await;
    let client = Uuid::new_v4();
    let provider = Uuid::new_v4();
    let job_id = job_pending_provider(&db, client, provider).await;

    let accept = RespondRequest {
        action: RespondAction::Accept,
        reason: None,
        comment: "great client".to_string(),
        rating: Some(json!(5)),
    };
    let closed = engagement::respond(&db, job_id, provider, accept.clone())
        .await
        .unwrap();
    assert_eq!(closed.status, JobStatus::Closed);
    let closure = closed.closure.expect("closed job must carry a closure");
    assert_eq!(closure.client_rating, Some(4.5));
    assert_eq!(closure.provider_rating, Some(5.0));

    // Client rated the provider 4.5, provider rated the client 5.0.
    let provider_rep = reputation_db::get_reputation(&db, provider).await.unwrap();
    assert_eq!(provider_rep.rating_count, 1);
    assert_eq!(provider_rep.rating_avg, 4.5);
    assert_eq!(provider_rep.review_count, 1);

    // The client never had a profile row; the contribution created one.
    let client_rep = reputation_db::get_reputation(&db, client).await.unwrap();
    assert_eq!(client_rep.rating_count, 1);
    assert_eq!(client_rep.rating_avg, 5.0);

    // A replayed accept finds a closed job and settles nothing.
    let err = engagement::respond(&db, job_id, provider, accept)
        .await
        .unwrap_err();
    assert!(matches!(err, EngagementError::InvalidState(_)));
    let provider_rep = reputation_db::get_reputation(&db, provider).await.unwrap();
    assert_eq!(provider_rep.rating_count, 1);
    assert_eq!(provider_rep.rating_avg, 4.5);
}

#[tokio::test]
async fn second_end_request_finds_moved_job() {
    let db = setup().await;
    let client = Uuid::new_v4();
    let provider = Uuid::new_v4();
    let job_id = job_pending_provider(&db, client, provider).await;

    // The provider's own end request arrives after the client's already
    // moved the job to `pending_provider`; it must not overwrite it.
    let late = EndJobRequest {
        reason: Some("canceled".to_string()),
        comment: String::new(),
        rating: None,
    };
    let err = engagement::request_end(&db, job_id, provider, late)
        .await
        .unwrap_err();
    assert!(matches!(err, EngagementError::InvalidState(_)));

    let job = job_db::get_job_by_id(&db, job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::PendingProvider);
    assert_eq!(job.end_request.unwrap().by, Role::Client);
}

#[tokio::test]
async fn stale_conditional_update_is_reported_not_applied() {
    let db = setup().await;
    let client = Uuid::new_v4();
    let provider = Uuid::new_v4();
    let job_id = job_pending_provider(&db, client, provider).await;

    // Two writers read the job at `pending_provider`. The first closes it.
    let now = Utc::now();
    let close = jobs::ActiveModel {
        status: Set(JobStatus::Closed),
        closure: Set(Some(Closure {
            reason: EndReason::Completed,
            client_rating: Some(4.5),
            client_comment: "quick and tidy".to_string(),
            provider_rating: None,
            provider_comment: String::new(),
            closed_at: now,
        })),
        updated_at: Set(now),
        ..Default::default()
    };
    let first = job_db::update_job_in_status(&db, job_id, JobStatus::PendingProvider, close)
        .await
        .unwrap();
    assert!(matches!(first, UpdateOutcome::Updated(_)));

    // The second still carries the `pending_provider` precondition and must
    // lose, with the winner's row reported back.
    let counter = jobs::ActiveModel {
        status: Set(JobStatus::PendingClient),
        counter_request: Set(Some(EndRequest {
            by: Role::Provider,
            reason: EndReason::PriceDisagreement,
            comment: String::new(),
            rating: None,
            at: now,
        })),
        updated_at: Set(now),
        ..Default::default()
    };
    match job_db::update_job_in_status(&db, job_id, JobStatus::PendingProvider, counter)
        .await
        .unwrap()
    {
        UpdateOutcome::Stale(current) => assert_eq!(current.status, JobStatus::Closed),
        other => panic!("expected a stale outcome, got {other:?}"),
    }

    // The loser wrote nothing.
    let job = job_db::get_job_by_id(&db, job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Closed);
    assert!(job.counter_request.is_none());

    // A row that is gone entirely is reported as missing, not stale.
    let patch = jobs::ActiveModel {
        status: Set(JobStatus::Closed),
        updated_at: Set(now),
        ..Default::default()
    };
    let gone = job_db::update_job_in_status(&db, Uuid::new_v4(), JobStatus::PendingProvider, patch)
        .await
        .unwrap();
    assert!(matches!(gone, UpdateOutcome::Missing));
}

#[tokio::test]
async fn replayed_contribution_is_applied_at_most_once() {
    let db = setup().await;
    let target = Uuid::new_v4();
    let contribution = Contribution {
        target_user_id: target,
        from_user_id: Uuid::new_v4(),
        job_id: Uuid::new_v4(),
        rating: Some(4.0),
        comment: "solid work".to_string(),
    };

    reputation_db::apply_contribution(&db, &contribution)
        .await
        .unwrap();
    // Same job, same author: the review log's unique index catches the
    // replay and the aggregate bump is rolled back with it.
    reputation_db::apply_contribution(&db, &contribution)
        .await
        .unwrap();

    let rep = reputation_db::get_reputation(&db, target).await.unwrap();
    assert_eq!(rep.rating_count, 1);
    assert_eq!(rep.rating_avg, 4.0);
    assert_eq!(rep.review_count, 1);

    let log = reputation_db::list_reviews_for_user(&db, target).await.unwrap();
    assert_eq!(log.len(), 1);
}

#[tokio::test]
async fn contributions_accumulate_and_average_derives_from_totals() {
    let db = setup().await;
    let target = Uuid::new_v4();
    let rate = |rating: Option<f64>, comment: &str| Contribution {
        target_user_id: target,
        from_user_id: Uuid::new_v4(),
        job_id: Uuid::new_v4(),
        rating,
        comment: comment.to_string(),
    };

    reputation_db::apply_contribution(&db, &rate(Some(4.0), "solid work"))
        .await
        .unwrap();
    reputation_db::apply_contribution(&db, &rate(Some(5.0), ""))
        .await
        .unwrap();

    let rep = reputation_db::get_reputation(&db, target).await.unwrap();
    assert_eq!(rep.rating_count, 2);
    assert_eq!(rep.rating_avg, 4.5);
    // Only the commented contribution counts as a review.
    assert_eq!(rep.review_count, 1);

    // A comment-only contribution logs a review but moves no rating figure.
    reputation_db::apply_contribution(&db, &rate(None, "showed up late"))
        .await
        .unwrap();
    let rep = reputation_db::get_reputation(&db, target).await.unwrap();
    assert_eq!(rep.rating_count, 2);
    assert_eq!(rep.rating_avg, 4.5);
    assert_eq!(rep.review_count, 2);
}
