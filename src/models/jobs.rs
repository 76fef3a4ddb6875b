use sea_orm::FromJsonQueryResult;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Job lifecycle status stored as a lowercase string in the database.
///
/// The only legal transitions are the ones `engagement::transitions` applies:
/// `pending_provider_accept` → (`in_progress` | `declined`);
/// `in_progress` → (`pending_provider` | `pending_client`);
/// `pending_provider` → (`closed` | `pending_client`);
/// `pending_client` → (`closed` | `disputed`).
/// `declined`, `closed` and `disputed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[sea_orm(string_value = "pending_provider_accept")]
    PendingProviderAccept,
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "pending_provider")]
    PendingProvider,
    #[sea_orm(string_value = "pending_client")]
    PendingClient,
    #[sea_orm(string_value = "closed")]
    Closed,
    #[sea_orm(string_value = "disputed")]
    Disputed,
    #[sea_orm(string_value = "declined")]
    Declined,
}

/// Which side of the engagement an actor is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Client,
    Provider,
}

/// Closed vocabulary of end/dispute reasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    Completed,
    NotSatisfied,
    NoShow,
    Canceled,
    PriceDisagreement,
    Reschedule,
    Other,
}

impl EndReason {
    /// Coerce free-form input into the closed vocabulary. Anything
    /// unrecognized becomes `Other` rather than being rejected.
    pub fn coerce(raw: &str) -> Self {
        match raw {
            "completed" => Self::Completed,
            "not_satisfied" => Self::NotSatisfied,
            "no_show" => Self::NoShow,
            "canceled" => Self::Canceled,
            "price_disagreement" => Self::PriceDisagreement,
            "reschedule" => Self::Reschedule,
            _ => Self::Other,
        }
    }
}

// ── JSONB sub-objects ──
//
// Each one is set by exactly one transition and never mutated afterwards.
// `status` is the source of truth for which of them may be present.

/// Provider accepted the invitation (`pending_provider_accept` → `in_progress`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct Acceptance {
    pub by: Role,
    pub at: DateTimeUtc,
}

/// Provider refused the invitation (`pending_provider_accept` → `declined`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct Decline {
    pub by: Role,
    pub at: DateTimeUtc,
}

/// An "I want to end this" proposal. Used both for the initial `end_request`
/// and for the `counter_request` rebuttal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct EndRequest {
    pub by: Role,
    pub reason: EndReason,
    pub comment: String,
    /// Provisional rating in [0.0, 5.0], one decimal. `None` means "no
    /// rating", which is distinct from a rating of zero.
    pub rating: Option<f64>,
    pub at: DateTimeUtc,
}

/// Final outcome, set exactly once when the job transitions to `closed`.
/// `client_rating`/`client_comment` are given *by* the client about the
/// provider; `provider_*` the other way around.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct Closure {
    pub reason: EndReason,
    pub client_rating: Option<f64>,
    pub client_comment: String,
    pub provider_rating: Option<f64>,
    pub provider_comment: String,
    pub closed_at: DateTimeUtc,
}

/// A party escalated instead of accepting (`pending_client` → `disputed`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct Dispute {
    pub by: Role,
    pub reason: EndReason,
    pub comment: String,
    pub at: DateTimeUtc,
}

/// SeaORM entity for the `jobs` table — one engagement between exactly one
/// client and one provider.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "jobs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub client_id: Uuid,
    pub provider_id: Uuid,
    /// Opaque taxonomy ids owned by the external meta service.
    pub category_id: String,
    pub service_id: String,
    pub title: String,
    pub status: JobStatus,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub acceptance: Option<Acceptance>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub decline: Option<Decline>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub end_request: Option<EndRequest>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub counter_request: Option<EndRequest>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub closure: Option<Closure>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub dispute: Option<Dispute>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Which side `user_id` is on, or `None` for a non-participant.
    pub fn role_of(&self, user_id: Uuid) -> Option<Role> {
        if user_id == self.client_id {
            Some(Role::Client)
        } else if user_id == self.provider_id {
            Some(Role::Provider)
        } else {
            None
        }
    }
}

// ── DTOs (request bodies — `actor_id` always comes from the JWT, never the body) ──

/// Body for POST /api/jobs. The authenticated user is the client.
#[derive(Debug, Clone, Deserialize)]
pub struct HireRequest {
    pub provider_id: Uuid,
    #[serde(default)]
    pub category_id: String,
    #[serde(default)]
    pub service_id: String,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvitationAction {
    Accept,
    Refuse,
}

/// Body for POST /api/jobs/{id}/accept.
#[derive(Debug, Clone, Deserialize)]
pub struct InvitationDecision {
    pub action: InvitationAction,
}

/// Body for POST /api/jobs/{id}/end.
///
/// `rating` is deliberately loose (`serde_json::Value`) so that numbers,
/// numeric strings and the empty string are all accepted the way the web
/// clients send them; `engagement::transitions::clean_rating` does the
/// clamping/validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EndJobRequest {
    pub reason: Option<String>,
    #[serde(default)]
    pub comment: String,
    pub rating: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RespondAction {
    Accept,
    Reject,
    Escalate,
}

/// Body for POST /api/jobs/{id}/respond.
#[derive(Debug, Clone, Deserialize)]
pub struct RespondRequest {
    pub action: RespondAction,
    pub reason: Option<String>,
    #[serde(default)]
    pub comment: String,
    pub rating: Option<serde_json::Value>,
}

/// Role filter for GET /api/jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleFilter {
    #[default]
    Any,
    Client,
    Provider,
}
