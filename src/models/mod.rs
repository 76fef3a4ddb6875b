pub mod jobs;
pub mod profiles;
pub mod reviews;

use serde::Deserialize;

use crate::models::jobs::{JobStatus, RoleFilter};

/// Query params for GET /api/jobs: `?role=client&status=closed,disputed`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobListQuery {
    pub role: Option<RoleFilter>,
    /// Optional comma-separated status list; unrecognized entries are ignored.
    pub status: Option<String>,
}

impl JobListQuery {
    pub fn role(&self) -> RoleFilter {
        self.role.unwrap_or_default()
    }

    pub fn statuses(&self) -> Option<Vec<JobStatus>> {
        use sea_orm::ActiveEnum;

        let raw = self.status.as_deref()?;
        let wanted: Vec<JobStatus> = raw
            .split(',')
            .filter_map(|s| JobStatus::try_from_value(&s.trim().to_owned()).ok())
            .collect();
        Some(wanted)
    }
}
