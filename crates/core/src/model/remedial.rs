use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::{LessonId, RemedialId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemedialStatus {
    Pending,
    Completed,
}

/// Follow-up assignment created by the backend after a failed attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Remedial {
    pub id: RemedialId,
    pub quiz_title: String,
    pub lesson_id: Option<LessonId>,
    pub status: RemedialStatus,
    pub assigned_at: DateTime<Utc>,
}

impl Remedial {
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == RemedialStatus::Pending
    }
}
