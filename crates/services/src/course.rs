use std::sync::Arc;

use tracing::{debug, info};

use lms_core::mastery::{MasteryDecision, newly_unlocked};
use lms_core::model::{AttemptId, AttemptResult, AttemptReview, LessonCard, Remedial};

use crate::api::LmsBackend;
use crate::error::ApiError;

/// Read side of the course: lessons, remedials and past attempts.
#[derive(Clone)]
pub struct CourseService {
    backend: Arc<dyn LmsBackend>,
}

impl CourseService {
    #[must_use]
    pub fn new(backend: Arc<dyn LmsBackend>) -> Self {
        Self { backend }
    }

    /// Lessons in server order and lock state.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the lesson list cannot be fetched.
    pub async fn lessons(&self) -> Result<Vec<LessonCard>, ApiError> {
        let lessons = self.backend.lessons().await?;
        debug!(count = lessons.len(), "lessons fetched");
        Ok(lessons)
    }

    /// # Errors
    ///
    /// Returns `ApiError` if the remedial list cannot be fetched.
    pub async fn remedials(&self) -> Result<Vec<Remedial>, ApiError> {
        let remedials = self.backend.remedials().await?;
        debug!(count = remedials.len(), "remedials fetched");
        Ok(remedials)
    }

    /// # Errors
    ///
    /// Returns `ApiError` if the attempt cannot be fetched.
    pub async fn attempt_review(&self, attempt_id: AttemptId) -> Result<AttemptReview, ApiError> {
        self.backend.attempt_review(attempt_id).await
    }

    /// Re-fetch lessons after an accepted attempt when the result asks for it.
    ///
    /// `None` when the result does not touch lock state, so nothing was fetched.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the lesson list cannot be fetched.
    pub async fn refresh_after(
        &self,
        result: &AttemptResult,
        before: &[LessonCard],
    ) -> Result<Option<LessonRefresh>, ApiError> {
        if !MasteryDecision::from_result(result).refresh_lessons {
            return Ok(None);
        }
        let lessons = self.backend.lessons().await?;
        let ids = newly_unlocked(before, &lessons);
        if !ids.is_empty() {
            info!(attempt_id = %result.attempt_id, unlocked = ?ids, "lessons unlocked");
        }
        let unlocked = lessons
            .iter()
            .filter(|lesson| ids.contains(&lesson.id))
            .cloned()
            .collect();
        Ok(Some(LessonRefresh { lessons, unlocked }))
    }
}

/// Lesson list fetched after an attempt, with the cards it unlocked.
#[derive(Debug, Clone, PartialEq)]
pub struct LessonRefresh {
    pub lessons: Vec<LessonCard>,
    /// Cards locked before the attempt and open now.
    pub unlocked: Vec<LessonCard>,
}
