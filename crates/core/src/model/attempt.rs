use serde::{Deserialize, Serialize};

use crate::model::ids::{AttemptId, LessonId, OptionId, QuestionId, RemedialId};

/// Outcome of a submitted attempt as scored by the backend.
///
/// Scores and the pass flag are authoritative; nothing here is recomputed locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptResult {
    pub attempt_id: AttemptId,
    pub earned_points: f64,
    pub total_points: f64,
    pub percentage: f64,
    pub passed: bool,
    pub time_spent_seconds: u32,
    /// Lesson this quiz gates, if any.
    pub linked_lesson_id: Option<LessonId>,
    /// Remedial record created server-side on failure, if the server reported one.
    pub remedial_id: Option<RemedialId>,
}

/// Per-question correctness shown when reviewing a finished attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionReview {
    pub question_id: QuestionId,
    pub text: String,
    pub selected_option_id: Option<OptionId>,
    pub selected_text: Option<String>,
    pub correct_option_id: Option<OptionId>,
    pub correct_text: Option<String>,
    pub is_correct: bool,
    pub points_awarded: f64,
    pub points: f64,
}

impl QuestionReview {
    #[must_use]
    pub fn was_answered(&self) -> bool {
        self.selected_option_id.is_some()
    }
}

/// Full result of an attempt, including the per-question breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptReview {
    pub result: AttemptResult,
    pub quiz_title: Option<String>,
    pub questions: Vec<QuestionReview>,
}

impl AttemptReview {
    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.questions.iter().filter(|q| q.is_correct).count()
    }

    #[must_use]
    pub fn unanswered_count(&self) -> usize {
        self.questions.iter().filter(|q| !q.was_answered()).count()
    }
}
