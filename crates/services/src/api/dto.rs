//! JSON shapes of the backend. Kept apart from the domain model so wire
//! naming never leaks into it.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use lms_core::model::{
    AttemptId, AttemptResult, AttemptReview, Choice, LessonCard, LessonId, OptionId, Question,
    QuestionId, QuestionKind, QuestionReview, Quiz, QuizId, QuizPaper, Remedial, RemedialId,
    RemedialStatus,
};
use lms_core::session::SubmissionRequest;

/// Error code the backend sends when the student has no attempts left.
pub const REJECT_NO_ATTEMPTS: &str = "no_attempts_remaining";
/// Error code the backend sends when this attempt was already recorded.
pub const REJECT_ALREADY_SUBMITTED: &str = "already_submitted";

//
// ─── QUIZ PAPER ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QuizPaperDto {
    pub quiz: QuizDto,
    pub questions: Vec<QuestionDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QuizDto {
    pub quiz_id: QuizId,
    pub title: String,
    pub time_limit_minutes: u32,
    pub passing_rate: u8,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QuestionDto {
    pub question_id: QuestionId,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub points: u32,
    pub choices: Vec<ChoiceDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChoiceDto {
    pub option_id: OptionId,
    pub text: String,
}

impl TryFrom<QuizPaperDto> for QuizPaper {
    type Error = lms_core::Error;

    fn try_from(dto: QuizPaperDto) -> Result<Self, Self::Error> {
        let quiz = Quiz::new(
            dto.quiz.quiz_id,
            dto.quiz.title,
            dto.quiz.time_limit_minutes,
            dto.quiz.passing_rate,
        )?;
        let questions = dto
            .questions
            .into_iter()
            .map(|q| {
                let choices = q
                    .choices
                    .into_iter()
                    .map(|c| Choice::new(c.option_id, c.text))
                    .collect();
                Question::new(q.question_id, q.text, q.kind, q.points, choices)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(QuizPaper::new(quiz, questions)?)
    }
}

//
// ─── SUBMISSION ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubmitBody<'a> {
    pub quiz_id: QuizId,
    pub time_taken_seconds: u32,
    pub answers: &'a BTreeMap<QuestionId, OptionId>,
}

impl<'a> From<&'a SubmissionRequest> for SubmitBody<'a> {
    fn from(request: &'a SubmissionRequest) -> Self {
        Self {
            quiz_id: request.quiz_id,
            time_taken_seconds: request.time_taken_seconds,
            answers: &request.answers,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AttemptResultDto {
    pub attempt_id: AttemptId,
    pub earned_points: f64,
    pub total_points: f64,
    pub percentage: f64,
    pub passed: bool,
    #[serde(default)]
    pub time_spent_seconds: Option<u32>,
    #[serde(default)]
    pub linked_lesson_id: Option<LessonId>,
    #[serde(default)]
    pub remedial_id: Option<RemedialId>,
}

impl AttemptResultDto {
    /// The server may omit the time spent; fall back to what was sent.
    pub fn into_result(self, time_taken_seconds: u32) -> AttemptResult {
        AttemptResult {
            attempt_id: self.attempt_id,
            earned_points: self.earned_points,
            total_points: self.total_points,
            percentage: self.percentage,
            passed: self.passed,
            time_spent_seconds: self.time_spent_seconds.unwrap_or(time_taken_seconds),
            linked_lesson_id: self.linked_lesson_id,
            remedial_id: self.remedial_id,
        }
    }
}

/// Error payload returned with non-2xx responses.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

impl ErrorBody {
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.message.as_deref().or(self.error.as_deref())
    }
}

//
// ─── ATTEMPT REVIEW ────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AttemptReviewDto {
    #[serde(flatten)]
    pub result: AttemptResultDto,
    #[serde(default)]
    pub quiz_title: Option<String>,
    #[serde(default)]
    pub questions: Vec<QuestionReviewDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QuestionReviewDto {
    pub question_id: QuestionId,
    pub text: String,
    #[serde(default)]
    pub selected_option_id: Option<OptionId>,
    #[serde(default)]
    pub selected_text: Option<String>,
    #[serde(default)]
    pub correct_option_id: Option<OptionId>,
    #[serde(default)]
    pub correct_text: Option<String>,
    pub is_correct: bool,
    pub points_awarded: f64,
    pub points: f64,
}

impl From<AttemptReviewDto> for AttemptReview {
    fn from(dto: AttemptReviewDto) -> Self {
        let time_spent = dto.result.time_spent_seconds.unwrap_or(0);
        Self {
            result: dto.result.into_result(time_spent),
            quiz_title: dto.quiz_title,
            questions: dto
                .questions
                .into_iter()
                .map(|q| QuestionReview {
                    question_id: q.question_id,
                    text: q.text,
                    selected_option_id: q.selected_option_id,
                    selected_text: q.selected_text,
                    correct_option_id: q.correct_option_id,
                    correct_text: q.correct_text,
                    is_correct: q.is_correct,
                    points_awarded: q.points_awarded,
                    points: q.points,
                })
                .collect(),
        }
    }
}

//
// ─── LESSONS & REMEDIALS ───────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
pub(crate) struct LessonsDto {
    pub lessons: Vec<LessonDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LessonDto {
    pub lesson_id: LessonId,
    pub subject: String,
    pub title: String,
    #[serde(default)]
    pub position: u32,
    #[serde(default)]
    pub linked_quiz_id: Option<QuizId>,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub prerequisite_title: Option<String>,
}

impl From<LessonDto> for LessonCard {
    fn from(dto: LessonDto) -> Self {
        Self {
            id: dto.lesson_id,
            subject: dto.subject,
            title: dto.title,
            position: dto.position,
            linked_quiz_id: dto.linked_quiz_id,
            locked: dto.locked,
            prerequisite_title: dto.prerequisite_title,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RemedialsDto {
    #[serde(default)]
    pub remedials: Vec<RemedialDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RemedialDto {
    pub remedial_id: RemedialId,
    pub quiz_title: String,
    #[serde(default)]
    pub lesson_id: Option<LessonId>,
    pub status: RemedialStatus,
    pub assigned_at: DateTime<Utc>,
}

impl From<RemedialDto> for Remedial {
    fn from(dto: RemedialDto) -> Self {
        Self {
            id: dto.remedial_id,
            quiz_title: dto.quiz_title,
            lesson_id: dto.lesson_id,
            status: dto.status,
            assigned_at: dto.assigned_at,
        }
    }
}
