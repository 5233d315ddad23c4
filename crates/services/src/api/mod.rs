//! Backend contract consumed by the client, plus its adapters.

mod dto;
mod http;
mod memory;

use async_trait::async_trait;

use lms_core::model::{
    AttemptId, AttemptResult, AttemptReview, LessonCard, QuizId, QuizPaper, Remedial,
};
use lms_core::session::SubmissionRequest;

use crate::error::ApiError;

pub use dto::{ErrorBody, REJECT_ALREADY_SUBMITTED, REJECT_NO_ATTEMPTS};
pub use http::HttpBackend;
pub use memory::{InMemoryBackend, ScriptedSubmit};

/// Remote LMS endpoints used by the assessment flow.
#[async_trait]
pub trait LmsBackend: Send + Sync {
    /// `GET /quizzes/{id}/questions`
    ///
    /// # Errors
    ///
    /// Returns `ApiError` for transport failures, error statuses or malformed payloads.
    async fn quiz_paper(&self, quiz_id: QuizId) -> Result<QuizPaper, ApiError>;

    /// `POST /quiz-attempts/submit`
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` when the server refuses the attempt, other
    /// variants for transport failures.
    async fn submit_attempt(&self, request: &SubmissionRequest)
    -> Result<AttemptResult, ApiError>;

    /// `GET /quiz-attempts/{attemptId}/result`
    ///
    /// # Errors
    ///
    /// Returns `ApiError` for transport failures, error statuses or malformed payloads.
    async fn attempt_review(&self, attempt_id: AttemptId) -> Result<AttemptReview, ApiError>;

    /// `GET /lessons`
    ///
    /// # Errors
    ///
    /// Returns `ApiError` for transport failures, error statuses or malformed payloads.
    async fn lessons(&self) -> Result<Vec<LessonCard>, ApiError>;

    /// `GET /remedials`
    ///
    /// # Errors
    ///
    /// Returns `ApiError` for transport failures, error statuses or malformed payloads.
    async fn remedials(&self) -> Result<Vec<Remedial>, ApiError>;
}
