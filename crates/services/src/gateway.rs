use std::sync::Arc;

use reqwest::StatusCode;
use tracing::{info, warn};

use lms_core::model::AttemptResult;
use lms_core::session::{RejectionReason, SubmissionRequest, SubmitFailure};

use crate::api::{LmsBackend, REJECT_ALREADY_SUBMITTED, REJECT_NO_ATTEMPTS};
use crate::error::ApiError;

/// Sends a frozen submission and sorts failures into retryable and terminal.
///
/// The gateway never retries on its own; a retry is always a user action that
/// goes back through the session.
#[derive(Clone)]
pub struct SubmissionGateway {
    backend: Arc<dyn LmsBackend>,
}

impl SubmissionGateway {
    #[must_use]
    pub fn new(backend: Arc<dyn LmsBackend>) -> Self {
        Self { backend }
    }

    #[must_use]
    pub fn backend(&self) -> &Arc<dyn LmsBackend> {
        &self.backend
    }

    /// Submit `request` exactly once.
    ///
    /// # Errors
    ///
    /// Returns `SubmitFailure::Transport` when no usable answer came back and
    /// `SubmitFailure::Rejected` when the server refused the attempt.
    pub async fn submit(&self, request: &SubmissionRequest) -> Result<AttemptResult, SubmitFailure> {
        match self.backend.submit_attempt(request).await {
            Ok(result) => {
                info!(
                    quiz_id = %request.quiz_id,
                    attempt_id = %result.attempt_id,
                    passed = result.passed,
                    percentage = result.percentage,
                    "attempt accepted"
                );
                Ok(result)
            }
            Err(err) => {
                let failure = classify(err);
                warn!(
                    quiz_id = %request.quiz_id,
                    retryable = failure.is_retryable(),
                    error = %failure,
                    "attempt not accepted"
                );
                Err(failure)
            }
        }
    }
}

/// Sort a backend error into a retryable or terminal submission failure.
#[must_use]
pub fn classify(err: ApiError) -> SubmitFailure {
    match err {
        ApiError::Status {
            status,
            code,
            message,
        } if !is_transient(status) => {
            let reason = match code.as_deref() {
                Some(REJECT_NO_ATTEMPTS) => RejectionReason::NoAttemptsRemaining,
                Some(REJECT_ALREADY_SUBMITTED) => RejectionReason::AlreadySubmitted,
                _ => RejectionReason::Other,
            };
            SubmitFailure::rejected(reason, message)
        }
        other => SubmitFailure::transport(other.to_string()),
    }
}

fn is_transient(status: StatusCode) -> bool {
    status.is_server_error()
        || status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
}
