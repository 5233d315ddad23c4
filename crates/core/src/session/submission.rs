use std::collections::BTreeMap;

use thiserror::Error;

use crate::model::{OptionId, QuestionId, QuizId};

/// What moved the session into `Submitting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitTrigger {
    Manual,
    Timeout,
}

/// Payload of a submission, frozen when the session enters `Submitting`.
///
/// A retry re-sends this exact value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRequest {
    pub quiz_id: QuizId,
    pub answers: BTreeMap<QuestionId, OptionId>,
    pub time_taken_seconds: u32,
}

/// Why the backend refused an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    NoAttemptsRemaining,
    AlreadySubmitted,
    Other,
}

/// Failure of one submission call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SubmitFailure {
    /// The request never produced a usable answer (network, timeout, 5xx).
    #[error("could not reach the server: {message}")]
    Transport { message: String },

    /// The server refused the attempt. Retrying cannot succeed.
    #[error("submission rejected: {message}")]
    Rejected {
        reason: RejectionReason,
        message: String,
    },
}

impl SubmitFailure {
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn rejected(reason: RejectionReason, message: impl Into<String>) -> Self {
        Self::Rejected {
            reason,
            message: message.into(),
        }
    }

    /// Only transport failures may be retried, and only by an explicit user action.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}
