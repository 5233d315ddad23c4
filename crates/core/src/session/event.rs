use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::model::{AttemptResult, OptionId, QuestionId, QuizPaper};
use crate::session::submission::{SubmissionRequest, SubmitFailure};

/// Everything that can happen to a quiz session.
///
/// Every user action, timer signal and network outcome goes through
/// `QuizSession::apply`, so the transition table alone decides what is allowed.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Loaded {
        paper: QuizPaper,
        started_at: DateTime<Utc>,
    },
    LoadFailed {
        message: String,
    },
    Answered {
        question_id: QuestionId,
        option_id: OptionId,
    },
    Navigated {
        index: usize,
    },
    TimerTicked {
        remaining: u32,
    },
    TimerExpired,
    SubmitRequested {
        /// Monotonic time since the session started.
        elapsed: Duration,
    },
    SubmitResolved(Result<AttemptResult, SubmitFailure>),
    RetryRequested,
    /// The quiz screen went away.
    Abandoned,
}

impl SessionEvent {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::Loaded { .. } => "loaded",
            SessionEvent::LoadFailed { .. } => "load_failed",
            SessionEvent::Answered { .. } => "answered",
            SessionEvent::Navigated { .. } => "navigated",
            SessionEvent::TimerTicked { .. } => "timer_ticked",
            SessionEvent::TimerExpired => "timer_expired",
            SessionEvent::SubmitRequested { .. } => "submit_requested",
            SessionEvent::SubmitResolved(_) => "submit_resolved",
            SessionEvent::RetryRequested => "retry_requested",
            SessionEvent::Abandoned => "abandoned",
        }
    }
}

/// Side effect requested by a transition, carried out by the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StartTimer { limit_secs: u32 },
    StopTimer,
    Submit(SubmissionRequest),
}

/// Result of applying one event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[must_use]
pub struct Transition {
    /// False when the event was ignored in the current phase.
    pub accepted: bool,
    pub effects: Vec<Effect>,
}

impl Transition {
    pub(crate) fn ignored() -> Self {
        Self::default()
    }

    pub(crate) fn accepted() -> Self {
        Self {
            accepted: true,
            effects: Vec::new(),
        }
    }

    pub(crate) fn with(effects: Vec<Effect>) -> Self {
        Self {
            accepted: true,
            effects,
        }
    }

    /// The submission this transition asks for, if any.
    #[must_use]
    pub fn submission(&self) -> Option<&SubmissionRequest> {
        self.effects.iter().find_map(|effect| match effect {
            Effect::Submit(request) => Some(request),
            _ => None,
        })
    }
}
