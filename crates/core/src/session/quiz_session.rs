use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::model::{AttemptResult, OptionId, Question, QuestionId, Quiz, QuizId, QuizPaper};
use crate::session::countdown::low_time_threshold;
use crate::session::event::{Effect, SessionEvent, Transition};
use crate::session::ledger::AnswerLedger;
use crate::session::navigator::{Navigator, SessionProgress};
use crate::session::submission::{SubmissionRequest, SubmitFailure, SubmitTrigger};

//
// ─── PHASES ────────────────────────────────────────────────────────────────────
//

/// Controller state of a session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionPhase {
    Loading,
    /// Questions could not be fetched. Terminal; the page must be reloaded.
    LoadError { message: String },
    InProgress,
    /// Exactly one submission is in flight.
    Submitting,
    /// The last submission hit a transport failure. A retry is allowed.
    SubmitFailed(SubmitFailure),
    Submitted(AttemptResult),
    /// The server refused the attempt. Terminal.
    Rejected(SubmitFailure),
    /// The quiz screen was left before a submission started. Terminal.
    Abandoned,
}

impl SessionPhase {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionPhase::LoadError { .. }
                | SessionPhase::Submitted(_)
                | SessionPhase::Rejected(_)
                | SessionPhase::Abandoned
        )
    }
}

/// Lifecycle of the answers, as exposed on the session record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    InProgress,
    Submitting,
    Submitted,
    /// Time ran out; the forced submission has not been accepted yet.
    Expired,
}

impl SessionStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Submitting => "submitting",
            SessionStatus::Submitted => "submitted",
            SessionStatus::Expired => "expired",
        }
    }
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One attempt at a quiz, created per visit to the quiz screen.
///
/// Owns the answer ledger, the navigator and the countdown value. All changes
/// go through [`QuizSession::apply`]; entering `Submitting` is the only gate
/// that decides whether a submission is produced.
pub struct QuizSession {
    id: Uuid,
    quiz_id: QuizId,
    quiz: Option<Quiz>,
    questions: Vec<Question>,
    total_points: u32,
    ledger: AnswerLedger,
    navigator: Navigator,
    started_at: Option<DateTime<Utc>>,
    remaining_seconds: u32,
    phase: SessionPhase,
    trigger: Option<SubmitTrigger>,
    pending: Option<SubmissionRequest>,
    submissions_issued: u32,
}

impl QuizSession {
    /// A fresh session waiting for its questions.
    #[must_use]
    pub fn new(quiz_id: QuizId) -> Self {
        Self {
            id: Uuid::new_v4(),
            quiz_id,
            quiz: None,
            questions: Vec::new(),
            total_points: 0,
            ledger: AnswerLedger::new(),
            navigator: Navigator::new(0),
            started_at: None,
            remaining_seconds: 0,
            phase: SessionPhase::Loading,
            trigger: None,
            pending: None,
            submissions_issued: 0,
        }
    }

    /// Apply one event and report which side effects the runtime must perform.
    pub fn apply(&mut self, event: SessionEvent) -> Transition {
        match (&self.phase, event) {
            (SessionPhase::Loading, SessionEvent::Loaded { paper, started_at }) => {
                self.load(paper, started_at)
            }
            (SessionPhase::Loading, SessionEvent::LoadFailed { message }) => {
                self.phase = SessionPhase::LoadError { message };
                Transition::accepted()
            }
            (
                SessionPhase::InProgress,
                SessionEvent::Answered {
                    question_id,
                    option_id,
                },
            ) => self.answer(question_id, option_id),
            (SessionPhase::InProgress, SessionEvent::Navigated { index }) => {
                self.navigator.go_to(index);
                Transition::accepted()
            }
            (SessionPhase::InProgress, SessionEvent::TimerTicked { remaining }) => {
                self.remaining_seconds = self.remaining_seconds.min(remaining);
                Transition::accepted()
            }
            (SessionPhase::InProgress, SessionEvent::TimerExpired) => {
                self.remaining_seconds = 0;
                let limit = self.time_limit_seconds();
                self.begin_submit(SubmitTrigger::Timeout, limit)
            }
            (SessionPhase::InProgress, SessionEvent::SubmitRequested { elapsed }) => {
                let elapsed = u32::try_from(elapsed.as_secs()).unwrap_or(u32::MAX);
                let taken = elapsed.min(self.time_limit_seconds());
                self.begin_submit(SubmitTrigger::Manual, taken)
            }
            (SessionPhase::Submitting, SessionEvent::SubmitResolved(outcome)) => {
                self.phase = match outcome {
                    Ok(result) => SessionPhase::Submitted(result),
                    Err(failure) if failure.is_retryable() => SessionPhase::SubmitFailed(failure),
                    Err(failure) => SessionPhase::Rejected(failure),
                };
                Transition::accepted()
            }
            (SessionPhase::SubmitFailed(_), SessionEvent::RetryRequested) => {
                let Some(request) = self.pending.clone() else {
                    return Transition::ignored();
                };
                self.phase = SessionPhase::Submitting;
                self.submissions_issued += 1;
                Transition::with(vec![Effect::Submit(request)])
            }
            (SessionPhase::Loading | SessionPhase::InProgress, SessionEvent::Abandoned) => {
                self.phase = SessionPhase::Abandoned;
                Transition::with(vec![Effect::StopTimer])
            }
            // An in-flight or failed submission outlives the screen; only the timer goes.
            (SessionPhase::Submitting | SessionPhase::SubmitFailed(_), SessionEvent::Abandoned) => {
                Transition::with(vec![Effect::StopTimer])
            }
            _ => Transition::ignored(),
        }
    }

    fn load(&mut self, paper: QuizPaper, started_at: DateTime<Utc>) -> Transition {
        if paper.quiz().id() != self.quiz_id {
            self.phase = SessionPhase::LoadError {
                message: format!(
                    "expected quiz {}, server sent quiz {}",
                    self.quiz_id,
                    paper.quiz().id()
                ),
            };
            return Transition::accepted();
        }
        self.total_points = paper.total_points();
        let (quiz, questions) = paper.into_parts();
        let limit_secs = quiz.time_limit_seconds();
        self.navigator = Navigator::new(questions.len());
        self.questions = questions;
        self.quiz = Some(quiz);
        self.started_at = Some(started_at);
        self.remaining_seconds = limit_secs;
        self.phase = SessionPhase::InProgress;
        Transition::with(vec![Effect::StartTimer { limit_secs }])
    }

    fn answer(&mut self, question_id: QuestionId, option_id: OptionId) -> Transition {
        if !self.questions.iter().any(|q| q.id() == question_id) {
            return Transition::ignored();
        }
        self.ledger.set_answer(question_id, option_id);
        Transition::accepted()
    }

    fn begin_submit(&mut self, trigger: SubmitTrigger, time_taken_seconds: u32) -> Transition {
        let request = SubmissionRequest {
            quiz_id: self.quiz_id,
            answers: self.ledger.snapshot(),
            time_taken_seconds,
        };
        self.phase = SessionPhase::Submitting;
        self.trigger = Some(trigger);
        self.pending = Some(request.clone());
        self.submissions_issued += 1;
        Transition::with(vec![Effect::StopTimer, Effect::Submit(request)])
    }

    //
    // ─── ACCESSORS ─────────────────────────────────────────────────────────────
    //

    /// Per-visit identifier, used to tell sessions apart in logs.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn quiz_id(&self) -> QuizId {
        self.quiz_id
    }

    #[must_use]
    pub fn quiz(&self) -> Option<&Quiz> {
        self.quiz.as_ref()
    }

    #[must_use]
    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    /// Answer lifecycle; `None` until the questions are loaded or after a load failure.
    #[must_use]
    pub fn status(&self) -> Option<SessionStatus> {
        let expired = self.trigger == Some(SubmitTrigger::Timeout);
        match &self.phase {
            SessionPhase::Loading | SessionPhase::LoadError { .. } => None,
            SessionPhase::InProgress => Some(SessionStatus::InProgress),
            SessionPhase::Abandoned => self.quiz.as_ref().map(|_| SessionStatus::InProgress),
            SessionPhase::Submitted(_) => Some(SessionStatus::Submitted),
            SessionPhase::Submitting | SessionPhase::SubmitFailed(_) | SessionPhase::Rejected(_) => {
                Some(if expired {
                    SessionStatus::Expired
                } else {
                    SessionStatus::Submitting
                })
            }
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    /// True while answers and navigation are accepted.
    #[must_use]
    pub fn accepts_input(&self) -> bool {
        self.phase == SessionPhase::InProgress
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn total_points(&self) -> u32 {
        self.total_points
    }

    #[must_use]
    pub fn time_limit_seconds(&self) -> u32 {
        self.quiz.as_ref().map_or(0, Quiz::time_limit_seconds)
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    #[must_use]
    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    /// True when the remaining time is low enough to warn the student.
    #[must_use]
    pub fn is_low_time(&self) -> bool {
        self.accepts_input()
            && self.remaining_seconds <= low_time_threshold(self.time_limit_seconds())
    }

    #[must_use]
    pub fn navigator(&self) -> Navigator {
        self.navigator
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.navigator.current())
    }

    #[must_use]
    pub fn answer_for(&self, question: QuestionId) -> Option<OptionId> {
        self.ledger.answer(question)
    }

    #[must_use]
    pub fn current_answer(&self) -> Option<OptionId> {
        self.current_question()
            .and_then(|question| self.ledger.answer(question.id()))
    }

    #[must_use]
    pub fn ledger(&self) -> &AnswerLedger {
        &self.ledger
    }

    #[must_use]
    pub fn unanswered_ids(&self) -> Vec<QuestionId> {
        self.ledger.unanswered_ids(&self.questions)
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        let answered = self.ledger.answered_count(&self.questions);
        SessionProgress {
            total: self.questions.len(),
            answered,
            unanswered: self.questions.len().saturating_sub(answered),
            position: self.navigator.current() + 1,
        }
    }

    #[must_use]
    pub fn trigger(&self) -> Option<SubmitTrigger> {
        self.trigger
    }

    /// The frozen payload of the current submission, once one was produced.
    #[must_use]
    pub fn pending_submission(&self) -> Option<&SubmissionRequest> {
        self.pending.as_ref()
    }

    /// Number of `Submit` effects this session has produced.
    #[must_use]
    pub fn submissions_issued(&self) -> u32 {
        self.submissions_issued
    }

    #[must_use]
    pub fn result(&self) -> Option<&AttemptResult> {
        match &self.phase {
            SessionPhase::Submitted(result) => Some(result),
            _ => None,
        }
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("id", &self.id)
            .field("quiz_id", &self.quiz_id)
            .field("questions_len", &self.questions.len())
            .field("answered", &self.ledger.answered_count(&self.questions))
            .field("current", &self.navigator.current())
            .field("remaining_seconds", &self.remaining_seconds)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}
