use lms_core::mastery::MasteryDecision;
use lms_core::model::{OptionId, Question, QuestionId};
use lms_core::session::{QuizSession, RejectionReason, SessionPhase, SubmitFailure, SubmitTrigger};

use crate::vm::result_vm::ActionVm;
use crate::vm::time_fmt::format_countdown;

/// Everything the student can do on the quiz screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuizIntent {
    Choose {
        question_id: QuestionId,
        option_id: OptionId,
    },
    GoTo(usize),
    Next,
    Previous,
    /// Manual submit; asks first while questions are unanswered.
    Submit,
    ConfirmSubmit,
    CancelSubmit,
    Retry,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChoiceVm {
    pub id: OptionId,
    pub text: String,
    pub selected: bool,
}

/// One question as shown on screen. Built from the question and its current answer only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionVm {
    pub id: QuestionId,
    pub heading: String,
    pub text: String,
    pub kind_label: &'static str,
    pub points_label: String,
    pub choices: Vec<ChoiceVm>,
}

impl QuestionVm {
    #[must_use]
    pub fn new(question: &Question, position: usize, total: usize, answer: Option<OptionId>) -> Self {
        let points = question.points();
        Self {
            id: question.id(),
            heading: format!("Question {position} of {total}"),
            text: question.text().to_string(),
            kind_label: question.kind().label(),
            points_label: if points == 1 {
                "1 point".to_string()
            } else {
                format!("{points} points")
            },
            choices: question
                .choices()
                .iter()
                .map(|choice| ChoiceVm {
                    id: choice.id,
                    text: choice.text.clone(),
                    selected: answer == Some(choice.id),
                })
                .collect(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaletteItemVm {
    pub index: usize,
    pub number: usize,
    pub answered: bool,
    pub current: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClockVm {
    pub text: String,
    pub urgent: bool,
}

/// Screen model of a session that accepts input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizVm {
    pub title: String,
    pub question: Option<QuestionVm>,
    pub palette: Vec<PaletteItemVm>,
    pub clock: ClockVm,
    pub progress_label: String,
    pub unanswered: usize,
    pub can_go_back: bool,
    pub can_go_forward: bool,
}

/// What the quiz screen shows for the current session phase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QuizScreen {
    Loading,
    LoadError { message: String },
    Answering(QuizVm),
    Submitting { message: &'static str },
    SubmitFailed { message: String },
    /// Terminal; the view returns to the lesson list on its own.
    Rejected { message: String, actions: Vec<ActionVm> },
    Submitted { attempt_id: u64 },
    Left,
}

#[must_use]
pub fn quiz_screen(session: &QuizSession) -> QuizScreen {
    match session.phase() {
        SessionPhase::Loading => QuizScreen::Loading,
        SessionPhase::LoadError { message } => QuizScreen::LoadError {
            message: message.clone(),
        },
        SessionPhase::InProgress => QuizScreen::Answering(quiz_vm(session)),
        SessionPhase::Submitting => QuizScreen::Submitting {
            message: match session.trigger() {
                Some(SubmitTrigger::Timeout) => "Time is up. Submitting your answers...",
                _ => "Submitting your answers...",
            },
        },
        SessionPhase::SubmitFailed(failure) => QuizScreen::SubmitFailed {
            message: failure.to_string(),
        },
        SessionPhase::Rejected(failure) => QuizScreen::Rejected {
            message: rejection_message(failure),
            actions: MasteryDecision::after_rejection()
                .steps
                .into_iter()
                .map(ActionVm::from)
                .collect(),
        },
        SessionPhase::Submitted(result) => QuizScreen::Submitted {
            attempt_id: result.attempt_id.value(),
        },
        SessionPhase::Abandoned => QuizScreen::Left,
    }
}

fn quiz_vm(session: &QuizSession) -> QuizVm {
    let progress = session.progress();
    let navigator = session.navigator();
    let current = navigator.current();
    QuizVm {
        title: session
            .quiz()
            .map(|quiz| quiz.title().to_string())
            .unwrap_or_default(),
        question: session.current_question().map(|question| {
            QuestionVm::new(
                question,
                progress.position,
                progress.total,
                session.answer_for(question.id()),
            )
        }),
        palette: session
            .questions()
            .iter()
            .enumerate()
            .map(|(index, question)| PaletteItemVm {
                index,
                number: index + 1,
                answered: session.answer_for(question.id()).is_some(),
                current: index == current,
            })
            .collect(),
        clock: ClockVm {
            text: format_countdown(session.remaining_seconds()),
            urgent: session.is_low_time(),
        },
        progress_label: format!("{} of {} answered", progress.answered, progress.total),
        unanswered: progress.unanswered,
        can_go_back: !navigator.is_first(),
        can_go_forward: !navigator.is_last(),
    }
}

fn rejection_message(failure: &SubmitFailure) -> String {
    match failure {
        SubmitFailure::Rejected {
            reason: RejectionReason::NoAttemptsRemaining,
            ..
        } => "You have no attempts left for this quiz.".to_string(),
        SubmitFailure::Rejected {
            reason: RejectionReason::AlreadySubmitted,
            ..
        } => "This attempt was already submitted.".to_string(),
        SubmitFailure::Rejected { message, .. } => format!("The server refused this attempt: {message}"),
        other => other.to_string(),
    }
}

/// Prompt shown before a manual submit when questions are still open.
#[must_use]
pub fn submit_confirmation(unanswered: usize) -> Option<String> {
    match unanswered {
        0 => None,
        1 => Some("You have 1 unanswered question. Submit anyway?".to_string()),
        n => Some(format!("You have {n} unanswered questions. Submit anyway?")),
    }
}
