mod countdown;
mod event;
mod ledger;
mod navigator;
mod quiz_session;
mod submission;

#[cfg(test)]
mod tests;

pub use countdown::{Countdown, CountdownStep, low_time_threshold};
pub use event::{Effect, SessionEvent, Transition};
pub use ledger::AnswerLedger;
pub use navigator::{Navigator, SessionProgress};
pub use quiz_session::{QuizSession, SessionPhase, SessionStatus};
pub use submission::{RejectionReason, SubmissionRequest, SubmitFailure, SubmitTrigger};
