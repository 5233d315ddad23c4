use std::time::Duration;

use crate::model::{
    AttemptId, AttemptResult, Choice, LessonId, OptionId, Question, QuestionId, QuestionKind,
    Quiz, QuizId, QuizPaper,
};
use crate::session::{
    Effect, QuizSession, RejectionReason, SessionEvent, SessionPhase, SessionStatus,
    SubmitFailure, SubmitTrigger,
};
use crate::time::fixed_now;

fn question(id: u64, points: u32) -> Question {
    Question::new(
        QuestionId::new(id),
        format!("Question {id}"),
        QuestionKind::MultipleChoice,
        points,
        vec![
            Choice::new(OptionId::new(id * 10 + 1), "A"),
            Choice::new(OptionId::new(id * 10 + 2), "B"),
            Choice::new(OptionId::new(id * 10 + 3), "C"),
        ],
    )
    .unwrap()
}

fn paper(minutes: u32) -> QuizPaper {
    let quiz = Quiz::new(QuizId::new(5), "Cells", minutes, 60).unwrap();
    QuizPaper::new(quiz, vec![question(1, 1), question(2, 1), question(3, 2)]).unwrap()
}

fn loaded(minutes: u32) -> QuizSession {
    let mut session = QuizSession::new(QuizId::new(5));
    let _ = session.apply(SessionEvent::Loaded {
        paper: paper(minutes),
        started_at: fixed_now(),
    });
    session
}

fn answer(session: &mut QuizSession, q: u64, o: u64) -> bool {
    session
        .apply(SessionEvent::Answered {
            question_id: QuestionId::new(q),
            option_id: OptionId::new(o),
        })
        .accepted
}

fn result(passed: bool) -> AttemptResult {
    AttemptResult {
        attempt_id: AttemptId::new(900),
        earned_points: 1.0,
        total_points: 4.0,
        percentage: 25.0,
        passed,
        time_spent_seconds: 30,
        linked_lesson_id: Some(LessonId::new(77)),
        remedial_id: None,
    }
}

#[test]
fn loading_starts_the_timer_with_the_quiz_limit() {
    let mut session = QuizSession::new(QuizId::new(5));
    assert_eq!(session.phase(), &SessionPhase::Loading);
    assert_eq!(session.status(), None);

    let transition = session.apply(SessionEvent::Loaded {
        paper: paper(2),
        started_at: fixed_now(),
    });

    assert!(transition.accepted);
    assert_eq!(transition.effects, vec![Effect::StartTimer { limit_secs: 120 }]);
    assert_eq!(session.status(), Some(SessionStatus::InProgress));
    assert_eq!(session.remaining_seconds(), 120);
    assert_eq!(session.total_points(), 4);
    assert_eq!(session.started_at(), Some(fixed_now()));
}

#[test]
fn load_failure_is_terminal() {
    let mut session = QuizSession::new(QuizId::new(5));
    let _ = session.apply(SessionEvent::LoadFailed {
        message: "offline".into(),
    });
    assert!(session.is_terminal());
    assert!(!session.apply(SessionEvent::Loaded {
        paper: paper(1),
        started_at: fixed_now(),
    })
    .accepted);
}

#[test]
fn paper_for_another_quiz_is_a_load_error() {
    let mut session = QuizSession::new(QuizId::new(6));
    let transition = session.apply(SessionEvent::Loaded {
        paper: paper(1),
        started_at: fixed_now(),
    });
    assert!(transition.effects.is_empty());
    assert!(matches!(session.phase(), SessionPhase::LoadError { .. }));
}

#[test]
fn revisiting_a_question_shows_the_last_answer() {
    let mut session = loaded(5);
    answer(&mut session, 1, 11);
    let _ = session.apply(SessionEvent::Navigated { index: 2 });
    answer(&mut session, 3, 31);
    let _ = session.apply(SessionEvent::Navigated { index: 0 });
    answer(&mut session, 1, 13);
    let _ = session.apply(SessionEvent::Navigated { index: 1 });
    assert_eq!(session.current_answer(), None);
    let _ = session.apply(SessionEvent::Navigated { index: 0 });

    assert_eq!(session.current_answer(), Some(OptionId::new(13)));
    let _ = session.apply(SessionEvent::Navigated { index: 99 });
    assert_eq!(session.navigator().current(), 2);
    assert_eq!(session.current_answer(), Some(OptionId::new(31)));
}

#[test]
fn answers_for_unknown_questions_are_ignored() {
    let mut session = loaded(5);
    assert!(!answer(&mut session, 42, 1));
    assert_eq!(session.progress().answered, 0);
}

#[test]
fn manual_submit_freezes_payload_and_stops_timer() {
    let mut session = loaded(5);
    answer(&mut session, 1, 11);
    answer(&mut session, 2, 22);

    let transition = session.apply(SessionEvent::SubmitRequested {
        elapsed: Duration::from_millis(42_700),
    });

    let request = transition.submission().cloned().unwrap();
    assert_eq!(transition.effects[0], Effect::StopTimer);
    assert_eq!(request.quiz_id, QuizId::new(5));
    assert_eq!(request.time_taken_seconds, 42);
    assert_eq!(request.answers.len(), 2);
    assert_eq!(request.answers.get(&QuestionId::new(1)), Some(&OptionId::new(11)));
    assert_eq!(request.answers.get(&QuestionId::new(2)), Some(&OptionId::new(22)));
    assert!(!request.answers.contains_key(&QuestionId::new(3)));
    assert_eq!(session.status(), Some(SessionStatus::Submitting));
    assert_eq!(session.trigger(), Some(SubmitTrigger::Manual));
    assert_eq!(session.unanswered_ids(), vec![QuestionId::new(3)]);
}

#[test]
fn submit_and_expiry_in_the_same_tick_submit_once() {
    let mut session = loaded(1);
    let first = session.apply(SessionEvent::SubmitRequested {
        elapsed: Duration::from_secs(59),
    });
    let second = session.apply(SessionEvent::TimerExpired);
    assert!(first.submission().is_some());
    assert!(!second.accepted);
    assert!(second.effects.is_empty());

    let mut session = loaded(1);
    let first = session.apply(SessionEvent::TimerExpired);
    let second = session.apply(SessionEvent::SubmitRequested {
        elapsed: Duration::from_secs(60),
    });
    assert!(first.submission().is_some());
    assert!(second.submission().is_none());
    assert_eq!(session.submissions_issued(), 1);
}

#[test]
fn nothing_mutates_the_session_once_submitting() {
    let mut session = loaded(5);
    answer(&mut session, 1, 11);
    let _ = session.apply(SessionEvent::TimerTicked { remaining: 200 });
    let _ = session.apply(SessionEvent::SubmitRequested {
        elapsed: Duration::from_secs(100),
    });

    assert!(!answer(&mut session, 1, 12));
    assert!(!session.apply(SessionEvent::Navigated { index: 2 }).accepted);
    assert!(!session.apply(SessionEvent::TimerTicked { remaining: 150 }).accepted);
    assert_eq!(session.answer_for(QuestionId::new(1)), Some(OptionId::new(11)));
    assert_eq!(session.navigator().current(), 0);
    assert_eq!(session.remaining_seconds(), 200);
}

#[test]
fn ticks_never_raise_the_remaining_time() {
    let mut session = loaded(1);
    let _ = session.apply(SessionEvent::TimerTicked { remaining: 30 });
    let _ = session.apply(SessionEvent::TimerTicked { remaining: 45 });
    assert_eq!(session.remaining_seconds(), 30);
}

#[test]
fn timeout_submits_with_the_full_limit_and_marks_expired() {
    let mut session = loaded(1);
    answer(&mut session, 2, 21);
    let transition = session.apply(SessionEvent::TimerExpired);

    let request = transition.submission().unwrap();
    assert_eq!(request.time_taken_seconds, 60);
    assert_eq!(session.remaining_seconds(), 0);
    assert_eq!(session.status(), Some(SessionStatus::Expired));
    assert!(!session.is_low_time());
}

#[test]
fn manual_time_taken_is_capped_at_the_limit() {
    let mut session = loaded(1);
    let transition = session.apply(SessionEvent::SubmitRequested {
        elapsed: Duration::from_secs(75),
    });
    assert_eq!(transition.submission().unwrap().time_taken_seconds, 60);
}

#[test]
fn transport_failure_allows_one_retry_with_the_same_payload() {
    let mut session = loaded(5);
    answer(&mut session, 1, 11);
    let first = session.apply(SessionEvent::SubmitRequested {
        elapsed: Duration::from_secs(10),
    });
    let original = first.submission().cloned().unwrap();

    let _ = session.apply(SessionEvent::SubmitResolved(Err(SubmitFailure::transport(
        "connection reset",
    ))));
    assert!(matches!(session.phase(), SessionPhase::SubmitFailed(_)));
    assert!(!session.is_terminal());
    assert!(!answer(&mut session, 2, 21));

    let retry = session.apply(SessionEvent::RetryRequested);
    assert_eq!(retry.effects, vec![Effect::Submit(original)]);
    assert_eq!(session.phase(), &SessionPhase::Submitting);
    assert!(!session.apply(SessionEvent::RetryRequested).accepted);
    assert_eq!(session.submissions_issued(), 2);

    let _ = session.apply(SessionEvent::SubmitResolved(Ok(result(true))));
    assert_eq!(session.status(), Some(SessionStatus::Submitted));
    assert_eq!(session.result().map(|r| r.attempt_id), Some(AttemptId::new(900)));
}

#[test]
fn rejection_is_terminal_and_not_retryable() {
    let mut session = loaded(5);
    let _ = session.apply(SessionEvent::SubmitRequested {
        elapsed: Duration::from_secs(10),
    });
    let _ = session.apply(SessionEvent::SubmitResolved(Err(SubmitFailure::rejected(
        RejectionReason::NoAttemptsRemaining,
        "no attempts remaining",
    ))));

    assert!(session.is_terminal());
    assert!(!session.apply(SessionEvent::RetryRequested).accepted);
    assert_eq!(session.submissions_issued(), 1);
}

#[test]
fn stale_resolution_outside_submitting_is_ignored() {
    let mut session = loaded(5);
    let transition = session.apply(SessionEvent::SubmitResolved(Ok(result(true))));
    assert!(!transition.accepted);
    assert_eq!(session.phase(), &SessionPhase::InProgress);
}

#[test]
fn leaving_the_screen_stops_the_timer() {
    let mut session = loaded(5);
    let transition = session.apply(SessionEvent::Abandoned);
    assert_eq!(transition.effects, vec![Effect::StopTimer]);
    assert!(session.is_terminal());
    assert!(!session.apply(SessionEvent::TimerExpired).accepted);
}

#[test]
fn leaving_during_submission_keeps_the_request_alive() {
    let mut session = loaded(5);
    let _ = session.apply(SessionEvent::SubmitRequested {
        elapsed: Duration::from_secs(3),
    });
    let _ = session.apply(SessionEvent::Abandoned);
    assert_eq!(session.phase(), &SessionPhase::Submitting);

    let _ = session.apply(SessionEvent::SubmitResolved(Ok(result(false))));
    assert!(session.result().is_some());
}

#[test]
fn low_time_warning_follows_the_remaining_seconds() {
    let mut session = loaded(1);
    assert!(!session.is_low_time());
    let _ = session.apply(SessionEvent::TimerTicked { remaining: 10 });
    assert!(session.is_low_time());
}
