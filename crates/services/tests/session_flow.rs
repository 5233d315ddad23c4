use std::sync::Arc;
use std::time::Duration;

use lms_core::mastery::{MasteryDecision, NextStep};
use lms_core::model::{
    Choice, LessonCard, LessonId, OptionId, Question, QuestionId, QuestionKind, Quiz, QuizId,
    QuizPaper,
};
use lms_core::session::{SessionPhase, SessionStatus, SubmitTrigger};
use lms_core::time::fixed_clock;
use services::api::REJECT_NO_ATTEMPTS;
use services::{CourseService, InMemoryBackend, ScriptedSubmit, SessionController, TimerSignal};
use tokio::time::Instant;

fn question(id: u64) -> Question {
    Question::new(
        QuestionId::new(id),
        format!("Question {id}"),
        QuestionKind::MultipleChoice,
        1,
        vec![
            Choice::new(OptionId::new(id * 10 + 1), "A"),
            Choice::new(OptionId::new(id * 10 + 2), "B"),
            Choice::new(OptionId::new(id * 10 + 3), "C"),
        ],
    )
    .unwrap()
}

fn one_minute_quiz() -> QuizPaper {
    let quiz = Quiz::new(QuizId::new(12), "Cells", 1, 70).unwrap();
    QuizPaper::new(quiz, vec![question(1), question(2), question(3)]).unwrap()
}

fn backend() -> Arc<InMemoryBackend> {
    let key = [(1, 11), (2, 22), (3, 33)]
        .map(|(q, o)| (QuestionId::new(q), OptionId::new(o)));
    Arc::new(
        InMemoryBackend::new(fixed_clock())
            .with_quiz(one_minute_quiz(), key)
            .with_lesson(LessonCard {
                id: LessonId::new(77),
                subject: "Biology".into(),
                title: "Cells".into(),
                position: 1,
                linked_quiz_id: Some(QuizId::new(12)),
                locked: false,
                prerequisite_title: None,
            })
            .with_lesson(LessonCard {
                id: LessonId::new(78),
                subject: "Biology".into(),
                title: "Division".into(),
                position: 2,
                linked_quiz_id: None,
                locked: true,
                prerequisite_title: None,
            }),
    )
}

async fn open(backend: &Arc<InMemoryBackend>) -> SessionController {
    SessionController::open(backend.clone(), QuizId::new(12), fixed_clock()).await
}

#[tokio::test(start_paused = true)]
async fn one_minute_quiz_submits_itself_at_the_deadline() {
    let backend = backend();
    let started = Instant::now();
    let mut controller = open(&backend).await;
    controller.answer(QuestionId::new(1), OptionId::new(11));

    let phase = controller.run_to_deadline().await.clone();

    let waited = started.elapsed();
    assert!(waited >= Duration::from_secs(60) && waited <= Duration::from_secs(61));
    assert!(matches!(phase, SessionPhase::Submitted(_)));
    assert_eq!(controller.session().trigger(), Some(SubmitTrigger::Timeout));
    let sent = backend.submissions();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].time_taken_seconds, 60);
    assert_eq!(sent[0].answers.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn ticks_count_down_without_going_back_up() {
    let backend = backend();
    let mut controller = open(&backend).await;
    let mut seen = Vec::new();

    for _ in 0..5 {
        let signal = controller.next_timer_signal().await.unwrap();
        controller.on_timer(signal);
        seen.push(controller.session().remaining_seconds());
    }

    assert_eq!(seen, vec![59, 58, 57, 56, 55]);
}

#[tokio::test(start_paused = true)]
async fn revised_answers_are_sent_once_as_last_written() {
    let backend = backend();
    let mut controller = open(&backend).await;

    controller.answer(QuestionId::new(1), OptionId::new(11));
    controller.next();
    controller.answer(QuestionId::new(2), OptionId::new(22));
    controller.previous();
    controller.answer(QuestionId::new(1), OptionId::new(13));
    assert_eq!(controller.session().current_answer(), Some(OptionId::new(13)));
    assert_eq!(controller.session().progress().unanswered, 1);

    tokio::time::sleep(Duration::from_secs(42)).await;
    assert!(controller.submit_now().await);

    let sent = backend.submissions();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].time_taken_seconds, 42);
    assert_eq!(
        sent[0].answers.iter().map(|(q, o)| (q.value(), o.value())).collect::<Vec<_>>(),
        vec![(1, 13), (2, 22)]
    );
    assert!(!controller.answer(QuestionId::new(3), OptionId::new(33)));
}

#[tokio::test(start_paused = true)]
async fn manual_submit_beats_a_pending_expiry() {
    let backend = backend();
    let mut controller = open(&backend).await;
    tokio::time::sleep(Duration::from_secs(60)).await;

    let manual = controller.request_submit().expect("manual submit wins the gate");
    while let Some(signal) = controller.next_timer_signal().await {
        assert!(controller.on_timer(signal).is_none());
    }
    assert!(controller.on_timer(TimerSignal::Expired).is_none());
    controller.submit(manual).await;

    assert_eq!(backend.submission_count(), 1);
    assert_eq!(controller.session().trigger(), Some(SubmitTrigger::Manual));
}

#[tokio::test(start_paused = true)]
async fn expiry_beats_a_late_manual_submit() {
    let backend = backend();
    let mut controller = open(&backend).await;

    let forced = loop {
        let signal = controller.next_timer_signal().await.expect("timer running");
        if let Some(request) = controller.on_timer(signal) {
            break request;
        }
    };
    assert_eq!(controller.session().status(), Some(SessionStatus::Expired));
    assert!(controller.request_submit().is_none());
    controller.submit(forced).await;

    assert_eq!(backend.submission_count(), 1);
    assert_eq!(controller.session().status(), Some(SessionStatus::Submitted));
}

#[tokio::test(start_paused = true)]
async fn transport_failure_retries_the_same_payload() {
    let backend = backend();
    backend.script_submit(ScriptedSubmit::TransportFailure);
    let mut controller = open(&backend).await;
    controller.answer(QuestionId::new(2), OptionId::new(22));

    assert!(controller.submit_now().await);
    assert!(matches!(
        controller.session().phase(),
        SessionPhase::SubmitFailed(_)
    ));
    assert!(!controller.is_timer_running());
    assert!(!controller.answer(QuestionId::new(1), OptionId::new(11)));

    tokio::time::sleep(Duration::from_secs(30)).await;
    let retry = controller.retry().expect("retry allowed after transport failure");
    controller.submit(retry).await;

    assert!(matches!(
        controller.session().phase(),
        SessionPhase::Submitted(_)
    ));
    let sent = backend.submissions();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0], sent[1]);
}

#[tokio::test(start_paused = true)]
async fn refusal_is_terminal() {
    let backend = backend();
    backend.script_submit(ScriptedSubmit::Reject {
        code: REJECT_NO_ATTEMPTS,
    });
    let mut controller = open(&backend).await;

    controller.submit_now().await;

    assert!(matches!(
        controller.session().phase(),
        SessionPhase::Rejected(_)
    ));
    assert!(controller.retry().is_none());
    assert_eq!(backend.submission_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn unreachable_backend_is_a_load_error() {
    let backend = backend();
    backend.set_unavailable(true);

    let controller = open(&backend).await;

    assert!(matches!(
        controller.session().phase(),
        SessionPhase::LoadError { .. }
    ));
    assert!(!controller.is_timer_running());
}

#[tokio::test(start_paused = true)]
async fn leaving_the_quiz_stops_everything() {
    let backend = backend();
    let mut controller = open(&backend).await;
    controller.answer(QuestionId::new(1), OptionId::new(11));

    controller.abandon();

    assert_eq!(controller.session().phase(), &SessionPhase::Abandoned);
    assert!(!controller.is_timer_running());
    assert!(controller.request_submit().is_none());
    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(backend.submission_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn failing_points_back_to_the_lesson_and_remedials() {
    let backend = backend();
    let course = CourseService::new(backend.clone());
    let mut controller = open(&backend).await;
    controller.answer(QuestionId::new(1), OptionId::new(11));

    controller.submit_now().await;

    let result = controller.session().result().expect("graded").clone();
    assert!(!result.passed);
    let decision = MasteryDecision::from_result(&result);
    assert_eq!(
        decision.steps,
        vec![NextStep::RestudyLesson(LessonId::new(77)), NextStep::OpenRemedials]
    );
    assert_eq!(course.remedials().await.unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn passing_unlocks_the_next_lesson() {
    let backend = backend();
    let course = CourseService::new(backend.clone());
    let before = course.lessons().await.unwrap();
    let mut controller = open(&backend).await;
    for (q, o) in [(1, 11), (2, 22), (3, 33)] {
        controller.answer(QuestionId::new(q), OptionId::new(o));
    }

    controller.submit_now().await;

    let result = controller.session().result().expect("graded").clone();
    assert!(result.passed);
    let refresh = course
        .refresh_after(&result, &before)
        .await
        .unwrap()
        .expect("lessons refreshed");
    assert_eq!(
        refresh.unlocked.iter().map(|lesson| lesson.id).collect::<Vec<_>>(),
        vec![LessonId::new(78)]
    );
    assert_eq!(refresh.unlocked[0].title, "Division");
    assert!(refresh.lessons.iter().all(|lesson| !lesson.locked));
}
