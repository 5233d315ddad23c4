use std::time::Duration;

use lms_core::model::{
    Choice, OptionId, Question, QuestionId, QuestionKind, Quiz, QuizId, QuizPaper,
};
use lms_core::session::SubmissionRequest;
use lms_core::time::fixed_clock;
use services::api::REJECT_NO_ATTEMPTS;
use services::{InMemoryBackend, LmsBackend, ScriptedSubmit};

use super::test_harness::{ViewKind, setup_view_harness};
use crate::vm::QuizIntent;
use dioxus::prelude::ReadableExt;

fn course() -> InMemoryBackend {
    InMemoryBackend::sample_course(fixed_clock())
}

fn one_minute_quiz() -> InMemoryBackend {
    let questions = (1..=2)
        .map(|id| {
            Question::new(
                QuestionId::new(id),
                format!("Statement {id}"),
                QuestionKind::TrueFalse,
                1,
                vec![
                    Choice::new(OptionId::new(id * 10 + 1), "True"),
                    Choice::new(OptionId::new(id * 10 + 2), "False"),
                ],
            )
            .unwrap()
        })
        .collect();
    let quiz = Quiz::new(QuizId::new(30), "Quick Check", 1, 50).unwrap();
    let key = [(1, 11), (2, 21)].map(|(q, o)| (QuestionId::new(q), OptionId::new(o)));
    InMemoryBackend::new(fixed_clock()).with_quiz(QuizPaper::new(quiz, questions).unwrap(), key)
}

#[tokio::test(flavor = "current_thread")]
async fn lessons_view_smoke_groups_and_locks() {
    let mut harness = setup_view_harness(ViewKind::Lessons, course());
    harness.settle().await;

    let html = harness.render();
    assert!(html.contains("Biology"), "missing subject in {html}");
    assert!(html.contains("Cell Structure"), "missing lesson in {html}");
    assert!(html.contains("Locked"), "missing lock badge in {html}");
    assert!(html.contains("Take quiz"), "missing quiz link in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn lessons_view_smoke_renders_error_state() {
    let backend = course();
    backend.set_unavailable(true);
    let mut harness = setup_view_harness(ViewKind::Lessons, backend);
    harness.settle().await;

    let html = harness.render();
    assert!(html.contains("Something went wrong"), "missing error in {html}");
    assert!(html.contains("Retry"), "missing retry in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn remedials_view_smoke_tolerates_empty_list() {
    let mut harness = setup_view_harness(ViewKind::Remedials, course());
    harness.settle().await;

    let html = harness.render();
    assert!(html.contains("may take a moment to appear"), "missing notice in {html}");
    assert!(!html.contains("Something went wrong"), "unexpected error in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn take_quiz_smoke_renders_first_question_and_clock() {
    let mut harness = setup_view_harness(ViewKind::TakeQuiz("1".into()), course());
    harness.settle().await;

    let html = harness.render();
    assert!(html.contains("Cell Structure Check"), "missing title in {html}");
    assert!(html.contains("Question 1 of 3"), "missing heading in {html}");
    assert!(html.contains("5:00") || html.contains("4:59"), "missing clock in {html}");
    assert!(html.contains("Nucleus"), "missing choice in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn take_quiz_smoke_answers_and_moves_on() {
    let mut harness = setup_view_harness(ViewKind::TakeQuiz("1".into()), course());
    harness.settle().await;

    harness
        .dispatch(QuizIntent::Choose {
            question_id: QuestionId::new(101),
            option_id: OptionId::new(1011),
        })
        .await;
    harness.dispatch(QuizIntent::Next).await;

    let html = harness.render();
    assert!(html.contains("Question 2 of 3"), "missing heading in {html}");
    assert!(html.contains("1 of 3 answered"), "missing progress in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn take_quiz_smoke_confirms_before_submitting_open_questions() {
    let mut harness = setup_view_harness(ViewKind::TakeQuiz("1".into()), course());
    harness.settle().await;

    harness.dispatch(QuizIntent::Submit).await;
    let html = harness.render();
    assert!(
        html.contains("You have 3 unanswered questions. Submit anyway?"),
        "missing confirmation in {html}"
    );
    assert_eq!(harness.backend.submission_count(), 0);

    harness.dispatch(QuizIntent::ConfirmSubmit).await;

    let sent = harness.backend.submissions();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].quiz_id, QuizId::new(1));
    assert!(sent[0].answers.is_empty());
}

#[tokio::test(flavor = "current_thread")]
async fn take_quiz_smoke_keeps_answers_after_cancelled_submit() {
    let mut harness = setup_view_harness(ViewKind::TakeQuiz("1".into()), course());
    harness.settle().await;

    harness
        .dispatch(QuizIntent::Choose {
            question_id: QuestionId::new(101),
            option_id: OptionId::new(1011),
        })
        .await;
    harness.dispatch(QuizIntent::Submit).await;
    harness.dispatch(QuizIntent::CancelSubmit).await;

    let html = harness.render();
    assert!(!html.contains("Submit anyway?"), "confirmation still open in {html}");
    assert!(html.contains("1 of 3 answered"), "missing progress in {html}");
    assert_eq!(harness.backend.submission_count(), 0);
    let handles = harness.quiz_handles.clone().expect("quiz handles");
    let answer = harness.dom.in_runtime(|| {
        handles
            .controller()
            .read()
            .as_ref()
            .and_then(|c| c.session().answer_for(QuestionId::new(101)))
    });
    assert_eq!(answer, Some(OptionId::new(1011)));
}

#[tokio::test(flavor = "current_thread")]
async fn take_quiz_smoke_rejects_a_bad_id() {
    let mut harness = setup_view_harness(ViewKind::TakeQuiz("abc".into()), course());
    harness.settle().await;

    let html = harness.render();
    assert!(html.contains("That link is not valid."), "missing error in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn take_quiz_smoke_reports_missing_quiz() {
    let mut harness = setup_view_harness(ViewKind::TakeQuiz("42".into()), course());
    harness.settle().await;

    let html = harness.render();
    assert!(html.contains("could not be loaded"), "missing load error in {html}");
    assert!(!html.contains("Question 1"), "unexpected question in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn results_view_smoke_offers_restudy_after_failing() {
    let backend = course();
    let result = backend
        .submit_attempt(&SubmissionRequest {
            quiz_id: QuizId::new(1),
            answers: [(QuestionId::new(101), OptionId::new(1012))].into_iter().collect(),
            time_taken_seconds: 75,
        })
        .await
        .expect("graded");
    let mut harness = setup_view_harness(ViewKind::Results(result.attempt_id.to_string()), backend);
    harness.settle().await;

    let html = harness.render();
    assert!(html.contains("Not passed"), "missing verdict in {html}");
    assert!(html.contains("0 / 4 points"), "missing score in {html}");
    assert!(html.contains("Re-study lesson 1"), "missing restudy action in {html}");
    assert!(html.contains("lesson_id=1"), "restudy does not target lesson 1 in {html}");
    assert!(html.contains("Go to remedials"), "missing remedial action in {html}");
    assert!(html.contains("Not answered"), "missing unanswered row in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn results_view_smoke_reports_unknown_attempt() {
    let mut harness = setup_view_harness(ViewKind::Results("999".into()), course());
    harness.settle().await;

    let html = harness.render();
    assert!(html.contains("could not find"), "missing not found in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn lesson_view_smoke_focuses_the_restudy_lesson() {
    let mut harness = setup_view_harness(ViewKind::Lesson("2".into()), course());
    harness.settle().await;

    let html = harness.render();
    assert!(html.contains("Re-study this lesson"), "missing focus marker in {html}");
    assert!(html.contains("lesson-2"), "missing card anchor in {html}");
    assert!(
        html.contains("lesson-card locked focused"),
        "lesson 2 not highlighted in {html}"
    );
    assert_eq!(html.matches("Re-study this lesson").count(), 1);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn take_quiz_smoke_submits_once_when_time_runs_out() {
    let mut harness = setup_view_harness(ViewKind::TakeQuiz("30".into()), one_minute_quiz());
    harness.settle().await;
    assert!(harness.timer_running());
    harness
        .dispatch(QuizIntent::Choose {
            question_id: QuestionId::new(1),
            option_id: OptionId::new(11),
        })
        .await;

    tokio::time::sleep(Duration::from_secs(61)).await;
    for _ in 0..5 {
        harness.drive_async().await;
    }

    let sent = harness.backend.submissions();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].quiz_id, QuizId::new(30));
    assert_eq!(sent[0].time_taken_seconds, 60);
    assert_eq!(
        sent[0].answers.get(&QuestionId::new(1)),
        Some(&OptionId::new(11))
    );

    tokio::time::sleep(Duration::from_secs(5)).await;
    for _ in 0..3 {
        harness.drive_async().await;
    }
    assert_eq!(harness.backend.submission_count(), 1);
}

#[tokio::test(flavor = "current_thread")]
async fn take_quiz_smoke_retries_the_same_answers_after_a_transport_failure() {
    let backend = course();
    backend.script_submit(ScriptedSubmit::TransportFailure);
    let mut harness = setup_view_harness(ViewKind::TakeQuiz("1".into()), backend);
    harness.settle().await;
    harness
        .dispatch(QuizIntent::Choose {
            question_id: QuestionId::new(101),
            option_id: OptionId::new(1011),
        })
        .await;

    harness.dispatch(QuizIntent::ConfirmSubmit).await;

    let html = harness.render();
    assert!(html.contains("Your answers were not sent."), "missing failure in {html}");
    assert!(html.contains("Try again"), "missing retry in {html}");
    assert!(!harness.timer_running());
    assert_eq!(harness.backend.submission_count(), 1);

    harness.dispatch(QuizIntent::Retry).await;

    let sent = harness.backend.submissions();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0], sent[1]);
    assert_eq!(
        sent[1].answers.get(&QuestionId::new(101)),
        Some(&OptionId::new(1011))
    );
}

#[tokio::test(flavor = "current_thread")]
async fn take_quiz_smoke_refusal_is_final() {
    let backend = course();
    backend.script_submit(ScriptedSubmit::Reject {
        code: REJECT_NO_ATTEMPTS,
    });
    let mut harness = setup_view_harness(ViewKind::TakeQuiz("1".into()), backend);
    harness.settle().await;

    harness.dispatch(QuizIntent::ConfirmSubmit).await;

    let html = harness.render();
    assert!(
        html.contains("You have no attempts left for this quiz."),
        "missing refusal in {html}"
    );
    assert!(html.contains("Back to lessons"), "missing way back in {html}");
    assert!(!html.contains("Try again"), "refusal offered a retry in {html}");

    harness.dispatch(QuizIntent::Retry).await;
    assert_eq!(harness.backend.submission_count(), 1);
}
