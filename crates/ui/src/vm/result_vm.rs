use lms_core::mastery::{MasteryDecision, NextStep};
use lms_core::model::{AttemptReview, LessonCard, LessonId, QuestionReview};

use crate::vm::time_fmt::format_time_spent;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionVm {
    pub label: String,
    pub target: ActionTarget,
    pub primary: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionTarget {
    Lessons,
    /// The lesson list, focused on one lesson.
    Lesson(LessonId),
    Remedials,
}

impl From<NextStep> for ActionVm {
    fn from(step: NextStep) -> Self {
        match step {
            NextStep::ContinueLessons => Self {
                label: "Continue to lessons".into(),
                target: ActionTarget::Lessons,
                primary: true,
            },
            NextStep::RestudyLesson(lesson) => Self {
                label: format!("Re-study lesson {lesson}"),
                target: ActionTarget::Lesson(lesson),
                primary: true,
            },
            NextStep::OpenRemedials => Self {
                label: "Go to remedials".into(),
                target: ActionTarget::Remedials,
                primary: false,
            },
            NextStep::BackToLessons => Self {
                label: "Back to lessons".into(),
                target: ActionTarget::Lessons,
                primary: false,
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReviewRowVm {
    pub number: usize,
    pub text: String,
    pub selected: String,
    pub correct: Option<String>,
    pub is_correct: bool,
    pub points: String,
}

impl ReviewRowVm {
    fn new(number: usize, row: &QuestionReview) -> Self {
        Self {
            number,
            text: row.text.clone(),
            selected: row
                .selected_text
                .clone()
                .unwrap_or_else(|| "Not answered".to_string()),
            correct: if row.is_correct {
                None
            } else {
                row.correct_text.clone()
            },
            is_correct: row.is_correct,
            points: format!("{} / {}", format_points(row.points_awarded), format_points(row.points)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultVm {
    pub title: String,
    pub verdict: &'static str,
    pub passed: bool,
    pub score: String,
    pub percentage: String,
    pub time_spent: String,
    pub summary: String,
    pub rows: Vec<ReviewRowVm>,
    pub actions: Vec<ActionVm>,
    pub unlocked: Vec<String>,
}

impl ResultVm {
    #[must_use]
    pub fn new(review: &AttemptReview, unlocked: &[LessonCard]) -> Self {
        let result = &review.result;
        let decision = MasteryDecision::from_result(result);
        Self {
            title: review
                .quiz_title
                .clone()
                .unwrap_or_else(|| "Quiz result".to_string()),
            verdict: if result.passed { "Passed" } else { "Not passed" },
            passed: result.passed,
            score: format!(
                "{} / {} points",
                format_points(result.earned_points),
                format_points(result.total_points)
            ),
            percentage: format!("{:.1}%", result.percentage),
            time_spent: format_time_spent(result.time_spent_seconds),
            summary: format!(
                "{} correct, {} unanswered",
                review.correct_count(),
                review.unanswered_count()
            ),
            rows: review
                .questions
                .iter()
                .enumerate()
                .map(|(index, row)| ReviewRowVm::new(index + 1, row))
                .collect(),
            actions: decision.steps.into_iter().map(ActionVm::from).collect(),
            unlocked: unlocked.iter().map(|lesson| lesson.title.clone()).collect(),
        }
    }
}

fn format_points(points: f64) -> String {
    if points.fract() == 0.0 {
        format!("{points:.0}")
    } else {
        format!("{points:.1}")
    }
}
