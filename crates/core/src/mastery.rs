//! Decides what a student may do next after an attempt.
//!
//! Lock state itself belongs to the backend; this module only turns a result
//! into navigation affordances and compares lesson lists fetched from the server.

use std::collections::HashSet;

use crate::model::{AttemptResult, LessonCard, LessonId, Remedial};

/// A navigation affordance offered on the result screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextStep {
    /// Passed a gating quiz: re-fetch lessons, the next one may be open now.
    ContinueLessons,
    /// Failed: go back to the lesson the quiz is linked to.
    RestudyLesson(LessonId),
    /// Failed: a remedial may have been created server-side.
    OpenRemedials,
    BackToLessons,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasteryDecision {
    pub passed: bool,
    /// True when the lesson list must be re-fetched to show the new lock state.
    pub refresh_lessons: bool,
    pub steps: Vec<NextStep>,
}

impl MasteryDecision {
    #[must_use]
    pub fn from_result(result: &AttemptResult) -> Self {
        if result.passed {
            let gated = result.linked_lesson_id.is_some();
            return Self {
                passed: true,
                refresh_lessons: gated,
                steps: vec![if gated {
                    NextStep::ContinueLessons
                } else {
                    NextStep::BackToLessons
                }],
            };
        }

        let mut steps = Vec::with_capacity(2);
        if let Some(lesson) = result.linked_lesson_id {
            steps.push(NextStep::RestudyLesson(lesson));
        }
        steps.push(NextStep::OpenRemedials);
        Self {
            passed: false,
            refresh_lessons: false,
            steps,
        }
    }

    /// Affordances after the server refused the attempt.
    #[must_use]
    pub fn after_rejection() -> Self {
        Self {
            passed: false,
            refresh_lessons: false,
            steps: vec![NextStep::BackToLessons],
        }
    }
}

/// Lessons locked in `before` that are unlocked in `after`.
#[must_use]
pub fn newly_unlocked(before: &[LessonCard], after: &[LessonCard]) -> Vec<LessonId> {
    let was_locked: HashSet<LessonId> = before
        .iter()
        .filter(|lesson| lesson.locked)
        .map(|lesson| lesson.id)
        .collect();
    after
        .iter()
        .filter(|lesson| !lesson.locked && was_locked.contains(&lesson.id))
        .map(|lesson| lesson.id)
        .collect()
}

/// How the remedial list should be presented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemedialOutlook<'a> {
    /// Nothing yet. Right after a failure the backend may still be creating it.
    NoneYet,
    Assigned {
        pending: Vec<&'a Remedial>,
        completed: Vec<&'a Remedial>,
    },
}

impl<'a> RemedialOutlook<'a> {
    #[must_use]
    pub fn from_list(remedials: &'a [Remedial]) -> Self {
        if remedials.is_empty() {
            return Self::NoneYet;
        }
        let (pending, completed) = remedials.iter().partition(|r| r.is_pending());
        Self::Assigned { pending, completed }
    }
}
