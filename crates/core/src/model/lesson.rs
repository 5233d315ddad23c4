use serde::{Deserialize, Serialize};

use crate::model::ids::{LessonId, QuizId};

/// Lesson as listed for a student, with its lock state decided by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonCard {
    pub id: LessonId,
    pub subject: String,
    pub title: String,
    pub position: u32,
    /// Quiz that must be passed before the following lesson unlocks.
    pub linked_quiz_id: Option<QuizId>,
    pub locked: bool,
    /// Title of the lesson whose quiz gates this one, when locked.
    pub prerequisite_title: Option<String>,
}

/// Lessons of one subject, ordered by position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectLessons {
    pub subject: String,
    pub lessons: Vec<LessonCard>,
}

/// Group lesson cards by subject (first-seen subject order) and sort each group by position.
#[must_use]
pub fn group_by_subject(cards: Vec<LessonCard>) -> Vec<SubjectLessons> {
    let mut groups: Vec<SubjectLessons> = Vec::new();
    for card in cards {
        match groups.iter_mut().find(|g| g.subject == card.subject) {
            Some(group) => group.lessons.push(card),
            None => groups.push(SubjectLessons {
                subject: card.subject.clone(),
                lessons: vec![card],
            }),
        }
    }
    for group in &mut groups {
        group.lessons.sort_by_key(|lesson| lesson.position);
    }
    groups
}
