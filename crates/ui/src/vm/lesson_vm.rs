use lms_core::mastery::RemedialOutlook;
use lms_core::model::{LessonCard, Remedial, RemedialStatus, SubjectLessons};

use crate::vm::time_fmt::format_datetime;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LessonCardVm {
    pub id: u64,
    pub title: String,
    pub locked: bool,
    pub lock_note: Option<String>,
    /// Quiz reachable from this card. Never set on a locked card.
    pub quiz_id: Option<u64>,
}

impl From<&LessonCard> for LessonCardVm {
    fn from(card: &LessonCard) -> Self {
        Self {
            id: card.id.value(),
            title: card.title.clone(),
            locked: card.locked,
            lock_note: card.locked.then(|| match &card.prerequisite_title {
                Some(title) => format!("Complete \"{title}\" first"),
                None => "Complete the previous lesson first".to_string(),
            }),
            quiz_id: if card.locked {
                None
            } else {
                card.linked_quiz_id.map(|quiz| quiz.value())
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubjectVm {
    pub subject: String,
    pub lessons: Vec<LessonCardVm>,
}

#[must_use]
pub fn map_subjects(subjects: &[SubjectLessons]) -> Vec<SubjectVm> {
    subjects
        .iter()
        .map(|group| SubjectVm {
            subject: group.subject.clone(),
            lessons: group.lessons.iter().map(LessonCardVm::from).collect(),
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemedialVm {
    pub id: u64,
    pub quiz_title: String,
    pub status: &'static str,
    pub assigned_at: String,
    pub lesson: Option<String>,
}

impl From<&Remedial> for RemedialVm {
    fn from(remedial: &Remedial) -> Self {
        Self {
            id: remedial.id.value(),
            quiz_title: remedial.quiz_title.clone(),
            status: match remedial.status {
                RemedialStatus::Pending => "Pending",
                RemedialStatus::Completed => "Completed",
            },
            assigned_at: format_datetime(remedial.assigned_at),
            lesson: remedial.lesson_id.map(|id| format!("Lesson {id}")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemedialsVm {
    /// Shown instead of an empty list; a fresh remedial can take a moment to appear.
    pub notice: Option<&'static str>,
    pub pending: Vec<RemedialVm>,
    pub completed: Vec<RemedialVm>,
}

#[must_use]
pub fn map_remedials(remedials: &[Remedial]) -> RemedialsVm {
    match RemedialOutlook::from_list(remedials) {
        RemedialOutlook::NoneYet => RemedialsVm {
            notice: Some(
                "No remedial work yet. If you just finished a quiz, it may take a moment to appear.",
            ),
            pending: Vec::new(),
            completed: Vec::new(),
        },
        RemedialOutlook::Assigned { pending, completed } => RemedialsVm {
            notice: None,
            pending: pending.into_iter().map(RemedialVm::from).collect(),
            completed: completed.into_iter().map(RemedialVm::from).collect(),
        },
    }
}
