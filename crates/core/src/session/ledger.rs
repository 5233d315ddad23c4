use std::collections::{BTreeMap, HashMap};

use crate::model::{OptionId, Question, QuestionId};

/// Selected option per question for one session.
///
/// Counts are derived from the question list on demand and never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerLedger {
    answers: HashMap<QuestionId, OptionId>,
}

impl AnswerLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a selection, replacing any earlier one. Returns the previous selection.
    pub fn set_answer(&mut self, question: QuestionId, option: OptionId) -> Option<OptionId> {
        self.answers.insert(question, option)
    }

    /// Current selection, or `None` when unanswered.
    #[must_use]
    pub fn answer(&self, question: QuestionId) -> Option<OptionId> {
        self.answers.get(&question).copied()
    }

    #[must_use]
    pub fn answered_count(&self, questions: &[Question]) -> usize {
        questions
            .iter()
            .filter(|q| self.answers.contains_key(&q.id()))
            .count()
    }

    /// Unanswered question ids, in question order.
    #[must_use]
    pub fn unanswered_ids(&self, questions: &[Question]) -> Vec<QuestionId> {
        questions
            .iter()
            .map(Question::id)
            .filter(|id| !self.answers.contains_key(id))
            .collect()
    }

    /// Ordered copy of the answers, as sent to the backend.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<QuestionId, OptionId> {
        self.answers.iter().map(|(q, o)| (*q, *o)).collect()
    }
}
