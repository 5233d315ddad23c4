use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{OptionId, QuestionId};

//
// ─── QUESTION TYPES ────────────────────────────────────────────────────────────
//

/// How a question presents its choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    MultipleChoice,
    TrueFalse,
}

impl QuestionKind {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            QuestionKind::MultipleChoice => "Multiple choice",
            QuestionKind::TrueFalse => "True / False",
        }
    }
}

/// One selectable option of a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub id: OptionId,
    pub text: String,
}

impl Choice {
    #[must_use]
    pub fn new(id: OptionId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }
}

/// A question as supplied once at session start. Immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    text: String,
    kind: QuestionKind,
    points: u32,
    choices: Vec<Choice>,
}

impl Question {
    /// Build a question, checking the shape the session relies on.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::ZeroPoints` if `points` is 0.
    /// Returns `QuestionError::TooFewChoices` if fewer than two choices are given.
    /// Returns `QuestionError::DuplicateChoice` if two choices share an id.
    pub fn new(
        id: QuestionId,
        text: impl Into<String>,
        kind: QuestionKind,
        points: u32,
        choices: Vec<Choice>,
    ) -> Result<Self, QuestionError> {
        if points == 0 {
            return Err(QuestionError::ZeroPoints { question: id });
        }
        if choices.len() < 2 {
            return Err(QuestionError::TooFewChoices {
                question: id,
                len: choices.len(),
            });
        }
        let mut seen = HashSet::with_capacity(choices.len());
        for choice in &choices {
            if !seen.insert(choice.id) {
                return Err(QuestionError::DuplicateChoice {
                    question: id,
                    option: choice.id,
                });
            }
        }

        Ok(Self {
            id,
            text: text.into(),
            kind,
            points,
            choices,
        })
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn kind(&self) -> QuestionKind {
        self.kind
    }

    #[must_use]
    pub fn points(&self) -> u32 {
        self.points
    }

    #[must_use]
    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    /// True when `option` is one of this question's own choices.
    #[must_use]
    pub fn offers(&self, option: OptionId) -> bool {
        self.choices.iter().any(|choice| choice.id == option)
    }
}

//
// ─── QUESTION VALIDATION ERRORS ────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question {question} must be worth at least one point")]
    ZeroPoints { question: QuestionId },

    #[error("question {question} needs at least two choices, got {len}")]
    TooFewChoices { question: QuestionId, len: usize },

    #[error("question {question} lists option {option} more than once")]
    DuplicateChoice {
        question: QuestionId,
        option: OptionId,
    },
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
