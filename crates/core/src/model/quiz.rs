use std::collections::HashSet;

use thiserror::Error;

use crate::model::ids::{QuestionId, QuizId};
use crate::model::question::Question;

/// Quiz header as delivered with its questions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quiz {
    id: QuizId,
    title: String,
    time_limit_minutes: u32,
    passing_rate: u8,
}

impl Quiz {
    /// # Errors
    ///
    /// Returns `QuizError::NoTimeLimit` for a zero-minute limit.
    /// Returns `QuizError::PassingRateOutOfRange` if `passing_rate` exceeds 100.
    pub fn new(
        id: QuizId,
        title: impl Into<String>,
        time_limit_minutes: u32,
        passing_rate: u8,
    ) -> Result<Self, QuizError> {
        if time_limit_minutes == 0 {
            return Err(QuizError::NoTimeLimit { quiz: id });
        }
        if passing_rate > 100 {
            return Err(QuizError::PassingRateOutOfRange {
                quiz: id,
                rate: passing_rate,
            });
        }
        Ok(Self {
            id,
            title: title.into(),
            time_limit_minutes,
            passing_rate,
        })
    }

    #[must_use]
    pub fn id(&self) -> QuizId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn time_limit_minutes(&self) -> u32 {
        self.time_limit_minutes
    }

    #[must_use]
    pub fn time_limit_seconds(&self) -> u32 {
        self.time_limit_minutes.saturating_mul(60)
    }

    /// Percentage (0–100) needed to pass. Informational only: pass/fail comes from the server.
    #[must_use]
    pub fn passing_rate(&self) -> u8 {
        self.passing_rate
    }
}

/// A quiz together with the ordered questions of one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizPaper {
    quiz: Quiz,
    questions: Vec<Question>,
}

impl QuizPaper {
    /// # Errors
    ///
    /// Returns `QuizError::NoQuestions` when `questions` is empty.
    /// Returns `QuizError::DuplicateQuestion` when two questions share an id.
    pub fn new(quiz: Quiz, questions: Vec<Question>) -> Result<Self, QuizError> {
        if questions.is_empty() {
            return Err(QuizError::NoQuestions { quiz: quiz.id() });
        }
        let mut seen = HashSet::with_capacity(questions.len());
        for question in &questions {
            if !seen.insert(question.id()) {
                return Err(QuizError::DuplicateQuestion {
                    quiz: quiz.id(),
                    question: question.id(),
                });
            }
        }
        Ok(Self { quiz, questions })
    }

    #[must_use]
    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Sum of all question points.
    #[must_use]
    pub fn total_points(&self) -> u32 {
        self.questions
            .iter()
            .fold(0_u32, |acc, q| acc.saturating_add(q.points()))
    }

    #[must_use]
    pub fn into_parts(self) -> (Quiz, Vec<Question>) {
        (self.quiz, self.questions)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("quiz {quiz} has no time limit")]
    NoTimeLimit { quiz: QuizId },

    #[error("quiz {quiz} passing rate {rate} is above 100")]
    PassingRateOutOfRange { quiz: QuizId, rate: u8 },

    #[error("quiz {quiz} has no questions")]
    NoQuestions { quiz: QuizId },

    #[error("quiz {quiz} lists question {question} more than once")]
    DuplicateQuestion { quiz: QuizId, question: QuestionId },
}
