use thiserror::Error;

use crate::model::{ParseIdError, QuestionError, QuizError};

/// Domain validation failures, used when mapping backend payloads into the model.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    ParseId(#[from] ParseIdError),
}
