mod attempt;
mod ids;
mod lesson;
mod question;
mod quiz;
mod remedial;

pub use ids::{AttemptId, LessonId, OptionId, ParseIdError, QuestionId, QuizId, RemedialId};

pub use attempt::{AttemptResult, AttemptReview, QuestionReview};
pub use lesson::{LessonCard, SubjectLessons, group_by_subject};
pub use question::{Choice, Question, QuestionError, QuestionKind};
pub use quiz::{Quiz, QuizError, QuizPaper};
pub use remedial::{Remedial, RemedialStatus};
