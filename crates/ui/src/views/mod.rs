mod lessons;
mod remedials;
mod results;
mod state;
mod take_quiz;

#[cfg(test)]
mod test_harness;
#[cfg(test)]
mod view_smoke;

pub use lessons::{LessonView, LessonsView};
pub use remedials::RemedialsView;
pub use results::ResultsView;
pub use state::{ViewError, ViewState, view_state_from_resource};
pub use take_quiz::TakeQuizView;
