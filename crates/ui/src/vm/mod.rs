mod lesson_vm;
mod quiz_vm;
mod result_vm;
mod time_fmt;

pub use lesson_vm::{
    LessonCardVm, RemedialVm, RemedialsVm, SubjectVm, map_remedials, map_subjects,
};
pub use quiz_vm::{
    ChoiceVm, ClockVm, PaletteItemVm, QuestionVm, QuizIntent, QuizScreen, QuizVm, quiz_screen,
    submit_confirmation,
};
pub use result_vm::{ActionTarget, ActionVm, ResultVm, ReviewRowVm};
pub use time_fmt::{format_countdown, format_datetime, format_time_spent};
