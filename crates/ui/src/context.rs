use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};

use lms_core::Clock;
use lms_core::model::{LessonCard, QuizId};
use services::{CourseService, LmsBackend};

pub trait UiApp: Send + Sync {
    fn backend(&self) -> Arc<dyn LmsBackend>;
    fn clock(&self) -> Clock;
    /// Quiz to open right after launch, if any.
    fn open_quiz_on_launch(&self) -> Option<QuizId>;
}

#[derive(Clone)]
pub struct AppContext {
    backend: Arc<dyn LmsBackend>,
    course: Arc<CourseService>,
    clock: Clock,
    open_quiz_on_launch: Option<QuizId>,
    open_quiz_on_launch_once: Arc<AtomicBool>,
    lesson_snapshot: Arc<Mutex<Option<Vec<LessonCard>>>>,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        let backend = app.backend();
        let open_quiz_on_launch = app.open_quiz_on_launch();

        Self {
            course: Arc::new(CourseService::new(Arc::clone(&backend))),
            backend,
            clock: app.clock(),
            open_quiz_on_launch,
            open_quiz_on_launch_once: Arc::new(AtomicBool::new(open_quiz_on_launch.is_some())),
            lesson_snapshot: Arc::new(Mutex::new(None)),
        }
    }

    #[must_use]
    pub fn backend(&self) -> Arc<dyn LmsBackend> {
        Arc::clone(&self.backend)
    }

    #[must_use]
    pub fn course(&self) -> Arc<CourseService> {
        Arc::clone(&self.course)
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// The launch quiz, returned once per app run.
    #[must_use]
    pub fn take_open_quiz_on_launch(&self) -> Option<QuizId> {
        if self.open_quiz_on_launch_once.swap(false, Ordering::AcqRel) {
            self.open_quiz_on_launch
        } else {
            None
        }
    }

    /// Last lesson list shown to the student, used to spot newly unlocked lessons.
    #[must_use]
    pub fn lesson_snapshot(&self) -> Option<Vec<LessonCard>> {
        self.lesson_snapshot
            .lock()
            .ok()
            .and_then(|snapshot| snapshot.clone())
    }

    pub fn remember_lessons(&self, lessons: Vec<LessonCard>) {
        if let Ok(mut snapshot) = self.lesson_snapshot.lock() {
            *snapshot = Some(lessons);
        }
    }
}

// Provided by the application composition root (`crates/app`).

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
