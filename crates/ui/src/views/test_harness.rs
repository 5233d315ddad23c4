use std::sync::Arc;
use std::time::Duration;

use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router};
use lms_core::Clock;
use lms_core::model::QuizId;
use lms_core::time::fixed_clock;
use services::{InMemoryBackend, LmsBackend};

use crate::context::{UiApp, build_app_context};
use crate::views::take_quiz::QuizTestHandles;
use crate::views::{LessonView, LessonsView, RemedialsView, ResultsView, TakeQuizView};
use crate::vm::QuizIntent;

#[derive(Clone)]
struct TestApp {
    backend: Arc<InMemoryBackend>,
}

impl UiApp for TestApp {
    fn backend(&self) -> Arc<dyn LmsBackend> {
        self.backend.clone()
    }

    fn clock(&self) -> Clock {
        fixed_clock()
    }

    fn open_quiz_on_launch(&self) -> Option<QuizId> {
        None
    }
}

#[derive(Clone, PartialEq, Eq)]
pub enum ViewKind {
    Lessons,
    Lesson(String),
    TakeQuiz(String),
    Results(String),
    Remedials,
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    app: Arc<TestApp>,
    view: ViewKind,
    quiz_handles: Option<QuizTestHandles>,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

#[component]
fn ViewRouterHarness(props: ViewHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(&app));
    use_context_provider(|| props.view.clone());
    if let Some(handles) = props.quiz_handles.clone() {
        use_context_provider(|| handles);
    }
    rsx! { Router::<TestRoute> {} }
}

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum TestRoute {
    #[route("/")]
    Root {},
}

#[component]
fn Root() -> Element {
    let view = use_context::<ViewKind>();
    match view {
        ViewKind::Lessons => rsx! { LessonsView {} },
        ViewKind::Lesson(lesson_id) => rsx! { LessonView { lesson_id } },
        ViewKind::TakeQuiz(quiz_id) => rsx! { TakeQuizView { quiz_id } },
        ViewKind::Results(attempt_id) => rsx! { ResultsView { attempt_id } },
        ViewKind::Remedials => rsx! { RemedialsView {} },
    }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
    pub backend: Arc<InMemoryBackend>,
    pub quiz_handles: Option<QuizTestHandles>,
}

impl ViewHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        let _ = tokio::time::timeout(Duration::from_millis(50), self.dom.wait_for_work()).await;
        self.dom.render_immediate(&mut NoOpMutations);
        self.dom.process_events();
    }

    /// Rebuild, then let pending tasks and resources finish.
    pub async fn settle(&mut self) {
        self.rebuild();
        for _ in 0..5 {
            self.drive_async().await;
        }
    }

    pub async fn dispatch(&mut self, intent: QuizIntent) {
        let handles = self.quiz_handles.clone().expect("quiz view harness");
        self.dom.in_runtime(|| handles.dispatch().call(intent));
        for _ in 0..3 {
            self.drive_async().await;
        }
    }

    pub fn timer_running(&self) -> bool {
        let handles = self.quiz_handles.clone().expect("quiz view harness");
        self.dom.in_runtime(|| {
            handles
                .controller()
                .read()
                .as_ref()
                .is_some_and(|c| c.is_timer_running())
        })
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

pub fn setup_view_harness(view: ViewKind, backend: InMemoryBackend) -> ViewHarness {
    let backend = Arc::new(backend);
    let quiz_handles = match view {
        ViewKind::TakeQuiz(_) => Some(QuizTestHandles::default()),
        _ => None,
    };
    let app = Arc::new(TestApp {
        backend: Arc::clone(&backend),
    });

    let dom = VirtualDom::new_with_props(
        ViewRouterHarness,
        ViewHarnessProps {
            app,
            view,
            quiz_handles: quiz_handles.clone(),
        },
    );

    ViewHarness {
        dom,
        backend,
        quiz_handles,
    }
}
