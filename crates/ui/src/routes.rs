use dioxus::prelude::*;
use dioxus_router::{Link, Outlet, Routable};

use crate::views::{LessonView, LessonsView, RemedialsView, ResultsView, TakeQuizView};

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Layout)]
        #[route("/", LessonsView)] Lessons {},
        #[route("/lesson?:lesson_id", LessonView)] Lesson { lesson_id: String },
        #[route("/take-quiz?:quiz_id", TakeQuizView)] TakeQuiz { quiz_id: String },
        #[route("/results?:attempt_id", ResultsView)] Results { attempt_id: String },
        #[route("/remedials", RemedialsView)] Remedials {},
}

#[component]
fn Layout() -> Element {
    rsx! {
        div { class: "app",
            Sidebar {}
            main { class: "content",
                Outlet::<Route> {}
            }
        }
    }
}

#[component]
fn Sidebar() -> Element {
    rsx! {
        nav { class: "sidebar",
            h1 { "Study" }
            ul {
                li { Link { to: Route::Lessons {}, "Lessons" } }
                li { Link { to: Route::Remedials {}, "Remedials" } }
            }
        }
    }
}
