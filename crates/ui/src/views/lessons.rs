use dioxus::document::eval;
use dioxus::prelude::*;
use dioxus_router::{Link, use_navigator};

use lms_core::model::{LessonId, group_by_subject};

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{LessonCardVm, SubjectVm, map_subjects};

#[derive(Clone, Debug, PartialEq)]
struct LessonsData {
    subjects: Vec<SubjectVm>,
}

#[component]
pub fn LessonsView() -> Element {
    rsx! { LessonList {} }
}

/// Lesson list scrolled to one lesson, reached from "re-study" on a result.
#[component]
pub fn LessonView(lesson_id: String) -> Element {
    let focus = lesson_id.parse::<LessonId>().ok();
    rsx! { LessonList { focus } }
}

#[component]
fn LessonList(focus: Option<LessonId>) -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();

    let launch_ctx = ctx.clone();
    use_effect(move || {
        if let Some(quiz_id) = launch_ctx.take_open_quiz_on_launch() {
            navigator.push(Route::TakeQuiz {
                quiz_id: quiz_id.to_string(),
            });
        }
    });

    let mut resource = use_resource(move || {
        let ctx = ctx.clone();
        async move {
            let lessons = ctx.course().lessons().await.map_err(ViewError::from)?;
            ctx.remember_lessons(lessons.clone());
            let subjects = map_subjects(&group_by_subject(lessons));
            Ok::<_, ViewError>(LessonsData { subjects })
        }
    });

    use_effect(move || {
        let ready = matches!(&*resource.read(), Some(Ok(_)));
        if let (true, Some(lesson_id)) = (ready, focus) {
            let _ = eval(&format!(
                "document.getElementById('lesson-{lesson_id}')?.scrollIntoView({{block: 'center'}});"
            ));
        }
    });

    let state = view_state_from_resource(&resource);
    let focused = focus.as_ref().map(LessonId::value);

    rsx! {
        div { class: "page",
            h2 { "Lessons" }

            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Ready(data) => rsx! {
                    if data.subjects.is_empty() {
                        p { "No lessons yet." }
                    } else {
                        for subject in data.subjects {
                            section { class: "subject",
                                h3 { "{subject.subject}" }
                                ul { class: "lesson-list",
                                    for lesson in subject.lessons {
                                        LessonCardItem {
                                            key: "{lesson.id}",
                                            focused: focused == Some(lesson.id),
                                            lesson: lesson.clone(),
                                        }
                                    }
                                }
                            }
                        }
                    }
                },
                ViewState::Error(err) => rsx! {
                    p { "{err.message()}" }
                    button { onclick: move |_| resource.restart(), "Retry" }
                },
            }
        }
    }
}

#[component]
fn LessonCardItem(lesson: LessonCardVm, focused: bool) -> Element {
    let class = card_class(lesson.locked, focused);
    rsx! {
        li { id: "lesson-{lesson.id}", class: "{class}",
            span { class: "lesson-title", "{lesson.title}" }
            if focused {
                span { class: "lesson-focus", "Re-study this lesson" }
            }
            if let Some(note) = lesson.lock_note {
                span { class: "lesson-lock", "Locked" }
                p { class: "lesson-note", "{note}" }
            }
            if let Some(quiz_id) = lesson.quiz_id {
                Link {
                    class: "lesson-quiz",
                    to: Route::TakeQuiz { quiz_id: quiz_id.to_string() },
                    "Take quiz"
                }
            }
        }
    }
}

fn card_class(locked: bool, focused: bool) -> &'static str {
    match (locked, focused) {
        (true, true) => "lesson-card locked focused",
        (true, false) => "lesson-card locked",
        (false, true) => "lesson-card focused",
        (false, false) => "lesson-card",
    }
}
