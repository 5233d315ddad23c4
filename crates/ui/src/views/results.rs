use dioxus::prelude::*;
use dioxus_router::Link;

use lms_core::model::AttemptId;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{ActionTarget, ActionVm, ResultVm, ReviewRowVm};

#[component]
pub fn ResultsView(attempt_id: String) -> Element {
    let ctx = use_context::<AppContext>();
    let parsed = attempt_id.parse::<AttemptId>().ok();

    let mut resource = use_resource(move || {
        let ctx = ctx.clone();
        async move {
            let attempt_id = parsed.ok_or(ViewError::InvalidId)?;
            let course = ctx.course();
            let review = course
                .attempt_review(attempt_id)
                .await
                .map_err(ViewError::from)?;
            // Lock state is server-owned; a failed refresh only hides the unlock notice.
            let refresh = match ctx.lesson_snapshot() {
                Some(before) => course
                    .refresh_after(&review.result, &before)
                    .await
                    .ok()
                    .flatten(),
                None => None,
            };
            let unlocked = match refresh {
                Some(refresh) => {
                    ctx.remember_lessons(refresh.lessons);
                    refresh.unlocked
                }
                None => Vec::new(),
            };
            Ok::<_, ViewError>(ResultVm::new(&review, &unlocked))
        }
    });

    let state = view_state_from_resource(&resource);

    rsx! {
        div { class: "page results",
            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    h2 { "Results" }
                    p { "Loading..." }
                },
                ViewState::Ready(vm) => rsx! {
                    ResultPanel { vm }
                },
                ViewState::Error(err) => rsx! {
                    h2 { "Results" }
                    p { "{err.message()}" }
                    if err != ViewError::InvalidId {
                        button { onclick: move |_| resource.restart(), "Retry" }
                    }
                    Link { to: Route::Lessons {}, "Back to lessons" }
                },
            }
        }
    }
}

#[component]
fn ResultPanel(vm: ResultVm) -> Element {
    let verdict_class = if vm.passed { "verdict passed" } else { "verdict failed" };
    rsx! {
        h2 { "{vm.title}" }
        p { class: "{verdict_class}", "{vm.verdict}" }
        dl { class: "score",
            dt { "Score" }
            dd { "{vm.score}" }
            dt { "Percentage" }
            dd { "{vm.percentage}" }
            dt { "Time spent" }
            dd { "{vm.time_spent}" }
        }
        p { class: "summary", "{vm.summary}" }
        for title in vm.unlocked {
            p { class: "unlocked", "New lesson unlocked: {title}" }
        }
        div { class: "actions",
            for action in vm.actions {
                ActionLink { action }
            }
        }
        ol { class: "review",
            for row in vm.rows {
                ReviewRow { key: "{row.number}", row: row.clone() }
            }
        }
    }
}

#[component]
pub(crate) fn ActionLink(action: ActionVm) -> Element {
    let class = if action.primary { "action primary" } else { "action" };
    let to = match action.target {
        ActionTarget::Lessons => Route::Lessons {},
        ActionTarget::Lesson(lesson_id) => Route::Lesson {
            lesson_id: lesson_id.to_string(),
        },
        ActionTarget::Remedials => Route::Remedials {},
    };
    rsx! {
        Link { class: "{class}", to, "{action.label}" }
    }
}

#[component]
fn ReviewRow(row: ReviewRowVm) -> Element {
    let class = if row.is_correct { "review-row correct" } else { "review-row incorrect" };
    rsx! {
        li { class: "{class}",
            p { class: "review-text", "{row.text}" }
            p { "Your answer: {row.selected}" }
            if let Some(correct) = row.correct {
                p { "Correct answer: {correct}" }
            }
            p { class: "review-points", "{row.points}" }
        }
    }
}
