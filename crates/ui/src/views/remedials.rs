use dioxus::prelude::*;

use crate::context::AppContext;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{RemedialVm, map_remedials};

#[component]
pub fn RemedialsView() -> Element {
    let ctx = use_context::<AppContext>();
    let course = ctx.course();

    let mut resource = use_resource(move || {
        let course = course.clone();
        async move {
            let remedials = course.remedials().await.map_err(ViewError::from)?;
            Ok::<_, ViewError>(map_remedials(&remedials))
        }
    });

    let state = view_state_from_resource(&resource);

    rsx! {
        div { class: "page",
            h2 { "Remedials" }

            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Ready(vm) => rsx! {
                    if let Some(notice) = vm.notice {
                        p { class: "notice", "{notice}" }
                        button { onclick: move |_| resource.restart(), "Refresh" }
                    }
                    if !vm.pending.is_empty() {
                        h3 { "To do" }
                        ul {
                            for remedial in vm.pending {
                                RemedialItem { key: "{remedial.id}", remedial: remedial.clone() }
                            }
                        }
                    }
                    if !vm.completed.is_empty() {
                        h3 { "Completed" }
                        ul {
                            for remedial in vm.completed {
                                RemedialItem { key: "{remedial.id}", remedial: remedial.clone() }
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
fn RemedialItem(remedial: RemedialVm) -> Element {
    rsx! {
        li { class: "remedial",
            span { class: "remedial-title", "{remedial.quiz_title}" }
            span { class: "remedial-status", "{remedial.status}" }
            if let Some(lesson) = remedial.lesson {
                span { class: "remedial-lesson", "{lesson}" }
            }
            span { class: "remedial-date", "Assigned {remedial.assigned_at}" }
        }
    }
}
