use std::time::Duration;

use dioxus::core::spawn_forever;
use dioxus::prelude::*;
use dioxus_router::{Link, Navigator, use_navigator};
use tracing::info;

use lms_core::model::QuizId;
use lms_core::session::{SessionPhase, SubmissionRequest};
use services::{SessionController, SubmissionGateway};

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::ViewError;
use crate::views::results::ActionLink;
use crate::vm::{
    PaletteItemVm, QuestionVm, QuizIntent, QuizScreen, QuizVm, quiz_screen, submit_confirmation,
};

#[cfg(test)]
use std::cell::RefCell;
#[cfg(test)]
use std::rc::Rc;

const REJECTED_REDIRECT_DELAY: Duration = Duration::from_secs(4);

#[component]
pub fn TakeQuizView(quiz_id: String) -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let parsed = quiz_id.parse::<QuizId>().ok();
    let gateway = use_hook(|| SubmissionGateway::new(ctx.backend()));
    let clock = ctx.clock();

    let controller = use_signal(|| None::<SessionController>);
    let confirming = use_signal(|| false);

    {
        let gateway = gateway.clone();
        use_future(move || {
            let gateway = gateway.clone();
            let mut controller = controller;
            async move {
                let Some(quiz_id) = parsed else {
                    return;
                };
                let mut opened = SessionController::new(quiz_id, gateway.clone(), clock);
                opened.load().await;
                let signals = opened.take_timer_signals();
                controller.set(Some(opened));

                let Some(mut signals) = signals else {
                    return;
                };
                while let Some(signal) = signals.recv().await {
                    let request = controller.write().as_mut().and_then(|c| c.on_timer(signal));
                    if let Some(request) = request {
                        send_in_background(controller, gateway.clone(), request, navigator);
                    }
                }
            }
        });
    }

    use_drop(move || {
        let mut controller = controller;
        if let Ok(mut guard) = controller.try_write() {
            if let Some(controller) = guard.as_mut() {
                controller.abandon();
            }
        }
    });

    let dispatch = use_callback(move |intent: QuizIntent| {
        let mut controller = controller;
        let mut confirming = confirming;
        match intent {
            QuizIntent::Choose {
                question_id,
                option_id,
            } => {
                if let Some(c) = controller.write().as_mut() {
                    c.answer(question_id, option_id);
                }
            }
            QuizIntent::GoTo(index) => {
                if let Some(c) = controller.write().as_mut() {
                    c.navigate(index);
                }
            }
            QuizIntent::Next => {
                if let Some(c) = controller.write().as_mut() {
                    c.next();
                }
            }
            QuizIntent::Previous => {
                if let Some(c) = controller.write().as_mut() {
                    c.previous();
                }
            }
            QuizIntent::Submit | QuizIntent::ConfirmSubmit => {
                let unanswered = controller
                    .read()
                    .as_ref()
                    .map_or(0, |c| c.session().progress().unanswered);
                if intent == QuizIntent::Submit && unanswered > 0 {
                    confirming.set(true);
                    return;
                }
                confirming.set(false);
                let request = controller
                    .write()
                    .as_mut()
                    .and_then(SessionController::request_submit);
                if let Some(request) = request {
                    send_in_background(controller, gateway.clone(), request, navigator);
                }
            }
            QuizIntent::CancelSubmit => confirming.set(false),
            QuizIntent::Retry => {
                let request = controller.write().as_mut().and_then(SessionController::retry);
                if let Some(request) = request {
                    send_in_background(controller, gateway.clone(), request, navigator);
                }
            }
        }
    });

    #[cfg(test)]
    {
        let mut registered = use_signal(|| false);
        if !registered() {
            registered.set(true);
            if let Some(handles) = try_consume_context::<QuizTestHandles>() {
                handles.register(dispatch, controller);
            }
        }
    }

    if parsed.is_none() {
        return rsx! {
            div { class: "page",
                h2 { "Quiz" }
                p { "{ViewError::InvalidId.message()}" }
                Link { to: Route::Lessons {}, "Back to lessons" }
            }
        };
    }

    let screen = controller
        .read()
        .as_ref()
        .map_or(QuizScreen::Loading, |c| quiz_screen(c.session()));

    rsx! {
        div { class: "page quiz",
            match screen {
                QuizScreen::Loading => rsx! {
                    h2 { "Quiz" }
                    p { "Loading questions..." }
                },
                QuizScreen::LoadError { message } => rsx! {
                    h2 { "Quiz" }
                    p { "This quiz could not be loaded. Please reload the page." }
                    p { class: "detail", "{message}" }
                    Link { to: Route::Lessons {}, "Back to lessons" }
                },
                QuizScreen::Answering(vm) => rsx! {
                    AnsweringPanel { vm, confirming: confirming(), dispatch }
                },
                QuizScreen::Submitting { message } => rsx! {
                    h2 { "Quiz" }
                    p { class: "submitting", "{message}" }
                },
                QuizScreen::SubmitFailed { message } => rsx! {
                    h2 { "Quiz" }
                    p { "Your answers were not sent." }
                    p { class: "detail", "{message}" }
                    button {
                        class: "primary",
                        onclick: move |_| dispatch.call(QuizIntent::Retry),
                        "Try again"
                    }
                },
                QuizScreen::Rejected { message, actions } => rsx! {
                    h2 { "Quiz" }
                    p { "{message}" }
                    p { class: "detail", "Returning to your lessons..." }
                    div { class: "actions",
                        for action in actions {
                            ActionLink { action }
                        }
                    }
                },
                QuizScreen::Submitted { attempt_id } => rsx! {
                    h2 { "Quiz" }
                    p { "Your answers were submitted." }
                    Link { to: Route::Results { attempt_id: attempt_id.to_string() }, "See results" }
                },
                QuizScreen::Left => rsx! {},
            }
        }
    }
}

#[component]
fn AnsweringPanel(vm: QuizVm, confirming: bool, dispatch: Callback<QuizIntent>) -> Element {
    let clock_class = if vm.clock.urgent { "clock urgent" } else { "clock" };
    let prompt = if confirming {
        submit_confirmation(vm.unanswered)
    } else {
        None
    };

    rsx! {
        header { class: "quiz-header",
            h2 { "{vm.title}" }
            span { class: "{clock_class}", role: "timer", "{vm.clock.text}" }
        }
        nav { class: "palette",
            for item in vm.palette {
                button {
                    key: "{item.index}",
                    class: palette_class(item),
                    onclick: move |_| dispatch.call(QuizIntent::GoTo(item.index)),
                    "{item.number}"
                }
            }
        }
        p { class: "progress", "{vm.progress_label}" }
        if let Some(question) = vm.question {
            QuestionCard { question, dispatch }
        }
        div { class: "quiz-nav",
            button {
                disabled: !vm.can_go_back,
                onclick: move |_| dispatch.call(QuizIntent::Previous),
                "Previous"
            }
            button {
                disabled: !vm.can_go_forward,
                onclick: move |_| dispatch.call(QuizIntent::Next),
                "Next"
            }
            button {
                class: "primary",
                onclick: move |_| dispatch.call(QuizIntent::Submit),
                "Submit"
            }
        }
        if let Some(prompt) = prompt {
            div { class: "confirm",
                p { "{prompt}" }
                button {
                    class: "primary",
                    onclick: move |_| dispatch.call(QuizIntent::ConfirmSubmit),
                    "Submit anyway"
                }
                button {
                    onclick: move |_| dispatch.call(QuizIntent::CancelSubmit),
                    "Keep answering"
                }
            }
        }
    }
}

#[component]
fn QuestionCard(question: QuestionVm, dispatch: Callback<QuizIntent>) -> Element {
    let question_id = question.id;
    rsx! {
        section { class: "question",
            p { class: "question-heading", "{question.heading}" }
            p { class: "question-meta", "{question.kind_label} · {question.points_label}" }
            p { class: "question-text", "{question.text}" }
            ul { class: "choices",
                for choice in question.choices {
                    li { key: "{choice.id}",
                        button {
                            class: choice_class(choice.selected),
                            onclick: move |_| dispatch.call(QuizIntent::Choose {
                                question_id,
                                option_id: choice.id,
                            }),
                            "{choice.text}"
                        }
                    }
                }
            }
        }
    }
}

fn palette_class(item: PaletteItemVm) -> &'static str {
    if item.current {
        "palette-item current"
    } else if item.answered {
        "palette-item answered"
    } else {
        "palette-item"
    }
}

fn choice_class(selected: bool) -> &'static str {
    if selected { "choice selected" } else { "choice" }
}

/// Send a submission on a task that outlives the quiz screen.
fn send_in_background(
    controller: Signal<Option<SessionController>>,
    gateway: SubmissionGateway,
    request: SubmissionRequest,
    navigator: Navigator,
) {
    spawn_forever(async move {
        let mut controller = controller;
        let outcome = gateway.submit(&request).await;
        let phase = match controller.try_write() {
            Ok(mut guard) => guard.as_mut().map(|c| c.resolve(outcome).clone()),
            Err(_) => {
                info!(quiz_id = %request.quiz_id, "quiz screen closed before the submission resolved");
                None
            }
        };
        match phase {
            Some(SessionPhase::Submitted(result)) => {
                navigator.replace(Route::Results {
                    attempt_id: result.attempt_id.to_string(),
                });
            }
            Some(SessionPhase::Rejected(_)) => {
                tokio::time::sleep(REJECTED_REDIRECT_DELAY).await;
                // The student may have left on their own meanwhile.
                let still_shown = controller.try_read().is_ok_and(|guard| {
                    matches!(&*guard, Some(c) if matches!(c.session().phase(), SessionPhase::Rejected(_)))
                });
                if still_shown {
                    navigator.replace(Route::Lessons {});
                }
            }
            _ => {}
        }
    });
}

#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct QuizTestHandles {
    dispatch: Rc<RefCell<Option<Callback<QuizIntent>>>>,
    controller: Rc<RefCell<Option<Signal<Option<SessionController>>>>>,
}

#[cfg(test)]
impl QuizTestHandles {
    pub(crate) fn register(
        &self,
        dispatch: Callback<QuizIntent>,
        controller: Signal<Option<SessionController>>,
    ) {
        *self.dispatch.borrow_mut() = Some(dispatch);
        *self.controller.borrow_mut() = Some(controller);
    }

    pub(crate) fn dispatch(&self) -> Callback<QuizIntent> {
        (*self.dispatch.borrow()).expect("quiz dispatch registered")
    }

    pub(crate) fn controller(&self) -> Signal<Option<SessionController>> {
        (*self.controller.borrow()).expect("quiz controller registered")
    }
}
