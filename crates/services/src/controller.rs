use std::sync::Arc;

use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use lms_core::Clock;
use lms_core::model::{AttemptResult, OptionId, QuestionId, QuizId};
use lms_core::session::{
    Effect, QuizSession, SessionEvent, SessionPhase, SubmissionRequest, SubmitFailure,
};

use crate::api::LmsBackend;
use crate::gateway::SubmissionGateway;
use crate::timer::{SessionTimer, TimerSignal};

/// Runs one quiz session: feeds events to the reducer and carries out its effects.
///
/// Timer effects are executed here. A `Submit` effect is handed back to the
/// caller as a [`SubmissionRequest`], so the network call can run without
/// holding the controller; its outcome comes back through [`Self::resolve`].
pub struct SessionController {
    session: QuizSession,
    gateway: SubmissionGateway,
    timer: SessionTimer,
    signals: Option<UnboundedReceiver<TimerSignal>>,
    started: Option<Instant>,
    clock: Clock,
}

impl SessionController {
    #[must_use]
    pub fn new(quiz_id: QuizId, gateway: SubmissionGateway, clock: Clock) -> Self {
        Self {
            session: QuizSession::new(quiz_id),
            gateway,
            timer: SessionTimer::new(),
            signals: None,
            started: None,
            clock,
        }
    }

    /// Create a session and fetch its questions. The countdown starts once they load.
    ///
    /// A failed fetch leaves the session in `LoadError`.
    pub async fn open(backend: Arc<dyn LmsBackend>, quiz_id: QuizId, clock: Clock) -> Self {
        let mut controller = Self::new(quiz_id, SubmissionGateway::new(backend), clock);
        controller.load().await;
        controller
    }

    /// Fetch the questions for a session still in `Loading`.
    pub async fn load(&mut self) {
        let quiz_id = self.session.quiz_id();
        let event = match self.gateway.backend().quiz_paper(quiz_id).await {
            Ok(paper) => SessionEvent::Loaded {
                paper,
                started_at: self.clock.now(),
            },
            Err(err) => {
                warn!(session = %self.session.id(), %quiz_id, error = %err, "quiz failed to load");
                SessionEvent::LoadFailed {
                    message: err.to_string(),
                }
            }
        };
        self.handle(event);
    }

    /// Apply one event and run its effects. Returns the submission to send, if any.
    pub fn handle(&mut self, event: SessionEvent) -> Option<SubmissionRequest> {
        let name = event.name();
        let transition = self.session.apply(event);
        if !transition.accepted {
            debug!(session = %self.session.id(), event = name, phase = ?self.session.phase(), "event ignored");
            return None;
        }

        let mut submission = None;
        for effect in transition.effects {
            match effect {
                Effect::StartTimer { limit_secs } => {
                    let (tx, rx) = unbounded_channel();
                    self.started = Some(Instant::now());
                    self.signals = Some(rx);
                    self.timer.start(limit_secs, tx);
                    info!(
                        session = %self.session.id(),
                        quiz_id = %self.session.quiz_id(),
                        limit_secs,
                        questions = self.session.questions().len(),
                        "session started"
                    );
                }
                Effect::StopTimer => self.timer.stop(),
                Effect::Submit(request) => {
                    info!(
                        session = %self.session.id(),
                        trigger = ?self.session.trigger(),
                        answered = request.answers.len(),
                        time_taken_seconds = request.time_taken_seconds,
                        "submitting attempt"
                    );
                    submission = Some(request);
                }
            }
        }
        submission
    }

    /// Record an answer. Returns false when the session no longer accepts input.
    pub fn answer(&mut self, question_id: QuestionId, option_id: OptionId) -> bool {
        self.session
            .apply(SessionEvent::Answered {
                question_id,
                option_id,
            })
            .accepted
    }

    /// Jump to the question at `index`, clamped to the question range.
    pub fn navigate(&mut self, index: usize) -> bool {
        self.session.apply(SessionEvent::Navigated { index }).accepted
    }

    pub fn next(&mut self) -> bool {
        let mut navigator = self.session.navigator();
        navigator.next();
        self.navigate(navigator.current())
    }

    pub fn previous(&mut self) -> bool {
        let mut navigator = self.session.navigator();
        navigator.previous();
        self.navigate(navigator.current())
    }

    /// Manual submit. Returns the submission to send when this call won the gate.
    pub fn request_submit(&mut self) -> Option<SubmissionRequest> {
        let elapsed = self.started.map(|at| at.elapsed()).unwrap_or_default();
        self.handle(SessionEvent::SubmitRequested { elapsed })
    }

    /// Apply a countdown signal. Expiry may produce the forced submission.
    pub fn on_timer(&mut self, signal: TimerSignal) -> Option<SubmissionRequest> {
        self.handle(signal.into())
    }

    /// Re-send the frozen payload after a transport failure.
    pub fn retry(&mut self) -> Option<SubmissionRequest> {
        self.handle(SessionEvent::RetryRequested)
    }

    /// Feed back the outcome of a submission call.
    pub fn resolve(&mut self, outcome: Result<AttemptResult, SubmitFailure>) -> &SessionPhase {
        self.handle(SessionEvent::SubmitResolved(outcome));
        self.session.phase()
    }

    /// The quiz screen went away. Stops the countdown; a submission in flight still resolves.
    pub fn abandon(&mut self) {
        if self.session.accepts_input() {
            info!(session = %self.session.id(), "session abandoned");
        }
        self.handle(SessionEvent::Abandoned);
    }

    /// Send `request` through the gateway and apply the outcome.
    pub async fn submit(&mut self, request: SubmissionRequest) -> &SessionPhase {
        let outcome = self.gateway.submit(&request).await;
        self.resolve(outcome)
    }

    /// Manual submit followed by the network call. Returns false when the gate was already taken.
    pub async fn submit_now(&mut self) -> bool {
        match self.request_submit() {
            Some(request) => {
                self.submit(request).await;
                true
            }
            None => false,
        }
    }

    /// Hand the countdown signals to the caller, who must feed them to [`Self::on_timer`].
    pub fn take_timer_signals(&mut self) -> Option<UnboundedReceiver<TimerSignal>> {
        self.signals.take()
    }

    /// Wait for the next countdown signal. `None` once the countdown stopped.
    pub async fn next_timer_signal(&mut self) -> Option<TimerSignal> {
        match self.signals.as_mut() {
            Some(rx) => rx.recv().await,
            None => None,
        }
    }

    /// Follow the countdown until the session leaves `InProgress`, sending the
    /// forced submission if time runs out.
    pub async fn run_to_deadline(&mut self) -> &SessionPhase {
        while self.session.accepts_input() {
            let Some(signal) = self.next_timer_signal().await else {
                break;
            };
            if let Some(request) = self.on_timer(signal) {
                self.submit(request).await;
            }
        }
        self.session.phase()
    }

    #[must_use]
    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    #[must_use]
    pub fn gateway(&self) -> &SubmissionGateway {
        &self.gateway
    }

    #[must_use]
    pub fn is_timer_running(&self) -> bool {
        self.timer.is_running()
    }
}
