use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;

use lms_core::Clock;
use lms_core::model::{
    AttemptId, AttemptResult, AttemptReview, Choice, LessonCard, LessonId, OptionId, Question,
    QuestionId, QuestionKind, QuestionReview, Quiz, QuizId, QuizPaper, Remedial, RemedialId,
    RemedialStatus,
};
use lms_core::session::SubmissionRequest;

use super::LmsBackend;
use super::dto::{REJECT_ALREADY_SUBMITTED, REJECT_NO_ATTEMPTS};
use crate::error::ApiError;

/// Scripted outcome for the next submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptedSubmit {
    /// Grade against the answer key, like a real backend would.
    Grade,
    /// Fail as if the network dropped the request.
    TransportFailure,
    /// Refuse with the given backend error code.
    Reject { code: &'static str },
}

struct QuizEntry {
    paper: QuizPaper,
    answer_key: HashMap<QuestionId, OptionId>,
}

#[derive(Default)]
struct State {
    quizzes: HashMap<QuizId, QuizEntry>,
    lessons: Vec<LessonCard>,
    remedials: Vec<Remedial>,
    reviews: HashMap<AttemptId, AttemptReview>,
    script: VecDeque<ScriptedSubmit>,
    submissions: Vec<SubmissionRequest>,
    passed: HashSet<QuizId>,
    attempts_used: HashMap<QuizId, u32>,
    max_attempts: Option<u32>,
    next_attempt: u64,
    next_remedial: u64,
    unavailable: bool,
}

/// Backend kept in memory: grades attempts, gates lessons and records remedials.
///
/// Used by tests and by the demo mode of the app.
#[derive(Clone)]
pub struct InMemoryBackend {
    clock: Clock,
    latency: Duration,
    state: Arc<Mutex<State>>,
}

impl InMemoryBackend {
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        Self {
            clock,
            latency: Duration::ZERO,
            state: Arc::new(Mutex::new(State {
                next_attempt: 1,
                next_remedial: 1,
                ..State::default()
            })),
        }
    }

    /// Delay every submission by `latency`.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Register a quiz with its answer key.
    #[must_use]
    pub fn with_quiz(
        self,
        paper: QuizPaper,
        answer_key: impl IntoIterator<Item = (QuestionId, OptionId)>,
    ) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.quizzes.insert(
                paper.quiz().id(),
                QuizEntry {
                    paper,
                    answer_key: answer_key.into_iter().collect(),
                },
            );
        }
        self
    }

    /// Register a lesson. Its `locked` flag is recomputed on every listing.
    #[must_use]
    pub fn with_lesson(self, lesson: LessonCard) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.lessons.push(lesson);
        }
        self
    }

    #[must_use]
    pub fn with_max_attempts(self, max: u32) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.max_attempts = Some(max);
        }
        self
    }

    /// Queue the outcome of the next submission. Unscripted submissions are graded.
    pub fn script_submit(&self, outcome: ScriptedSubmit) {
        if let Ok(mut state) = self.state.lock() {
            state.script.push_back(outcome);
        }
    }

    /// Make every call fail as unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.unavailable = unavailable;
        }
    }

    /// Every submission that reached this backend, in arrival order.
    #[must_use]
    pub fn submissions(&self) -> Vec<SubmissionRequest> {
        self.state
            .lock()
            .map(|state| state.submissions.clone())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn submission_count(&self) -> usize {
        self.state
            .lock()
            .map(|state| state.submissions.len())
            .unwrap_or_default()
    }

    fn state(&self) -> Result<MutexGuard<'_, State>, ApiError> {
        let state = self
            .state
            .lock()
            .map_err(|e| ApiError::Unavailable(e.to_string()))?;
        if state.unavailable {
            return Err(ApiError::Unavailable("connection refused".into()));
        }
        Ok(state)
    }

    /// A small biology course with two gated lessons and two quizzes.
    #[must_use]
    pub fn sample_course(clock: Clock) -> Self {
        let backend = Self::new(clock);
        let (cells, cells_key) = sample_quiz(
            1,
            "Cell Structure Check",
            5,
            &[
                ("Which organelle holds the genetic material?", &["Nucleus", "Ribosome", "Vacuole"], 0, 1),
                ("Plant cells have a cell wall.", &["True", "False"], 0, 1),
                ("Where is most ATP produced?", &["Golgi body", "Mitochondria", "Lysosome"], 1, 2),
            ],
        );
        let (division, division_key) = sample_quiz(
            2,
            "Cell Division Check",
            3,
            &[
                ("Mitosis yields two identical daughter cells.", &["True", "False"], 0, 1),
                ("Which phase aligns chromosomes at the equator?", &["Prophase", "Metaphase", "Telophase"], 1, 1),
            ],
        );
        backend
            .with_quiz(cells, cells_key)
            .with_quiz(division, division_key)
            .with_lesson(sample_lesson(1, "Cell Structure", 1, Some(1)))
            .with_lesson(sample_lesson(2, "Cell Division", 2, Some(2)))
            .with_lesson(sample_lesson(3, "Genetics Basics", 3, None))
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new(Clock::default())
    }
}

#[async_trait]
impl LmsBackend for InMemoryBackend {
    async fn quiz_paper(&self, quiz_id: QuizId) -> Result<QuizPaper, ApiError> {
        let state = self.state()?;
        state
            .quizzes
            .get(&quiz_id)
            .map(|entry| entry.paper.clone())
            .ok_or_else(|| not_found(format!("quiz {quiz_id} not found")))
    }

    async fn submit_attempt(
        &self,
        request: &SubmissionRequest,
    ) -> Result<AttemptResult, ApiError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let mut state = self.state()?;
        state.submissions.push(request.clone());
        match state.script.pop_front().unwrap_or(ScriptedSubmit::Grade) {
            ScriptedSubmit::Grade => {}
            ScriptedSubmit::TransportFailure => {
                return Err(ApiError::Unavailable("connection reset by peer".into()));
            }
            ScriptedSubmit::Reject { code } => return Err(rejected(code)),
        }

        let used = state.attempts_used.get(&request.quiz_id).copied().unwrap_or(0);
        if state.max_attempts.is_some_and(|max| used >= max) {
            return Err(rejected(REJECT_NO_ATTEMPTS));
        }
        state.attempts_used.insert(request.quiz_id, used + 1);
        let now = self.clock.now();
        grade(&mut state, request, now)
    }

    async fn attempt_review(&self, attempt_id: AttemptId) -> Result<AttemptReview, ApiError> {
        let state = self.state()?;
        state
            .reviews
            .get(&attempt_id)
            .cloned()
            .ok_or_else(|| not_found(format!("attempt {attempt_id} not found")))
    }

    async fn lessons(&self) -> Result<Vec<LessonCard>, ApiError> {
        let state = self.state()?;
        Ok(state
            .lessons
            .iter()
            .map(|lesson| {
                let gate = state
                    .lessons
                    .iter()
                    .filter(|other| other.subject == lesson.subject && other.position < lesson.position)
                    .max_by_key(|other| other.position);
                let locked_by = gate.filter(|prev| {
                    prev.linked_quiz_id
                        .is_some_and(|quiz| !state.passed.contains(&quiz))
                });
                LessonCard {
                    locked: locked_by.is_some(),
                    prerequisite_title: locked_by.map(|prev| prev.title.clone()),
                    ..lesson.clone()
                }
            })
            .collect())
    }

    async fn remedials(&self) -> Result<Vec<Remedial>, ApiError> {
        Ok(self.state()?.remedials.clone())
    }
}

fn grade(
    state: &mut State,
    request: &SubmissionRequest,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<AttemptResult, ApiError> {
    let entry = state
        .quizzes
        .get(&request.quiz_id)
        .ok_or_else(|| not_found(format!("quiz {} not found", request.quiz_id)))?;

    let mut earned = 0_u32;
    let mut questions = Vec::with_capacity(entry.paper.questions().len());
    for question in entry.paper.questions() {
        let selected = request.answers.get(&question.id()).copied();
        let correct = entry.answer_key.get(&question.id()).copied();
        let is_correct = selected.is_some() && selected == correct;
        if is_correct {
            earned += question.points();
        }
        questions.push(QuestionReview {
            question_id: question.id(),
            text: question.text().to_string(),
            selected_option_id: selected,
            selected_text: selected.and_then(|id| choice_text(question, id)),
            correct_option_id: correct,
            correct_text: correct.and_then(|id| choice_text(question, id)),
            is_correct,
            points_awarded: if is_correct { f64::from(question.points()) } else { 0.0 },
            points: f64::from(question.points()),
        });
    }

    let quiz = entry.paper.quiz().clone();
    let total = entry.paper.total_points();
    let percentage = if total == 0 {
        0.0
    } else {
        (f64::from(earned) * 1000.0 / f64::from(total)).round() / 10.0
    };
    let passed = percentage >= f64::from(quiz.passing_rate());
    let linked_lesson_id = state
        .lessons
        .iter()
        .find(|lesson| lesson.linked_quiz_id == Some(quiz.id()))
        .map(|lesson| lesson.id);

    let remedial_id = if passed {
        state.passed.insert(quiz.id());
        None
    } else {
        let id = RemedialId::new(state.next_remedial);
        state.next_remedial += 1;
        state.remedials.push(Remedial {
            id,
            quiz_title: quiz.title().to_string(),
            lesson_id: linked_lesson_id,
            status: RemedialStatus::Pending,
            assigned_at: now,
        });
        Some(id)
    };

    let attempt_id = AttemptId::new(state.next_attempt);
    state.next_attempt += 1;
    let result = AttemptResult {
        attempt_id,
        earned_points: f64::from(earned),
        total_points: f64::from(total),
        percentage,
        passed,
        time_spent_seconds: request.time_taken_seconds,
        linked_lesson_id,
        remedial_id,
    };
    state.reviews.insert(
        attempt_id,
        AttemptReview {
            result: result.clone(),
            quiz_title: Some(quiz.title().to_string()),
            questions,
        },
    );
    Ok(result)
}

fn choice_text(question: &Question, id: OptionId) -> Option<String> {
    question
        .choices()
        .iter()
        .find(|choice| choice.id == id)
        .map(|choice| choice.text.clone())
}

fn not_found(message: String) -> ApiError {
    ApiError::Status {
        status: StatusCode::NOT_FOUND,
        code: None,
        message,
    }
}

fn rejected(code: &str) -> ApiError {
    let message = match code {
        REJECT_NO_ATTEMPTS => "no attempts remaining for this quiz",
        REJECT_ALREADY_SUBMITTED => "this attempt was already submitted",
        _ => "attempt refused",
    };
    ApiError::Status {
        status: StatusCode::CONFLICT,
        code: Some(code.to_string()),
        message: message.to_string(),
    }
}

type SampleQuestion<'a> = (&'a str, &'a [&'a str], usize, u32);

fn sample_quiz(
    quiz_id: u64,
    title: &str,
    minutes: u32,
    questions: &[SampleQuestion<'_>],
) -> (QuizPaper, Vec<(QuestionId, OptionId)>) {
    let mut built = Vec::with_capacity(questions.len());
    let mut key = Vec::with_capacity(questions.len());
    for (index, (text, choices, correct, points)) in questions.iter().enumerate() {
        let question_id = QuestionId::new(quiz_id * 100 + index as u64 + 1);
        let choices: Vec<Choice> = choices
            .iter()
            .enumerate()
            .map(|(n, label)| Choice::new(OptionId::new(question_id.value() * 10 + n as u64 + 1), *label))
            .collect();
        let kind = if choices.len() == 2 {
            QuestionKind::TrueFalse
        } else {
            QuestionKind::MultipleChoice
        };
        key.push((question_id, choices[*correct].id));
        if let Ok(question) = Question::new(question_id, *text, kind, *points, choices) {
            built.push(question);
        }
    }
    let paper = Quiz::new(QuizId::new(quiz_id), title, minutes, 60)
        .and_then(|quiz| QuizPaper::new(quiz, built));
    match paper {
        Ok(paper) => (paper, key),
        Err(err) => unreachable!("sample quiz {quiz_id} is well-formed: {err}"),
    }
}

fn sample_lesson(id: u64, title: &str, position: u32, quiz: Option<u64>) -> LessonCard {
    LessonCard {
        id: LessonId::new(id),
        subject: "Biology".into(),
        title: title.into(),
        position,
        linked_quiz_id: quiz.map(QuizId::new),
        locked: false,
        prerequisite_title: None,
    }
}
