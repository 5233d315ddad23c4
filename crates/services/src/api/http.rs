use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use lms_core::model::{
    AttemptId, AttemptResult, AttemptReview, LessonCard, QuizId, QuizPaper, Remedial,
};
use lms_core::session::SubmissionRequest;

use super::LmsBackend;
use super::dto::{
    AttemptResultDto, AttemptReviewDto, ErrorBody, LessonsDto, QuizPaperDto, RemedialsDto,
    SubmitBody,
};
use crate::config::ApiConfig;
use crate::error::ApiError;

/// `LmsBackend` over JSON/HTTP.
#[derive(Clone, Debug)]
pub struct HttpBackend {
    client: Client,
    config: ApiConfig,
}

impl HttpBackend {
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client cannot be built.
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self { client, config })
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Build the submit request without sending it.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Url` if the endpoint cannot be resolved.
    pub fn build_submit(&self, request: &SubmissionRequest) -> Result<RequestBuilder, ApiError> {
        let url = self.config.endpoint("quiz-attempts/submit")?;
        Ok(self.authorize(self.client.post(url).json(&SubmitBody::from(request))))
    }

    fn get(&self, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.config.endpoint(path)?;
        Ok(self.authorize(self.client.get(url)))
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.config.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

#[async_trait]
impl LmsBackend for HttpBackend {
    async fn quiz_paper(&self, quiz_id: QuizId) -> Result<QuizPaper, ApiError> {
        debug!(%quiz_id, "fetching quiz questions");
        let response = self.get(&format!("quizzes/{quiz_id}/questions"))?.send().await?;
        let dto: QuizPaperDto = read_json(response).await?;
        Ok(QuizPaper::try_from(dto)?)
    }

    async fn submit_attempt(
        &self,
        request: &SubmissionRequest,
    ) -> Result<AttemptResult, ApiError> {
        debug!(quiz_id = %request.quiz_id, answers = request.answers.len(), "posting attempt");
        let response = self.build_submit(request)?.send().await?;
        let dto: AttemptResultDto = read_json(response).await?;
        Ok(dto.into_result(request.time_taken_seconds))
    }

    async fn attempt_review(&self, attempt_id: AttemptId) -> Result<AttemptReview, ApiError> {
        let response = self
            .get(&format!("quiz-attempts/{attempt_id}/result"))?
            .send()
            .await?;
        let dto: AttemptReviewDto = read_json(response).await?;
        Ok(dto.into())
    }

    async fn lessons(&self) -> Result<Vec<LessonCard>, ApiError> {
        let response = self.get("lessons")?.send().await?;
        let dto: LessonsDto = read_json(response).await?;
        Ok(dto.lessons.into_iter().map(LessonCard::from).collect())
    }

    async fn remedials(&self) -> Result<Vec<Remedial>, ApiError> {
        let response = self.get("remedials")?.send().await?;
        let dto: RemedialsDto = read_json(response).await?;
        Ok(dto.remedials.into_iter().map(Remedial::from).collect())
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let raw = response.text().await.unwrap_or_default();
    let body: ErrorBody = serde_json::from_str(&raw).unwrap_or_default();
    let message = body.text().map_or_else(
        || status.canonical_reason().unwrap_or("request failed").to_string(),
        str::to_string,
    );
    Err(ApiError::Status {
        status,
        code: body.code,
        message,
    })
}
