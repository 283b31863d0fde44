//! Axum route handlers that proxy the side panel's backend calls.

use std::collections::BTreeMap;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::backend::models::{qa_pairs, FitBand, GapEntry};
use crate::backend::{
    JobDescriptionRequest, JobDescriptionResponse, QuestionsRequest, ResumeResponse,
    ReviewRequest, ReviewResponse,
};
use crate::errors::AppError;
use crate::panel::demo;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Review payload plus the display values the panel shows for it.
#[derive(Debug, Serialize)]
pub struct ReviewView {
    #[serde(flatten)]
    pub review: ReviewResponse,
    pub fit_label: String,
    pub fit_band: Option<FitBand>,
    pub rationale: String,
    pub gaps: Vec<GapEntry>,
    pub questions: Vec<String>,
}

impl From<ReviewResponse> for ReviewView {
    fn from(review: ReviewResponse) -> Self {
        Self {
            fit_label: review.fit_score_label(),
            fit_band: review.fit_band(),
            rationale: review.rationale().to_string(),
            gaps: review.gap_map().to_vec(),
            questions: review.questions().to_vec(),
            review,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AnswersRequest {
    pub questions: Vec<String>,
    /// Answers keyed by question index.
    #[serde(default)]
    pub answers: BTreeMap<usize, String>,
    #[serde(default)]
    pub demo: bool,
}

fn default_command() -> String {
    "load".to_string()
}

#[derive(Debug, Deserialize)]
pub struct ResumeQuery {
    #[serde(default = "default_command")]
    pub command: String,
    #[serde(default)]
    pub demo: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/review
pub async fn handle_review(
    State(state): State<AppState>,
    Json(mut request): Json<ReviewRequest>,
) -> Result<Json<ReviewView>, AppError> {
    request.job_description = request.job_description.trim().to_string();
    if request.job_description.is_empty() {
        return Err(AppError::Validation(
            "job_description must not be empty".to_string(),
        ));
    }

    if state.config.demo_mode {
        info!("Demo mode: serving the built-in review");
        return Ok(Json(demo::demo_review().into()));
    }

    let review = state.backend.review(&request).await?;
    if let Some(error) = review.error.as_deref().filter(|e| !e.is_empty()) {
        return Err(AppError::Backend {
            status: 200,
            message: error.to_string(),
        });
    }
    Ok(Json(review.into()))
}

/// POST /api/v1/questions
pub async fn handle_questions(
    State(state): State<AppState>,
    Json(request): Json<AnswersRequest>,
) -> Result<Json<ReviewView>, AppError> {
    if request.questions.is_empty() {
        return Err(AppError::Validation("no questions to answer".to_string()));
    }

    let body = QuestionsRequest {
        qa_pairs: qa_pairs(&request.questions, &request.answers),
        demo: request.demo || state.config.demo_mode,
    };
    let review = state.backend.submit_questions(&body).await?;
    Ok(Json(review.into()))
}

/// POST /api/v1/job-description
pub async fn handle_job_description(
    State(state): State<AppState>,
    Json(request): Json<JobDescriptionRequest>,
) -> Result<Json<JobDescriptionResponse>, AppError> {
    if state.config.demo_mode {
        return Ok(Json(JobDescriptionResponse {
            job_description: Some(demo::DEMO_JOB_DESCRIPTION.to_string()),
            error: None,
        }));
    }
    Ok(Json(state.backend.job_description(&request).await?))
}

/// GET /api/v1/resume?command=load&demo=false
pub async fn handle_resume(
    State(state): State<AppState>,
    Query(query): Query<ResumeQuery>,
) -> Result<Json<ResumeResponse>, AppError> {
    let demo = query.demo || state.config.demo_mode;
    Ok(Json(state.backend.resume(&query.command, demo).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testing::FakeBackend;
    use crate::backend::BackendError;

    fn review_request(job_description: &str) -> ReviewRequest {
        ReviewRequest {
            job_description: job_description.to_string(),
            url: "https://jobs.example.com/1".to_string(),
            demo: false,
        }
    }

    #[tokio::test]
    async fn test_review_adds_display_fields() {
        let (state, _) = AppState::for_tests(FakeBackend::default(), false);
        let Json(view) = handle_review(State(state), Json(review_request("  Rust  ")))
            .await
            .unwrap();
        assert_eq!(view.fit_label, "7/10");
        assert_eq!(view.fit_band, Some(FitBand::Strong));
        assert_eq!(view.questions.len(), 2);

        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("Tailored_Resume").is_some());
    }

    #[tokio::test]
    async fn test_blank_job_description_is_rejected() {
        let (state, backend) = AppState::for_tests(FakeBackend::default(), false);
        let result = handle_review(State(state), Json(review_request("   "))).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_demo_mode_skips_backend() {
        let (state, backend) = AppState::for_tests(FakeBackend::default(), true);
        let Json(view) = handle_review(State(state), Json(review_request("anything")))
            .await
            .unwrap();
        assert!(view.review.tailored_resume().contains("<span"));
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_backend_403_maps_to_forbidden() {
        let fake = FakeBackend::failing(|| BackendError::Forbidden("Account not enabled".into()));
        let (state, _) = AppState::for_tests(fake, false);
        let result = handle_review(State(state), Json(review_request("Rust"))).await;
        assert!(matches!(result, Err(AppError::Forbidden(m)) if m == "Account not enabled"));
    }

    #[tokio::test]
    async fn test_questions_are_paired_by_index() {
        let (state, backend) = AppState::for_tests(FakeBackend::default(), false);
        let request = AnswersRequest {
            questions: vec!["A?".into(), "B?".into()],
            answers: BTreeMap::from([(1, "yes".to_string())]),
            demo: false,
        };
        let Json(view) = handle_questions(State(state), Json(request)).await.unwrap();
        assert_eq!(view.fit_label, "7/10");
        assert_eq!(view.questions.len(), 2);

        let sent = backend.last_questions().unwrap();
        assert_eq!(sent.qa_pairs[0].answer, "");
        assert_eq!(sent.qa_pairs[1].answer, "yes");
    }

    #[tokio::test]
    async fn test_resume_defaults_to_load() {
        let (state, _) = AppState::for_tests(FakeBackend::default(), false);
        let query: ResumeQuery = serde_json::from_str("{}").unwrap();
        let Json(response) = handle_resume(State(state), Query(query)).await.unwrap();
        assert_eq!(response.resume.as_deref(), Some("resume for load"));
    }
}
