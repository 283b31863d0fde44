//! In-process `ResumeBackend` for handler and session tests.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::backend::models::Fit;
use crate::backend::{
    BackendError, JobDescriptionRequest, JobDescriptionResponse, QuestionsRequest,
    ResumeBackend, ResumeResponse, ReviewRequest, ReviewResponse,
};

pub const FAKE_RESUME: &str = r#"Managed **3** <span style="color:#c00000"><del>small</del></span><span style="color:#008000">large</span> projects"#;

type ErrorFactory = Box<dyn Fn() -> BackendError + Send + Sync>;

#[derive(Default)]
pub struct FakeBackend {
    calls: AtomicU32,
    fail_with: Option<ErrorFactory>,
    hang: bool,
    last_review: Mutex<Option<ReviewRequest>>,
    last_questions: Mutex<Option<QuestionsRequest>>,
}

impl FakeBackend {
    pub fn failing(error: impl Fn() -> BackendError + Send + Sync + 'static) -> Self {
        Self {
            fail_with: Some(Box::new(error)),
            ..Self::default()
        }
    }

    /// Review and question calls never complete.
    pub fn hanging() -> Self {
        Self {
            hang: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_review(&self) -> Option<ReviewRequest> {
        self.last_review.lock().unwrap().clone()
    }

    pub fn last_questions(&self) -> Option<QuestionsRequest> {
        self.last_questions.lock().unwrap().clone()
    }

    fn hit(&self) -> Result<(), BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.fail_with {
            Some(error) => Err(error()),
            None => Ok(()),
        }
    }

    async fn stall(&self) {
        if self.hang {
            std::future::pending::<()>().await;
        }
    }

    pub fn review_response() -> ReviewResponse {
        ReviewResponse {
            tailored_resume: Some(FAKE_RESUME.to_string()),
            fit: Some(Fit {
                score: Some(7.0),
                rationale: Some("Good overlap".to_string()),
            }),
            gap_map: None,
            questions: Some(vec!["Kubernetes?".to_string(), "Team size?".to_string()]),
            error: None,
        }
    }
}

#[async_trait]
impl ResumeBackend for FakeBackend {
    async fn review(&self, request: &ReviewRequest) -> Result<ReviewResponse, BackendError> {
        *self.last_review.lock().unwrap() = Some(request.clone());
        self.stall().await;
        self.hit()?;
        Ok(Self::review_response())
    }

    async fn submit_questions(
        &self,
        request: &QuestionsRequest,
    ) -> Result<ReviewResponse, BackendError> {
        *self.last_questions.lock().unwrap() = Some(request.clone());
        self.stall().await;
        self.hit()?;
        Ok(Self::review_response())
    }

    async fn job_description(
        &self,
        _request: &JobDescriptionRequest,
    ) -> Result<JobDescriptionResponse, BackendError> {
        self.hit()?;
        Ok(JobDescriptionResponse {
            job_description: Some("Senior Rust engineer".to_string()),
            error: None,
        })
    }

    async fn resume(&self, action: &str, _demo: bool) -> Result<ResumeResponse, BackendError> {
        self.hit()?;
        Ok(ResumeResponse {
            resume: Some(format!("resume for {action}")),
            error: None,
        })
    }
}
