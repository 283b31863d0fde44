//! Panel session: the single owner of the tailored Document and the transient
//! UI state around it (hover, edit draft, redline toggle, in-flight guard).
//!
//! Every resolution rewrites the whole document and re-tokenizes it, so change
//! ids are only meaningful for the current render. The host is expected to
//! re-render after each call.

pub mod demo;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::backend::models::qa_pairs;
use crate::backend::{BackendError, QuestionsRequest, ResumeBackend, ReviewRequest, ReviewResponse};
use crate::environment::{HostEnvironment, PanelFlags};
use crate::redline::{
    apply_at, clean_view, render, render_plain, tokenize, ChangeKind, ChangeStatus, Decision,
    RedlineError, RenderedDocument, TokenizedDocument, ViewState,
};

pub const CLEAN_EXPORT_FILENAME: &str = "resume.md";
pub const REDLINE_EXPORT_FILENAME: &str = "resume_redline.md";

#[derive(Debug, Error)]
pub enum PanelError {
    #[error("a request is already in progress")]
    Busy,

    #[error("change {0} cannot be edited")]
    NotEditable(String),

    #[error("no change is being edited")]
    NotEditing,

    #[error("unknown change {0}")]
    UnknownChange(String),

    #[error("job description is empty")]
    EmptyJobDescription,

    #[error("no questions to answer")]
    NoQuestions,

    #[error("answers were already submitted")]
    AlreadySubmitted,

    #[error(transparent)]
    Redline(#[from] RedlineError),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    #[default]
    JobDescription,
    Review,
    Resume,
}

/// One resolved change, kept for display ("3 accepted, 1 edited").
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub id: String,
    pub kind: ChangeKind,
    pub status: ChangeStatus,
}

/// What copy or download hands to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Export {
    pub filename: &'static str,
    pub content: String,
}

/// Clears the in-flight flag when a backend call ends, including when the
/// caller drops the future before it completes.
struct InFlight<'a>(&'a mut bool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

pub struct PanelSession {
    backend: Arc<dyn ResumeBackend>,
    environment: HostEnvironment,
    flags: PanelFlags,

    document: String,
    tokenized: TokenizedDocument,
    view: ViewState,
    show_redlines: bool,
    resolutions: Vec<Resolution>,

    active_tab: Tab,
    job_description: String,
    tab_url: String,
    review: Option<ReviewResponse>,
    answers: BTreeMap<usize, String>,
    questions_submitted: bool,

    in_flight: bool,
    error: Option<String>,
}

impl PanelSession {
    pub fn new(
        backend: Arc<dyn ResumeBackend>,
        environment: HostEnvironment,
        flags: PanelFlags,
    ) -> Self {
        let mut session = Self {
            backend,
            environment,
            flags,
            document: String::new(),
            tokenized: tokenize(""),
            view: ViewState::default(),
            show_redlines: true,
            resolutions: Vec::new(),
            active_tab: Tab::default(),
            job_description: String::new(),
            tab_url: String::new(),
            review: None,
            answers: BTreeMap::new(),
            questions_submitted: false,
            in_flight: false,
            error: None,
        };
        if flags.demo_mode {
            session.load_demo();
        }
        session
    }

    fn load_demo(&mut self) {
        info!("Loading demo job description and review");
        self.job_description = demo::DEMO_JOB_DESCRIPTION.to_string();
        let review = demo::demo_review();
        self.set_document(review.tailored_resume().to_string());
        self.review = Some(review);
    }

    // ────────────────────────────────────────────────────────────────────────
    // Accessors
    // ────────────────────────────────────────────────────────────────────────

    pub fn document(&self) -> &str {
        &self.document
    }

    pub fn tokenized(&self) -> &TokenizedDocument {
        &self.tokenized
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn flags(&self) -> PanelFlags {
        self.flags
    }

    pub fn environment(&self) -> HostEnvironment {
        self.environment
    }

    pub fn show_redlines(&self) -> bool {
        self.show_redlines
    }

    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    pub fn review(&self) -> Option<&ReviewResponse> {
        self.review.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight
    }

    pub fn resolutions(&self) -> &[Resolution] {
        &self.resolutions
    }

    pub fn questions_submitted(&self) -> bool {
        self.questions_submitted
    }

    pub fn set_tab(&mut self, tab: Tab) {
        self.active_tab = tab;
    }

    pub fn set_authenticated(&mut self, authenticated: bool) {
        self.flags.authenticated = authenticated;
        if authenticated {
            self.flags.authorized = true;
        }
    }

    pub fn set_tab_url(&mut self, url: impl Into<String>) {
        self.tab_url = url.into();
    }

    pub fn tab_url(&self) -> &str {
        &self.tab_url
    }

    /// Editing the job description text exits demo mode.
    pub fn set_job_description(&mut self, text: impl Into<String>) {
        let text = text.into();
        if self.flags.demo_mode && text != demo::DEMO_JOB_DESCRIPTION {
            info!("Job description edited, leaving demo mode");
            self.flags.demo_mode = false;
        }
        self.job_description = text;
    }

    pub fn job_description(&self) -> &str {
        &self.job_description
    }

    /// Replaces the document wholesale and drops all per-change UI state.
    pub fn set_document(&mut self, document: String) {
        self.tokenized = tokenize(&document);
        self.document = document;
        self.view = ViewState::default();
        self.resolutions.clear();
    }

    // ────────────────────────────────────────────────────────────────────────
    // Redline interaction
    // ────────────────────────────────────────────────────────────────────────

    pub fn hover(&mut self, id: Option<&str>) {
        self.view.hovered_id = id
            .filter(|id| self.tokenized.registry.get(id).is_some())
            .map(str::to_string);
    }

    pub fn accept(&mut self, id: &str) -> Result<(), PanelError> {
        self.resolve(id, Decision::Accept, ChangeStatus::Accepted)
    }

    pub fn reject(&mut self, id: &str) -> Result<(), PanelError> {
        self.resolve(id, Decision::Reject, ChangeStatus::Rejected)
    }

    /// Enters edit mode on an addition, leaving edit mode on any other change.
    /// The draft starts as the change's current text.
    pub fn begin_edit(&mut self, id: &str) -> Result<(), PanelError> {
        let change = self
            .tokenized
            .registry
            .get(id)
            .ok_or_else(|| PanelError::UnknownChange(id.to_string()))?;
        if change.kind != ChangeKind::Addition {
            return Err(PanelError::NotEditable(id.to_string()));
        }
        self.view.draft = change.display_text.clone();
        self.view.editing_id = Some(id.to_string());
        Ok(())
    }

    pub fn update_draft(&mut self, draft: impl Into<String>) -> Result<(), PanelError> {
        if self.view.editing_id.is_none() {
            return Err(PanelError::NotEditing);
        }
        self.view.draft = draft.into();
        Ok(())
    }

    /// Saves the draft: an implicit accept with the edited text.
    pub fn save_edit(&mut self) -> Result<(), PanelError> {
        let id = self.view.editing_id.clone().ok_or(PanelError::NotEditing)?;
        let draft = std::mem::take(&mut self.view.draft);
        self.resolve(&id, Decision::Edit(draft), ChangeStatus::Edited)
    }

    pub fn cancel_edit(&mut self) {
        self.view.editing_id = None;
        self.view.draft.clear();
    }

    fn resolve(&mut self, id: &str, decision: Decision, status: ChangeStatus) -> Result<(), PanelError> {
        let Some(change) = self.tokenized.registry.get(id) else {
            debug!("Change {id} is not in the current document, ignoring");
            return Ok(());
        };

        let document = apply_at(&self.document, change, &decision)?;
        let resolution = Resolution {
            id: change.id.clone(),
            kind: change.kind,
            status,
        };
        debug!("Resolved {} as {:?}", resolution.id, resolution.status);

        let resolutions = std::mem::take(&mut self.resolutions);
        self.set_document(document);
        self.resolutions = resolutions;
        self.resolutions.push(resolution);
        Ok(())
    }

    pub fn toggle_redlines(&mut self) {
        self.show_redlines = !self.show_redlines;
        if !self.show_redlines {
            self.cancel_edit();
            self.view.hovered_id = None;
        }
    }

    /// Display model for the résumé tab. Empty while résumé content is blocked.
    pub fn render(&self) -> RenderedDocument {
        if !self.flags.authorized {
            return RenderedDocument::default();
        }
        if self.show_redlines {
            render(&self.tokenized, &self.view)
        } else {
            render_plain(&self.clean_view())
        }
    }

    pub fn clean_view(&self) -> String {
        clean_view(&self.document)
    }

    /// Clean text when redlines are hidden, the raw document otherwise.
    pub fn export(&self) -> Export {
        if self.show_redlines {
            Export {
                filename: REDLINE_EXPORT_FILENAME,
                content: self.document.clone(),
            }
        } else {
            Export {
                filename: CLEAN_EXPORT_FILENAME,
                content: self.clean_view(),
            }
        }
    }

    // ────────────────────────────────────────────────────────────────────────
    // Backend calls
    // ────────────────────────────────────────────────────────────────────────

    /// Marks a review request as in flight and returns its body. Returns
    /// `Ok(None)` in demo mode, where the review is already loaded.
    pub fn begin_review(&mut self) -> Result<Option<ReviewRequest>, PanelError> {
        if self.in_flight {
            return Err(PanelError::Busy);
        }
        let job_description = self.job_description.trim();
        if job_description.is_empty() {
            return Err(PanelError::EmptyJobDescription);
        }
        if self.flags.demo_mode {
            self.active_tab = Tab::Review;
            return Ok(None);
        }

        let request = ReviewRequest {
            job_description: job_description.to_string(),
            url: self.tab_url.clone(),
            demo: false,
        };
        self.in_flight = true;
        self.error = None;
        Ok(Some(request))
    }

    pub fn finish_review(&mut self, result: Result<ReviewResponse, BackendError>) {
        self.in_flight = false;
        match result {
            Ok(review) => {
                self.set_document(review.tailored_resume().to_string());
                self.review = Some(review);
                self.answers.clear();
                self.questions_submitted = false;
                self.active_tab = Tab::Review;
            }
            Err(e) => self.record_backend_error(&e),
        }
    }

    pub async fn send_to_review(&mut self) -> Result<(), PanelError> {
        let Some(request) = self.begin_review()? else {
            return Ok(());
        };
        let backend = Arc::clone(&self.backend);
        let result = {
            let _guard = InFlight(&mut self.in_flight);
            backend.review(&request).await
        };
        let failed = result.is_err();
        self.finish_review(result);
        if failed {
            warn!("Review request failed: {}", self.error.as_deref().unwrap_or(""));
        }
        Ok(())
    }

    pub fn set_answer(&mut self, index: usize, answer: impl Into<String>) {
        self.answers.insert(index, answer.into());
    }

    pub fn answers(&self) -> &BTreeMap<usize, String> {
        &self.answers
    }

    pub async fn submit_answers(&mut self) -> Result<(), PanelError> {
        if self.in_flight {
            return Err(PanelError::Busy);
        }
        let questions = self
            .review
            .as_ref()
            .map(|r| r.questions().to_vec())
            .unwrap_or_default();
        if questions.is_empty() {
            return Err(PanelError::NoQuestions);
        }
        if self.questions_submitted {
            return Err(PanelError::AlreadySubmitted);
        }

        let request = QuestionsRequest {
            qa_pairs: qa_pairs(&questions, &self.answers),
            demo: self.flags.demo_mode,
        };
        self.in_flight = true;
        self.error = None;
        let backend = Arc::clone(&self.backend);
        let result = {
            let _guard = InFlight(&mut self.in_flight);
            backend.submit_questions(&request).await
        };

        match result {
            Ok(_) => {
                self.questions_submitted = true;
                Ok(())
            }
            Err(e) => {
                self.record_backend_error(&e);
                Err(e.into())
            }
        }
    }

    fn record_backend_error(&mut self, error: &BackendError) {
        match error {
            BackendError::Unauthorized(_) => self.flags.authenticated = false,
            BackendError::Forbidden(_) => self.flags.authorized = false,
            _ => {}
        }
        self.error = Some(error.to_string());
    }
}
