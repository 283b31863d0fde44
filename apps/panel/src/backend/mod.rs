/// Backend client. The single point of entry for calls to the remote résumé
/// analysis backend (`/review`, `/questions`, `/jobdescription`, `/resume`).
///
/// Every call gets a fixed time budget and one serial retry; 401 and 403 are
/// never retried. A 401 also clears the cached credential.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::auth::TokenStore;
use crate::config::Config;

pub mod handlers;
pub mod models;
pub mod retry;
#[cfg(test)]
pub(crate) mod testing;

pub use models::{
    JobDescriptionRequest, JobDescriptionResponse, QaPair, QuestionsRequest, ResumeResponse,
    ReviewRequest, ReviewResponse,
};
pub use retry::{with_retry, RetryPolicy};

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl BackendError {
    /// Whether an authenticated call may be attempted again.
    pub fn is_retryable(&self) -> bool {
        match self {
            BackendError::Unauthorized(_) | BackendError::Forbidden(_) => false,
            other => !other.to_string().to_lowercase().contains("authentication"),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Unauthorized(_) => Some(401),
            BackendError::Forbidden(_) => Some(403),
            BackendError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Per-call time budgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Job description fetch, résumé load.
    pub short: Duration,
    /// Review generation, question submission.
    pub long: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            short: Duration::from_secs(30),
            long: Duration::from_secs(150),
        }
    }
}

/// Operations the panel needs from the backend. `AppState` and the panel
/// session hold an `Arc<dyn ResumeBackend>` so tests can swap in a fake.
#[async_trait]
pub trait ResumeBackend: Send + Sync {
    async fn review(&self, request: &ReviewRequest) -> Result<ReviewResponse, BackendError>;

    async fn submit_questions(
        &self,
        request: &QuestionsRequest,
    ) -> Result<ReviewResponse, BackendError>;

    async fn job_description(
        &self,
        request: &JobDescriptionRequest,
    ) -> Result<JobDescriptionResponse, BackendError>;

    async fn resume(&self, action: &str, demo: bool) -> Result<ResumeResponse, BackendError>;
}

struct Call<'a> {
    method: Method,
    path: &'a str,
    query: Vec<(&'static str, String)>,
    body: Option<Value>,
    auth: bool,
    budget: Duration,
}

#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
    tokens: TokenStore,
    retry: RetryPolicy,
    timeouts: Timeouts,
}

impl BackendClient {
    pub fn new(
        base_url: impl Into<String>,
        tokens: TokenStore,
        retry: RetryPolicy,
        timeouts: Timeouts,
    ) -> Result<Self, BackendError> {
        Ok(Self {
            client: Client::builder().build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tokens,
            retry,
            timeouts,
        })
    }

    pub fn from_config(config: &Config, tokens: TokenStore) -> Result<Self, BackendError> {
        Self::new(
            config.backend_base_url(),
            tokens,
            RetryPolicy {
                retries: config.max_retries,
                delay: config.retry_delay,
            },
            Timeouts {
                short: config.short_timeout,
                long: config.long_timeout,
            },
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn call<T: DeserializeOwned>(&self, call: Call<'_>) -> Result<T, BackendError> {
        let auth = call.auth;
        let call = &call;
        with_retry(
            self.retry,
            |e: &BackendError| {
                if auth {
                    e.is_retryable()
                } else {
                    !matches!(e, BackendError::Unauthorized(_) | BackendError::Forbidden(_))
                }
            },
            |_| async move {
                match tokio::time::timeout(call.budget, self.send_once::<T>(call)).await {
                    Ok(result) => result,
                    Err(_) => Err(BackendError::Timeout(call.budget)),
                }
            },
        )
        .await
    }

    async fn send_once<T: DeserializeOwned>(&self, call: &Call<'_>) -> Result<T, BackendError> {
        let url = format!("{}{}", self.base_url, call.path);
        let mut request = self
            .client
            .request(call.method.clone(), &url)
            .header(ACCEPT, "application/json");

        if !call.query.is_empty() {
            request = request.query(&call.query);
        }
        if let Some(body) = &call.body {
            request = request.json(body);
        }
        if call.auth {
            match self.tokens.id_token().await {
                Ok(Some(id_token)) => request = request.bearer_auth(id_token),
                Ok(None) => {}
                Err(e) => warn!("Could not read stored credential, sending without it: {e}"),
            }
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(self.error_from_response(response).await);
        }

        let body = response.text().await?;
        debug!("{} {} succeeded ({} bytes)", call.method, call.path, body.len());
        Ok(serde_json::from_str(&body)?)
    }

    async fn error_from_response(&self, response: Response) -> BackendError {
        let status = response.status().as_u16();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.contains("application/json"))
            .unwrap_or(false);
        let body = response.text().await.unwrap_or_default();
        let message = extract_error_message(status, is_json, &body);

        match status {
            401 => {
                if let Err(e) = self.tokens.clear().await {
                    warn!("Failed to clear credential after 401: {e}");
                }
                BackendError::Unauthorized(message)
            }
            403 => BackendError::Forbidden(message),
            _ => BackendError::Api { status, message },
        }
    }
}

#[async_trait]
impl ResumeBackend for BackendClient {
    async fn review(&self, request: &ReviewRequest) -> Result<ReviewResponse, BackendError> {
        self.call(Call {
            method: Method::POST,
            path: "/review",
            query: Vec::new(),
            body: Some(serde_json::to_value(request)?),
            auth: true,
            budget: self.timeouts.long,
        })
        .await
    }

    async fn submit_questions(
        &self,
        request: &QuestionsRequest,
    ) -> Result<ReviewResponse, BackendError> {
        self.call(Call {
            method: Method::POST,
            path: "/questions",
            query: Vec::new(),
            body: Some(serde_json::to_value(request)?),
            auth: true,
            budget: self.timeouts.long,
        })
        .await
    }

    async fn job_description(
        &self,
        request: &JobDescriptionRequest,
    ) -> Result<JobDescriptionResponse, BackendError> {
        self.call(Call {
            method: Method::POST,
            path: "/jobdescription",
            query: Vec::new(),
            body: Some(serde_json::to_value(request)?),
            auth: false,
            budget: self.timeouts.short,
        })
        .await
    }

    async fn resume(&self, action: &str, demo: bool) -> Result<ResumeResponse, BackendError> {
        self.call(Call {
            method: Method::GET,
            path: "/resume",
            query: vec![("command", action.to_string()), ("demo", demo.to_string())],
            body: None,
            auth: true,
            budget: self.timeouts.short,
        })
        .await
    }
}

/// User-facing message for a failed response: `detail`, then `message`, then
/// the JSON body itself, then the raw text, then `HTTP <status>`.
pub fn extract_error_message(status: u16, is_json: bool, body: &str) -> String {
    if is_json {
        if let Ok(value) = serde_json::from_str::<Value>(body) {
            if let Some(detail) = value.get("detail").and_then(Value::as_str) {
                return detail.to_string();
            }
            if let Some(message) = value.get("message").and_then(Value::as_str) {
                return message.to_string();
            }
            if !value.is_null() {
                return value.to_string();
            }
        }
    }
    if !body.is_empty() {
        return body.to_string();
    }
    format!("HTTP {status}")
}
