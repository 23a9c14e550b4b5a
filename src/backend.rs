//! HTTP client for the remote insurance-advisory QA service.
//!
//! Two live operations plus one auxiliary:
//! - `check_health`: passive reachability probe. Never errors — any failure
//!   is just `false`, because it only drives the connectivity banner.
//! - `ask`: question submission. Failures propagate as `BackendError` so the
//!   controller can append the user-facing fallback turn.
//! - `history`: server-side Q&A log, for the history sidebar.
//!
//! The `ChatBackend` trait is the seam used by controller and poller tests.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::config;

/// Exact body the backend's probe endpoint returns when the chat
/// controller is registered. Anything else counts as unhealthy.
pub const HEALTH_CONFIRMATION: &str = "ChatController가 정상적으로 등록되었습니다!";

/// Connect timeout only — answers can take as long as the model needs,
/// so no overall request timeout is enforced.
const CONNECT_TIMEOUT_SECS: u64 = 5;

/// Errors from advisory backend operations.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Cannot reach advisory backend at {0}")]
    Connection(String),
    #[error("Request timed out")]
    Timeout,
    #[error("HTTP client error: {0}")]
    HttpClient(String),
    #[error("Backend returned HTTP {status}: {body}")]
    BackendStatus { status: u16, body: String },
    #[error("Failed to parse backend response: {0}")]
    ResponseParsing(String),
}

/// Request body for POST /chat.
#[derive(Serialize)]
struct AskRequest<'a> {
    question: &'a str,
}

/// Response body from POST /chat.
#[derive(Debug, Clone, Deserialize)]
struct AskResponse {
    #[serde(default)]
    answer: String,
    #[serde(default)]
    contexts: Option<Vec<String>>,
    #[serde(default)]
    confidence: Option<f32>,
}

/// Parsed answer augmented with the locally measured round-trip time.
#[derive(Debug, Clone)]
pub struct Answer {
    pub answer: String,
    pub contexts: Option<Vec<String>>,
    pub confidence: Option<f32>,
    pub processing_time_ms: u64,
}

/// One record from GET /chat/history (server-managed Q&A log).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: String,
    pub question: String,
    pub answer: String,
    /// ISO 8601 timestamp, as reported by the backend.
    pub timestamp: String,
    #[serde(default)]
    pub contexts: Option<Vec<String>>,
    #[serde(default)]
    pub confidence: Option<f32>,
}

/// Seam between the controller and the HTTP layer.
pub trait ChatBackend {
    /// True only when the probe endpoint answers 200 with the expected body.
    /// Must never propagate an error.
    fn check_health(&self) -> bool;

    /// Submit a question. Any transport, non-2xx, or parse failure is an
    /// error the caller must handle.
    fn ask(&self, question: &str) -> Result<Answer, BackendError>;

    fn history(&self) -> Result<Vec<HistoryRecord>, BackendError>;
}

/// reqwest-backed client for the advisory service.
pub struct BackendClient {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl BackendClient {
    /// Create a client against the given base URL (e.g. "http://host:8080/api").
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Client against the configured backend (env override or local default).
    pub fn from_env() -> Self {
        Self::new(&config::backend_base_url())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn map_send_error(&self, e: reqwest::Error) -> BackendError {
        if e.is_connect() {
            BackendError::Connection(self.base_url.clone())
        } else if e.is_timeout() {
            BackendError::Timeout
        } else {
            BackendError::HttpClient(e.to_string())
        }
    }
}

impl ChatBackend for BackendClient {
    fn check_health(&self) -> bool {
        let url = format!("{}/chat/test", self.base_url);
        let response = match self.client.get(&url).send() {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!(error = %e, "Health probe failed to reach backend");
                return false;
            }
        };

        if response.status() != reqwest::StatusCode::OK {
            tracing::debug!(status = %response.status(), "Health probe got non-200");
            return false;
        }

        match response.text() {
            Ok(body) => body == HEALTH_CONFIRMATION,
            Err(e) => {
                tracing::debug!(error = %e, "Health probe body unreadable");
                false
            }
        }
    }

    fn ask(&self, question: &str) -> Result<Answer, BackendError> {
        let url = format!("{}/chat", self.base_url);
        let body = AskRequest { question };

        let started = Instant::now();
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(BackendError::BackendStatus {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: AskResponse = response
            .json()
            .map_err(|e| BackendError::ResponseParsing(e.to_string()))?;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        Ok(Answer {
            answer: parsed.answer,
            contexts: parsed.contexts,
            confidence: parsed.confidence,
            processing_time_ms: elapsed_ms,
        })
    }

    fn history(&self) -> Result<Vec<HistoryRecord>, BackendError> {
        let url = format!("{}/chat/history", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(BackendError::BackendStatus {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .map_err(|e| BackendError::ResponseParsing(e.to_string()))
    }
}

/// Mock backend for testing — configurable outcome, counts `ask` calls.
pub struct MockBackend {
    healthy: bool,
    fail_ask: bool,
    answer: String,
    confidence: Option<f32>,
    contexts: Option<Vec<String>>,
    history: Vec<HistoryRecord>,
    ask_calls: std::sync::Mutex<usize>,
}

impl MockBackend {
    /// A healthy backend answering every question with `answer`.
    pub fn answering(answer: &str) -> Self {
        Self {
            healthy: true,
            fail_ask: false,
            answer: answer.to_string(),
            confidence: None,
            contexts: None,
            history: Vec::new(),
            ask_calls: std::sync::Mutex::new(0),
        }
    }

    /// An unreachable backend: unhealthy, every `ask` fails.
    pub fn failing() -> Self {
        Self {
            healthy: false,
            fail_ask: true,
            answer: String::new(),
            confidence: None,
            contexts: None,
            history: Vec::new(),
            ask_calls: std::sync::Mutex::new(0),
        }
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn with_contexts(mut self, contexts: Vec<&str>) -> Self {
        self.contexts = Some(contexts.into_iter().map(String::from).collect());
        self
    }

    pub fn with_history(mut self, history: Vec<HistoryRecord>) -> Self {
        self.history = history;
        self
    }

    /// How many times `ask` was dispatched.
    pub fn ask_count(&self) -> usize {
        self.ask_calls.lock().map(|c| *c).unwrap_or(0)
    }
}

impl ChatBackend for MockBackend {
    fn check_health(&self) -> bool {
        self.healthy
    }

    fn ask(&self, _question: &str) -> Result<Answer, BackendError> {
        if let Ok(mut calls) = self.ask_calls.lock() {
            *calls += 1;
        }
        if self.fail_ask {
            return Err(BackendError::Connection("mock".to_string()));
        }
        Ok(Answer {
            answer: self.answer.clone(),
            contexts: self.contexts.clone(),
            confidence: self.confidence,
            processing_time_ms: 0,
        })
    }

    fn history(&self) -> Result<Vec<HistoryRecord>, BackendError> {
        if self.fail_ask {
            return Err(BackendError::Connection("mock".to_string()));
        }
        Ok(self.history.clone())
    }
}
