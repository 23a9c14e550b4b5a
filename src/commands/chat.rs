//! Chat IPC commands.
//!
//! Commands:
//! - `send_chat_message`: run one submission through the controller
//! - `cancel_chat_message`: abandon the in-flight submission
//! - `get_chat_view`: transcript + flags + derived low-confidence notice
//! - `set_question_mode` / `get_question_mode`: advisory question category
//! - `clear_messages`: new-chat affordance
//! - `check_backend_health`: one-off reachability probe
//! - `fetch_chat_history`: server-side Q&A log
//! - `get_welcome_content`: mode copy + example questions
//!
//! HTTP-bound commands run on a blocking thread to avoid freezing the UI.

use std::str::FromStr;
use std::sync::Arc;

use tauri::State;

use crate::backend::{ChatBackend, HistoryRecord};
use crate::chat::{
    confidence_label, example_questions, mode_description, mode_title, ExampleQuestion,
    WELCOME_SUBTITLE, WELCOME_TITLE,
};
use crate::controller::{low_confidence_notice, SendOutcome, LOW_CONFIDENCE_NOTICE};
use crate::models::enums::QuestionMode;
use crate::models::Message;
use crate::store::ChatStore;

use super::state::AppState;

// ═══════════════════════════════════════════
// Frontend-facing types
// ═══════════════════════════════════════════

/// Frontend-friendly message representation.
/// Converts Uuid/DateTime to String and derives the confidence label.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MessageView {
    pub id: String,
    pub role: String,
    pub content: String,
    pub created_at: String,
    pub confidence: Option<f32>,
    pub confidence_label: Option<String>,
    pub contexts: Option<Vec<String>>,
    pub latency_ms: Option<u64>,
}

impl From<Message> for MessageView {
    fn from(m: Message) -> Self {
        MessageView {
            id: m.id.to_string(),
            role: m.role.as_str().to_string(),
            content: m.content,
            created_at: m.created_at.to_rfc3339(),
            confidence: m.confidence,
            confidence_label: m.confidence.map(|c| confidence_label(c).to_string()),
            contexts: m.contexts,
            latency_ms: m.latency_ms,
        }
    }
}

/// Everything the chat screen renders, in one payload.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ChatView {
    pub messages: Vec<MessageView>,
    pub pending: bool,
    pub connectivity: String,
    pub mode: String,
    /// Derived: last turn is a weak assistant answer.
    pub low_confidence: bool,
    pub low_confidence_notice: String,
}

/// Result of one submission: terminal outcome plus the refreshed view.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SendReply {
    pub outcome: SendOutcome,
    pub view: ChatView,
}

/// Welcome screen content for the selected mode.
#[derive(Debug, Clone, serde::Serialize)]
pub struct WelcomeContent {
    pub title: String,
    pub subtitle: String,
    pub mode_title: String,
    pub mode_description: String,
    pub examples: Vec<ExampleQuestion>,
}

pub(crate) fn build_chat_view(store: &ChatStore) -> Result<ChatView, String> {
    let snap = store.snapshot().map_err(|e| e.to_string())?;
    let low_confidence = low_confidence_notice(&snap.messages);
    Ok(ChatView {
        messages: snap.messages.into_iter().map(MessageView::from).collect(),
        pending: snap.pending,
        connectivity: snap.connectivity.as_str().to_string(),
        mode: snap.mode.as_str().to_string(),
        low_confidence,
        low_confidence_notice: LOW_CONFIDENCE_NOTICE.to_string(),
    })
}

// ═══════════════════════════════════════════
// Commands
// ═══════════════════════════════════════════

/// Submit a question to the advisory backend.
#[tauri::command]
pub async fn send_chat_message(
    text: String,
    state: State<'_, Arc<AppState>>,
) -> Result<SendReply, String> {
    let app = Arc::clone(state.inner());
    let outcome = tauri::async_runtime::spawn_blocking(move || {
        app.controller
            .send(&app.backend, &text)
            .map_err(|e| e.to_string())
    })
    .await
    .map_err(|e| format!("Task failed: {e}"))??;

    Ok(SendReply {
        outcome,
        view: build_chat_view(&state.store)?,
    })
}

/// Abandon the in-flight question, if any. Returns true when one was
/// cancelled. The response, when it eventually arrives, is discarded.
#[tauri::command]
pub fn cancel_chat_message(state: State<'_, Arc<AppState>>) -> Result<bool, String> {
    state.controller.cancel().map_err(|e| e.to_string())
}

/// Current transcript, flags, and derived notice.
#[tauri::command]
pub fn get_chat_view(state: State<'_, Arc<AppState>>) -> Result<ChatView, String> {
    build_chat_view(&state.store)
}

/// Select the advisory question category ("qna" or "recommendation").
#[tauri::command]
pub fn set_question_mode(mode: String, state: State<'_, Arc<AppState>>) -> Result<(), String> {
    let mode = QuestionMode::from_str(&mode).map_err(|e| e.to_string())?;
    state.store.set_mode(mode).map_err(|e| e.to_string())
}

#[tauri::command]
pub fn get_question_mode(state: State<'_, Arc<AppState>>) -> Result<String, String> {
    state
        .store
        .mode()
        .map(|m| m.as_str().to_string())
        .map_err(|e| e.to_string())
}

/// Drop the transcript and start a fresh chat.
#[tauri::command]
pub fn clear_messages(state: State<'_, Arc<AppState>>) -> Result<(), String> {
    state.store.clear().map_err(|e| e.to_string())
}

/// One-off reachability probe. Never errors — unreachable is just `false`.
/// Runs on a blocking thread to avoid freezing the UI (HTTP call).
#[tauri::command]
pub async fn check_backend_health(state: State<'_, Arc<AppState>>) -> Result<bool, String> {
    let app = Arc::clone(state.inner());
    tauri::async_runtime::spawn_blocking(move || app.backend.check_health())
        .await
        .map_err(|e| format!("Task failed: {e}"))
}

/// Server-side Q&A log for the history sidebar.
/// Runs on a blocking thread to avoid freezing the UI (HTTP call).
#[tauri::command]
pub async fn fetch_chat_history(
    state: State<'_, Arc<AppState>>,
) -> Result<Vec<HistoryRecord>, String> {
    let app = Arc::clone(state.inner());
    tauri::async_runtime::spawn_blocking(move || app.backend.history().map_err(|e| e.to_string()))
        .await
        .map_err(|e| format!("Task failed: {e}"))?
}

/// Welcome screen copy and example questions for the given mode.
#[tauri::command]
pub fn get_welcome_content(mode: String) -> Result<WelcomeContent, String> {
    let mode = QuestionMode::from_str(&mode).map_err(|e| e.to_string())?;
    Ok(WelcomeContent {
        title: WELCOME_TITLE.to_string(),
        subtitle: WELCOME_SUBTITLE.to_string(),
        mode_title: mode_title(mode).to_string(),
        mode_description: mode_description(mode).to_string(),
        examples: example_questions(mode),
    })
}
