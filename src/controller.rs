//! Conversation controller — optimistic send, reconcile, fallback.
//!
//! Each submission runs the machine Idle → Sending → {Reconciled, Failed}
//! → Idle. The user turn is appended before the network call and is never
//! rolled back; the assistant turn is appended on reconciliation. Overlapping
//! sends are excluded by the store's `pending` flag, so transcript order
//! always matches submission order.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::backend::ChatBackend;
use crate::models::enums::{Connectivity, MessageRole};
use crate::models::Message;
use crate::store::{ChatStore, StoreError};

/// Fixed apology appended when the backend cannot answer.
pub const FALLBACK_MESSAGE: &str =
    "죄송합니다. 서버 연결에 문제가 발생했습니다. 잠시 후 다시 시도해주세요.";

/// Supplementary notice shown under a weak final answer.
pub const LOW_CONFIDENCE_NOTICE: &str =
    "AI가 명확한 답변을 찾지 못했습니다. 질문을 더 구체적으로 입력해 주세요.";

/// Answers below this confidence trigger the notice.
pub const LOW_CONFIDENCE_THRESHOLD: f32 = 0.5;

/// Why a submission never left the input boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// Blank or whitespace-only text.
    Empty,
    /// A send is already in flight.
    Busy,
}

/// Terminal result of one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "reason")]
pub enum SendOutcome {
    /// Submission refused; the store was not touched at all.
    Rejected(RejectReason),
    /// Backend answered; assistant turn appended with answer metadata.
    Reconciled,
    /// Backend failed; fixed fallback turn appended.
    Failed,
    /// Cancelled while waiting; no assistant turn for this request.
    Cancelled,
}

/// Drives the send state machine against a `ChatStore`.
pub struct ConversationController {
    store: Arc<ChatStore>,
    /// Bumped by `cancel`; a send whose captured generation no longer
    /// matches discards its response instead of reconciling it.
    generation: AtomicU64,
}

impl ConversationController {
    pub fn new(store: Arc<ChatStore>) -> Self {
        Self {
            store,
            generation: AtomicU64::new(0),
        }
    }

    /// Submit a question.
    ///
    /// Blank text and overlapping sends are rejected without mutating the
    /// store. Otherwise the user turn is appended immediately, the backend
    /// is asked, and the outcome is reconciled: answer turn + Connected on
    /// success, fallback turn + Disconnected on failure.
    pub fn send<B: ChatBackend>(
        &self,
        backend: &B,
        text: &str,
    ) -> Result<SendOutcome, StoreError> {
        let question = text.trim();
        if question.is_empty() {
            return Ok(SendOutcome::Rejected(RejectReason::Empty));
        }
        if !self.store.begin_send()? {
            tracing::debug!("Submission refused: a question is already in flight");
            return Ok(SendOutcome::Rejected(RejectReason::Busy));
        }

        let generation = self.generation.load(Ordering::SeqCst);
        self.store.append(Message::user(question))?;

        let result = backend.ask(question);

        if self.generation.load(Ordering::SeqCst) != generation {
            // Cancelled while waiting. The advisor already moved on — drop
            // the stale response and leave connectivity as it was. `cancel`
            // already cleared `pending`, and a newer send may own it again
            // by now, so this branch must not write the flag.
            tracing::debug!("Discarding response for a cancelled question");
            return Ok(SendOutcome::Cancelled);
        }

        match result {
            Ok(answer) => {
                self.store.append(Message::assistant(
                    &answer.answer,
                    answer.confidence,
                    answer.contexts,
                    Some(answer.processing_time_ms),
                ))?;
                self.store.set_connectivity(Connectivity::Connected)?;
                self.store.set_pending(false)?;
                Ok(SendOutcome::Reconciled)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Question failed; appending fallback");
                self.store.append(Message::fallback(FALLBACK_MESSAGE))?;
                self.store.set_connectivity(Connectivity::Disconnected)?;
                self.store.set_pending(false)?;
                Ok(SendOutcome::Failed)
            }
        }
    }

    /// Abandon the in-flight question, if any. Returns true when there was
    /// one. The underlying request is not terminated; its response will be
    /// discarded when it arrives.
    pub fn cancel(&self) -> Result<bool, StoreError> {
        if !self.store.is_pending()? {
            return Ok(false);
        }
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.store.set_pending(false)?;
        tracing::info!("In-flight question cancelled");
        Ok(true)
    }
}

/// Derived display rule: the transcript ends in an assistant turn whose
/// confidence is defined and below the threshold. Never stored.
pub fn low_confidence_notice(messages: &[Message]) -> bool {
    messages.last().is_some_and(|m| {
        m.role == MessageRole::Assistant
            && m.confidence.is_some_and(|c| c < LOW_CONFIDENCE_THRESHOLD)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Answer, BackendError, HistoryRecord, MockBackend};

    fn controller() -> (Arc<ChatStore>, ConversationController) {
        let store = Arc::new(ChatStore::new());
        let controller = ConversationController::new(store.clone());
        (store, controller)
    }

    #[test]
    fn successful_send_appends_user_then_assistant() {
        let (store, controller) = controller();
        let backend = MockBackend::answering("X")
            .with_confidence(0.42)
            .with_contexts(vec!["약관 제1조"]);

        let outcome = controller.send(&backend, "유방암은 보장 대상입니까?").unwrap();
        assert_eq!(outcome, SendOutcome::Reconciled);

        let snap = store.snapshot().unwrap();
        assert_eq!(snap.messages.len(), 2);
        assert_eq!(snap.messages[0].role, MessageRole::User);
        assert_eq!(snap.messages[0].content, "유방암은 보장 대상입니까?");
        assert_eq!(snap.messages[1].role, MessageRole::Assistant);
        assert_eq!(snap.messages[1].content, "X");
        assert_eq!(snap.messages[1].confidence, Some(0.42));
        assert!(snap.messages[1].latency_ms.is_some());
        assert!(!snap.pending);
        assert_eq!(snap.connectivity, Connectivity::Connected);
        // 0.42 < 0.5 and it is the last message
        assert!(low_confidence_notice(&snap.messages));
    }

    #[test]
    fn failed_send_appends_exactly_one_fallback() {
        let (store, controller) = controller();
        let backend = MockBackend::failing();

        let outcome = controller.send(&backend, "질문입니다").unwrap();
        assert_eq!(outcome, SendOutcome::Failed);

        let snap = store.snapshot().unwrap();
        assert_eq!(snap.messages.len(), 2);
        let fallback = &snap.messages[1];
        assert_eq!(fallback.role, MessageRole::Assistant);
        assert_eq!(fallback.content, FALLBACK_MESSAGE);
        assert!(fallback.confidence.is_none());
        assert!(fallback.contexts.is_none());
        assert!(fallback.latency_ms.is_none());
        assert!(!snap.pending);
        assert_eq!(snap.connectivity, Connectivity::Disconnected);
        // Fallback has no confidence, so no notice
        assert!(!low_confidence_notice(&snap.messages));
    }

    #[test]
    fn blank_submission_never_touches_the_store() {
        let (store, controller) = controller();
        let backend = MockBackend::answering("unused");

        for text in ["", "   ", "\n\t "] {
            let outcome = controller.send(&backend, text).unwrap();
            assert_eq!(outcome, SendOutcome::Rejected(RejectReason::Empty));
        }

        let snap = store.snapshot().unwrap();
        assert!(snap.messages.is_empty());
        assert!(!snap.pending);
        assert_eq!(backend.ask_count(), 0);
    }

    #[test]
    fn submission_while_pending_is_a_no_op() {
        let (store, controller) = controller();
        let backend = MockBackend::answering("unused");

        // Simulate an in-flight send
        assert!(store.begin_send().unwrap());

        let outcome = controller.send(&backend, "두 번째 질문").unwrap();
        assert_eq!(outcome, SendOutcome::Rejected(RejectReason::Busy));
        assert!(store.snapshot().unwrap().messages.is_empty());
        assert_eq!(backend.ask_count(), 0);
    }

    #[test]
    fn sequential_sends_preserve_submission_order() {
        let (store, controller) = controller();
        let backend = MockBackend::answering("답변");

        for q in ["첫 질문", "둘째 질문", "셋째 질문"] {
            assert_eq!(controller.send(&backend, q).unwrap(), SendOutcome::Reconciled);
        }

        let snap = store.snapshot().unwrap();
        assert_eq!(snap.messages.len(), 6);
        let users: Vec<&str> = snap
            .messages
            .iter()
            .filter(|m| m.role == MessageRole::User)
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(users, vec!["첫 질문", "둘째 질문", "셋째 질문"]);
        assert_eq!(backend.ask_count(), 3);
    }

    #[test]
    fn send_trims_submitted_text() {
        let (store, controller) = controller();
        let backend = MockBackend::answering("답변");

        controller.send(&backend, "  질문  \n").unwrap();
        assert_eq!(store.snapshot().unwrap().messages[0].content, "질문");
    }

    /// Backend that cancels the controller mid-request, standing in for the
    /// advisor pressing cancel while the answer is still on the wire.
    struct CancellingBackend<'a> {
        controller: &'a ConversationController,
    }

    impl ChatBackend for CancellingBackend<'_> {
        fn check_health(&self) -> bool {
            true
        }

        fn ask(&self, _question: &str) -> Result<Answer, BackendError> {
            assert!(self.controller.cancel().unwrap());
            Ok(Answer {
                answer: "too late".to_string(),
                contexts: None,
                confidence: Some(0.99),
                processing_time_ms: 5,
            })
        }

        fn history(&self) -> Result<Vec<HistoryRecord>, BackendError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn cancelled_send_discards_the_response() {
        let (store, controller) = controller();
        let backend = CancellingBackend {
            controller: &controller,
        };

        let outcome = controller.send(&backend, "취소될 질문").unwrap();
        assert_eq!(outcome, SendOutcome::Cancelled);

        let snap = store.snapshot().unwrap();
        // User turn stays; no assistant turn for the aborted request
        assert_eq!(snap.messages.len(), 1);
        assert_eq!(snap.messages[0].role, MessageRole::User);
        assert!(!snap.pending);
        // Connectivity untouched by the discarded response
        assert_eq!(snap.connectivity, Connectivity::Unknown);
    }

    /// Backend that blocks each `ask` until the test releases it, standing
    /// in for an answer still on the wire.
    struct GatedBackend {
        release: std::sync::Mutex<std::sync::mpsc::Receiver<()>>,
    }

    impl ChatBackend for GatedBackend {
        fn check_health(&self) -> bool {
            true
        }

        fn ask(&self, _question: &str) -> Result<Answer, BackendError> {
            self.release
                .lock()
                .expect("gate lock")
                .recv()
                .expect("gate closed");
            Ok(Answer {
                answer: "stale".to_string(),
                contexts: None,
                confidence: Some(0.9),
                processing_time_ms: 1,
            })
        }

        fn history(&self) -> Result<Vec<HistoryRecord>, BackendError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn stale_response_does_not_clobber_a_newer_send() {
        let store = Arc::new(ChatStore::new());
        let controller = Arc::new(ConversationController::new(store.clone()));

        let (release, gate) = std::sync::mpsc::channel();
        let backend = Arc::new(GatedBackend {
            release: std::sync::Mutex::new(gate),
        });

        // First question goes out and blocks on the gate
        let sender = Arc::clone(&controller);
        let sender_backend = Arc::clone(&backend);
        let first = std::thread::spawn(move || sender.send(&*sender_backend, "첫 질문"));
        for _ in 0..200 {
            if store.is_pending().unwrap() {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        assert!(store.is_pending().unwrap());

        // Advisor cancels and immediately submits again; the second
        // question is now the one in flight
        assert!(controller.cancel().unwrap());
        assert!(store.begin_send().unwrap());

        // The first question's answer finally arrives — and is discarded
        release.send(()).unwrap();
        let outcome = first.join().unwrap().unwrap();
        assert_eq!(outcome, SendOutcome::Cancelled);

        // The newer send still owns the pending flag, so a third
        // submission is still refused
        assert!(store.is_pending().unwrap());
        assert!(!store.begin_send().unwrap());
        // Only the first user turn is in the transcript; no assistant turn
        // for the cancelled request
        assert_eq!(store.snapshot().unwrap().messages.len(), 1);
    }

    #[test]
    fn cancel_when_idle_is_false() {
        let (_store, controller) = controller();
        assert!(!controller.cancel().unwrap());
    }

    #[test]
    fn send_works_again_after_cancel() {
        let (store, controller) = controller();
        {
            let backend = CancellingBackend {
                controller: &controller,
            };
            controller.send(&backend, "취소될 질문").unwrap();
        }

        let backend = MockBackend::answering("정상 답변");
        let outcome = controller.send(&backend, "다음 질문").unwrap();
        assert_eq!(outcome, SendOutcome::Reconciled);
        assert_eq!(store.snapshot().unwrap().messages.len(), 3);
    }

    #[test]
    fn notice_requires_last_message_to_be_weak_assistant() {
        // Empty transcript
        assert!(!low_confidence_notice(&[]));

        // Strong answer
        let strong = vec![
            Message::user("q"),
            Message::assistant("a", Some(0.9), None, None),
        ];
        assert!(!low_confidence_notice(&strong));

        // Exactly at the threshold is not "below"
        let at = vec![Message::assistant("a", Some(0.5), None, None)];
        assert!(!low_confidence_notice(&at));

        // Weak answer, but a user turn follows it
        let buried = vec![
            Message::assistant("a", Some(0.3), None, None),
            Message::user("q"),
        ];
        assert!(!low_confidence_notice(&buried));

        // Weak answer last
        let weak = vec![
            Message::user("q"),
            Message::assistant("a", Some(0.3), None, None),
        ];
        assert!(low_confidence_notice(&weak));
    }
}
