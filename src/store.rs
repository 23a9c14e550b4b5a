//! In-memory session state for the chat screen.
//!
//! One `ChatStore` lives in Tauri managed state for the lifetime of the
//! process; nothing here is persisted. `append` is the only way the
//! transcript grows — existing turns are never edited or reordered, and the
//! only removal path is the explicit new-chat `clear`.

use std::sync::Mutex;

use crate::models::enums::{Connectivity, QuestionMode};
use crate::models::Message;

/// Errors from ChatStore operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Internal lock error")]
    LockPoisoned,
}

/// Session state container: transcript plus ephemeral UI flags.
pub struct ChatStore {
    messages: Mutex<Vec<Message>>,
    /// True while a question is in flight. At most one send at a time.
    pending: Mutex<bool>,
    connectivity: Mutex<Connectivity>,
    mode: Mutex<QuestionMode>,
}

/// Point-in-time copy of the store, handed to the presentation layer.
#[derive(Debug, Clone)]
pub struct ChatSnapshot {
    pub messages: Vec<Message>,
    pub pending: bool,
    pub connectivity: Connectivity,
    pub mode: QuestionMode,
}

impl ChatStore {
    pub fn new() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            pending: Mutex::new(false),
            connectivity: Mutex::new(Connectivity::Unknown),
            mode: Mutex::new(QuestionMode::QnA),
        }
    }

    /// Append a turn to the transcript. Insertion order is chronological
    /// order; nothing ever rewrites earlier entries.
    pub fn append(&self, message: Message) -> Result<(), StoreError> {
        let mut messages = self.messages.lock().map_err(|_| StoreError::LockPoisoned)?;
        messages.push(message);
        Ok(())
    }

    /// Atomically flip `pending` from false to true.
    /// Returns false (and changes nothing) if a send is already in flight.
    pub fn begin_send(&self) -> Result<bool, StoreError> {
        let mut pending = self.pending.lock().map_err(|_| StoreError::LockPoisoned)?;
        if *pending {
            return Ok(false);
        }
        *pending = true;
        Ok(true)
    }

    pub fn set_pending(&self, value: bool) -> Result<(), StoreError> {
        let mut pending = self.pending.lock().map_err(|_| StoreError::LockPoisoned)?;
        *pending = value;
        Ok(())
    }

    pub fn is_pending(&self) -> Result<bool, StoreError> {
        self.pending
            .lock()
            .map(|p| *p)
            .map_err(|_| StoreError::LockPoisoned)
    }

    pub fn set_connectivity(&self, value: Connectivity) -> Result<(), StoreError> {
        let mut connectivity = self
            .connectivity
            .lock()
            .map_err(|_| StoreError::LockPoisoned)?;
        *connectivity = value;
        Ok(())
    }

    pub fn connectivity(&self) -> Result<Connectivity, StoreError> {
        self.connectivity
            .lock()
            .map(|c| *c)
            .map_err(|_| StoreError::LockPoisoned)
    }

    pub fn set_mode(&self, value: QuestionMode) -> Result<(), StoreError> {
        let mut mode = self.mode.lock().map_err(|_| StoreError::LockPoisoned)?;
        *mode = value;
        Ok(())
    }

    pub fn mode(&self) -> Result<QuestionMode, StoreError> {
        self.mode
            .lock()
            .map(|m| *m)
            .map_err(|_| StoreError::LockPoisoned)
    }

    /// Drop the transcript (new-chat affordance). Flags are untouched.
    pub fn clear(&self) -> Result<(), StoreError> {
        let mut messages = self.messages.lock().map_err(|_| StoreError::LockPoisoned)?;
        messages.clear();
        Ok(())
    }

    pub fn snapshot(&self) -> Result<ChatSnapshot, StoreError> {
        let messages = self.messages.lock().map_err(|_| StoreError::LockPoisoned)?;
        Ok(ChatSnapshot {
            messages: messages.clone(),
            pending: self.is_pending()?,
            connectivity: self.connectivity()?,
            mode: self.mode()?,
        })
    }
}

impl Default for ChatStore {
    fn default() -> Self {
        Self::new()
    }
}
