use std::sync::{Arc, Mutex};

use crate::backend::BackendClient;
use crate::controller::ConversationController;
use crate::poller::HealthPollerHandle;
use crate::store::ChatStore;

/// Global application state managed by Tauri.
/// Owns the session store, the send controller, the HTTP client, and the
/// connectivity poller handle. Created at launch, dropped at exit — there is
/// no persistence in between.
pub struct AppState {
    pub store: Arc<ChatStore>,
    pub controller: ConversationController,
    pub backend: BackendClient,
    /// Poller handle (set in `.setup()`); dropping it stops the thread.
    pub poller: Mutex<Option<HealthPollerHandle>>,
}

impl AppState {
    pub fn new() -> Self {
        let store = Arc::new(ChatStore::new());
        Self {
            controller: ConversationController::new(store.clone()),
            store,
            backend: BackendClient::from_env(),
            poller: Mutex::new(None),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
