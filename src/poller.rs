//! Background connectivity poller.
//!
//! Spawns a thread that probes the backend health endpoint on a fixed
//! interval and writes the result into the store's connectivity flag.
//! It never touches the transcript or the pending flag — it only feeds the
//! passive banner in the presentation layer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::backend::ChatBackend;
use crate::models::enums::Connectivity;
use crate::store::ChatStore;

/// Probe interval: every 30 seconds.
const POLL_INTERVAL_SECS: u64 = 30;

/// Sleep granularity for shutdown responsiveness.
const SLEEP_GRANULARITY_MS: u64 = 200;

/// Handle for the connectivity poller thread.
///
/// Supports graceful shutdown via `shutdown()` or automatic cleanup on
/// `Drop`. Store this in Tauri app state so it is dropped when the app exits.
pub struct HealthPollerHandle {
    shutdown: Arc<AtomicBool>,
    handle: Option<std::thread::JoinHandle<()>>,
}

impl HealthPollerHandle {
    /// Request graceful shutdown. The thread exits within one sleep tick.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }
}

impl Drop for HealthPollerHandle {
    fn drop(&mut self) {
        self.shutdown();
        if let Some(h) = self.handle.take() {
            let _ = h.join();
        }
    }
}

/// Start the connectivity poller on a separate thread.
///
/// Probes once immediately (so the banner settles right after launch) and
/// then every `POLL_INTERVAL_SECS`. Call this from the Tauri `.setup()`
/// callback and keep the returned handle in managed state.
pub fn start_health_poller<B>(store: Arc<ChatStore>, backend: B) -> HealthPollerHandle
where
    B: ChatBackend + Send + 'static,
{
    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = shutdown.clone();

    let handle = std::thread::spawn(move || {
        tracing::info!("Connectivity poller started (every {POLL_INTERVAL_SECS}s)");
        poll_loop(&store, &backend, &flag);
        tracing::info!("Connectivity poller shutting down");
    });

    HealthPollerHandle {
        shutdown,
        handle: Some(handle),
    }
}

fn poll_loop<B: ChatBackend>(store: &ChatStore, backend: &B, shutdown: &AtomicBool) {
    while !shutdown.load(Ordering::Relaxed) {
        probe_once(store, backend);

        // Sleep in small increments for responsive shutdown
        let ticks = POLL_INTERVAL_SECS * 1000 / SLEEP_GRANULARITY_MS;
        for _ in 0..ticks {
            if shutdown.load(Ordering::Relaxed) {
                return;
            }
            std::thread::sleep(Duration::from_millis(SLEEP_GRANULARITY_MS));
        }
    }
}

fn probe_once<B: ChatBackend>(store: &ChatStore, backend: &B) {
    let connectivity = if backend.check_health() {
        Connectivity::Connected
    } else {
        Connectivity::Disconnected
    };
    tracing::debug!(connectivity = connectivity.as_str(), "Health probe");
    if let Err(e) = store.set_connectivity(connectivity) {
        tracing::warn!(error = %e, "Failed to record connectivity");
    }
}
