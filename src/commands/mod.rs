pub mod chat;
pub mod state;

/// Health check IPC command — verifies the Rust core is running.
/// (Backend reachability is a separate concern: `check_backend_health`.)
#[tauri::command]
pub fn health_check() -> String {
    tracing::debug!("Health check called");
    "ok".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_check_returns_ok() {
        assert_eq!(health_check(), "ok");
    }
}
