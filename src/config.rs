/// Application-level constants
pub const APP_NAME: &str = "Bodam";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable overriding the advisory backend base URL.
pub const BACKEND_URL_ENV: &str = "BODAM_BACKEND_URL";

/// Local development backend (Spring QA service behind /api).
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8080/api";

/// Resolve the advisory backend base URL.
/// Env override wins; otherwise the local development address.
pub fn backend_base_url() -> String {
    std::env::var(BACKEND_URL_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string())
}

/// Default tracing filter when RUST_LOG is not set.
pub fn default_log_filter() -> String {
    "info,bodam_lib=debug".to_string()
}
