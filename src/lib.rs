pub mod backend; // HTTP client for the remote advisory QA service
pub mod chat; // Presentation helpers: confidence bands, welcome copy
pub mod commands;
pub mod config;
pub mod controller; // Send state machine: optimistic append + reconcile
pub mod models;
pub mod poller; // 30s connectivity probe thread
pub mod store; // In-memory session state

use std::sync::Arc;

use tauri::Manager;
use tracing_subscriber::EnvFilter;

use commands::state::AppState;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("Bodam starting v{}", config::APP_VERSION);

    tauri::Builder::default()
        .plugin(tauri_plugin_shell::init())
        .manage(Arc::new(AppState::new()))
        .setup(|app| {
            // Connectivity banner: probe the backend every 30s for the
            // lifetime of the window. The handle lives in managed state so
            // the thread is joined when the app exits.
            let state: tauri::State<'_, Arc<AppState>> = app.state();
            let handle = poller::start_health_poller(
                state.store.clone(),
                backend::BackendClient::from_env(),
            );
            if let Ok(mut slot) = state.poller.lock() {
                *slot = Some(handle);
            }
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::health_check,
            commands::chat::send_chat_message,
            commands::chat::cancel_chat_message,
            commands::chat::get_chat_view,
            commands::chat::set_question_mode,
            commands::chat::get_question_mode,
            commands::chat::clear_messages,
            commands::chat::check_backend_health,
            commands::chat::fetch_chat_history,
            commands::chat::get_welcome_content,
        ])
        .run(tauri::generate_context!())
        .expect("error while running Bodam");
}
