// ABOUTME: Main library for the IN450 database viewer
// ABOUTME: Contains module declarations, the command response envelope and desktop app setup

use serde::{Deserialize, Serialize};

// Module declarations
pub mod cli;
pub mod config;
pub mod console;
pub mod db;
pub mod logging;
pub mod models;
pub mod render;
pub mod smoke;
pub mod viewer;

#[cfg(feature = "desktop")]
pub mod commands;

#[cfg(test)]
pub(crate) mod testing;

/// Standard response envelope for desktop commands
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub messages: Messages,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Messages {
    pub error: Vec<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            messages: Messages::default(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            messages: Messages {
                error: vec![message],
            },
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub connected: bool,
    pub version: String,
    pub platform: String,
}

impl HealthResponse {
    pub fn new(connected: bool) -> Self {
        Self {
            connected,
            version: env!("CARGO_PKG_VERSION").to_string(),
            platform: std::env::consts::OS.to_string(),
        }
    }
}

/// Start the desktop window. The session is released when the window is
/// asked to close, before the window itself goes away.
#[cfg(feature = "desktop")]
pub fn run(startup: cli::Startup) -> tauri::Result<()> {
    use tauri::Manager;

    tauri::Builder::default()
        .manage(commands::AppState::new(startup))
        .setup(|app| {
            app.handle().plugin(
                tauri_plugin_log::Builder::default()
                    .level(if cfg!(debug_assertions) {
                        log::LevelFilter::Debug
                    } else {
                        log::LevelFilter::Info
                    })
                    .build(),
            )?;
            Ok(())
        })
        .on_window_event(|window, event| {
            if let tauri::WindowEvent::CloseRequested { .. } = event {
                let state = window.state::<commands::AppState>();
                tauri::async_runtime::block_on(state.shutdown());
            }
        })
        .invoke_handler(tauri::generate_handler![
            commands::check_health,
            commands::get_login_defaults,
            commands::list_actions,
            commands::login,
            commands::run_action,
        ])
        .run(tauri::generate_context!())
}
