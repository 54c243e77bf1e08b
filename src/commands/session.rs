// ABOUTME: Session-related Tauri commands
// ABOUTME: Login, query controls and health for the desktop window, backed by one shared viewer

use serde::Serialize;
use std::sync::Mutex;
use tauri::{AppHandle, Manager};

use crate::cli::Startup;
use crate::db::PgConnector;
use crate::models::RowLimit;
use crate::viewer::{Action, LoginForm, Outcome, Viewer};
use crate::{ApiResponse, HealthResponse};

/// Managed state: the one viewer every window command goes through
pub struct AppState {
    viewer: tokio::sync::Mutex<Viewer<PgConnector>>,
    startup: Mutex<Startup>,
}

impl AppState {
    pub fn new(startup: Startup) -> Self {
        Self {
            viewer: tokio::sync::Mutex::new(Viewer::new(PgConnector)),
            startup: Mutex::new(startup),
        }
    }

    /// Release the session; failures are logged and never block teardown
    pub async fn shutdown(&self) {
        let mut viewer = self.viewer.lock().await;
        if let Err(e) = viewer.shutdown().await {
            log::warn!("Error while closing the connection: {}", e);
        }
    }
}

/// Login form defaults (without password)
#[derive(Serialize)]
pub struct LoginDefaults {
    pub form: LoginForm,
    pub row_limit: RowLimit,
}

/// One query button
#[derive(Serialize)]
pub struct ActionInfo {
    pub id: Action,
    pub label: &'static str,
    pub uses_limit: bool,
}

/// Check overall health status
#[tauri::command]
pub async fn check_health(app: AppHandle) -> ApiResponse<HealthResponse> {
    let state = app.state::<AppState>();
    let connected = state.viewer.lock().await.is_logged_in();
    ApiResponse::success(HealthResponse::new(connected))
}

/// Get the prefilled login form
#[tauri::command]
pub async fn get_login_defaults(app: AppHandle) -> ApiResponse<LoginDefaults> {
    let state = app.state::<AppState>();
    let defaults = match state.startup.lock() {
        Ok(startup) => {
            let mut form = LoginForm::from_profile(&startup.profile);
            form.password.clear();
            LoginDefaults {
                form,
                row_limit: startup.row_limit,
            }
        }
        Err(e) => return ApiResponse::error(format!("Failed to read settings: {}", e)),
    };
    ApiResponse::success(defaults)
}

/// Get the query buttons in display order
#[tauri::command]
pub async fn list_actions() -> ApiResponse<Vec<ActionInfo>> {
    let actions = Action::ALL
        .iter()
        .map(|&action| ActionInfo {
            id: action,
            label: action.label(),
            uses_limit: action.uses_limit(),
        })
        .collect();
    ApiResponse::success(actions)
}

/// Submit the login form. A password left blank falls back to `DB_PASS`.
#[tauri::command]
pub async fn login(app: AppHandle, form: LoginForm) -> ApiResponse<Outcome> {
    let state = app.state::<AppState>();

    let mut form = form;
    if form.password.is_empty() {
        if let Ok(startup) = state.startup.lock() {
            form.password = startup.profile.password.clone();
        }
    }

    let (outcome, fresh) = state.viewer.lock().await.submit_login(&form).await;

    if let Some(profile) = fresh {
        match state.startup.lock() {
            Ok(mut startup) => {
                let row_limit = startup.row_limit;
                startup.remember(&profile, row_limit);
            }
            Err(e) => log::warn!("Could not remember profile: {}", e),
        }
    }

    ApiResponse::success(outcome)
}

/// Run one query button with the current row-limit field
#[tauri::command]
pub async fn run_action(app: AppHandle, action: Action, limit: String) -> ApiResponse<Outcome> {
    let state = app.state::<AppState>();
    let mut viewer = state.viewer.lock().await;
    if !viewer.is_logged_in() {
        return ApiResponse::error("Not logged in".to_string());
    }
    ApiResponse::success(viewer.perform(action, &limit).await)
}
