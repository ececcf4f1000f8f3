mod actions;
mod classify;
mod db;
mod feedback;
mod history;
mod scanner;
mod settings;
mod utils;

use std::sync::Arc;

use serde::Serialize;
use tauri::{AppHandle, Emitter, Manager, State};

use actions::commands::{connect_wifi, copy_scan_content, open_scan_target};
use db::Database;
use feedback::FeedbackHandle;
use history::commands::{
    delete_all_scans, delete_scan, get_scan, list_scans, list_scans_paginated, search_scans,
    set_favorite,
};
use scanner::commands::{
    dismiss_result, get_scanner_state, pause_scanner, resume_scanner, scan_image_file,
    start_scanner, stop_scanner,
};
use scanner::ScannerController;
use settings::{SettingsStore, UserSettings};

pub(crate) struct AppState {
    pub(crate) db: Database,
    pub(crate) scanner: ScannerController,
    pub(crate) settings: Arc<SettingsStore>,
}

#[derive(Serialize, Clone)]
#[serde(rename_all = "camelCase")]
struct ScanNoticeEvent {
    message: String,
}

/// Transient user-facing notice; every caught failure funnels through here.
pub(crate) fn emit_notice(app_handle: &AppHandle, message: impl Into<String>) {
    let _ = app_handle.emit(
        "scan-notice",
        ScanNoticeEvent {
            message: message.into(),
        },
    );
}

#[tauri::command]
fn get_settings(state: State<AppState>) -> Result<UserSettings, String> {
    Ok(state.settings.current())
}

#[tauri::command]
fn update_settings(
    settings: UserSettings,
    state: State<AppState>,
    app_handle: tauri::AppHandle,
) -> Result<(), String> {
    state
        .settings
        .update(settings.clone())
        .map_err(|e| e.to_string())?;

    state.scanner.apply_settings(&settings.scanner);

    app_handle
        .emit("settings-updated", &settings)
        .map_err(|e| e.to_string())?;

    Ok(())
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("QuickQR starting up...");

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .plugin(tauri_plugin_clipboard_manager::init())
        .setup(|app| {
            let result = (|| -> anyhow::Result<()> {
                let app_data_dir = app
                    .path()
                    .app_data_dir()
                    .map_err(|err| anyhow::anyhow!(err))?;
                std::fs::create_dir_all(&app_data_dir)?;

                let db_path = app_data_dir.join("quickqr.sqlite3");
                let database = Database::new(db_path)?;

                let settings_path = app_data_dir.join("settings.json");
                let settings_store = Arc::new(SettingsStore::new(settings_path)?);

                let scanner = ScannerController::new(
                    app.handle().clone(),
                    database.clone(),
                    Arc::clone(&settings_store),
                    FeedbackHandle::new(),
                );

                app.manage(AppState {
                    db: database,
                    scanner,
                    settings: settings_store,
                });

                Ok(())
            })();

            result.map_err(|err| err.into())
        })
        .invoke_handler(tauri::generate_handler![
            get_scanner_state,
            start_scanner,
            stop_scanner,
            pause_scanner,
            resume_scanner,
            dismiss_result,
            scan_image_file,
            list_scans,
            list_scans_paginated,
            search_scans,
            get_scan,
            set_favorite,
            delete_scan,
            delete_all_scans,
            open_scan_target,
            copy_scan_content,
            connect_wifi,
            get_settings,
            update_settings,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
