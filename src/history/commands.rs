use tauri::{AppHandle, Emitter, State};

use crate::{db::models::ScanRecord, AppState};

#[tauri::command]
pub async fn list_scans(state: State<'_, AppState>) -> Result<Vec<ScanRecord>, String> {
    state.db.list_scans().await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn list_scans_paginated(
    state: State<'_, AppState>,
    limit: u32,
    offset: u32,
) -> Result<Vec<ScanRecord>, String> {
    state
        .db
        .list_scans_paginated(limit, offset)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn search_scans(
    state: State<'_, AppState>,
    query: String,
) -> Result<Vec<ScanRecord>, String> {
    state
        .db
        .search_scans(&query)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn get_scan(
    state: State<'_, AppState>,
    scan_id: String,
) -> Result<Option<ScanRecord>, String> {
    state.db.get_scan(&scan_id).await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn set_favorite(
    state: State<'_, AppState>,
    app_handle: AppHandle,
    scan_id: String,
    favorite: bool,
) -> Result<(), String> {
    state
        .db
        .set_favorite(&scan_id, favorite)
        .await
        .map_err(|e| e.to_string())?;
    let _ = app_handle.emit("history-changed", ());
    Ok(())
}

#[tauri::command]
pub async fn delete_scan(
    state: State<'_, AppState>,
    app_handle: AppHandle,
    scan_id: String,
) -> Result<(), String> {
    state
        .db
        .delete_scan(&scan_id)
        .await
        .map_err(|e| e.to_string())?;
    let _ = app_handle.emit("history-changed", ());
    Ok(())
}

#[tauri::command]
pub async fn delete_all_scans(
    state: State<'_, AppState>,
    app_handle: AppHandle,
) -> Result<(), String> {
    state.db.delete_all_scans().await.map_err(|e| e.to_string())?;
    let _ = app_handle.emit("history-changed", ());
    Ok(())
}
