use std::path::PathBuf;

use tauri::State;

use crate::AppState;

use super::{still, ScannerController, ScannerSnapshot};

fn controller_from_state(state: &State<'_, AppState>) -> ScannerController {
    state.scanner.clone()
}

#[tauri::command]
pub async fn get_scanner_state(state: State<'_, AppState>) -> Result<ScannerSnapshot, String> {
    Ok(controller_from_state(&state).snapshot())
}

#[tauri::command]
pub async fn start_scanner(state: State<'_, AppState>) -> Result<(), String> {
    let controller = controller_from_state(&state);
    controller.start().await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn stop_scanner(state: State<'_, AppState>) -> Result<(), String> {
    let controller = controller_from_state(&state);
    controller.stop().await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn pause_scanner(state: State<'_, AppState>) -> Result<(), String> {
    controller_from_state(&state).pause();
    Ok(())
}

#[tauri::command]
pub async fn resume_scanner(state: State<'_, AppState>) -> Result<(), String> {
    controller_from_state(&state).resume();
    Ok(())
}

#[tauri::command]
pub async fn dismiss_result(state: State<'_, AppState>) -> Result<(), String> {
    controller_from_state(&state).dismissed();
    Ok(())
}

/// Scan a picked image file through the same admission path as the camera.
#[tauri::command]
pub async fn scan_image_file(state: State<'_, AppState>, path: String) -> Result<(), String> {
    let decoded = tokio::task::spawn_blocking(move || {
        still::decode_image_file(&PathBuf::from(path))
    })
    .await
    .map_err(|e| e.to_string())?
    .map_err(|e| e.to_string())?;

    match decoded {
        Some(value) => {
            let controller = controller_from_state(&state);
            controller.dispatch(value).await.map_err(|e| e.to_string())?;
            Ok(())
        }
        None => Err("No QR code found in the image.".to_string()),
    }
}
