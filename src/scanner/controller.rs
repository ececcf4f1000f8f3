use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::{Duration, Instant},
};

use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use log::{error, warn};
use serde::Serialize;
use tauri::{AppHandle, Emitter};
use tauri_plugin_opener::OpenerExt;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{
    classify::{self, ResultPresentation},
    db::{models::ScanRecord, Database},
    emit_notice,
    feedback::FeedbackHandle,
    settings::{ScannerSettings, SettingsStore},
};

use super::{
    gate::{ScanGate, REARM_DELAY},
    loop_worker,
};

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ScannerSnapshot {
    pub running: bool,
    pub paused: bool,
    pub result_showing: bool,
}

#[derive(Serialize, Clone)]
#[serde(rename_all = "camelCase")]
struct ScanDetectedEvent {
    record: ScanRecord,
    presentation: ResultPresentation,
}

#[derive(Serialize, Clone)]
#[serde(rename_all = "camelCase")]
struct ScannerStateEvent {
    running: bool,
}

/// Outcome of offering a decoded value to the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Admission {
    /// Admitted, persisted and dispatched to the result dialog.
    Dispatched,
    /// Admitted but handed straight to the system opener (UPI).
    PassThrough,
    /// Dropped by the gate (cooldown, paused, or a result already showing).
    Rejected,
}

struct CaptureWorker {
    token: CancellationToken,
    join: thread::JoinHandle<()>,
}

/// Owns the capture thread and the admission gate; the single authority for
/// whether a decoded value reaches the UI.
#[derive(Clone)]
pub struct ScannerController {
    app_handle: AppHandle,
    db: Database,
    settings: Arc<SettingsStore>,
    feedback: FeedbackHandle,
    gate: Arc<ScanGate>,
    worker: Arc<Mutex<Option<CaptureWorker>>>,
    capture_alive: Arc<AtomicBool>,
}

impl ScannerController {
    pub fn new(
        app_handle: AppHandle,
        db: Database,
        settings: Arc<SettingsStore>,
        feedback: FeedbackHandle,
    ) -> Self {
        let cooldown = Duration::from_millis(settings.scanner().cooldown_ms);
        Self {
            app_handle,
            db,
            settings,
            feedback,
            gate: Arc::new(ScanGate::new(cooldown)),
            worker: Arc::new(Mutex::new(None)),
            capture_alive: Arc::new(AtomicBool::new(false)),
        }
    }

    pub async fn start(&self) -> Result<()> {
        let mut worker = self.worker.lock().await;
        if worker.is_some() {
            bail!("scanner already running");
        }

        let scanner_settings = self.settings.scanner();
        self.gate.reset();
        self.gate
            .set_cooldown(Duration::from_millis(scanner_settings.cooldown_ms));

        let token = CancellationToken::new();
        let token_clone = token.clone();
        let controller = self.clone();
        let camera_index = scanner_settings.camera_index;

        let join = thread::Builder::new()
            .name("quickqr-capture".into())
            .spawn(move || loop_worker::capture_loop(controller, camera_index, token_clone))
            .context("failed to spawn capture thread")?;

        *worker = Some(CaptureWorker { token, join });
        Ok(())
    }

    pub async fn stop(&self) -> Result<()> {
        let worker = self.worker.lock().await.take();
        if let Some(worker) = worker {
            worker.token.cancel();
            tokio::task::spawn_blocking(move || {
                if let Err(err) = worker.join.join() {
                    error!("Capture thread panicked: {err:?}");
                }
            })
            .await
            .context("capture thread failed to join")?;
        }
        Ok(())
    }

    /// Screen hidden: keep the camera running but stop admitting results.
    pub fn pause(&self) {
        self.gate.pause();
    }

    /// Screen visible again: drop any stale in-flight result and re-admit.
    pub fn resume(&self) {
        self.gate.resume();
    }

    /// Result dialog dismissed. The gate re-opens after a short delay so
    /// frames that were already in flight cannot immediately re-trigger.
    pub fn dismissed(&self) {
        let gate = Arc::clone(&self.gate);
        tauri::async_runtime::spawn(async move {
            tokio::time::sleep(REARM_DELAY).await;
            gate.release();
        });
    }

    pub fn apply_settings(&self, scanner_settings: &ScannerSettings) {
        self.gate
            .set_cooldown(Duration::from_millis(scanner_settings.cooldown_ms));
    }

    pub fn snapshot(&self) -> ScannerSnapshot {
        ScannerSnapshot {
            running: self.capture_alive.load(Ordering::SeqCst),
            paused: self.gate.is_paused(),
            result_showing: self.gate.is_displayed(),
        }
    }

    /// Offer a decoded value to the pipeline. Called from the capture thread
    /// and from the gallery-scan command; the gate guarantees at most one
    /// caller proceeds per displayed result.
    pub(crate) async fn dispatch(&self, raw: String) -> Result<Admission> {
        if !self.gate.try_admit(Instant::now()) {
            return Ok(Admission::Rejected);
        }

        if self.settings.scanner().sound_enabled {
            self.feedback.chirp();
        }

        let value = raw.trim().to_string();

        if classify::is_upi(&value) {
            // Payment URIs go straight to the system handler: no dialog,
            // no history entry, gate re-opened before the hand-off.
            self.gate.revert();
            if let Err(err) = self.app_handle.opener().open_url(value, None::<&str>) {
                warn!("UPI open failed: {err}");
                emit_notice(&self.app_handle, "No payment app could handle this code.");
            }
            return Ok(Admission::PassThrough);
        }

        let kind = classify::classify(&value);
        let record = ScanRecord {
            id: Uuid::new_v4().to_string(),
            content: value.clone(),
            kind,
            scanned_at: Utc::now(),
            favorite: false,
        };

        // A storage failure is a notice, not a reason to withhold the result.
        if let Err(err) = self.db.insert_scan(&record).await {
            error!("Failed to persist scan: {err:?}");
            emit_notice(&self.app_handle, "Failed to save scan to history.");
        } else {
            let _ = self.app_handle.emit("history-changed", ());
        }

        let presentation = classify::presentation_for(&value, kind);
        self.gate.mark_displayed();

        if let Err(err) = self.app_handle.emit(
            "scan-detected",
            ScanDetectedEvent {
                record,
                presentation,
            },
        ) {
            self.gate.release();
            return Err(anyhow!("failed to emit scan-detected: {err}"));
        }

        Ok(Admission::Dispatched)
    }

    pub(crate) fn capture_started(&self) {
        self.capture_alive.store(true, Ordering::SeqCst);
        self.emit_scanner_state(true);
    }

    pub(crate) fn capture_stopped(&self) {
        self.capture_alive.store(false, Ordering::SeqCst);
        self.emit_scanner_state(false);
    }

    pub(crate) fn capture_failed(&self, message: &str) {
        self.capture_alive.store(false, Ordering::SeqCst);
        emit_notice(&self.app_handle, message);
        self.emit_scanner_state(false);
    }

    fn emit_scanner_state(&self, running: bool) {
        let _ = self
            .app_handle
            .emit("scanner-state-changed", ScannerStateEvent { running });
    }
}
