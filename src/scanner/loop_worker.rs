use std::time::Duration;

use anyhow::{anyhow, Result};
use nokhwa::{
    pixel_format::RgbFormat,
    utils::{
        CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
    },
    Camera,
};
use tokio_util::sync::CancellationToken;

use super::controller::ScannerController;
use super::decode;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = false;

// Import the logging macros (exported at the crate root)
use crate::{log_info, log_warn};

const FRAME_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Blocking capture loop, run on its own OS thread (the camera backend is
/// synchronous). Back-pressure is keep-only-latest by construction: the next
/// frame is pulled only after the previous one has been fully handled.
pub(crate) fn capture_loop(
    controller: ScannerController,
    camera_index: u32,
    token: CancellationToken,
) {
    let mut camera = match open_camera(camera_index) {
        Ok(camera) => camera,
        Err(err) => {
            log::error!("Camera open failed: {err:?}");
            controller.capture_failed("Camera is not available.");
            return;
        }
    };

    if let Err(err) = camera.open_stream() {
        log::error!("Camera stream start failed: {err}");
        controller.capture_failed("Failed to start the camera stream.");
        return;
    }

    log::info!(
        "Camera opened: {} at {:?}",
        camera.info().human_name(),
        camera.resolution()
    );
    controller.capture_started();

    while !token.is_cancelled() {
        let frame = match camera.frame() {
            Ok(frame) => frame,
            Err(err) => {
                log_warn!("frame capture error: {err}");
                std::thread::sleep(FRAME_RETRY_DELAY);
                continue;
            }
        };

        let decoded = match frame.decode_image::<RgbFormat>() {
            Ok(image) => image,
            Err(err) => {
                log_warn!("frame decode error: {err}");
                continue;
            }
        };

        let width = decoded.width() as usize;
        let height = decoded.height() as usize;
        let rgb = decoded.into_raw();

        let gray = decode::luma_from_rgb(&rgb, width, height);
        if let Some(value) = decode::decode_grayscale(&gray, width, height) {
            log_info!("decoded payload of {} bytes", value.len());
            if let Err(err) = tauri::async_runtime::block_on(controller.dispatch(value)) {
                log::error!("Scan dispatch failed: {err:?}");
            }
        }
    }

    if let Err(err) = camera.stop_stream() {
        log_warn!("camera stream stop failed: {err}");
    }
    controller.capture_stopped();
    log::info!("Capture loop shutting down");
}

fn open_camera(index: u32) -> Result<Camera> {
    // MJPEG at preview resolution first, then anything the device offers.
    let formats_to_try = [
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(CameraFormat::new(
            Resolution::new(1280, 720),
            FrameFormat::MJPEG,
            30,
        ))),
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(CameraFormat::new(
            Resolution::new(640, 480),
            FrameFormat::YUYV,
            30,
        ))),
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::None),
    ];

    let mut last_error = String::new();
    for requested in formats_to_try {
        match Camera::new(CameraIndex::Index(index), requested) {
            Ok(camera) => return Ok(camera),
            Err(err) => {
                log_warn!("camera format rejected: {err}");
                last_error = err.to_string();
            }
        }
    }

    Err(anyhow!("failed to open camera {index}: {last_error}"))
}
