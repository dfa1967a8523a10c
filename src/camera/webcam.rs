// ABOUTME: Real webcam backend using nokhwa, behind the webcam feature flag
// ABOUTME: Classifies device-open failures into the shared camera error taxonomy
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Webcam capture backend via nokhwa

use super::backend::{CameraBackend, CameraStream, RawFrame, StreamRequest};
use crate::errors::{CameraError, CaptureError};
use async_trait::async_trait;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{ApiBackend, CameraIndex, RequestedFormat, RequestedFormatType};
use tracing::{debug, info};

/// Webcam backend bound to a device index
///
/// Desktop platforms do not expose facing metadata uniformly, so device
/// selection is by index; [`WebcamBackend::list_devices`] enumerates what is
/// available.
#[derive(Debug, Clone, Copy)]
pub struct WebcamBackend {
    index: u32,
}

impl WebcamBackend {
    /// Backend for the camera at `index`
    #[must_use]
    pub fn new(index: u32) -> Self {
        Self { index }
    }

    /// Enumerate attached camera devices
    ///
    /// # Errors
    ///
    /// Returns `DeviceNotFound` when enumeration itself fails.
    pub fn list_devices() -> Result<Vec<String>, CameraError> {
        let devices = nokhwa::query(ApiBackend::Auto)
            .map_err(|e| CameraError::DeviceNotFound(e.to_string()))?;

        Ok(devices
            .into_iter()
            .map(|info| format!("{}: {}", info.index(), info.human_name()))
            .collect())
    }
}

#[async_trait]
impl CameraBackend for WebcamBackend {
    async fn open(&self, request: &StreamRequest) -> Result<Box<dyn CameraStream>, CameraError> {
        let index = self.index;
        debug!(
            index,
            requested_width = request.width,
            requested_height = request.height,
            "Opening webcam"
        );

        // Camera::new probes the device synchronously; keep it off the event loop.
        let camera = tokio::task::spawn_blocking(move || {
            let requested =
                RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestResolution);
            nokhwa::Camera::new(CameraIndex::Index(index), requested)
        })
        .await
        .map_err(|e| CameraError::Unavailable(format!("camera open task failed: {e}")))?
        .map_err(|e| classify_open_error(&e))?;

        let resolution = camera.resolution();
        info!(
            index,
            width = resolution.width(),
            height = resolution.height(),
            "Webcam opened"
        );

        Ok(Box::new(WebcamStream {
            camera,
            open: true,
            sequence: 0,
            resolution: (resolution.width(), resolution.height()),
        }))
    }

    fn backend_name(&self) -> &'static str {
        "webcam"
    }
}

fn classify_open_error(err: &nokhwa::NokhwaError) -> CameraError {
    let message = err.to_string();
    let lowered = message.to_lowercase();
    if lowered.contains("permission") || lowered.contains("denied") || lowered.contains("busy") {
        CameraError::PermissionDenied(message)
    } else if lowered.contains("not found") || lowered.contains("no device") {
        CameraError::DeviceNotFound(message)
    } else {
        CameraError::Unavailable(message)
    }
}

struct WebcamStream {
    camera: nokhwa::Camera,
    open: bool,
    sequence: u64,
    resolution: (u32, u32),
}

impl CameraStream for WebcamStream {
    fn current_frame(&mut self) -> Result<RawFrame, CaptureError> {
        if !self.open {
            return Err(CaptureError::NoFrameAvailable);
        }

        let frame = self
            .camera
            .frame()
            .map_err(|_| CaptureError::NoFrameAvailable)?;
        let image = frame
            .decode_image::<RgbFormat>()
            .map_err(|e| CaptureError::EncodingFailed(e.to_string()))?;

        self.sequence += 1;
        Ok(RawFrame {
            image,
            sequence: self.sequence,
        })
    }

    fn resolution(&self) -> (u32, u32) {
        self.resolution
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn close(&mut self) {
        if self.open {
            let _ = self.camera.stop_stream();
            self.open = false;
            info!(frames = self.sequence, "Webcam stream closed");
        }
    }
}

impl Drop for WebcamStream {
    fn drop(&mut self) {
        self.close();
    }
}
