// ABOUTME: Camera backend abstraction and shared frame types
// ABOUTME: Defines the CameraBackend/CameraStream seam the session manager drives
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Shared types and traits for camera backends

use crate::config::CaptureConfig;
use crate::errors::{CameraError, CaptureError};
use async_trait::async_trait;
use image::RgbImage;
use std::fmt;

/// Which way the requested camera faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraFacing {
    /// Rear (environment) camera, the default for scanning products
    #[default]
    Rear,
    /// Front (user) camera
    Front,
}

/// Parameters for opening a camera stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamRequest {
    /// Requested camera orientation
    pub facing: CameraFacing,
    /// Ideal frame width; the device may pick the nearest supported mode
    pub width: u32,
    /// Ideal frame height; the device may pick the nearest supported mode
    pub height: u32,
}

impl StreamRequest {
    /// Rear-facing request at the configured ideal resolution
    #[must_use]
    pub fn from_config(config: &CaptureConfig) -> Self {
        Self {
            facing: CameraFacing::Rear,
            width: config.frame_width,
            height: config.frame_height,
        }
    }
}

impl Default for StreamRequest {
    fn default() -> Self {
        Self {
            facing: CameraFacing::Rear,
            width: crate::constants::capture::FRAME_WIDTH,
            height: crate::constants::capture::FRAME_HEIGHT,
        }
    }
}

/// A single RGB frame pulled from an active stream
#[derive(Clone)]
pub struct RawFrame {
    /// Decoded RGB pixel data
    pub image: RgbImage,
    /// Monotonic frame counter within the stream
    pub sequence: u64,
}

impl RawFrame {
    /// Pixel dimensions (width, height)
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

impl fmt::Debug for RawFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (width, height) = self.dimensions();
        write!(f, "RawFrame({width}x{height}, seq {})", self.sequence)
    }
}

/// Exclusive handle on an open camera stream
///
/// Holding a `CameraStream` means holding the OS-level camera lock; `close`
/// releases it and must be idempotent.
pub trait CameraStream: Send {
    /// Most recent frame, if the device has produced one yet
    ///
    /// # Errors
    ///
    /// Returns `NoFrameAvailable` while the stream is warming up or after it
    /// has been closed.
    fn current_frame(&mut self) -> Result<RawFrame, CaptureError>;

    /// Actual resolution the device settled on
    fn resolution(&self) -> (u32, u32);

    /// Whether the stream still holds the device
    fn is_open(&self) -> bool;

    /// Release the device; safe to call any number of times
    fn close(&mut self);
}

impl fmt::Debug for dyn CameraStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<camera stream>")
    }
}

/// Platform seam for acquiring camera streams
#[async_trait]
pub trait CameraBackend: Send + Sync {
    /// Acquire an exclusive stream matching the request
    ///
    /// # Errors
    ///
    /// Fails with `PermissionDenied`, `DeviceNotFound`, or `Unavailable`;
    /// acquisition errors are classified, never retried automatically.
    async fn open(&self, request: &StreamRequest) -> Result<Box<dyn CameraStream>, CameraError>;

    /// Stable name for logging
    fn backend_name(&self) -> &'static str;
}

/// A renderable preview surface the active stream is bound to
///
/// The surface may not be mounted yet when attachment is requested; the
/// session manager polls `is_ready` within a bounded retry budget.
pub trait VideoSink: Send {
    /// Whether the surface is mounted and can accept frames
    fn is_ready(&self) -> bool;

    /// Present a frame on the surface
    fn render(&mut self, frame: &RawFrame);
}
