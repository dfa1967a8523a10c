// ABOUTME: Synthetic camera backend producing deterministic test-pattern frames
// ABOUTME: Supports scripted acquisition failures and warmup delays for lifecycle tests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Synthetic Camera Backend
//!
//! A hardware-free [`CameraBackend`] for tests and development. Frames are
//! deterministic gradients, acquisition failures can be scripted, and the
//! backend counts its open streams so tests can assert that no device lock
//! ever leaks.

use super::backend::{CameraBackend, CameraStream, RawFrame, StreamRequest};
use crate::errors::{CameraError, CaptureError};
use async_trait::async_trait;
use image::RgbImage;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Acquisition failure the synthetic backend should simulate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntheticFailure {
    /// Simulate the user denying camera access
    PermissionDenied,
    /// Simulate a machine without a camera
    DeviceNotFound,
    /// Simulate an unclassified platform failure
    Unavailable,
}

/// Deterministic camera backend for tests
#[derive(Debug, Clone)]
pub struct SyntheticBackend {
    failure: Option<SyntheticFailure>,
    warmup_frames: u32,
    active_streams: Arc<AtomicUsize>,
}

impl SyntheticBackend {
    /// A backend that always acquires successfully
    #[must_use]
    pub fn new() -> Self {
        Self {
            failure: None,
            warmup_frames: 0,
            active_streams: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A backend that fails every acquisition with the given error
    #[must_use]
    pub fn failing(failure: SyntheticFailure) -> Self {
        Self {
            failure: Some(failure),
            ..Self::new()
        }
    }

    /// Make streams report `NoFrameAvailable` for the first `frames` reads
    #[must_use]
    pub fn with_warmup(mut self, frames: u32) -> Self {
        self.warmup_frames = frames;
        self
    }

    /// How many streams are currently holding the (synthetic) device
    #[must_use]
    pub fn active_streams(&self) -> usize {
        self.active_streams.load(Ordering::SeqCst)
    }
}

impl Default for SyntheticBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CameraBackend for SyntheticBackend {
    async fn open(&self, request: &StreamRequest) -> Result<Box<dyn CameraStream>, CameraError> {
        if let Some(failure) = self.failure {
            return Err(match failure {
                SyntheticFailure::PermissionDenied => {
                    CameraError::PermissionDenied("synthetic denial".into())
                }
                SyntheticFailure::DeviceNotFound => {
                    CameraError::DeviceNotFound("synthetic absence".into())
                }
                SyntheticFailure::Unavailable => {
                    CameraError::Unavailable("synthetic failure".into())
                }
            });
        }

        self.active_streams.fetch_add(1, Ordering::SeqCst);
        debug!(width = request.width, height = request.height, "Synthetic stream opened");
        Ok(Box::new(SyntheticStream {
            width: request.width,
            height: request.height,
            sequence: 0,
            warmup_remaining: self.warmup_frames,
            open: true,
            active_streams: Arc::clone(&self.active_streams),
        }))
    }

    fn backend_name(&self) -> &'static str {
        "synthetic"
    }
}

struct SyntheticStream {
    width: u32,
    height: u32,
    sequence: u64,
    warmup_remaining: u32,
    open: bool,
    active_streams: Arc<AtomicUsize>,
}

impl CameraStream for SyntheticStream {
    fn current_frame(&mut self) -> Result<RawFrame, CaptureError> {
        if !self.open {
            return Err(CaptureError::NoFrameAvailable);
        }
        if self.warmup_remaining > 0 {
            self.warmup_remaining -= 1;
            return Err(CaptureError::NoFrameAvailable);
        }

        self.sequence += 1;
        let sequence = self.sequence;
        let image = test_pattern(self.width, self.height, sequence);
        Ok(RawFrame { image, sequence })
    }

    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn close(&mut self) {
        if self.open {
            self.open = false;
            self.active_streams.fetch_sub(1, Ordering::SeqCst);
            debug!(frames = self.sequence, "Synthetic stream closed");
        }
    }
}

impl Drop for SyntheticStream {
    fn drop(&mut self) {
        self.close();
    }
}

/// Gradient test pattern; varies per frame so motion is observable
fn test_pattern(width: u32, height: u32, sequence: u64) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x & 0xFF) as u8, (y & 0xFF) as u8, (sequence & 0xFF) as u8])
    })
}
