// ABOUTME: Camera session lifecycle manager with guaranteed stream release
// ABOUTME: Owns the exclusive stream handle and the session state machine
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Camera Session Manager
//!
//! One [`CameraSessionManager`] per capture UI instance. The manager owns at
//! most one stream at a time; starting a new session tears down any prior
//! stream before the device is reacquired, so two hardware locks can never
//! be held. The stream lives inside an RAII guard; dropping the manager, or
//! any early return, releases the device.

use super::backend::{CameraBackend, CameraStream, StreamRequest, VideoSink};
use crate::config::CaptureConfig;
use crate::errors::{CameraError, CaptureError};
use crate::models::CapturedImage;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Lifecycle state of a capture session
///
/// Transitions are strictly forward, with two sanctioned exceptions:
/// `Error -> Idle` (retry) and `Streaming -> Closed` (user cancel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No session started yet
    #[default]
    Idle,
    /// Device acquisition in flight
    Starting,
    /// Stream live, preview possible
    Streaming,
    /// A frame is being frozen and encoded
    Capturing,
    /// The captured image is with the recognition client
    Processing,
    /// Acquisition failed; retry returns to `Idle`
    Error,
    /// Stream released, session over
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Starting => "starting",
            Self::Streaming => "streaming",
            Self::Capturing => "capturing",
            Self::Processing => "processing",
            Self::Error => "error",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// RAII wrapper releasing the stream on drop
struct StreamGuard {
    stream: Box<dyn CameraStream>,
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        self.stream.close();
    }
}

/// Manages one camera-to-recognition session at a time
pub struct CameraSessionManager {
    backend: Arc<dyn CameraBackend>,
    request: StreamRequest,
    jpeg_quality: u8,
    sink_attach_max_attempts: u32,
    sink_attach_retry: Duration,
    state: SessionState,
    stream: Option<StreamGuard>,
    last_error: Option<CameraError>,
}

impl CameraSessionManager {
    /// Create a manager for the given backend and configuration
    #[must_use]
    pub fn new(backend: Arc<dyn CameraBackend>, config: &CaptureConfig) -> Self {
        Self {
            backend,
            request: StreamRequest::from_config(config),
            jpeg_quality: config.jpeg_quality,
            sink_attach_max_attempts: config.sink_attach_max_attempts,
            sink_attach_retry: Duration::from_millis(config.sink_attach_retry_ms),
            state: SessionState::Idle,
            stream: None,
            last_error: None,
        }
    }

    /// Current session state
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Last acquisition error, if the session is in `Error`
    #[must_use]
    pub fn last_error(&self) -> Option<&CameraError> {
        self.last_error.as_ref()
    }

    /// Whether a live stream is currently held
    #[must_use]
    pub fn is_streaming(&self) -> bool {
        self.stream.is_some()
    }

    /// Acquire the camera and begin streaming
    ///
    /// Starting over an already-streaming session first releases the prior
    /// stream completely, so exactly one device lock exists afterwards.
    ///
    /// # Errors
    ///
    /// Propagates the backend's classified acquisition error and parks the
    /// session in `Error`; the caller decides between retry and the upload
    /// fallback.
    pub async fn start(&mut self) -> Result<(), CameraError> {
        if self.stream.is_some() {
            warn!(state = %self.state, "Releasing previous stream before restart");
            self.stop();
        }

        self.state = SessionState::Starting;
        self.last_error = None;

        match self.backend.open(&self.request).await {
            Ok(stream) => {
                let (width, height) = stream.resolution();
                info!(
                    backend = self.backend.backend_name(),
                    width, height, "Camera session streaming"
                );
                self.stream = Some(StreamGuard { stream });
                self.state = SessionState::Streaming;
                Ok(())
            }
            Err(err) => {
                error!(backend = self.backend.backend_name(), error = %err, "Camera acquisition failed");
                self.state = SessionState::Error;
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Release the stream; idempotent and safe before any successful start
    pub fn stop(&mut self) {
        if self.stream.take().is_some() {
            debug!("Camera stream released");
        }
        match self.state {
            SessionState::Idle | SessionState::Error | SessionState::Closed => {}
            _ => self.state = SessionState::Closed,
        }
    }

    /// Return from `Error` to `Idle` so the user can retry
    pub fn reset(&mut self) {
        if self.state == SessionState::Error {
            self.state = SessionState::Idle;
            self.last_error = None;
        }
    }

    /// Bind the active stream to a preview sink
    ///
    /// The surface may not be mounted yet; attachment is retried within a
    /// bounded budget before failing.
    ///
    /// # Errors
    ///
    /// `Unavailable` when no stream is active; `SinkNotReady` when the sink
    /// never became ready within the retry budget.
    pub async fn attach_to_sink(&mut self, sink: &mut dyn VideoSink) -> Result<(), CameraError> {
        if self.stream.is_none() {
            return Err(CameraError::Unavailable("no active stream to attach".into()));
        }

        for attempt in 1..=self.sink_attach_max_attempts {
            if sink.is_ready() {
                if let Some(guard) = self.stream.as_mut() {
                    if let Ok(frame) = guard.stream.current_frame() {
                        sink.render(&frame);
                    }
                }
                debug!(attempt, "Video sink attached");
                return Ok(());
            }
            tokio::time::sleep(self.sink_attach_retry).await;
        }

        warn!(
            attempts = self.sink_attach_max_attempts,
            "Video sink never became ready"
        );
        Err(CameraError::SinkNotReady {
            attempts: self.sink_attach_max_attempts,
        })
    }

    /// Freeze the current frame to a JPEG still
    ///
    /// Moves the session through `Capturing` into `Processing` on success;
    /// a failed capture falls back to `Streaming` so the user can try again.
    ///
    /// # Errors
    ///
    /// `NoFrameAvailable` when no stream is active or the device has not
    /// produced a frame yet; encoding failures are surfaced as-is.
    pub async fn capture_frame(&mut self) -> Result<CapturedImage, CaptureError> {
        if self.stream.is_none() {
            return Err(CaptureError::NoFrameAvailable);
        }
        if self.state == SessionState::Streaming {
            self.state = SessionState::Capturing;
        }

        let quality = self.jpeg_quality;
        let result = match self.stream.as_mut() {
            Some(guard) => crate::capture::capture_frame(guard.stream.as_mut(), quality).await,
            None => Err(CaptureError::NoFrameAvailable),
        };

        match &result {
            Ok(image) => {
                debug!(bytes = image.len(), "Frame captured and encoded");
                self.state = SessionState::Processing;
            }
            Err(err) => {
                warn!(error = %err, "Frame capture failed");
                if self.state == SessionState::Capturing {
                    self.state = SessionState::Streaming;
                }
            }
        }
        result
    }
}

impl Drop for CameraSessionManager {
    fn drop(&mut self) {
        // The guard would release the device anyway; going through stop()
        // keeps the state machine honest for anything observing it.
        self.stop();
    }
}

impl fmt::Debug for CameraSessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CameraSessionManager")
            .field("backend", &self.backend.backend_name())
            .field("state", &self.state)
            .field("streaming", &self.stream.is_some())
            .finish()
    }
}
