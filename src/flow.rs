// ABOUTME: Capture flow orchestration shared by the barcode and photo paths
// ABOUTME: State machine, single in-flight recognition, guaranteed camera cleanup, timed error expiry
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Capture Flow
//!
//! One [`CaptureFlow`] per capture UI instance. It drives the shared state
//! machine `Idle -> Scanning | Picking -> Processing -> Recognized | Failed`
//! for both the barcode and the photo path, enforces a single in-flight
//! recognition call, and stops the camera session on every exit path:
//! success, failure, cancel, or drop (the session manager releases the
//! device from its own destructor).
//!
//! Failures never escape this layer as panics or unhandled propagation:
//! each one becomes a classified [`ErrorNotice`] with a display deadline,
//! and `Failed -> Idle` is always reachable through [`CaptureFlow::retry`].

use crate::camera::{CameraBackend, CameraSessionManager, VideoSink};
use crate::capture;
use crate::config::CaptureConfig;
use crate::context::ApiContext;
use crate::errors::{ErrorGuidance, PipelineError};
use crate::http;
use crate::models::{Barcode, CapturedImage, RecognizedProductDraft};
use crate::recognition::RecognitionClient;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Flow states shared by both capture paths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowState {
    /// Nothing in progress
    #[default]
    Idle,
    /// Camera active, waiting for the user to trigger a capture
    Scanning,
    /// A picked file is being validated
    Picking,
    /// A recognition call is in flight; the capture trigger is disabled
    Processing,
    /// A result was handed off to the meal-logging form
    Recognized,
    /// The attempt failed; retry returns to `Idle`
    Failed,
}

/// Which recognition operation a capture feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMode {
    /// Decode a barcode, then hand the value to the meal form
    Barcode,
    /// Recognize the product and estimate macros from the photo
    Photo,
}

/// Callbacks into the embedding application
pub trait CaptureEvents: Send {
    /// A barcode was decoded (or typed and validated)
    fn on_scan(&mut self, barcode: Barcode);

    /// A product draft was recognized from a photo
    fn on_recognize(&mut self, draft: RecognizedProductDraft);

    /// The capture UI was closed
    fn on_close(&mut self);
}

/// A classified, user-facing failure with a display deadline
///
/// Notices expire instead of lingering: once `expires_at` passes, the UI
/// stops rendering the message so the user is not stuck staring at a stale
/// error before retrying. Expiry is checked against a caller-supplied
/// instant; there is no background timer to race against in tests.
#[derive(Debug, Clone)]
pub struct ErrorNotice {
    /// Specific, classified failure message
    pub message: String,
    /// Affordance the UI should present
    pub guidance: ErrorGuidance,
    /// Whether retrying with the same input can succeed
    pub retryable: bool,
    expires_at: Instant,
}

impl ErrorNotice {
    fn new(error: &PipelineError, ttl: Duration) -> Self {
        Self {
            message: error.to_string(),
            guidance: error.guidance(),
            retryable: error.is_retryable(),
            expires_at: Instant::now() + ttl,
        }
    }

    /// Whether the display window has passed
    #[must_use]
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

enum RecognitionOutcome {
    Scanned(Barcode),
    Recognized(RecognizedProductDraft),
}

/// Orchestrates one camera-or-upload capture attempt at a time
pub struct CaptureFlow<E: CaptureEvents> {
    session: CameraSessionManager,
    recognition: RecognitionClient,
    config: CaptureConfig,
    mode: CaptureMode,
    state: FlowState,
    notice: Option<ErrorNotice>,
    events: E,
}

impl<E: CaptureEvents> CaptureFlow<E> {
    /// Build a flow over the given backend and API context
    #[must_use]
    pub fn new(
        backend: Arc<dyn CameraBackend>,
        context: ApiContext,
        config: CaptureConfig,
        mode: CaptureMode,
        events: E,
    ) -> Self {
        let session = CameraSessionManager::new(backend, &config);
        let client = http::create_client_with_timeout(
            config.http_timeout_secs,
            config.http_connect_timeout_secs,
        );
        Self {
            session,
            recognition: RecognitionClient::with_client(client, context),
            config,
            mode,
            state: FlowState::Idle,
            notice: None,
            events,
        }
    }

    /// Current flow state
    #[must_use]
    pub fn state(&self) -> FlowState {
        self.state
    }

    /// Current capture mode
    #[must_use]
    pub fn mode(&self) -> CaptureMode {
        self.mode
    }

    /// The camera session this flow drives
    #[must_use]
    pub fn session(&self) -> &CameraSessionManager {
        &self.session
    }

    /// Switch between the barcode and photo tabs
    ///
    /// Ignored while a recognition call is in flight.
    pub fn set_mode(&mut self, mode: CaptureMode) {
        if self.state == FlowState::Processing {
            warn!("Mode switch ignored while processing");
            return;
        }
        self.mode = mode;
    }

    /// The active error notice, unless its display window has passed
    #[must_use]
    pub fn error_notice(&self, now: Instant) -> Option<&ErrorNotice> {
        self.notice.as_ref().filter(|notice| !notice.is_expired(now))
    }

    /// Drop a notice whose display window has passed
    pub fn clear_expired_notice(&mut self, now: Instant) {
        if self.notice.as_ref().is_some_and(|n| n.is_expired(now)) {
            self.notice = None;
            debug!("Stale error notice cleared");
        }
    }

    /// Start the camera and enter `Scanning`
    ///
    /// A `Failed` flow retries implicitly; any other non-idle state ignores
    /// the request.
    ///
    /// # Errors
    ///
    /// Classified camera errors; the flow lands in `Failed` with an upload
    /// fallback suggested, and never enters `Scanning`.
    pub async fn start_scanning(&mut self) -> Result<(), PipelineError> {
        match self.state {
            FlowState::Idle => {}
            FlowState::Failed => self.retry(),
            _ => {
                debug!(state = ?self.state, "start_scanning ignored");
                return Ok(());
            }
        }

        match self.session.start().await {
            Ok(()) => {
                self.state = FlowState::Scanning;
                debug!("Capture flow scanning");
                Ok(())
            }
            Err(err) => {
                let error = PipelineError::Camera(err);
                self.fail(&error);
                Err(error)
            }
        }
    }

    /// Bind the live preview to a sink; does not change flow state
    ///
    /// # Errors
    ///
    /// `SinkNotReady` when the surface never mounted within the retry
    /// budget. The camera keeps streaming; the caller may re-attach.
    pub async fn attach_preview(&mut self, sink: &mut dyn VideoSink) -> Result<(), PipelineError> {
        self.session
            .attach_to_sink(sink)
            .await
            .map_err(PipelineError::Camera)
    }

    /// Freeze a frame and submit it for recognition
    ///
    /// Only valid while `Scanning`; in particular, a second trigger while
    /// `Processing` is a no-op, so recognition calls never overlap.
    ///
    /// # Errors
    ///
    /// Capture and recognition errors land the flow in `Failed` with a
    /// classified notice.
    pub async fn capture_and_submit(&mut self) -> Result<(), PipelineError> {
        if self.state != FlowState::Scanning {
            warn!(state = ?self.state, "Capture trigger ignored");
            return Ok(());
        }
        self.state = FlowState::Processing;

        let image = match self.session.capture_frame().await {
            Ok(image) => image,
            Err(err) => {
                let error = PipelineError::Capture(err);
                self.fail(&error);
                return Err(error);
            }
        };

        self.submit(image).await
    }

    /// Validate a user-picked file and submit it for recognition
    ///
    /// Works from `Idle` (camera never started), from `Failed` (implicit
    /// retry), and from `Scanning` (the camera is released first).
    ///
    /// # Errors
    ///
    /// `InvalidType` and `TooLarge` fail immediately, before any network
    /// call; recognition errors follow the shared classification.
    pub async fn pick_file(
        &mut self,
        file_name: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<(), PipelineError> {
        match self.state {
            FlowState::Idle => {}
            FlowState::Failed => self.retry(),
            FlowState::Scanning => self.session.stop(),
            _ => {
                warn!(state = ?self.state, "File pick ignored");
                return Ok(());
            }
        }
        self.state = FlowState::Picking;

        let image = match capture::from_file_with_limit(
            file_name,
            content_type,
            data,
            self.config.max_upload_bytes,
        ) {
            Ok(image) => image,
            Err(err) => {
                let error = PipelineError::Capture(err);
                self.fail(&error);
                return Err(error);
            }
        };

        self.submit(image).await
    }

    /// Accept a manually typed barcode
    ///
    /// Applies the same validation as a decoded barcode and converges on the
    /// same `on_scan` hand-off; a too-short value fails without any lookup.
    ///
    /// # Errors
    ///
    /// Validation failures land the flow in `Failed` with a manual-entry
    /// notice.
    pub fn enter_manual_barcode(&mut self, raw: &str) -> Result<(), PipelineError> {
        if self.state == FlowState::Processing {
            warn!("Manual entry ignored while processing");
            return Ok(());
        }

        match Barcode::parse(raw) {
            Ok(barcode) => {
                self.session.stop();
                self.state = FlowState::Recognized;
                self.notice = None;
                info!(barcode = %barcode, "Manual barcode accepted");
                self.events.on_scan(barcode);
                Ok(())
            }
            Err(err) => {
                let error = PipelineError::Recognition(err);
                self.fail(&error);
                Err(error)
            }
        }
    }

    /// Return to `Idle` so the user can try again
    ///
    /// Always available from `Failed` (no failure permanently locks the
    /// flow) and from `Recognized` to begin a fresh capture.
    pub fn retry(&mut self) {
        if matches!(self.state, FlowState::Failed | FlowState::Recognized) {
            self.state = FlowState::Idle;
            self.notice = None;
            self.session.reset();
            debug!("Capture flow reset for retry");
        }
    }

    /// Close the capture UI: release the camera and notify the embedder
    pub fn close(&mut self) {
        self.session.stop();
        self.state = FlowState::Idle;
        self.notice = None;
        self.events.on_close();
    }

    async fn submit(&mut self, image: CapturedImage) -> Result<(), PipelineError> {
        self.state = FlowState::Processing;

        let outcome = match self.mode {
            CaptureMode::Barcode => self
                .recognition
                .decode_barcode(image)
                .await
                .map(|decoded| RecognitionOutcome::Scanned(decoded.barcode)),
            CaptureMode::Photo => self
                .recognition
                .recognize_product(image)
                .await
                .map(RecognitionOutcome::Recognized),
        };

        match outcome {
            Ok(result) => {
                self.session.stop();
                self.state = FlowState::Recognized;
                self.notice = None;
                match result {
                    RecognitionOutcome::Scanned(barcode) => {
                        info!(barcode = %barcode, "Capture flow recognized a barcode");
                        self.events.on_scan(barcode);
                    }
                    RecognitionOutcome::Recognized(draft) => {
                        info!(product = %draft.name, "Capture flow recognized a product");
                        self.events.on_recognize(draft);
                    }
                }
                Ok(())
            }
            Err(err) => {
                let error = PipelineError::Recognition(err);
                self.fail(&error);
                Err(error)
            }
        }
    }

    /// Shared failure path: camera released, state `Failed`, notice armed
    fn fail(&mut self, error: &PipelineError) {
        self.session.stop();
        warn!(error = %error, guidance = ?error.guidance(), "Capture attempt failed");
        self.notice = Some(ErrorNotice::new(
            error,
            Duration::from_secs(self.config.error_display_ttl_secs),
        ));
        self.state = FlowState::Failed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::RecognitionError;

    #[test]
    fn notices_expire_after_their_window() {
        let error = PipelineError::Recognition(RecognitionError::NotRecognized("x".into()));
        let notice = ErrorNotice::new(&error, Duration::from_secs(5));
        let now = Instant::now();

        assert!(!notice.is_expired(now));
        assert!(notice.is_expired(now + Duration::from_secs(6)));
        assert_eq!(notice.guidance, ErrorGuidance::ManualEntry);
        assert!(!notice.retryable);
    }
}
