// ABOUTME: Camera abstraction for the meal-capture pipeline
// ABOUTME: Backend trait, session lifecycle manager, and synthetic/webcam implementations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Camera Layer
//!
//! Everything that touches the camera device. The [`CameraBackend`] trait is
//! the platform seam: the session manager works the same against the
//! synthetic backend used in tests and the real webcam backend behind the
//! `webcam` feature. The [`CameraSessionManager`] owns the exclusive stream
//! handle and guarantees it is released on every exit path.

pub mod backend;
pub mod session;
pub mod synthetic;
#[cfg(feature = "webcam")]
pub mod webcam;

pub use backend::{CameraBackend, CameraFacing, CameraStream, RawFrame, StreamRequest, VideoSink};
pub use session::{CameraSessionManager, SessionState};
pub use synthetic::{SyntheticBackend, SyntheticFailure};
#[cfg(feature = "webcam")]
pub use webcam::WebcamBackend;
