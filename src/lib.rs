// ABOUTME: Main library entry point for the Pierre meal-capture pipeline
// ABOUTME: Camera session management, capture and encode, and food recognition client
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Pierre Capture
//!
//! Client-side meal-capture pipeline for the Pierre fitness platform:
//! camera-based and upload-based image capture, server-side barcode decode,
//! photo-based food recognition, and hand-off of a normalized product draft
//! to the meal-logging form.
//!
//! ## Architecture
//!
//! Three cooperating components, orchestrated by one flow:
//! - **Camera session manager**: acquires and releases the device camera,
//!   owns the exclusive stream handle, guarantees release on every exit path
//! - **Capture & encode**: freezes a frame to a JPEG still, or validates a
//!   user-selected file, producing one normalized [`models::CapturedImage`]
//! - **Recognition client**: submits the payload to the nutrition backend
//!   and classifies every outcome for the retry/fallback UI
//!
//! Authentication state is never ambient: API-calling components receive an
//! explicit [`context::ApiContext`] carrying the base URL and bearer token.
//!
//! ## Example
//!
//! ```rust,no_run
//! use pierre_capture::camera::SyntheticBackend;
//! use pierre_capture::config::CaptureConfig;
//! use pierre_capture::context::ApiContext;
//! use pierre_capture::flow::{CaptureEvents, CaptureFlow, CaptureMode};
//! use pierre_capture::models::{Barcode, RecognizedProductDraft};
//! use std::sync::Arc;
//!
//! struct MealForm;
//!
//! impl CaptureEvents for MealForm {
//!     fn on_scan(&mut self, barcode: Barcode) {
//!         println!("scanned {barcode}");
//!     }
//!     fn on_recognize(&mut self, draft: RecognizedProductDraft) {
//!         println!("recognized {}", draft.name);
//!     }
//!     fn on_close(&mut self) {}
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = CaptureConfig::from_env()?;
//!     let context = ApiContext::with_static_token("http://localhost:8081", "jwt")?;
//!     let mut flow = CaptureFlow::new(
//!         Arc::new(SyntheticBackend::new()),
//!         context,
//!         config,
//!         CaptureMode::Barcode,
//!         MealForm,
//!     );
//!
//!     flow.start_scanning().await?;
//!     flow.capture_and_submit().await?;
//!     Ok(())
//! }
//! ```

/// Camera backend abstraction, session lifecycle, and implementations
pub mod camera;
/// Frame encoding and upload validation into one normalized image shape
pub mod capture;
/// Environment-based runtime configuration
pub mod config;
/// Limits, defaults, and fixed backend endpoint paths
pub mod constants;
/// Injected API session context (base URL + bearer token)
pub mod context;
/// Classified error taxonomy across all pipeline layers
pub mod errors;
/// Capture flow orchestration shared by the barcode and photo paths
pub mod flow;
/// Shared pooled HTTP client
pub mod http;
/// Opt-in tracing subscriber setup
pub mod logging;
/// Core data models: captured images, barcodes, drafts, and log records
pub mod models;
/// Recognition client against the nutrition backend's fixed REST contract
pub mod recognition;
