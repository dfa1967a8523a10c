// ABOUTME: Capture and encode layer normalizing camera frames and file uploads
// ABOUTME: Everything downstream sees one CapturedImage shape regardless of source
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Capture & Encode
//!
//! Two entry points, one output: a camera frame frozen to a JPEG still, or a
//! user-selected file validated without decoding. Both produce a
//! [`crate::models::CapturedImage`], so the recognition client never needs
//! to know where an image came from.

pub mod encode;
pub mod upload;

pub use encode::{capture_frame, encode_frame};
pub use upload::{from_file, from_file_with_limit, from_path};
