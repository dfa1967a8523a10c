// ABOUTME: Environment configuration management for the capture pipeline
// ABOUTME: Handles environment variables and runtime defaults for camera, upload, and HTTP settings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Environment-based configuration for the capture pipeline

use crate::constants::{capture, env_config, http, limits};
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::env;
use tracing::warn;

/// Runtime configuration for the capture pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Base URL of the nutrition backend
    pub api_base_url: String,
    /// HTTP request timeout in seconds
    pub http_timeout_secs: u64,
    /// HTTP connection timeout in seconds
    pub http_connect_timeout_secs: u64,
    /// Ideal camera frame width
    pub frame_width: u32,
    /// Ideal camera frame height
    pub frame_height: u32,
    /// JPEG quality for captured frames (1..=100)
    pub jpeg_quality: u8,
    /// Maximum accepted upload size in bytes
    pub max_upload_bytes: u64,
    /// Sink attachment retry budget
    pub sink_attach_max_attempts: u32,
    /// Delay between sink attachment attempts in milliseconds
    pub sink_attach_retry_ms: u64,
    /// How long surfaced errors stay visible before auto-clearing, in seconds
    pub error_display_ttl_secs: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            api_base_url: env_config::api_base_url(),
            http_timeout_secs: http::TIMEOUT_SECS,
            http_connect_timeout_secs: http::CONNECT_TIMEOUT_SECS,
            frame_width: capture::FRAME_WIDTH,
            frame_height: capture::FRAME_HEIGHT,
            jpeg_quality: capture::JPEG_QUALITY,
            max_upload_bytes: limits::MAX_UPLOAD_BYTES,
            sink_attach_max_attempts: capture::SINK_ATTACH_MAX_ATTEMPTS,
            sink_attach_retry_ms: capture::SINK_ATTACH_RETRY_MS,
            error_display_ttl_secs: capture::ERROR_DISPLAY_TTL_SECS,
        }
    }
}

impl CaptureConfig {
    /// Load configuration from environment variables, falling back to defaults
    ///
    /// Unparseable numeric values fall back to their defaults with a warning
    /// rather than failing startup.
    ///
    /// # Errors
    ///
    /// Returns an error when a provided value is syntactically valid but
    /// semantically out of range (e.g. a JPEG quality of 0).
    pub fn from_env() -> Result<Self> {
        let mut config = Self {
            api_base_url: env_config::api_base_url(),
            http_timeout_secs: env_config::http_timeout_secs(),
            jpeg_quality: env_config::jpeg_quality(),
            ..Self::default()
        };

        if let Ok(raw) = env::var("PIERRE_CAPTURE_FRAME_SIZE") {
            match parse_frame_size(&raw) {
                Some((width, height)) => {
                    config.frame_width = width;
                    config.frame_height = height;
                }
                None => warn!(value = %raw, "Ignoring malformed PIERRE_CAPTURE_FRAME_SIZE"),
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Check invariants that would otherwise surface as confusing runtime errors
    ///
    /// # Errors
    ///
    /// Returns an error for out-of-range quality, zero-sized frames, or a zero
    /// retry budget.
    pub fn validate(&self) -> Result<()> {
        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            bail!("jpeg_quality must be within 1..=100, got {}", self.jpeg_quality);
        }
        if self.frame_width == 0 || self.frame_height == 0 {
            bail!(
                "frame size must be nonzero, got {}x{}",
                self.frame_width,
                self.frame_height
            );
        }
        if self.sink_attach_max_attempts == 0 {
            bail!("sink_attach_max_attempts must be at least 1");
        }
        Ok(())
    }
}

fn parse_frame_size(raw: &str) -> Option<(u32, u32)> {
    let (width, height) = raw.split_once('x')?;
    Some((width.trim().parse().ok()?, height.trim().parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn default_config_is_valid() {
        let config = CaptureConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.jpeg_quality, 90);
        assert_eq!((config.frame_width, config.frame_height), (1280, 720));
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn out_of_range_quality_is_rejected() {
        let config = CaptureConfig {
            jpeg_quality: 0,
            ..CaptureConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn frame_size_override_is_parsed() {
        env::set_var("PIERRE_CAPTURE_FRAME_SIZE", "1920x1080");
        let config = CaptureConfig::from_env().unwrap();
        env::remove_var("PIERRE_CAPTURE_FRAME_SIZE");
        assert_eq!((config.frame_width, config.frame_height), (1920, 1080));
    }

    #[test]
    #[serial]
    fn malformed_frame_size_falls_back_to_default() {
        env::set_var("PIERRE_CAPTURE_FRAME_SIZE", "widexhigh");
        let config = CaptureConfig::from_env().unwrap();
        env::remove_var("PIERRE_CAPTURE_FRAME_SIZE");
        assert_eq!((config.frame_width, config.frame_height), (1280, 720));
    }
}
