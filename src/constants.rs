// ABOUTME: System-wide constants and configuration values for the meal-capture pipeline
// ABOUTME: Contains upload limits, capture defaults, endpoint paths, and environment overrides
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Constants Module
//!
//! Hardcoded limits and defaults for the capture pipeline, plus the
//! environment-variable overrides the configuration layer reads.

/// Validation limits enforced client-side before any network call
pub mod limits {
    /// Maximum accepted upload size in bytes (10 MB)
    pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

    /// Minimum barcode length accepted from scan or manual entry
    pub const MIN_BARCODE_LEN: usize = 8;

    /// Maximum barcode length the nutrition backend accepts
    pub const MAX_BARCODE_LEN: usize = 20;

    /// Smallest portion weight the nutrition backend accepts (grams)
    pub const MIN_PORTION_WEIGHT_G: f64 = 1.0;

    /// Largest portion weight the nutrition backend accepts (grams)
    pub const MAX_PORTION_WEIGHT_G: f64 = 10_000.0;
}

/// Defaults for camera acquisition, encoding, and error display
pub mod capture {
    /// JPEG quality used when freezing a video frame to a still
    pub const JPEG_QUALITY: u8 = 90;

    /// Ideal camera frame width requested from the device
    pub const FRAME_WIDTH: u32 = 1280;

    /// Ideal camera frame height requested from the device
    pub const FRAME_HEIGHT: u32 = 720;

    /// How many times sink attachment is retried while the surface mounts
    pub const SINK_ATTACH_MAX_ATTEMPTS: u32 = 10;

    /// Delay between sink attachment attempts in milliseconds
    pub const SINK_ATTACH_RETRY_MS: u64 = 50;

    /// How long a surfaced capture error stays visible before auto-clearing
    pub const ERROR_DISPLAY_TTL_SECS: u64 = 5;

    /// File name reported for camera-captured stills in multipart uploads
    pub const CAPTURE_FILE_NAME: &str = "capture.jpg";
}

/// HTTP client defaults shared with the recognition client
pub mod http {
    /// Request timeout in seconds
    pub const TIMEOUT_SECS: u64 = 30;

    /// Connection timeout in seconds
    pub const CONNECT_TIMEOUT_SECS: u64 = 10;
}

/// Fixed nutrition-backend endpoint paths (the contract is external)
pub mod endpoints {
    /// Multipart barcode decode from an image
    pub const SCAN_BARCODE_IMAGE: &str = "/nutrition/scan-barcode-image";

    /// Multipart AI product recognition from an image
    pub const RECOGNIZE_PRODUCT_IMAGE: &str = "/nutrition/recognize-product-image";

    /// JSON barcode-to-product lookup
    pub const LOOKUP_BARCODE: &str = "/nutrition/lookup-barcode";

    /// JSON product creation from a recognition draft
    pub const PRODUCTS_FROM_RECOGNITION: &str = "/nutrition/products/from-recognition";

    /// JSON meal-log creation from a barcode
    pub const LOGS_FROM_BARCODE: &str = "/nutrition/logs/from-barcode";

    /// JSON meal-log creation from a known product
    pub const LOGS: &str = "/nutrition/logs";
}

/// Environment-based configuration overrides
pub mod env_config {
    use std::env;

    /// Get the nutrition API base URL from environment or default
    #[must_use]
    pub fn api_base_url() -> String {
        env::var("PIERRE_CAPTURE_API_URL").unwrap_or_else(|_| "http://localhost:8081".into())
    }

    /// Get the HTTP request timeout from environment or default
    #[must_use]
    pub fn http_timeout_secs() -> u64 {
        env::var("PIERRE_CAPTURE_HTTP_TIMEOUT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(super::http::TIMEOUT_SECS)
    }

    /// Get the JPEG quality from environment or default
    #[must_use]
    pub fn jpeg_quality() -> u8 {
        env::var("PIERRE_CAPTURE_JPEG_QUALITY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(super::capture::JPEG_QUALITY)
    }
}
