// ABOUTME: Unified error taxonomy for the meal-capture pipeline
// ABOUTME: Classified camera, capture, and recognition errors with retry and guidance mapping
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Capture Error Handling
//!
//! Every failure in the pipeline is classified at the layer it occurs in:
//! camera acquisition, image capture/validation, or recognition. The
//! classification is part of the contract: it decides whether the caller
//! shows a retry button, suggests a clearer photo, or falls back to manual
//! entry. Nothing here panics; errors reset the owning flow, they never
//! escape it.

use thiserror::Error;

/// Errors from camera acquisition and stream lifecycle
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CameraError {
    /// The user (or platform policy) denied camera access
    #[error("camera permission denied: {0}")]
    PermissionDenied(String),

    /// No camera device matching the request exists
    #[error("camera device not found: {0}")]
    DeviceNotFound(String),

    /// The preview sink never became ready within the retry budget
    #[error("video sink not ready after {attempts} attempts")]
    SinkNotReady {
        /// How many attachment attempts were made before giving up
        attempts: u32,
    },

    /// Acquisition failed for a reason the platform did not classify
    #[error("camera unavailable: {0}")]
    Unavailable(String),
}

/// Errors from freezing a frame or validating an uploaded file
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The selected file is not an image
    #[error("file is not an image (content type: {0})")]
    InvalidType(String),

    /// The selected file exceeds the upload limit
    #[error("file too large: {size} bytes exceeds the {limit} byte limit")]
    TooLarge {
        /// Actual size of the rejected file
        size: u64,
        /// Limit that was exceeded
        limit: u64,
    },

    /// The camera stream has not produced a readable frame yet
    #[error("no frame available from the camera stream")]
    NoFrameAvailable,

    /// Encoding the frame to JPEG failed
    #[error("image encoding failed: {0}")]
    EncodingFailed(String),

    /// Reading the selected file failed
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors from the recognition backend, classified for the caller
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecognitionError {
    /// The barcode or product is absent from the backend's data
    #[error("not found: {0}")]
    NotFound(String),

    /// The service answered but recognized nothing usable; an HTTP 200
    /// carrying an empty or too-short barcode lands here, not in success
    #[error("not recognized: {0}")]
    NotRecognized(String),

    /// Server-side or network failure; safe to retry with the same input
    #[error("transient service failure: {0}")]
    TransientServerError(String),

    /// The request was rejected; retrying without changing the input is futile
    #[error("request rejected: {0}")]
    Malformed(String),

    /// The bearer token was missing or expired; the embedding app handles this
    #[error("authentication required")]
    AuthRequired,
}

impl RecognitionError {
    /// Whether retrying the same request can reasonably succeed
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransientServerError(_))
    }
}

/// What the UI should offer the user after a classified failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorGuidance {
    /// Transient problem; offer a retry button
    Retry,
    /// The image itself was the problem; ask for a clearer photo
    TryClearerPhoto,
    /// Recognition has nothing to offer; suggest typing the barcode or
    /// entering the product by hand
    ManualEntry,
    /// The camera cannot be used; offer the file-upload path instead
    UploadInstead,
    /// The rejected file cannot be submitted; ask for a different one
    PickDifferentFile,
    /// The session is no longer authenticated
    Reauthenticate,
}

impl ErrorGuidance {
    /// Short user-facing hint matching the classification
    #[must_use]
    pub fn hint(&self) -> &'static str {
        match self {
            Self::Retry => "Something went wrong on our side. Try again.",
            Self::TryClearerPhoto => "The image could not be processed. Try a clearer photo.",
            Self::ManualEntry => "Nothing was recognized. Enter the barcode or product manually.",
            Self::UploadInstead => "The camera is unavailable. Upload a photo instead.",
            Self::PickDifferentFile => "That file cannot be used. Pick an image under 10 MB.",
            Self::Reauthenticate => "Your session expired. Sign in again.",
        }
    }
}

/// Any failure a capture flow can surface, tagged with its layer
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Camera-layer failure
    #[error(transparent)]
    Camera(#[from] CameraError),

    /// Capture/validation-layer failure
    #[error(transparent)]
    Capture(#[from] CaptureError),

    /// Recognition-layer failure
    #[error(transparent)]
    Recognition(#[from] RecognitionError),
}

impl PipelineError {
    /// Map the failure to the affordance the UI should present
    #[must_use]
    pub fn guidance(&self) -> ErrorGuidance {
        match self {
            Self::Camera(err) => match err {
                CameraError::SinkNotReady { .. } => ErrorGuidance::Retry,
                CameraError::PermissionDenied(_)
                | CameraError::DeviceNotFound(_)
                | CameraError::Unavailable(_) => ErrorGuidance::UploadInstead,
            },
            Self::Capture(err) => match err {
                CaptureError::InvalidType(_) | CaptureError::TooLarge { .. } => {
                    ErrorGuidance::PickDifferentFile
                }
                CaptureError::NoFrameAvailable
                | CaptureError::EncodingFailed(_)
                | CaptureError::Io(_) => ErrorGuidance::Retry,
            },
            Self::Recognition(err) => match err {
                RecognitionError::NotFound(_) | RecognitionError::NotRecognized(_) => {
                    ErrorGuidance::ManualEntry
                }
                RecognitionError::TransientServerError(_) => ErrorGuidance::Retry,
                RecognitionError::Malformed(_) => ErrorGuidance::TryClearerPhoto,
                RecognitionError::AuthRequired => ErrorGuidance::Reauthenticate,
            },
        }
    }

    /// Whether the same operation may be retried without new input
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self.guidance(), ErrorGuidance::Retry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_errors_are_retryable() {
        let err = RecognitionError::TransientServerError("502 from backend".into());
        assert!(err.is_retryable());
        assert!(PipelineError::from(err).is_retryable());
    }

    #[test]
    fn not_recognized_suggests_manual_entry() {
        let err = PipelineError::from(RecognitionError::NotRecognized("empty barcode".into()));
        assert_eq!(err.guidance(), ErrorGuidance::ManualEntry);
        assert!(!err.is_retryable());
    }

    #[test]
    fn camera_failures_offer_upload_fallback() {
        let err = PipelineError::from(CameraError::PermissionDenied("user declined".into()));
        assert_eq!(err.guidance(), ErrorGuidance::UploadInstead);
    }

    #[test]
    fn rejected_files_ask_for_a_different_one() {
        let err = PipelineError::from(CaptureError::InvalidType("text/plain".into()));
        assert_eq!(err.guidance(), ErrorGuidance::PickDifferentFile);
    }
}
