// ABOUTME: Upload validation producing CapturedImage from user-selected files
// ABOUTME: MIME and size checks run before any decode or network work
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! File-upload path of the capture layer
//!
//! Validation is deliberately shallow: the declared content type must start
//! with `image/` and the payload must fit the upload limit. The bytes are
//! never decoded here: a rejected file costs nothing, and an accepted one
//! is judged by the recognition backend anyway.

use crate::constants::limits;
use crate::errors::CaptureError;
use crate::models::CapturedImage;
use std::path::Path;
use tracing::debug;

/// Validate an uploaded file against the default 10 MB limit
///
/// # Errors
///
/// `InvalidType` when the content type is not `image/*`; `TooLarge` when the
/// payload exceeds the limit.
pub fn from_file(
    file_name: &str,
    content_type: &str,
    data: Vec<u8>,
) -> Result<CapturedImage, CaptureError> {
    from_file_with_limit(file_name, content_type, data, limits::MAX_UPLOAD_BYTES)
}

/// Validate an uploaded file against an explicit size limit
///
/// # Errors
///
/// `InvalidType` when the content type is not `image/*`; `TooLarge` when the
/// payload exceeds `max_bytes`.
pub fn from_file_with_limit(
    file_name: &str,
    content_type: &str,
    data: Vec<u8>,
    max_bytes: u64,
) -> Result<CapturedImage, CaptureError> {
    if !content_type.starts_with("image/") {
        return Err(CaptureError::InvalidType(content_type.to_owned()));
    }

    let size = data.len() as u64;
    if size > max_bytes {
        return Err(CaptureError::TooLarge {
            size,
            limit: max_bytes,
        });
    }

    debug!(file_name, content_type, size, "Upload accepted");
    Ok(CapturedImage::from_upload(file_name, content_type, data))
}

/// Read and validate an image file from disk
///
/// The content type is inferred from the extension, and the size limit is
/// checked against file metadata before the file is read at all.
///
/// # Errors
///
/// `InvalidType` for unrecognized extensions, `TooLarge` before reading
/// oversized files, and `Io` for filesystem failures.
pub async fn from_path(path: &Path, max_bytes: u64) -> Result<CapturedImage, CaptureError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();
    let Some(content_type) = content_type_for_extension(extension) else {
        return Err(CaptureError::InvalidType(format!(
            "unrecognized extension: {extension:?}"
        )));
    };

    let metadata = tokio::fs::metadata(path).await?;
    if metadata.len() > max_bytes {
        return Err(CaptureError::TooLarge {
            size: metadata.len(),
            limit: max_bytes,
        });
    }

    let data = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("upload");

    from_file_with_limit(file_name, content_type, data, max_bytes)
}

fn content_type_for_extension(extension: &str) -> Option<&'static str> {
    match extension.to_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        "heic" => Some("image/heic"),
        _ => None,
    }
}
