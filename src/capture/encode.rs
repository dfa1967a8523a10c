// ABOUTME: Frame-to-JPEG encoding for camera captures
// ABOUTME: Freezes the current video frame to an immutable CapturedImage off the event loop
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Still-image encoding from live camera frames

use crate::camera::{CameraStream, RawFrame};
use crate::errors::CaptureError;
use crate::models::CapturedImage;
use image::RgbImage;
use std::io::Cursor;
use tracing::debug;

/// Freeze the stream's current frame to a JPEG still
///
/// # Errors
///
/// `NoFrameAvailable` when the stream has not produced a frame yet;
/// `EncodingFailed` when JPEG encoding goes wrong.
pub async fn capture_frame(
    stream: &mut dyn CameraStream,
    jpeg_quality: u8,
) -> Result<CapturedImage, CaptureError> {
    let frame = stream.current_frame()?;
    encode_frame(frame, jpeg_quality).await
}

/// Encode an already-grabbed frame to a JPEG still
///
/// Encoding is CPU-bound, so it runs on a blocking task rather than the
/// event loop.
///
/// # Errors
///
/// `EncodingFailed` when the encoder rejects the frame or the blocking task
/// is cancelled.
pub async fn encode_frame(frame: RawFrame, jpeg_quality: u8) -> Result<CapturedImage, CaptureError> {
    let (width, height) = frame.dimensions();

    let bytes = tokio::task::spawn_blocking(move || encode_jpeg(&frame.image, jpeg_quality))
        .await
        .map_err(|e| CaptureError::EncodingFailed(format!("encoding task failed: {e}")))??;

    debug!(width, height, bytes = bytes.len(), "Frame encoded to JPEG");
    Ok(CapturedImage::from_camera(bytes, width, height))
}

fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>, CaptureError> {
    let mut buffer = Vec::new();
    let mut cursor = Cursor::new(&mut buffer);
    let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, quality);

    encoder
        .encode(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| CaptureError::EncodingFailed(e.to_string()))?;

    Ok(buffer)
}
