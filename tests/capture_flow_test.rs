// ABOUTME: End-to-end tests for the capture flow state machine
// ABOUTME: Happy paths, classified failures, retry, cleanup on every exit path, error expiry
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Capture Flow Tests
//!
//! Drives whole capture attempts, camera or upload, barcode or photo,
//! against the synthetic camera backend and the loopback recognition stub,
//! and checks the invariants the embedding UI leans on: exactly one stream,
//! cleanup on every exit path, `Failed -> Idle` always reachable, notices
//! that expire.

mod common;

use anyhow::Result;
use common::{spawn_stub, Event, EventRecorder, Script, StubBackend};
use pierre_capture::camera::{SessionState, SyntheticBackend, SyntheticFailure};
use pierre_capture::config::CaptureConfig;
use pierre_capture::errors::{ErrorGuidance, PipelineError};
use pierre_capture::flow::{CaptureFlow, CaptureMode, FlowState};
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};

struct Fixture {
    stub: Arc<StubBackend>,
    backend: SyntheticBackend,
    recorder: EventRecorder,
    flow: CaptureFlow<EventRecorder>,
}

async fn fixture(mode: CaptureMode) -> Fixture {
    fixture_with_backend(mode, SyntheticBackend::new()).await
}

async fn fixture_with_backend(mode: CaptureMode, backend: SyntheticBackend) -> Fixture {
    let stub = StubBackend::new();
    let addr = spawn_stub(Arc::clone(&stub)).await;
    let recorder = EventRecorder::new();
    let flow = CaptureFlow::new(
        Arc::new(backend.clone()),
        common::test_context(addr),
        CaptureConfig::default(),
        mode,
        recorder.clone(),
    );
    Fixture {
        stub,
        backend,
        recorder,
        flow,
    }
}

fn jpeg_bytes(len: usize) -> Vec<u8> {
    let mut data = vec![0u8; len];
    data[0] = 0xFF;
    data[1] = 0xD8;
    data
}

#[tokio::test]
async fn barcode_scan_happy_path_hands_off_and_releases_the_camera() -> Result<()> {
    let mut fx = fixture(CaptureMode::Barcode).await;

    fx.flow.start_scanning().await?;
    assert_eq!(fx.flow.state(), FlowState::Scanning);
    assert_eq!(fx.backend.active_streams(), 1);

    fx.flow.capture_and_submit().await?;
    assert_eq!(fx.flow.state(), FlowState::Recognized);
    assert_eq!(
        fx.recorder.events(),
        vec![Event::Scanned("4006381333931".into())]
    );

    // Recognized is an exit path: the device lock is gone
    assert_eq!(fx.backend.active_streams(), 0);
    assert_eq!(fx.flow.session().state(), SessionState::Closed);
    Ok(())
}

#[tokio::test]
async fn photo_recognition_delivers_the_draft_without_precision_loss() -> Result<()> {
    let mut fx = fixture(CaptureMode::Photo).await;

    fx.flow.start_scanning().await?;
    fx.flow.capture_and_submit().await?;

    assert_eq!(fx.recorder.events(), vec![Event::Recognized("Greek Yogurt".into())]);
    let drafts = fx.recorder.drafts();
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].calories_per_100g, Some(59.3));
    assert_eq!(drafts[0].proteins_per_100g, Some(10.19));
    assert_eq!(drafts[0].fats_per_100g, Some(0.66));
    assert_eq!(drafts[0].carbs_per_100g, Some(3.6));
    Ok(())
}

#[tokio::test]
async fn two_megabyte_jpeg_upload_scans_without_a_camera() -> Result<()> {
    let mut fx = fixture(CaptureMode::Barcode).await;

    fx.flow
        .pick_file("barcode.jpg", "image/jpeg", jpeg_bytes(2 * 1024 * 1024))
        .await?;

    assert_eq!(fx.flow.state(), FlowState::Recognized);
    assert_eq!(
        fx.recorder.events(),
        vec![Event::Scanned("4006381333931".into())]
    );
    assert_eq!(fx.backend.active_streams(), 0);
    Ok(())
}

#[tokio::test]
async fn text_file_fails_immediately_with_no_network_call() {
    let mut fx = fixture(CaptureMode::Barcode).await;

    let err = fx
        .flow
        .pick_file("notes.txt", "text/plain", b"hello".to_vec())
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Capture(_)));
    assert_eq!(fx.flow.state(), FlowState::Failed);
    assert_eq!(fx.stub.request_count(), 0);

    let notice = fx.flow.error_notice(Instant::now()).unwrap();
    assert_eq!(notice.guidance, ErrorGuidance::PickDifferentFile);
    assert!(!notice.retryable);

    // Failed -> Idle is always reachable
    fx.flow.retry();
    assert_eq!(fx.flow.state(), FlowState::Idle);
    assert!(fx.flow.error_notice(Instant::now()).is_none());
}

#[tokio::test]
async fn permission_denied_offers_upload_fallback_without_streaming() -> Result<()> {
    let mut fx = fixture_with_backend(
        CaptureMode::Barcode,
        SyntheticBackend::failing(SyntheticFailure::PermissionDenied),
    )
    .await;

    let err = fx.flow.start_scanning().await.unwrap_err();
    assert!(matches!(err, PipelineError::Camera(_)));
    assert_eq!(fx.flow.state(), FlowState::Failed);
    assert_eq!(fx.backend.active_streams(), 0);

    let notice = fx.flow.error_notice(Instant::now()).unwrap();
    assert_eq!(notice.guidance, ErrorGuidance::UploadInstead);

    // The upload path still works from Failed (implicit retry)
    fx.flow
        .pick_file("barcode.jpg", "image/jpeg", jpeg_bytes(64 * 1024))
        .await?;
    assert_eq!(fx.flow.state(), FlowState::Recognized);
    assert_eq!(
        fx.recorder.events(),
        vec![Event::Scanned("4006381333931".into())]
    );
    Ok(())
}

#[tokio::test]
async fn empty_barcode_response_fails_the_attempt_and_allows_retry() -> Result<()> {
    let mut fx = fixture(CaptureMode::Barcode).await;
    fx.stub
        .set_scan(Script::Ok(json!({ "barcode": "", "type": "EAN13" })));

    fx.flow.start_scanning().await?;
    let err = fx.flow.capture_and_submit().await.unwrap_err();
    assert!(matches!(err, PipelineError::Recognition(_)));
    assert_eq!(fx.flow.state(), FlowState::Failed);
    assert_eq!(fx.backend.active_streams(), 0);

    let notice = fx.flow.error_notice(Instant::now()).unwrap();
    assert_eq!(notice.guidance, ErrorGuidance::ManualEntry);

    fx.flow.retry();
    fx.stub
        .set_scan(Script::Ok(json!({ "barcode": "4006381333931", "type": "EAN13" })));
    fx.flow.start_scanning().await?;
    fx.flow.capture_and_submit().await?;
    assert_eq!(fx.flow.state(), FlowState::Recognized);
    Ok(())
}

#[tokio::test]
async fn manual_barcode_entry_converges_on_the_scan_hand_off() {
    let mut fx = fixture(CaptureMode::Barcode).await;

    // Too short: validation failure, no lookup, no hand-off
    let err = fx.flow.enter_manual_barcode("123").unwrap_err();
    assert!(matches!(err, PipelineError::Recognition(_)));
    assert_eq!(fx.flow.state(), FlowState::Failed);
    assert_eq!(fx.stub.request_count(), 0);
    assert!(fx.recorder.events().is_empty());

    fx.flow.retry();
    fx.flow.enter_manual_barcode("4006381333931").unwrap();
    assert_eq!(fx.flow.state(), FlowState::Recognized);
    assert_eq!(
        fx.recorder.events(),
        vec![Event::Scanned("4006381333931".into())]
    );
}

#[tokio::test]
async fn error_notices_expire_after_the_display_window() {
    let mut fx = fixture(CaptureMode::Barcode).await;

    let _ = fx
        .flow
        .pick_file("notes.txt", "text/plain", b"hello".to_vec())
        .await;
    let now = Instant::now();
    assert!(fx.flow.error_notice(now).is_some());

    // Default TTL is five seconds; past the deadline the notice is gone
    let later = now + Duration::from_secs(6);
    assert!(fx.flow.error_notice(later).is_none());

    fx.flow.clear_expired_notice(later);
    assert!(fx.flow.error_notice(now).is_none());
}

#[tokio::test]
async fn closing_the_flow_releases_the_camera_and_notifies() -> Result<()> {
    let mut fx = fixture(CaptureMode::Barcode).await;

    fx.flow.start_scanning().await?;
    assert_eq!(fx.backend.active_streams(), 1);

    fx.flow.close();
    assert_eq!(fx.flow.state(), FlowState::Idle);
    assert_eq!(fx.backend.active_streams(), 0);
    assert_eq!(fx.recorder.events(), vec![Event::Closed]);
    Ok(())
}

#[tokio::test]
async fn dropping_the_flow_mid_scan_releases_the_camera() -> Result<()> {
    let backend = SyntheticBackend::new();
    {
        let mut fx = fixture_with_backend(CaptureMode::Barcode, backend.clone()).await;
        fx.flow.start_scanning().await?;
        assert_eq!(backend.active_streams(), 1);
        drop(fx);
    }
    assert_eq!(backend.active_streams(), 0);
    Ok(())
}

#[tokio::test]
async fn capture_trigger_outside_scanning_is_a_no_op() {
    let mut fx = fixture(CaptureMode::Barcode).await;

    fx.flow.capture_and_submit().await.unwrap();
    assert_eq!(fx.flow.state(), FlowState::Idle);
    assert!(fx.recorder.events().is_empty());
    assert_eq!(fx.stub.request_count(), 0);
}

#[tokio::test]
async fn mode_switch_swaps_the_recognition_operation() -> Result<()> {
    let mut fx = fixture(CaptureMode::Barcode).await;

    fx.flow.set_mode(CaptureMode::Photo);
    fx.flow.start_scanning().await?;
    fx.flow.capture_and_submit().await?;

    assert_eq!(fx.recorder.events(), vec![Event::Recognized("Greek Yogurt".into())]);
    Ok(())
}
