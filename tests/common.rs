// ABOUTME: Shared test utilities for the capture pipeline integration tests
// ABOUTME: Loopback nutrition-backend stub with scriptable responses plus an event recorder
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org
#![allow(dead_code, clippy::missing_panics_doc, clippy::must_use_candidate)]

//! Shared test utilities for `pierre-capture`
//!
//! Stands up a loopback stub of the nutrition backend's fixed REST contract
//! so recognition-layer tests exercise real multipart and JSON round-trips
//! without a network. Every handler counts requests, which is how tests
//! assert that rejected inputs never reach the wire.

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use pierre_capture::context::ApiContext;
use pierre_capture::flow::CaptureEvents;
use pierre_capture::models::{Barcode, RecognizedProductDraft};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Scripted behavior for the stub's endpoints
#[derive(Debug, Clone)]
pub enum Script {
    /// HTTP 200 with the given JSON body
    Ok(Value),
    /// HTTP 404 with a detail message
    NotFound,
    /// HTTP 500 with a detail message
    ServerError,
    /// HTTP 400 with a detail message
    BadRequest,
    /// HTTP 401 with a detail message
    Unauthorized,
}

impl Script {
    fn into_response(self) -> (StatusCode, Json<Value>) {
        match self {
            Self::Ok(body) => (StatusCode::OK, Json(body)),
            Self::NotFound => (
                StatusCode::NOT_FOUND,
                Json(json!({ "detail": "Nothing matched the request" })),
            ),
            Self::ServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "detail": "Recognition backend failed" })),
            ),
            Self::BadRequest => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "detail": "The image could not be processed" })),
            ),
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "detail": "Not authenticated" })),
            ),
        }
    }
}

/// Loopback stand-in for the nutrition backend
pub struct StubBackend {
    scan: Mutex<Script>,
    recognize: Mutex<Script>,
    lookup: Mutex<Script>,
    log_from_barcode: Mutex<Script>,
    requests: AtomicUsize,
    last_authorization: Mutex<Option<String>>,
}

impl StubBackend {
    /// Stub with happy-path defaults on every endpoint
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            scan: Mutex::new(Script::Ok(
                json!({ "barcode": "4006381333931", "type": "EAN13" }),
            )),
            recognize: Mutex::new(Script::Ok(recognized_product_body())),
            lookup: Mutex::new(Script::Ok(food_product_body())),
            log_from_barcode: Mutex::new(Script::Ok(nutrition_log_body())),
            requests: AtomicUsize::new(0),
            last_authorization: Mutex::new(None),
        })
    }

    pub fn set_scan(&self, script: Script) {
        *self.scan.lock().unwrap() = script;
    }

    pub fn set_recognize(&self, script: Script) {
        *self.recognize.lock().unwrap() = script;
    }

    pub fn set_lookup(&self, script: Script) {
        *self.lookup.lock().unwrap() = script;
    }

    pub fn set_log_from_barcode(&self, script: Script) {
        *self.log_from_barcode.lock().unwrap() = script;
    }

    /// How many requests reached the stub, across all endpoints
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Authorization header of the most recent request
    pub fn last_authorization(&self) -> Option<String> {
        self.last_authorization.lock().unwrap().clone()
    }

    fn record(&self, headers: &HeaderMap) {
        self.requests.fetch_add(1, Ordering::SeqCst);
        *self.last_authorization.lock().unwrap() = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(ToOwned::to_owned);
    }
}

/// Default photo-recognition body with precise macro values
pub fn recognized_product_body() -> Value {
    json!({
        "name": "Greek Yogurt",
        "description": "Plain strained yogurt",
        "estimated_calories_per_100g": 59.3,
        "estimated_proteins_per_100g": 10.19,
        "estimated_fats_per_100g": 0.66,
        "estimated_carbs_per_100g": 3.6,
        "brand": "Fage",
        "category": "Dairy",
        "confidence": "high"
    })
}

/// Default barcode-lookup product body
pub fn food_product_body() -> Value {
    json!({
        "id": "2c0f4bd6-5c33-4f6e-9d2a-7f1b8e4a6c01",
        "name": "Nutella",
        "calories": 539.0,
        "proteins": 6.3,
        "fats": 30.9,
        "carbs": 57.5,
        "brand": "Ferrero",
        "category": "Spreads",
        "barcode": "3017620422003",
        "source": "openfoodfacts"
    })
}

/// Default meal-log body with server-computed per-portion macros
pub fn nutrition_log_body() -> Value {
    json!({
        "id": "71c2a7e5-9b64-4f25-8a3e-2d5c1b9f4e02",
        "user_id": "8f4e2d5c-1b9f-4e02-a7e5-9b644f258a3e",
        "product_id": "2c0f4bd6-5c33-4f6e-9d2a-7f1b8e4a6c01",
        "weight_g": 150.0,
        "eaten_at": "2025-06-01T12:00:00Z",
        "meal_type": "lunch",
        "calories": 808.5,
        "proteins": 9.45,
        "fats": 46.35,
        "carbs": 86.25,
        "product_name": "Nutella"
    })
}

async fn drain_multipart(multipart: &mut Multipart) -> usize {
    let mut total = 0;
    while let Ok(Some(field)) = multipart.next_field().await {
        if let Ok(bytes) = field.bytes().await {
            total += bytes.len();
        }
    }
    total
}

async fn scan_handler(
    State(stub): State<Arc<StubBackend>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> (StatusCode, Json<Value>) {
    stub.record(&headers);
    drain_multipart(&mut multipart).await;
    stub.scan.lock().unwrap().clone().into_response()
}

async fn recognize_handler(
    State(stub): State<Arc<StubBackend>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> (StatusCode, Json<Value>) {
    stub.record(&headers);
    drain_multipart(&mut multipart).await;
    stub.recognize.lock().unwrap().clone().into_response()
}

async fn lookup_handler(
    State(stub): State<Arc<StubBackend>>,
    headers: HeaderMap,
    Json(_body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    stub.record(&headers);
    stub.lookup.lock().unwrap().clone().into_response()
}

async fn log_from_barcode_handler(
    State(stub): State<Arc<StubBackend>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    stub.record(&headers);
    let script = stub.log_from_barcode.lock().unwrap().clone();
    match script {
        // Echo the requested weight back the way the backend does
        Script::Ok(mut value) => {
            if let Some(weight) = body.get("weight_g") {
                value["weight_g"] = weight.clone();
            }
            (StatusCode::CREATED, Json(value))
        }
        other => other.into_response(),
    }
}

/// Serve the stub on an ephemeral loopback port
pub async fn spawn_stub(stub: Arc<StubBackend>) -> SocketAddr {
    let app = Router::new()
        .route("/nutrition/scan-barcode-image", post(scan_handler))
        .route("/nutrition/recognize-product-image", post(recognize_handler))
        .route("/nutrition/lookup-barcode", post(lookup_handler))
        .route("/nutrition/logs/from-barcode", post(log_from_barcode_handler))
        .layer(DefaultBodyLimit::max(32 * 1024 * 1024))
        .with_state(stub);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// API context pointing at the stub, with a fixed test token
pub fn test_context(addr: SocketAddr) -> ApiContext {
    ApiContext::with_static_token(&format!("http://{addr}"), "test-token").unwrap()
}

/// Events observed by the embedding application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// `on_scan` fired with this barcode
    Scanned(String),
    /// `on_recognize` fired with this product name
    Recognized(String),
    /// `on_close` fired
    Closed,
}

/// Recording implementation of the capture callbacks
///
/// Clone one handle into the flow and keep the original for assertions;
/// both share the same buffers.
#[derive(Clone, Default)]
pub struct EventRecorder {
    events: Arc<Mutex<Vec<Event>>>,
    drafts: Arc<Mutex<Vec<RecognizedProductDraft>>>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn drafts(&self) -> Vec<RecognizedProductDraft> {
        self.drafts.lock().unwrap().clone()
    }
}

impl CaptureEvents for EventRecorder {
    fn on_scan(&mut self, barcode: Barcode) {
        self.events
            .lock()
            .unwrap()
            .push(Event::Scanned(barcode.to_string()));
    }

    fn on_recognize(&mut self, draft: RecognizedProductDraft) {
        self.events
            .lock()
            .unwrap()
            .push(Event::Recognized(draft.name.clone()));
        self.drafts.lock().unwrap().push(draft);
    }

    fn on_close(&mut self) {
        self.events.lock().unwrap().push(Event::Closed);
    }
}
