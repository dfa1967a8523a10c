// ABOUTME: Recognition layer talking to the nutrition backend's fixed REST contract
// ABOUTME: Barcode decode, photo recognition, barcode lookup, and meal-log creation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Recognition Client
//!
//! The network half of the pipeline. Two image operations share one shape
//! (submit a multipart payload, classify the outcome), plus the JSON calls
//! the recognized result feeds into. The error classification
//! (`NotFound` / `NotRecognized` / `TransientServerError` / `Malformed`) is
//! part of the contract, not a presentation afterthought.

pub mod client;
pub mod models;

pub use client::RecognitionClient;
pub use models::DecodedBarcode;
