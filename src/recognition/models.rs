// ABOUTME: Wire-level response types for the nutrition backend's recognition endpoints
// ABOUTME: Shapes mirror the fixed REST contract; normalization happens in the client
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Response shapes of the recognition endpoints

use crate::models::Barcode;
use serde::Deserialize;

/// Raw response of the barcode-scan endpoint
///
/// An HTTP 200 carrying an empty or short `barcode` is not a successful
/// decode; the client validates before surfacing anything.
#[derive(Debug, Clone, Deserialize)]
pub struct BarcodeScanResponse {
    /// Decoded barcode value, possibly empty
    #[serde(default)]
    pub barcode: String,
    /// Symbology reported by the decoder (e.g. `EAN13`)
    #[serde(rename = "type", default)]
    pub symbology: Option<String>,
    /// Decoder quality metric, when provided
    #[serde(default)]
    pub quality: Option<i64>,
}

/// Raw response of the product-recognition endpoint
///
/// Every estimate is nullable; the recognizer reports what it could not
/// estimate as `null`, never as a fabricated number.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductRecognitionResponse {
    /// Recognized product name
    #[serde(default)]
    pub name: Option<String>,
    /// Free-text description from the recognizer
    #[serde(default)]
    pub description: Option<String>,
    /// Estimated calories per 100 g
    #[serde(default)]
    pub estimated_calories_per_100g: Option<f64>,
    /// Estimated protein grams per 100 g
    #[serde(default)]
    pub estimated_proteins_per_100g: Option<f64>,
    /// Estimated fat grams per 100 g
    #[serde(default)]
    pub estimated_fats_per_100g: Option<f64>,
    /// Estimated carbohydrate grams per 100 g
    #[serde(default)]
    pub estimated_carbs_per_100g: Option<f64>,
    /// Brand, when recognized
    #[serde(default)]
    pub brand: Option<String>,
    /// Category, when recognized
    #[serde(default)]
    pub category: Option<String>,
    /// Confidence label, verbatim
    #[serde(default)]
    pub confidence: Option<String>,
}

/// Error body the backend attaches to non-2xx responses
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    /// Human-readable failure detail
    #[serde(default)]
    pub detail: Option<String>,
}

/// Outcome of a successful barcode decode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedBarcode {
    /// The validated barcode
    pub barcode: Barcode,
    /// Symbology reported by the decoder, when known
    pub symbology: Option<String>,
}
