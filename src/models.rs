// ABOUTME: Core data models for the meal-capture pipeline
// ABOUTME: Captured images, barcodes, recognized product drafts, and meal-log records
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Capture Data Models
//!
//! The value types that move through the pipeline. `CapturedImage` is the
//! single normalized form of an image regardless of whether it came from the
//! camera or a file upload. `RecognizedProductDraft` is the one artifact that
//! outlives a capture session; it is handed to the meal-logging form and
//! never mutated by this crate afterwards.
//!
//! Unknown macro estimates are `None` end-to-end. Nothing in this crate
//! silently coerces a missing value to `0`; the only defaulting seam is
//! [`RecognizedProductDraft::to_product_create`], which requires an explicit
//! [`MacroFallback`] policy from the caller.

use crate::constants::limits;
use crate::errors::RecognitionError;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// An immutable still image ready for recognition
///
/// Raw bytes plus MIME type plus (when known) pixel dimensions. Produced by
/// the capture layer, consumed exactly once by the recognition client, then
/// discarded.
#[derive(Debug, Clone)]
pub struct CapturedImage {
    bytes: Bytes,
    content_type: String,
    file_name: String,
    dimensions: Option<(u32, u32)>,
}

impl CapturedImage {
    /// Build from a freshly encoded camera frame
    #[must_use]
    pub fn from_camera(jpeg_bytes: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            bytes: Bytes::from(jpeg_bytes),
            content_type: "image/jpeg".into(),
            file_name: crate::constants::capture::CAPTURE_FILE_NAME.into(),
            dimensions: Some((width, height)),
        }
    }

    /// Build from an already-validated file upload
    ///
    /// Dimensions are unknown here: uploads are validated without decoding.
    #[must_use]
    pub fn from_upload(file_name: &str, content_type: &str, data: Vec<u8>) -> Self {
        Self {
            bytes: Bytes::from(data),
            content_type: content_type.into(),
            file_name: file_name.into(),
            dimensions: None,
        }
    }

    /// Raw image bytes
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume the image, yielding its bytes for transmission
    #[must_use]
    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }

    /// MIME type of the payload (always `image/*`)
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// File name reported in multipart uploads
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Pixel dimensions, when the image came from the camera
    #[must_use]
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.dimensions
    }

    /// Payload size in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the payload is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// A validated product barcode
///
/// Both the scanned and the manually typed path go through [`Barcode::parse`],
/// so a string shorter than eight characters can never reach the lookup
/// endpoint from either side.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Barcode(String);

impl Barcode {
    /// Validate a raw barcode string from a scan or manual entry
    ///
    /// # Errors
    ///
    /// Returns `NotRecognized` for values shorter than eight characters
    /// (including empty responses from a technically successful scan) and
    /// `Malformed` for values longer than the backend accepts.
    pub fn parse(raw: &str) -> Result<Self, RecognitionError> {
        let trimmed = raw.trim();
        if trimmed.len() < limits::MIN_BARCODE_LEN {
            return Err(RecognitionError::NotRecognized(format!(
                "barcode {trimmed:?} is shorter than {} characters",
                limits::MIN_BARCODE_LEN
            )));
        }
        if trimmed.len() > limits::MAX_BARCODE_LEN {
            return Err(RecognitionError::Malformed(format!(
                "barcode exceeds {} characters",
                limits::MAX_BARCODE_LEN
            )));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// The validated barcode value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Barcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Type of meal a log entry belongs to
///
/// Closed set matching the backend's validation pattern exactly; free-form
/// meal strings are not representable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MealType {
    /// Breakfast meal
    Breakfast,
    /// Lunch meal
    Lunch,
    /// Dinner meal
    Dinner,
    /// Snack between meals
    Snack,
}

impl MealType {
    /// Parse a meal type from its wire representation
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "breakfast" => Some(Self::Breakfast),
            "lunch" => Some(Self::Lunch),
            "dinner" => Some(Self::Dinner),
            "snack" => Some(Self::Snack),
            _ => None,
        }
    }

    /// Wire representation of this meal type
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
            Self::Snack => "snack",
        }
    }
}

/// Where a product record came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ProductSource {
    /// Resolved from the Open Food Facts dataset via barcode lookup
    Openfoodfacts,
    /// Entered by an administrator
    Manual,
    /// Added by a regular user
    UserAdded,
    /// Estimated by photo recognition
    AiRecognition,
    /// Resolved through the barcode-lookup path
    BarcodeLookup,
}

/// Normalized recognition output handed to the meal-logging form
///
/// Macro fields are per 100 g. `None` means the recognizer gave no estimate;
/// the display layer decides how to render that (the convention is a dash,
/// never a fabricated zero).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecognizedProductDraft {
    /// Product name as recognized
    pub name: String,
    /// Estimated calories per 100 g
    pub calories_per_100g: Option<f64>,
    /// Estimated protein grams per 100 g
    pub proteins_per_100g: Option<f64>,
    /// Estimated fat grams per 100 g
    pub fats_per_100g: Option<f64>,
    /// Estimated carbohydrate grams per 100 g
    pub carbs_per_100g: Option<f64>,
    /// Brand, when recognized
    pub brand: Option<String>,
    /// Category, when recognized
    pub category: Option<String>,
    /// Barcode, when the draft came from a barcode path
    pub barcode: Option<Barcode>,
    /// Free-text description from the recognizer
    pub description: Option<String>,
    /// Recognizer confidence label, verbatim from the backend
    pub confidence: Option<String>,
    /// Which pipeline produced this draft
    pub source: ProductSource,
}

/// Policy for resolving missing macro estimates at the persistence seam
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacroFallback {
    /// Refuse to build a create request unless all four macros are present
    RequireComplete,
    /// Fill missing macros with zero, only ever at the caller's request
    ZeroFill,
}

impl RecognizedProductDraft {
    /// Convert the draft into a product-creation request
    ///
    /// Returns `None` under [`MacroFallback::RequireComplete`] when any macro
    /// estimate is missing. This is the only place in the crate where an
    /// unknown macro can become a `0`, and only under an explicit policy.
    #[must_use]
    pub fn to_product_create(&self, fallback: MacroFallback) -> Option<FoodProductCreate> {
        let resolve = |value: Option<f64>| match (value, fallback) {
            (Some(v), _) => Some(v),
            (None, MacroFallback::ZeroFill) => Some(0.0),
            (None, MacroFallback::RequireComplete) => None,
        };

        Some(FoodProductCreate {
            name: self.name.clone(),
            calories: resolve(self.calories_per_100g)?,
            proteins: resolve(self.proteins_per_100g)?,
            fats: resolve(self.fats_per_100g)?,
            carbs: resolve(self.carbs_per_100g)?,
            brand: self.brand.clone(),
            category: self.category.clone(),
            barcode: self.barcode.as_ref().map(|b| b.as_str().to_owned()),
            source: Some(self.source),
        })
    }
}

/// Product-creation request body (per-100 g values are required upstream)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoodProductCreate {
    /// Product name
    pub name: String,
    /// Calories per 100 g
    pub calories: f64,
    /// Protein grams per 100 g
    pub proteins: f64,
    /// Fat grams per 100 g
    pub fats: f64,
    /// Carbohydrate grams per 100 g
    pub carbs: f64,
    /// Brand, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    /// Category, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Barcode, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    /// Provenance tag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ProductSource>,
}

/// Full product record as returned by the barcode-lookup endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodProduct {
    /// Backend identifier
    pub id: Uuid,
    /// Product name
    pub name: String,
    /// Calories per 100 g
    pub calories: f64,
    /// Protein grams per 100 g
    pub proteins: f64,
    /// Fat grams per 100 g
    pub fats: f64,
    /// Carbohydrate grams per 100 g
    pub carbs: f64,
    /// Brand, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    /// Category, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Barcode, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    /// Provenance tag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ProductSource>,
}

impl FoodProduct {
    /// Reshape a looked-up product into the draft handed to the meal form
    ///
    /// Lookup results always carry full macros, so the draft's estimates are
    /// all `Some` on this path.
    #[must_use]
    pub fn into_draft(self) -> RecognizedProductDraft {
        RecognizedProductDraft {
            name: self.name,
            calories_per_100g: Some(self.calories),
            proteins_per_100g: Some(self.proteins),
            fats_per_100g: Some(self.fats),
            carbs_per_100g: Some(self.carbs),
            brand: self.brand,
            category: self.category,
            barcode: self.barcode.as_deref().and_then(|b| Barcode::parse(b).ok()),
            description: None,
            confidence: None,
            source: ProductSource::BarcodeLookup,
        }
    }
}

fn validate_portion_weight(weight_g: f64) -> Result<(), RecognitionError> {
    if !(limits::MIN_PORTION_WEIGHT_G..=limits::MAX_PORTION_WEIGHT_G).contains(&weight_g) {
        return Err(RecognitionError::Malformed(format!(
            "portion weight {weight_g} g is outside {}..={} g",
            limits::MIN_PORTION_WEIGHT_G,
            limits::MAX_PORTION_WEIGHT_G
        )));
    }
    Ok(())
}

/// Meal-log creation request from a known product
#[derive(Debug, Clone, Serialize)]
pub struct NutritionLogCreate {
    /// Product to log
    pub product_id: Uuid,
    /// Portion weight in grams
    pub weight_g: f64,
    /// When the meal was eaten; backend defaults to now when omitted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eaten_at: Option<DateTime<Utc>>,
    /// Meal slot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meal_type: Option<MealType>,
    /// Free-text note
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl NutritionLogCreate {
    /// Check the portion weight against the backend's documented range
    ///
    /// # Errors
    ///
    /// Returns `Malformed` when the weight is outside 1..=10000 g.
    pub fn validate(&self) -> Result<(), RecognitionError> {
        validate_portion_weight(self.weight_g)
    }
}

/// Meal-log creation request straight from a barcode
#[derive(Debug, Clone, Serialize)]
pub struct BarcodeLogCreate {
    /// Validated barcode identifying the product
    pub barcode: Barcode,
    /// Portion weight in grams
    pub weight_g: f64,
    /// When the meal was eaten; backend defaults to now when omitted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eaten_at: Option<DateTime<Utc>>,
    /// Meal slot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meal_type: Option<MealType>,
    /// Free-text note
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl BarcodeLogCreate {
    /// Check the portion weight against the backend's documented range
    ///
    /// # Errors
    ///
    /// Returns `Malformed` when the weight is outside 1..=10000 g.
    pub fn validate(&self) -> Result<(), RecognitionError> {
        validate_portion_weight(self.weight_g)
    }
}

/// Meal-log entry as returned by the backend, with per-portion macros
#[derive(Debug, Clone, Deserialize)]
pub struct NutritionLogEntry {
    /// Log entry identifier
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    /// Logged product
    pub product_id: Uuid,
    /// Portion weight in grams
    pub weight_g: f64,
    /// When the meal was eaten
    pub eaten_at: DateTime<Utc>,
    /// Meal slot
    #[serde(default)]
    pub meal_type: Option<MealType>,
    /// Free-text note
    #[serde(default)]
    pub notes: Option<String>,
    /// Calories for this portion, computed server-side
    #[serde(default)]
    pub calories: Option<f64>,
    /// Protein grams for this portion
    #[serde(default)]
    pub proteins: Option<f64>,
    /// Fat grams for this portion
    #[serde(default)]
    pub fats: Option<f64>,
    /// Carbohydrate grams for this portion
    #[serde(default)]
    pub carbs: Option<f64>,
    /// Product name echoed for display
    #[serde(default)]
    pub product_name: Option<String>,
}
