// ABOUTME: HTTP client for barcode decode, photo recognition, and meal-log creation
// ABOUTME: Classifies every failure into the contract's retry/fallback taxonomy
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Recognition client against the nutrition backend

use super::models::{ApiErrorBody, BarcodeScanResponse, DecodedBarcode, ProductRecognitionResponse};
use crate::constants::endpoints;
use crate::context::ApiContext;
use crate::errors::RecognitionError;
use crate::http;
use crate::models::{
    Barcode, BarcodeLogCreate, CapturedImage, FoodProduct, FoodProductCreate, NutritionLogCreate,
    NutritionLogEntry, ProductSource, RecognizedProductDraft,
};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, info, warn};

/// What a 404 means depends on who answered: an image endpoint saying 404
/// found nothing in the picture, a lookup endpoint saying 404 has no such
/// product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EndpointKind {
    ImageRecognition,
    ProductLookup,
}

/// Client for the nutrition backend's recognition and logging endpoints
///
/// Holds no authentication state of its own: the injected [`ApiContext`]
/// supplies the base URL and bearer token for every request.
#[derive(Debug, Clone)]
pub struct RecognitionClient {
    client: Client,
    context: ApiContext,
}

impl RecognitionClient {
    /// Build a client over the shared pooled HTTP client
    #[must_use]
    pub fn new(context: ApiContext) -> Self {
        Self {
            client: http::shared_client().clone(),
            context,
        }
    }

    /// Build a client over a custom HTTP client (custom timeouts, tests)
    #[must_use]
    pub fn with_client(client: Client, context: ApiContext) -> Self {
        Self { client, context }
    }

    /// Decode a barcode from a captured image
    ///
    /// The image is consumed; it is not retained after the attempt.
    ///
    /// # Errors
    ///
    /// `NotRecognized` when no (or a too-short) barcode comes back, even on
    /// HTTP 200, plus the shared classification for transport and status
    /// failures.
    pub async fn decode_barcode(
        &self,
        image: CapturedImage,
    ) -> Result<DecodedBarcode, RecognitionError> {
        let response = self.post_image(endpoints::SCAN_BARCODE_IMAGE, image).await?;
        let response = classify(response, EndpointKind::ImageRecognition).await?;
        let body: BarcodeScanResponse = read_json(response).await?;

        let barcode = Barcode::parse(&body.barcode)?;
        info!(barcode = %barcode, symbology = ?body.symbology, "Barcode decoded");
        Ok(DecodedBarcode {
            barcode,
            symbology: body.symbology,
        })
    }

    /// Recognize a food product from a captured photo
    ///
    /// Missing macro estimates stay `None` in the returned draft; present
    /// values are passed through untouched.
    ///
    /// # Errors
    ///
    /// `NotRecognized` when the recognizer returns no product name, plus the
    /// shared classification for transport and status failures.
    pub async fn recognize_product(
        &self,
        image: CapturedImage,
    ) -> Result<RecognizedProductDraft, RecognitionError> {
        let response = self
            .post_image(endpoints::RECOGNIZE_PRODUCT_IMAGE, image)
            .await?;
        let response = classify(response, EndpointKind::ImageRecognition).await?;
        let body: ProductRecognitionResponse = read_json(response).await?;

        let Some(name) = body
            .name
            .map(|n| n.trim().to_owned())
            .filter(|n| !n.is_empty())
        else {
            return Err(RecognitionError::NotRecognized(
                "recognizer returned no product name".into(),
            ));
        };

        info!(
            product = %name,
            confidence = ?body.confidence,
            "Product recognized from photo"
        );
        Ok(RecognizedProductDraft {
            name,
            calories_per_100g: body.estimated_calories_per_100g,
            proteins_per_100g: body.estimated_proteins_per_100g,
            fats_per_100g: body.estimated_fats_per_100g,
            carbs_per_100g: body.estimated_carbs_per_100g,
            brand: body.brand,
            category: body.category,
            barcode: None,
            description: body.description,
            confidence: body.confidence,
            source: ProductSource::AiRecognition,
        })
    }

    /// Resolve a validated barcode to a full product record
    ///
    /// # Errors
    ///
    /// `NotFound` when the product is absent from the backend's data, plus
    /// the shared classification for transport and status failures.
    pub async fn lookup_barcode(&self, barcode: &Barcode) -> Result<FoodProduct, RecognitionError> {
        let url = self.context.endpoint(endpoints::LOOKUP_BARCODE);
        let request = self.client.post(url).json(&json!({ "barcode": barcode.as_str() }));
        let response = classify(self.send(request).await?, EndpointKind::ProductLookup).await?;
        let product: FoodProduct = read_json(response).await?;
        info!(barcode = %barcode, product = %product.name, "Barcode resolved to product");
        Ok(product)
    }

    /// Validate a manually typed barcode and run the same product lookup
    ///
    /// This is the convergence point with the scan path: both go through
    /// [`Barcode::parse`] and then [`Self::lookup_barcode`].
    ///
    /// # Errors
    ///
    /// Validation failures surface before any request is made.
    pub async fn lookup_manual_entry(&self, raw: &str) -> Result<FoodProduct, RecognitionError> {
        let barcode = Barcode::parse(raw)?;
        debug!(barcode = %barcode, "Manual barcode entry validated");
        self.lookup_barcode(&barcode).await
    }

    /// Create a meal-log entry straight from a barcode
    ///
    /// # Errors
    ///
    /// Portion-weight validation failures surface before any request;
    /// `NotFound` when the barcode resolves to nothing.
    pub async fn create_log_from_barcode(
        &self,
        log: &BarcodeLogCreate,
    ) -> Result<NutritionLogEntry, RecognitionError> {
        log.validate()?;
        let url = self.context.endpoint(endpoints::LOGS_FROM_BARCODE);
        let response = classify(
            self.send(self.client.post(url).json(log)).await?,
            EndpointKind::ProductLookup,
        )
        .await?;
        let entry: NutritionLogEntry = read_json(response).await?;
        info!(entry = %entry.id, weight_g = entry.weight_g, "Meal logged from barcode");
        Ok(entry)
    }

    /// Create a meal-log entry for an already-known product
    ///
    /// # Errors
    ///
    /// Portion-weight validation failures surface before any request.
    pub async fn create_log(
        &self,
        log: &NutritionLogCreate,
    ) -> Result<NutritionLogEntry, RecognitionError> {
        log.validate()?;
        let url = self.context.endpoint(endpoints::LOGS);
        let response = classify(
            self.send(self.client.post(url).json(log)).await?,
            EndpointKind::ProductLookup,
        )
        .await?;
        let entry: NutritionLogEntry = read_json(response).await?;
        info!(entry = %entry.id, weight_g = entry.weight_g, "Meal logged");
        Ok(entry)
    }

    /// Persist a recognition draft as a product record
    ///
    /// # Errors
    ///
    /// Shared classification for transport and status failures.
    pub async fn create_product_from_recognition(
        &self,
        product: &FoodProductCreate,
    ) -> Result<FoodProduct, RecognitionError> {
        let url = self.context.endpoint(endpoints::PRODUCTS_FROM_RECOGNITION);
        let response = classify(
            self.send(self.client.post(url).json(product)).await?,
            EndpointKind::ProductLookup,
        )
        .await?;
        let created: FoodProduct = read_json(response).await?;
        info!(product = %created.name, id = %created.id, "Recognition draft persisted");
        Ok(created)
    }

    async fn post_image(
        &self,
        path: &str,
        image: CapturedImage,
    ) -> Result<Response, RecognitionError> {
        let url = self.context.endpoint(path);
        let file_name = image.file_name().to_owned();
        let content_type = image.content_type().to_owned();
        debug!(endpoint = path, bytes = image.len(), "Submitting image");

        let part = Part::stream(reqwest::Body::from(image.into_bytes()))
            .file_name(file_name)
            .mime_str(&content_type)
            .map_err(|e| RecognitionError::Malformed(format!("invalid content type: {e}")))?;
        let form = Form::new().part("file", part);

        self.send(self.client.post(url).multipart(form)).await
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, RecognitionError> {
        self.context.authorize(request).send().await.map_err(|e| {
            warn!(error = %e, "Recognition request failed in transit");
            RecognitionError::TransientServerError(e.to_string())
        })
    }
}

async fn classify(response: Response, kind: EndpointKind) -> Result<Response, RecognitionError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let detail = response
        .json::<ApiErrorBody>()
        .await
        .ok()
        .and_then(|body| body.detail)
        .unwrap_or_else(|| format!("HTTP {status}"));
    warn!(%status, detail, "Recognition request rejected");

    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RecognitionError::AuthRequired,
        StatusCode::NOT_FOUND => match kind {
            EndpointKind::ImageRecognition => RecognitionError::NotRecognized(detail),
            EndpointKind::ProductLookup => RecognitionError::NotFound(detail),
        },
        StatusCode::BAD_REQUEST
        | StatusCode::PAYLOAD_TOO_LARGE
        | StatusCode::UNSUPPORTED_MEDIA_TYPE
        | StatusCode::UNPROCESSABLE_ENTITY => RecognitionError::Malformed(detail),
        _ => RecognitionError::TransientServerError(detail),
    })
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, RecognitionError> {
    response
        .json()
        .await
        .map_err(|e| RecognitionError::TransientServerError(format!("invalid response body: {e}")))
}
