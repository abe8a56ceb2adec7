//! Reqwest-backed inference provider adapter.
//!
//! This adapter owns transport details only: payload encoding, timeout and
//! HTTP error mapping, and JSON decoding into label-confidence mappings.
//! Cancellation (caller abort, deadline) surfaces as an upstream-domain
//! failure like any other failed call.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};

use super::dto::{InferenceRequestDto, InferenceResponseDto};
use crate::domain::ports::InferenceProvider;
use crate::domain::{ImagePayload, LabelConfidences, UpstreamError};

/// Inference provider adapter performing HTTP POST requests against one
/// endpoint.
pub struct InferenceHttpProvider {
    client: Client,
    endpoint: Url,
}

impl InferenceHttpProvider {
    /// Build an adapter with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl InferenceProvider for InferenceHttpProvider {
    async fn classify(
        &self,
        images: &[ImagePayload],
    ) -> Result<Vec<LabelConfidences>, UpstreamError> {
        let body = InferenceRequestDto::from_images(images);
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, bytes.as_ref()));
        }

        decode_predictions(bytes.as_ref(), images.len())
    }
}

fn decode_predictions(
    body: &[u8],
    expected_count: usize,
) -> Result<Vec<LabelConfidences>, UpstreamError> {
    let decoded: InferenceResponseDto = serde_json::from_slice(body).map_err(|err| {
        UpstreamError::malformed(format!("invalid provider JSON payload: {err}"))
    })?;
    decoded.into_domain(expected_count)
}

fn map_transport_error(error: reqwest::Error) -> UpstreamError {
    if error.is_timeout() {
        UpstreamError::timeout(error.to_string())
    } else {
        UpstreamError::unreachable(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> UpstreamError {
    let preview = body_preview(body);
    let message = if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), preview)
    };

    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            UpstreamError::timeout(message)
        }
        _ => UpstreamError::status(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
