//! Wire types for the inference provider call.

use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};

use crate::domain::{ImagePayload, LabelConfidences, UpstreamError};

/// Request body posted to the provider: base64-encoded images in submission
/// order.
#[derive(Debug, Serialize)]
pub struct InferenceRequestDto {
    pub images: Vec<String>,
}

impl InferenceRequestDto {
    /// Encode a batch of opaque image payloads for the wire.
    pub fn from_images(images: &[ImagePayload]) -> Self {
        Self {
            images: images
                .iter()
                .map(|image| general_purpose::STANDARD.encode(image.bytes()))
                .collect(),
        }
    }
}

/// Provider response: one label-confidence mapping per submitted image.
#[derive(Debug, Deserialize)]
pub struct InferenceResponseDto {
    pub predictions: Vec<LabelConfidences>,
}

impl InferenceResponseDto {
    /// Validate the decoded payload against the submitted batch.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::Malformed`] when the prediction count does
    /// not match the batch size or a confidence falls outside `[0.0, 1.0]`.
    pub fn into_domain(self, expected_count: usize) -> Result<Vec<LabelConfidences>, UpstreamError> {
        if self.predictions.len() != expected_count {
            return Err(UpstreamError::malformed(format!(
                "expected {expected_count} prediction sets, got {}",
                self.predictions.len()
            )));
        }
        for (index, mapping) in self.predictions.iter().enumerate() {
            for (label, confidence) in mapping {
                if !confidence.is_finite() || !(0.0..=1.0).contains(confidence) {
                    return Err(UpstreamError::malformed(format!(
                        "confidence {confidence} for label {label:?} in set {index} \
                         is outside [0.0, 1.0]"
                    )));
                }
            }
        }
        Ok(self.predictions)
    }
}
