//! Ports for the gateway's two external collaborators.
//!
//! The orchestrator only sees these traits; concrete adapters live in
//! `outbound`. Both collaborators are specified purely by their call
//! contract: submit work, receive a result, or fail with their domain error.

use async_trait::async_trait;
use tracing::debug;

use super::classification::{ImagePayload, LabelConfidences, NewClassificationRecord};
use super::error::{DatabaseError, UpstreamError};

/// Inference provider accepting one or more images and returning ordered
/// label-to-confidence mappings, one per submitted image.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InferenceProvider: Send + Sync {
    /// Classify the given batch of images.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError`] when the provider is unreachable, times out,
    /// rejects the call, or answers with an unusable payload.
    async fn classify(&self, images: &[ImagePayload]) -> Result<Vec<LabelConfidences>, UpstreamError>;
}

/// Persistence port recording one classification request per call.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClassificationLogRepository: Send + Sync {
    /// Persist a request/result record.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError`] when the record cannot be written.
    async fn record(&self, record: NewClassificationRecord) -> Result<(), DatabaseError>;
}

/// Repository that records nothing, used when the gateway runs without a
/// database (local development and tests).
pub struct NoOpClassificationLog;

#[async_trait]
impl ClassificationLogRepository for NoOpClassificationLog {
    async fn record(&self, record: NewClassificationRecord) -> Result<(), DatabaseError> {
        debug!(
            correlation_id = %record.correlation_id,
            image_count = record.image_count,
            "classification log disabled; dropping record"
        );
        Ok(())
    }
}
