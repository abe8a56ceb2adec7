//! Classification types and the orchestrator service.

use std::sync::Arc;

use async_trait::async_trait;
use std::collections::BTreeMap;
use tracing::debug;

use super::error::{Failure, UpstreamError};
use super::ports::{ClassificationLogRepository, InferenceProvider};
use crate::models::{GatewayReply, ResponseModel};
use crate::pipeline::{RequestContext, TerminalHandler};

/// Opaque binary image submitted for classification.
///
/// The gateway never interprets the bytes; encoding concerns stay at the
/// transport boundaries (base64 inbound, provider wire format outbound).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload(Vec<u8>);

impl ImagePayload {
    /// Wrap raw image bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Borrow the raw image bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for ImagePayload {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

/// Label-to-confidence mapping for a single image.
///
/// Keys are unique label strings; values lie in the closed interval
/// `[0.0, 1.0]`. The provider adapter enforces the range at decode time.
pub type LabelConfidences = BTreeMap<String, f32>;

/// The classification request as seen by the pipeline and orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifyCommand {
    /// Images to classify, in submission order. Always at least one.
    pub images: Vec<ImagePayload>,
}

/// Request metadata persisted through the classification log port.
#[derive(Debug, Clone, PartialEq)]
pub struct NewClassificationRecord {
    /// Correlation identifier of the request being recorded.
    pub correlation_id: String,
    /// Number of images submitted.
    pub image_count: i32,
    /// Serialized label-confidence mappings returned to the caller.
    pub predictions: serde_json::Value,
}

/// Orchestrator composing the inference provider and the classification log.
///
/// Collaborators are injected at construction; nothing is resolved from
/// ambient state.
pub struct ClassificationService {
    provider: Arc<dyn InferenceProvider>,
    log: Arc<dyn ClassificationLogRepository>,
}

impl ClassificationService {
    /// Create a service from its two collaborators.
    pub fn new(
        provider: Arc<dyn InferenceProvider>,
        log: Arc<dyn ClassificationLogRepository>,
    ) -> Self {
        Self { provider, log }
    }

    /// Classify a batch of images and record the request.
    ///
    /// Provider failures surface as [`Failure::Upstream`], persistence
    /// failures as [`Failure::Database`], and anything else (such as a
    /// serialization defect) as [`Failure::Unknown`].
    ///
    /// # Errors
    ///
    /// Returns the tagged [`Failure`] for the translation chain to intercept.
    pub async fn classify(
        &self,
        command: ClassifyCommand,
        ctx: &RequestContext,
    ) -> Result<ResponseModel, Failure> {
        let image_count = command.images.len();
        let predictions = self.provider.classify(&command.images).await?;

        // One mapping per submitted image, in submission order.
        if predictions.len() != image_count {
            return Err(UpstreamError::malformed(format!(
                "expected {image_count} prediction sets, provider returned {}",
                predictions.len()
            ))
            .into());
        }

        debug!(
            correlation_id = %ctx.correlation_id(),
            image_count,
            "classification obtained from provider"
        );

        let serialized = serde_json::to_value(&predictions)
            .map_err(|err| Failure::unknown(format!("predictions not serializable: {err}")))?;
        let record = NewClassificationRecord {
            correlation_id: ctx.correlation_id().to_string(),
            image_count: i32::try_from(image_count)
                .map_err(|err| Failure::unknown(format!("image count out of range: {err}")))?,
            predictions: serialized,
        };
        self.log.record(record).await?;

        Ok(ResponseModel::success(predictions))
    }
}

#[async_trait]
impl TerminalHandler for ClassificationService {
    async fn call(
        &self,
        command: ClassifyCommand,
        ctx: &RequestContext,
    ) -> Result<GatewayReply, Failure> {
        self.classify(command, ctx).await.map(GatewayReply::Success)
    }
}
