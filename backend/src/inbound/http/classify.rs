//! Classification endpoint.
//!
//! Decodes the inbound batch, opens the request context, and hands the
//! command to the pipeline. Transport validation (empty batch, undecodable
//! base64) is rejected here with a 400 before the pipeline runs; everything
//! past this point speaks the uniform success/error contract.

use actix_web::{post, web, HttpResponse};
use base64::{engine::general_purpose, Engine as _};
use serde::Deserialize;
use tracing::warn;
use utoipa::ToSchema;

use super::state::HttpState;
use crate::domain::{ClassifyCommand, ImagePayload};
use crate::middleware::correlation::CorrelationId;
use crate::models::GatewayReply;
use crate::pipeline::RequestContext;

/// Inbound classification request: a batch of base64-encoded images.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ClassifyRequest {
    /// Base64-encoded image payloads, in submission order. At least one.
    #[schema(example = json!(["iVBORw0KGgo="]))]
    pub images: Vec<String>,
}

/// Transport-level request rejections.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ClassifyRequestError {
    /// The batch was empty.
    #[error("at least one image is required")]
    EmptyBatch,
    /// An entry was not valid base64.
    #[error("image {index} is not valid base64")]
    InvalidImage {
        /// Zero-based position of the offending entry.
        index: usize,
    },
}

impl ClassifyRequest {
    /// Decode the batch into the command the pipeline consumes.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifyRequestError`] when the batch is empty or an entry
    /// does not decode.
    pub fn into_command(self) -> Result<ClassifyCommand, ClassifyRequestError> {
        if self.images.is_empty() {
            return Err(ClassifyRequestError::EmptyBatch);
        }
        let images = self
            .images
            .into_iter()
            .enumerate()
            .map(|(index, encoded)| {
                general_purpose::STANDARD
                    .decode(encoded.as_bytes())
                    .map(ImagePayload::new)
                    .map_err(|_| ClassifyRequestError::InvalidImage { index })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ClassifyCommand { images })
    }
}

/// Classify a batch of images.
#[utoipa::path(
    post,
    path = "/api/v1/classify",
    request_body = ClassifyRequest,
    responses(
        (status = 200, description = "Classification result", body = crate::models::ResponseModel),
        (status = 400, description = "Malformed request"),
        (status = 502, description = "Inference provider failure", body = crate::models::ErrorEnvelope),
        (status = 503, description = "Persistence failure", body = crate::models::ErrorEnvelope),
        (status = 500, description = "Unclassified failure", body = crate::models::ErrorEnvelope)
    ),
    tags = ["classification"]
)]
#[post("/api/v1/classify")]
pub async fn classify(
    state: web::Data<HttpState>,
    payload: web::Json<ClassifyRequest>,
) -> HttpResponse {
    let command = match payload.into_inner().into_command() {
        Ok(command) => command,
        Err(err) => {
            warn!(error = %err, "rejected malformed classification request");
            return HttpResponse::BadRequest()
                .json(serde_json::json!({ "Message": err.to_string() }));
        }
    };

    let ctx = RequestContext::new(CorrelationId::current().unwrap_or_else(CorrelationId::generate));
    match state.pipeline().dispatch(command, &ctx).await {
        GatewayReply::Success(model) => HttpResponse::Ok().json(model),
        GatewayReply::Error(envelope) => {
            HttpResponse::build(envelope.kind().status_code()).json(envelope)
        }
    }
}
