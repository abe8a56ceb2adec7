//! Error translation stages.
//!
//! Each translator owns exactly one failure domain. It forwards the request,
//! intercepts failures carrying its tag, logs the full detail server-side,
//! and converts them into the sanitised envelope. Failures outside its
//! domain are re-raised unchanged for an enclosing translator.
//!
//! The unknown translator is the innermost guard: it converts unclassified
//! failures and re-raises tagged domain failures outward, so no failure
//! reaches the transport layer untranslated.

use async_trait::async_trait;
use tracing::error;

use super::{Next, PipelineStage, RequestContext};
use crate::domain::{ClassifyCommand, Failure};
use crate::models::{ErrorEnvelope, ErrorKind, GatewayReply};

/// Client-facing message for persistence failures.
const DATABASE_MESSAGE: &str = "The persistence layer is currently unavailable";
/// Client-facing message for inference-provider failures.
const UPSTREAM_MESSAGE: &str = "The classification service did not return a usable result";
/// Client-facing message for everything else.
const UNKNOWN_MESSAGE: &str = "An unexpected error occurred";

/// Intercepts persistence-domain failures.
pub struct DatabaseErrorTranslator;

#[async_trait]
impl PipelineStage for DatabaseErrorTranslator {
    async fn handle(
        &self,
        command: ClassifyCommand,
        ctx: &RequestContext,
        next: Next<'_>,
    ) -> Result<GatewayReply, Failure> {
        match next.run(command, ctx).await {
            Err(Failure::Database(err)) => {
                error!(
                    correlation_id = %ctx.correlation_id(),
                    error = %err,
                    "database failure intercepted"
                );
                Ok(GatewayReply::Error(ErrorEnvelope::new(
                    ErrorKind::DatabaseError,
                    DATABASE_MESSAGE,
                    ctx.correlation_id(),
                )))
            }
            other => other,
        }
    }
}

/// Intercepts upstream-domain (inference provider) failures.
pub struct UpstreamErrorTranslator;

#[async_trait]
impl PipelineStage for UpstreamErrorTranslator {
    async fn handle(
        &self,
        command: ClassifyCommand,
        ctx: &RequestContext,
        next: Next<'_>,
    ) -> Result<GatewayReply, Failure> {
        match next.run(command, ctx).await {
            Err(Failure::Upstream(err)) => {
                error!(
                    correlation_id = %ctx.correlation_id(),
                    error = %err,
                    "upstream failure intercepted"
                );
                Ok(GatewayReply::Error(ErrorEnvelope::new(
                    ErrorKind::UpstreamError,
                    UPSTREAM_MESSAGE,
                    ctx.correlation_id(),
                )))
            }
            other => other,
        }
    }
}

/// Terminal safety net for unclassified failures.
///
/// Tagged domain failures pass through outward to their owning translator.
pub struct UnknownErrorTranslator;

#[async_trait]
impl PipelineStage for UnknownErrorTranslator {
    async fn handle(
        &self,
        command: ClassifyCommand,
        ctx: &RequestContext,
        next: Next<'_>,
    ) -> Result<GatewayReply, Failure> {
        match next.run(command, ctx).await {
            Err(Failure::Unknown(detail)) => {
                error!(
                    correlation_id = %ctx.correlation_id(),
                    error = %detail,
                    "unclassified failure intercepted"
                );
                Ok(GatewayReply::Error(ErrorEnvelope::new(
                    ErrorKind::UnknownError,
                    UNKNOWN_MESSAGE,
                    ctx.correlation_id(),
                )))
            }
            other => other,
        }
    }
}
