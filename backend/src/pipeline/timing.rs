//! Outermost stage recording elapsed handling time.

use async_trait::async_trait;
use tracing::info;

use super::{Next, PipelineStage, RequestContext};
use crate::domain::{ClassifyCommand, Failure};
use crate::models::GatewayReply;

/// Records the elapsed duration, measured from the context's start instant,
/// after the inner stages return, on every exit path.
///
/// The duration is attached to a successful payload as a diagnostic field and
/// logged with the correlation id; it never changes the content or status of
/// the reply, and timing itself never fails the request.
pub struct TimingStage;

#[async_trait]
impl PipelineStage for TimingStage {
    async fn handle(
        &self,
        command: ClassifyCommand,
        ctx: &RequestContext,
        next: Next<'_>,
    ) -> Result<GatewayReply, Failure> {
        let outcome = next.run(command, ctx).await;
        let elapsed = ctx.started().elapsed();
        let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

        match outcome {
            Ok(GatewayReply::Success(mut model)) => {
                model.set_taken(elapsed);
                info!(
                    correlation_id = %ctx.correlation_id(),
                    elapsed_ms,
                    image_count = model.data().len(),
                    "classification request succeeded"
                );
                Ok(GatewayReply::Success(model))
            }
            Ok(GatewayReply::Error(envelope)) => {
                info!(
                    correlation_id = %ctx.correlation_id(),
                    elapsed_ms,
                    kind = ?envelope.kind(),
                    "classification request reported an error"
                );
                Ok(GatewayReply::Error(envelope))
            }
            Err(failure) => {
                // Should not happen with the standard chain; still timed.
                info!(
                    correlation_id = %ctx.correlation_id(),
                    elapsed_ms,
                    error = %failure,
                    "classification request failed untranslated"
                );
                Err(failure)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ErrorEnvelope, ErrorKind};
    use crate::pipeline::tests::{command, context, StubTerminal};
    use crate::pipeline::Pipeline;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn attaches_duration_to_successful_replies() {
        let pipeline = Pipeline::new(
            vec![Arc::new(TimingStage)],
            Arc::new(StubTerminal::succeeding()),
        );

        let reply = pipeline.dispatch(command(), &context()).await;

        let GatewayReply::Success(model) = reply else {
            panic!("expected a success reply");
        };
        assert!(model.is_ok());
        assert!(model.taken() >= Duration::ZERO);
    }

    #[tokio::test]
    async fn measures_from_context_entry() {
        let pipeline = Pipeline::new(
            vec![Arc::new(TimingStage)],
            Arc::new(StubTerminal::succeeding()),
        );
        let ctx = context();
        tokio::time::sleep(Duration::from_millis(20)).await;

        let reply = pipeline.dispatch(command(), &ctx).await;

        let GatewayReply::Success(model) = reply else {
            panic!("expected a success reply");
        };
        // The context was opened before the sleep, so the recorded duration
        // must include it.
        assert!(model.taken() >= Duration::from_millis(20));
    }

    #[tokio::test]
    async fn passes_error_replies_through_unchanged() {
        let ctx = context();
        let envelope = ErrorEnvelope::new(
            ErrorKind::UpstreamError,
            "The inference provider is unavailable",
            ctx.correlation_id(),
        );
        let expected = envelope.clone();
        let terminal = StubTerminal::succeeding();

        struct ErrorStage(ErrorEnvelope);

        #[async_trait]
        impl PipelineStage for ErrorStage {
            async fn handle(
                &self,
                _command: ClassifyCommand,
                _ctx: &RequestContext,
                _next: Next<'_>,
            ) -> Result<GatewayReply, Failure> {
                Ok(GatewayReply::Error(self.0.clone()))
            }
        }

        let pipeline = Pipeline::new(
            vec![Arc::new(TimingStage), Arc::new(ErrorStage(envelope))],
            Arc::new(terminal),
        );

        let reply = pipeline.dispatch(command(), &ctx).await;

        assert_eq!(reply, GatewayReply::Error(expected));
    }

    #[tokio::test]
    async fn re_raises_untranslated_failures_after_timing() {
        // Timing alone, no translators: the failure must come back out so an
        // enclosing guard can handle it, not be swallowed by timing.
        let pipeline = Pipeline::new(
            vec![Arc::new(TimingStage)],
            Arc::new(StubTerminal::new(|| Err(Failure::unknown("boom")))),
        );

        let reply = pipeline.dispatch(command(), &context()).await;

        let GatewayReply::Error(envelope) = reply else {
            panic!("expected the dispatch guard to report an envelope");
        };
        assert_eq!(envelope.kind(), ErrorKind::UnknownError);
    }
}
