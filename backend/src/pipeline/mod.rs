//! The request-processing pipeline.
//!
//! A pipeline is an ordered chain of stages composed once at startup by
//! explicit wrapping. Each stage implements a single capability,
//! `handle(command, ctx, next)`, and either forwards the call to the next
//! stage or intercepts a tagged [`Failure`] raised by an inner stage and
//! converts it into the uniform error envelope. The terminal handler at the
//! centre of the chain is the classification orchestrator.
//!
//! Fixed order, outermost first: timing, database translator, upstream
//! translator, unknown translator (the terminal safety net), orchestrator.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::error;

use crate::domain::{ClassifyCommand, Failure};
use crate::middleware::correlation::CorrelationId;
use crate::models::{ErrorEnvelope, ErrorKind, GatewayReply};

pub mod timing;
pub mod translate;

pub use timing::TimingStage;
pub use translate::{DatabaseErrorTranslator, UnknownErrorTranslator, UpstreamErrorTranslator};

/// Request-scoped context threaded through every stage and collaborator call.
///
/// Created at request entry, discarded at completion, never shared across
/// requests.
#[derive(Debug, Clone)]
pub struct RequestContext {
    correlation_id: CorrelationId,
    started: Instant,
}

impl RequestContext {
    /// Open a context for a request entering the pipeline now.
    pub fn new(correlation_id: CorrelationId) -> Self {
        Self {
            correlation_id,
            started: Instant::now(),
        }
    }

    /// The request's correlation identifier.
    pub fn correlation_id(&self) -> CorrelationId {
        self.correlation_id
    }

    /// Instant at which the request entered the pipeline.
    pub fn started(&self) -> Instant {
        self.started
    }
}

/// One stage of the chain.
///
/// A stage invokes `next` to forward the request inward; a tagged failure
/// returned by `next` may be intercepted and converted into an error reply,
/// or re-raised unchanged for an enclosing stage.
#[async_trait]
pub trait PipelineStage: Send + Sync {
    /// Handle the request, forwarding through `next`.
    ///
    /// # Errors
    ///
    /// Returns the re-raised [`Failure`] when the stage does not own the
    /// failure's domain.
    async fn handle(
        &self,
        command: ClassifyCommand,
        ctx: &RequestContext,
        next: Next<'_>,
    ) -> Result<GatewayReply, Failure>;
}

/// The innermost handler the chain wraps: the classification orchestrator.
#[async_trait]
pub trait TerminalHandler: Send + Sync {
    /// Produce a reply for the request, raising tagged failures.
    ///
    /// # Errors
    ///
    /// Returns a tagged [`Failure`] for the translators to intercept.
    async fn call(
        &self,
        command: ClassifyCommand,
        ctx: &RequestContext,
    ) -> Result<GatewayReply, Failure>;
}

/// Handle to the remainder of the chain, passed into each stage.
pub struct Next<'a> {
    stages: &'a [Arc<dyn PipelineStage>],
    terminal: &'a dyn TerminalHandler,
}

impl Next<'_> {
    /// Forward the request to the next stage, or to the terminal handler when
    /// no stages remain.
    ///
    /// # Errors
    ///
    /// Propagates whatever failure the inner stages raise.
    pub async fn run(
        self,
        command: ClassifyCommand,
        ctx: &RequestContext,
    ) -> Result<GatewayReply, Failure> {
        match self.stages.split_first() {
            Some((head, rest)) => {
                let next = Next {
                    stages: rest,
                    terminal: self.terminal,
                };
                head.handle(command, ctx, next).await
            }
            None => self.terminal.call(command, ctx).await,
        }
    }
}

/// The assembled chain: an ordered stage list around a terminal handler.
pub struct Pipeline {
    stages: Vec<Arc<dyn PipelineStage>>,
    terminal: Arc<dyn TerminalHandler>,
}

impl Pipeline {
    /// Compose a pipeline from an explicit stage list.
    ///
    /// Stages run in list order, first entry outermost.
    pub fn new(stages: Vec<Arc<dyn PipelineStage>>, terminal: Arc<dyn TerminalHandler>) -> Self {
        Self { stages, terminal }
    }

    /// The production chain: timing outermost, then one translator per
    /// failure domain with the catch-all immediately around the terminal.
    pub fn standard(terminal: Arc<dyn TerminalHandler>) -> Self {
        Self::new(
            vec![
                Arc::new(TimingStage),
                Arc::new(DatabaseErrorTranslator),
                Arc::new(UpstreamErrorTranslator),
                Arc::new(UnknownErrorTranslator),
            ],
            terminal,
        )
    }

    /// Run one request through the chain.
    ///
    /// Every request passes through exactly once and terminates in either a
    /// success reply or a reported envelope; a failure value escaping the
    /// translators is a chain misconfiguration and is reported as an unknown
    /// error rather than propagated to the transport layer.
    pub async fn dispatch(&self, command: ClassifyCommand, ctx: &RequestContext) -> GatewayReply {
        let next = Next {
            stages: &self.stages,
            terminal: &*self.terminal,
        };
        match next.run(command, ctx).await {
            Ok(reply) => reply,
            Err(failure) => {
                error!(
                    correlation_id = %ctx.correlation_id(),
                    error = %failure,
                    "failure escaped the translation chain"
                );
                GatewayReply::Error(ErrorEnvelope::new(
                    ErrorKind::UnknownError,
                    "An unexpected error occurred",
                    ctx.correlation_id(),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DatabaseError, ImagePayload, LabelConfidences, UpstreamError};
    use crate::models::ResponseModel;
    use std::sync::Mutex;

    pub(crate) fn command() -> ClassifyCommand {
        ClassifyCommand {
            images: vec![ImagePayload::new(vec![0xAB])],
        }
    }

    pub(crate) fn context() -> RequestContext {
        RequestContext::new(CorrelationId::generate())
    }

    pub(crate) struct StubTerminal {
        outcome: fn() -> Result<GatewayReply, Failure>,
    }

    impl StubTerminal {
        pub(crate) fn new(outcome: fn() -> Result<GatewayReply, Failure>) -> Self {
            Self { outcome }
        }

        pub(crate) fn succeeding() -> Self {
            Self::new(Self::succeeding_outcome)
        }

        pub(crate) fn succeeding_outcome() -> Result<GatewayReply, Failure> {
            Ok(GatewayReply::Success(ResponseModel::success(vec![
                LabelConfidences::from([("oak".to_owned(), 0.92_f32)]),
            ])))
        }
    }

    #[async_trait]
    impl TerminalHandler for StubTerminal {
        async fn call(
            &self,
            _command: ClassifyCommand,
            _ctx: &RequestContext,
        ) -> Result<GatewayReply, Failure> {
            (self.outcome)()
        }
    }

    struct RecordingStage {
        name: &'static str,
        order: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl PipelineStage for RecordingStage {
        async fn handle(
            &self,
            command: ClassifyCommand,
            ctx: &RequestContext,
            next: Next<'_>,
        ) -> Result<GatewayReply, Failure> {
            self.order.lock().expect("order lock").push(self.name);
            next.run(command, ctx).await
        }
    }

    #[tokio::test]
    async fn stages_run_in_registration_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let stage = |name| {
            Arc::new(RecordingStage {
                name,
                order: order.clone(),
            }) as Arc<dyn PipelineStage>
        };
        let pipeline = Pipeline::new(
            vec![stage("outer"), stage("middle"), stage("inner")],
            Arc::new(StubTerminal::succeeding()),
        );

        let reply = pipeline.dispatch(command(), &context()).await;

        assert!(matches!(reply, GatewayReply::Success(_)));
        assert_eq!(
            *order.lock().expect("order lock"),
            vec!["outer", "middle", "inner"]
        );
    }

    #[tokio::test]
    async fn standard_chain_reports_database_failures() {
        let pipeline = Pipeline::standard(Arc::new(StubTerminal::new(|| {
            Err(DatabaseError::unavailable("connection refused").into())
        })));

        let reply = pipeline.dispatch(command(), &context()).await;

        let GatewayReply::Error(envelope) = reply else {
            panic!("expected an error reply");
        };
        assert_eq!(envelope.kind(), ErrorKind::DatabaseError);
    }

    #[tokio::test]
    async fn standard_chain_reports_upstream_failures() {
        let pipeline = Pipeline::standard(Arc::new(StubTerminal::new(|| {
            Err(UpstreamError::timeout("deadline elapsed").into())
        })));

        let reply = pipeline.dispatch(command(), &context()).await;

        let GatewayReply::Error(envelope) = reply else {
            panic!("expected an error reply");
        };
        assert_eq!(envelope.kind(), ErrorKind::UpstreamError);
    }

    #[tokio::test]
    async fn standard_chain_reports_unclassified_failures() {
        let pipeline = Pipeline::standard(Arc::new(StubTerminal::new(|| {
            Err(Failure::unknown("slice index out of range"))
        })));

        let reply = pipeline.dispatch(command(), &context()).await;

        let GatewayReply::Error(envelope) = reply else {
            panic!("expected an error reply");
        };
        assert_eq!(envelope.kind(), ErrorKind::UnknownError);
        assert!(
            !envelope.message().contains("slice index"),
            "internal detail must not leak to the client"
        );
    }

    #[tokio::test]
    async fn envelope_carries_the_request_correlation_id() {
        let pipeline = Pipeline::standard(Arc::new(StubTerminal::new(|| {
            Err(DatabaseError::timeout("connection timeout").into())
        })));
        let ctx = context();

        let reply = pipeline.dispatch(command(), &ctx).await;

        let GatewayReply::Error(envelope) = reply else {
            panic!("expected an error reply");
        };
        assert_eq!(envelope.correlation_id(), ctx.correlation_id().to_string());
    }

    #[tokio::test]
    async fn dispatch_never_leaks_a_failure_value() {
        // An empty chain around a failing terminal simulates a
        // misconfigured pipeline with no translators at all.
        let pipeline = Pipeline::new(
            Vec::new(),
            Arc::new(StubTerminal::new(|| {
                Err(Failure::unknown("nothing intercepted this"))
            })),
        );

        let reply = pipeline.dispatch(command(), &context()).await;

        let GatewayReply::Error(envelope) = reply else {
            panic!("expected an error reply");
        };
        assert_eq!(envelope.kind(), ErrorKind::UnknownError);
    }
}
