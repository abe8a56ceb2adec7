//! Shared state for HTTP handlers.

use std::sync::Arc;

use crate::pipeline::Pipeline;

/// Handler state: the assembled request pipeline.
///
/// Built once at startup from explicitly constructed collaborators and shared
/// read-only across workers.
pub struct HttpState {
    pipeline: Arc<Pipeline>,
}

impl HttpState {
    /// Wrap the assembled pipeline.
    pub fn new(pipeline: Arc<Pipeline>) -> Self {
        Self { pipeline }
    }

    /// The request pipeline.
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }
}
