//! Treeline gateway library modules.
//!
//! An HTTP gateway fronting an image-classification inference provider: the
//! request pipeline, its failure-translation chain, and the wire contracts.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod models;
pub mod outbound;
pub mod pipeline;
pub mod server;

pub use middleware::Correlation;
