//! Transport-agnostic core: failure taxonomy, classification types, the
//! orchestrator service, and ports for the two external collaborators.

pub mod classification;
pub mod error;
pub mod ports;

pub use classification::{
    ClassificationService, ClassifyCommand, ImagePayload, LabelConfidences,
    NewClassificationRecord,
};
pub use error::{DatabaseError, Failure, UpstreamError};
