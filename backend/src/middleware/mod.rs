//! Transport middleware: request correlation and the CORS allow-list.

pub mod correlation;
pub mod cors;

pub use correlation::{Correlation, CorrelationId, CORRELATION_ID_HEADER};
pub use cors::{AllowedOrigins, Cors};
