//! Wire contracts shared by the pipeline and the HTTP adapter.

pub mod response;

pub use response::{ErrorEnvelope, ErrorKind, GatewayReply, ResponseModel};
