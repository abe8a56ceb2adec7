//! OpenAPI documentation configuration.
//!
//! Generates the document served to Swagger UI in debug builds.

use utoipa::OpenApi;

use crate::inbound::http::classify::ClassifyRequest;
use crate::models::{ErrorEnvelope, ErrorKind, ResponseModel};

/// OpenAPI document for the gateway API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Treeline gateway API",
        description = "HTTP gateway for tree-species image classification."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::classify::classify,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(ClassifyRequest, ResponseModel, ErrorEnvelope, ErrorKind)),
    tags(
        (name = "classification", description = "Image classification"),
        (name = "health", description = "Probes")
    )
)]
pub struct ApiDoc;
