//! Server construction and wiring.
//!
//! The chain and the orchestrator take their collaborators as constructor
//! arguments; assembly happens once here, before the worker factories start.

mod config;

pub use config::ServerConfig;

use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use tracing::warn;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use crate::domain::ports::{ClassificationLogRepository, NoOpClassificationLog};
use crate::domain::ClassificationService;
#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::inbound::http::{classify::classify, live, ready, HealthState, HttpState};
use crate::middleware::{AllowedOrigins, Correlation, Cors};
use crate::outbound::inference::InferenceHttpProvider;
use crate::outbound::persistence::{DbPool, DieselClassificationLog, PoolConfig};
use crate::pipeline::Pipeline;

/// Build the classification log from configuration.
///
/// Uses the database-backed repository when a URL is configured and a no-op
/// log otherwise.
async fn build_classification_log(
    config: &ServerConfig,
) -> std::io::Result<Arc<dyn ClassificationLogRepository>> {
    match &config.database_url {
        Some(url) => {
            let pool = DbPool::new(PoolConfig::new(url.clone()))
                .await
                .map_err(|err| std::io::Error::other(format!("pool construction failed: {err}")))?;
            Ok(Arc::new(DieselClassificationLog::new(pool)))
        }
        None => {
            warn!("no database configured; classification log disabled");
            Ok(Arc::new(NoOpClassificationLog))
        }
    }
}

/// Assemble the pipeline and run the HTTP server until shutdown.
///
/// # Errors
///
/// Returns an error when a collaborator cannot be constructed or the listen
/// address cannot be bound.
pub async fn run(config: ServerConfig) -> std::io::Result<()> {
    let provider = InferenceHttpProvider::new(
        config.inference_endpoint.clone(),
        config.inference_timeout,
    )
    .map_err(|err| std::io::Error::other(format!("inference client construction failed: {err}")))?;
    let log = build_classification_log(&config).await?;

    let service = ClassificationService::new(Arc::new(provider), log);
    let pipeline = Arc::new(Pipeline::standard(Arc::new(service)));

    let http_state = web::Data::new(HttpState::new(pipeline));
    let health_state = web::Data::new(HealthState::new());
    let allowed_origins = AllowedOrigins::new(config.allowed_origins.clone());

    // Clone for the server factory so the readiness flip below still sees it.
    let factory_health_state = health_state.clone();
    let server = HttpServer::new(move || {
        let app = App::new()
            .app_data(http_state.clone())
            .app_data(factory_health_state.clone())
            .wrap(Cors::new(allowed_origins.clone()))
            .wrap(Correlation)
            .service(classify)
            .service(ready)
            .service(live);

        #[cfg(debug_assertions)]
        let app =
            app.service(SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()));

        app
    })
    .bind(config.bind_addr)?;

    health_state.mark_ready();
    server.run().await
}
