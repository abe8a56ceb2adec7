//! Treeline gateway binary entry point.

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use url::Url;

use treeline_backend::server::{self, ServerConfig};

/// Command-line arguments for the gateway.
#[derive(Debug, Parser)]
#[command(name = "treeline-backend", about = "Tree-species classification gateway")]
struct Args {
    /// Socket address to listen on.
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
    bind_addr: SocketAddr,

    /// Endpoint of the inference provider.
    #[arg(long, env = "INFERENCE_URL")]
    inference_url: Url,

    /// Timeout for inference calls, in seconds.
    #[arg(long, env = "INFERENCE_TIMEOUT_SECS", default_value_t = 30)]
    inference_timeout_secs: u64,

    /// PostgreSQL URL for the classification log. Omit to disable the log.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Origins permitted by the cross-origin allow-list.
    #[arg(long, env = "ALLOWED_ORIGINS", value_delimiter = ',')]
    allowed_origins: Vec<Url>,
}

impl Args {
    fn into_config(self) -> ServerConfig {
        let mut config = ServerConfig::new(self.bind_addr, self.inference_url)
            .with_inference_timeout(Duration::from_secs(self.inference_timeout_secs))
            .with_allowed_origins(self.allowed_origins);
        if let Some(url) = self.database_url {
            config = config.with_database_url(url);
        }
        config
    }
}

fn init_tracing() {
    if let Err(err) = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %err, "tracing subscriber already initialised");
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_tracing();

    let config = Args::parse().into_config();
    info!(addr = %config.bind_addr(), "starting gateway");
    server::run(config).await
}
