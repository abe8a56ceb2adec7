//! Server configuration object.

use std::net::SocketAddr;
use std::time::Duration;

use url::Url;

/// Builder-style configuration for creating the HTTP server.
///
/// Collaborator endpoints are explicit; nothing is resolved from ambient
/// state at request time.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) inference_endpoint: Url,
    pub(crate) inference_timeout: Duration,
    pub(crate) database_url: Option<String>,
    pub(crate) allowed_origins: Vec<Url>,
}

impl ServerConfig {
    /// Construct a configuration for the given bind address and provider
    /// endpoint.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, inference_endpoint: Url) -> Self {
        Self {
            bind_addr,
            inference_endpoint,
            inference_timeout: Duration::from_secs(30),
            database_url: None,
            allowed_origins: Vec::new(),
        }
    }

    /// Set the inference call timeout.
    #[must_use]
    pub fn with_inference_timeout(mut self, timeout: Duration) -> Self {
        self.inference_timeout = timeout;
        self
    }

    /// Attach a database URL for the classification log.
    ///
    /// Without one the gateway runs with the log disabled.
    #[must_use]
    pub fn with_database_url(mut self, database_url: impl Into<String>) -> Self {
        self.database_url = Some(database_url.into());
        self
    }

    /// Set the cross-origin allow-list.
    #[must_use]
    pub fn with_allowed_origins(mut self, origins: Vec<Url>) -> Self {
        self.allowed_origins = origins;
        self
    }

    /// The socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
