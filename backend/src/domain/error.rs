//! Domain failure taxonomy.
//!
//! Failures are tagged at their point of origin: the persistence adapter
//! raises [`DatabaseError`], the inference adapter raises [`UpstreamError`],
//! and everything else is folded into [`Failure::Unknown`]. The translation
//! chain matches on the tag, never on downcasting or string inspection.

/// Persistence-layer failures raised by the storage adapter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DatabaseError {
    /// The database is unreachable or no pooled connection could be obtained.
    #[error("database unavailable: {message}")]
    Unavailable { message: String },

    /// A query was executed and rejected by the database.
    #[error("database query failed: {message}")]
    Query { message: String },

    /// The database did not answer within the configured deadline.
    #[error("database call timed out: {message}")]
    Timeout { message: String },
}

impl DatabaseError {
    /// Create an unavailability error with the given message.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Create a query error with the given message.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Create a timeout error with the given message.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }
}

/// Inference-provider failures raised by the outbound HTTP adapter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpstreamError {
    /// The provider endpoint could not be reached.
    #[error("inference provider unreachable: {message}")]
    Unreachable { message: String },

    /// The provider did not answer within the configured deadline.
    #[error("inference call timed out: {message}")]
    Timeout { message: String },

    /// The provider answered with a non-success HTTP status.
    #[error("inference provider rejected the call: {message}")]
    Status { message: String },

    /// The provider answered with a payload the gateway cannot use.
    #[error("inference provider returned a malformed result: {message}")]
    Malformed { message: String },
}

impl UpstreamError {
    /// Create an unreachability error with the given message.
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::Unreachable {
            message: message.into(),
        }
    }

    /// Create a timeout error with the given message.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Create a status error with the given message.
    pub fn status(message: impl Into<String>) -> Self {
        Self::Status {
            message: message.into(),
        }
    }

    /// Create a malformed-result error with the given message.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }
}

/// In-flight request failure carried through the translation chain.
///
/// Each variant belongs to exactly one translator. A stage that does not own
/// the variant re-raises it unchanged so an enclosing stage can intercept it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Failure {
    /// Persistence-domain failure, intercepted by the database translator.
    #[error(transparent)]
    Database(#[from] DatabaseError),

    /// Upstream-domain failure, intercepted by the upstream translator.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// Anything not attributable to the two domains above.
    #[error("unclassified failure: {0}")]
    Unknown(String),
}

impl Failure {
    /// Tag an unclassified failure.
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::Unknown(message.into())
    }
}
