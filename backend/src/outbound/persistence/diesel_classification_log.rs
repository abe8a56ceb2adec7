//! PostgreSQL-backed `ClassificationLogRepository` implementation.
//!
//! All operations are async via `diesel-async`. Pool and Diesel failures are
//! mapped to the persistence-domain error so the translation chain can
//! intercept them.

use async_trait::async_trait;
use diesel_async::RunQueryDsl;
use tracing::debug;

use super::models::NewClassificationRow;
use super::pool::{DbPool, PoolError};
use super::schema::classification_requests;
use crate::domain::ports::ClassificationLogRepository;
use crate::domain::{DatabaseError, NewClassificationRecord};

/// Diesel-backed classification log.
#[derive(Clone)]
pub struct DieselClassificationLog {
    pool: DbPool,
}

impl DieselClassificationLog {
    /// Create a repository over the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> DatabaseError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            DatabaseError::unavailable(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> DatabaseError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            DatabaseError::unavailable("database connection error")
        }
        _ => DatabaseError::query("database error"),
    }
}

#[async_trait]
impl ClassificationLogRepository for DieselClassificationLog {
    async fn record(&self, record: NewClassificationRecord) -> Result<(), DatabaseError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewClassificationRow::from(record);
        diesel::insert_into(classification_requests::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }
}
