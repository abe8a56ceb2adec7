//! Outbound adapter for the backing store.

mod diesel_classification_log;
mod models;
mod pool;
pub mod schema;

pub use diesel_classification_log::DieselClassificationLog;
pub use pool::{DbPool, PoolConfig, PoolError};
