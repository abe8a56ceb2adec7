//! Row types for the classification log table.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::classification_requests;
use crate::domain::NewClassificationRecord;

/// Insertable row recording one classification request.
#[derive(Debug, Insertable)]
#[diesel(table_name = classification_requests)]
pub struct NewClassificationRow {
    pub correlation_id: String,
    pub image_count: i32,
    pub predictions: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl From<NewClassificationRecord> for NewClassificationRow {
    fn from(record: NewClassificationRecord) -> Self {
        Self {
            correlation_id: record.correlation_id,
            image_count: record.image_count,
            predictions: record.predictions,
            created_at: Utc::now(),
        }
    }
}
