//! Client-facing wire contracts.
//!
//! The success payload serializes only the classification data; the success
//! flag and the elapsed duration are diagnostics for logging and never reach
//! the wire. The error payload is the sanitised envelope shared by every
//! failure kind.

use std::time::Duration;

use actix_web::http::StatusCode;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::LabelConfidences;
use crate::middleware::correlation::CorrelationId;

/// Successful classification payload.
///
/// `Data` holds one label-to-confidence mapping per submitted image, in
/// submission order.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ResponseModel {
    /// Per-image label-confidence mappings.
    #[serde(rename = "Data")]
    #[schema(value_type = Vec<Object>)]
    data: Vec<LabelConfidences>,

    // Diagnostics only. Set by the orchestrator and the timing stage,
    // consumed by logging; excluded from the serialized payload.
    #[serde(skip)]
    is_ok: bool,
    #[serde(skip)]
    taken: Duration,
}

impl ResponseModel {
    /// Assemble a successful response around the classification data.
    pub fn success(data: Vec<LabelConfidences>) -> Self {
        Self {
            data,
            is_ok: true,
            taken: Duration::ZERO,
        }
    }

    /// Per-image label-confidence mappings.
    pub fn data(&self) -> &[LabelConfidences] {
        &self.data
    }

    /// Whether the request succeeded. Diagnostic only.
    pub fn is_ok(&self) -> bool {
        self.is_ok
    }

    /// Elapsed handling time recorded by the timing stage. Diagnostic only.
    pub fn taken(&self) -> Duration {
        self.taken
    }

    /// Record the elapsed handling time supplied by the timing stage.
    pub fn set_taken(&mut self, taken: Duration) {
        self.taken = taken;
    }
}

/// Outcome of a dispatched request: terminal states of the chain.
///
/// Each request ends in exactly one of these; no state is revisited.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayReply {
    /// The classification succeeded and the payload is ready to serialize.
    Success(ResponseModel),
    /// A failure was intercepted and reported as a sanitised envelope.
    Error(ErrorEnvelope),
}

/// Failure kind reported to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum ErrorKind {
    /// Persistence layer unreachable, query failure, or pool exhaustion.
    DatabaseError,
    /// Inference provider unreachable, timed out, or returned an unusable
    /// result.
    UpstreamError,
    /// Any failure not attributable to the two domains above.
    UnknownError,
}

impl ErrorKind {
    /// HTTP status class associated with this failure kind.
    pub fn status_code(self) -> StatusCode {
        match self {
            Self::DatabaseError => StatusCode::SERVICE_UNAVAILABLE,
            Self::UpstreamError => StatusCode::BAD_GATEWAY,
            Self::UnknownError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Sanitised error payload returned for every intercepted failure.
///
/// Carries the kind, a human-readable message free of internal detail, and
/// the request's correlation identifier. Raw error text stays in the server
/// logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorEnvelope {
    /// Failure kind.
    #[serde(rename = "Kind")]
    kind: ErrorKind,
    /// Human-readable description, sanitised for clients.
    #[serde(rename = "Message")]
    message: String,
    /// Correlation identifier tying the response to the server-side logs.
    #[serde(rename = "CorrelationId")]
    correlation_id: String,
}

impl ErrorEnvelope {
    /// Build an envelope for the given kind and correlation identifier.
    pub fn new(kind: ErrorKind, message: impl Into<String>, correlation_id: CorrelationId) -> Self {
        Self {
            kind,
            message: message.into(),
            correlation_id: correlation_id.to_string(),
        }
    }

    /// Failure kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Sanitised message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Correlation identifier embedded in the payload.
    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LabelConfidences;

    #[test]
    fn serialized_response_contains_only_data() {
        let mut model = ResponseModel::success(vec![
            LabelConfidences::from([("oak".to_owned(), 0.92_f32)]),
            LabelConfidences::from([("oak".to_owned(), 0.40_f32), ("pine".to_owned(), 0.55_f32)]),
        ]);
        model.set_taken(Duration::from_millis(125));

        let value = serde_json::to_value(&model).expect("model serializes");
        let object = value.as_object().expect("model serializes to an object");
        assert_eq!(object.keys().collect::<Vec<_>>(), vec!["Data"]);

        let expected = serde_json::json!({
            "Data": [
                { "oak": 0.92_f32 },
                { "oak": 0.40_f32, "pine": 0.55_f32 }
            ]
        });
        assert_eq!(value, expected);
    }

    #[test]
    fn confidences_round_trip_at_native_precision() {
        let model = ResponseModel::success(vec![LabelConfidences::from([(
            "oak".to_owned(),
            0.123_456_79_f32,
        )])]);
        let text = serde_json::to_string(&model).expect("model serializes");
        let value: serde_json::Value = serde_json::from_str(&text).expect("payload parses");
        let confidence = value["Data"][0]["oak"].as_f64().expect("confidence present");
        assert_eq!(confidence as f32, 0.123_456_79_f32);
    }

    #[test]
    fn envelope_uses_pascal_case_keys() {
        let envelope = ErrorEnvelope::new(
            ErrorKind::DatabaseError,
            "The persistence layer is unavailable",
            CorrelationId::generate(),
        );
        let value = serde_json::to_value(&envelope).expect("envelope serializes");
        let object = value.as_object().expect("envelope serializes to an object");
        assert_eq!(
            object.keys().collect::<Vec<_>>(),
            vec!["CorrelationId", "Kind", "Message"]
        );
        assert_eq!(value["Kind"], "DatabaseError");
    }

    #[test]
    fn kinds_map_to_their_status_class() {
        assert_eq!(
            ErrorKind::DatabaseError.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ErrorKind::UpstreamError.status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ErrorKind::UnknownError.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
