//! Diesel table definitions for the classification log.

diesel::table! {
    classification_requests (id) {
        id -> Int8,
        correlation_id -> Text,
        image_count -> Int4,
        predictions -> Jsonb,
        created_at -> Timestamptz,
    }
}
