//! Outbound adapter for the inference provider.

mod dto;
mod http_provider;

pub use http_provider::InferenceHttpProvider;
