//! Outbound adapters for the two external collaborators.

pub mod inference;
pub mod persistence;
