//! HTTP inbound adapter: the classification endpoint and health probes.

pub mod classify;
pub mod health;
pub mod state;

pub use health::{live, ready, HealthState};
pub use state::HttpState;
