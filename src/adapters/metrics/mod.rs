//! Metrics and Monitoring Adapters
//!
//! Provides the Prometheus `/metrics` endpoint and the health probes
//! (`/live`, `/ready`, `/health`) via axum 0.7.

pub mod health;
pub mod prometheus;

pub use health::HealthState;
pub use prometheus::MetricsRegistry;
