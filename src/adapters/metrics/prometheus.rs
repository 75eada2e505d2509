//! Prometheus Metrics Registry - Reward Allocation Observability
//!
//! Registers the service metrics and renders them in the Prometheus
//! text format on `/metrics`. Covers claim and purchase outcomes,
//! granted share volume and allocation latency.

use std::sync::Arc;

use axum::Router;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use tracing::error;

use crate::domain::{AllocationError, ShareReceipt};

/// Label value recorded for successful operations.
pub const SUCCESS_LABEL: &str = "SUCCESS";

/// Centralized Prometheus metrics for the reward service.
///
/// All metrics follow the naming convention `free_share_*` and carry an
/// `operation` label (`claim` or `purchase`).
pub struct MetricsRegistry {
    registry: Registry,
    /// Finished operations by outcome code.
    pub outcomes: IntCounterVec,
    /// Shares moved into user accounts.
    pub shares_granted: IntCounter,
    /// End-to-end operation latency (seconds).
    pub latency_seconds: HistogramVec,
}

impl MetricsRegistry {
    /// Create and register all Prometheus metrics.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let outcomes = IntCounterVec::new(
            Opts::new(
                "free_share_outcomes_total",
                "Finished claims and purchases by outcome code",
            ),
            &["operation", "outcome"],
        )?;

        let shares_granted = IntCounter::new(
            "free_share_shares_granted_total",
            "Shares moved from the reward account to users",
        )?;

        let latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "free_share_latency_seconds",
                "Claim and purchase latency in seconds",
            )
            .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0]),
            &["operation"],
        )?;

        registry.register(Box::new(outcomes.clone()))?;
        registry.register(Box::new(shares_granted.clone()))?;
        registry.register(Box::new(latency_seconds.clone()))?;

        Ok(Self {
            registry,
            outcomes,
            shares_granted,
            latency_seconds,
        })
    }

    /// Record one finished operation.
    pub fn observe(
        &self,
        operation: &str,
        result: &Result<ShareReceipt, AllocationError>,
        elapsed_secs: f64,
    ) {
        let outcome = match result {
            Ok(receipt) => {
                self.shares_granted.inc_by(u64::from(receipt.quantity));
                SUCCESS_LABEL
            }
            Err(e) => e.code().as_str(),
        };
        self.outcomes.with_label_values(&[operation, outcome]).inc();
        self.latency_seconds
            .with_label_values(&[operation])
            .observe(elapsed_secs);
    }

    /// Encode every registered metric in the Prometheus text format.
    pub fn render(&self) -> anyhow::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// `/metrics` route, merged into the service router.
    pub fn router(self: Arc<Self>) -> Router {
        Router::new().route(
            "/metrics",
            get(move || {
                let metrics = Arc::clone(&self);
                async move {
                    match metrics.render() {
                        Ok(body) => (StatusCode::OK, body).into_response(),
                        Err(e) => {
                            error!(error = %e, "Failed to encode metrics");
                            StatusCode::INTERNAL_SERVER_ERROR.into_response()
                        }
                    }
                }
            }),
        )
    }
}
