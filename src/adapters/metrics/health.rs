//! Health Probes - Liveness and Readiness
//!
//! Exposes `/live`, `/ready` and `/health` via axum 0.7. Readiness
//! depends on the record store being usable and the service not being
//! in graceful shutdown.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::adapters::persistence::RecordStore;

/// Shared health state polled by the probes.
pub struct HealthState {
    /// Backing store checked on every readiness probe.
    store: Arc<RecordStore>,
    /// Cleared when graceful shutdown starts.
    accepting: AtomicBool,
}

impl HealthState {
    pub fn new(store: Arc<RecordStore>) -> Self {
        Self {
            store,
            accepting: AtomicBool::new(true),
        }
    }

    /// Readiness probe answers 503 from now on.
    pub fn mark_shutting_down(&self) {
        self.accepting.store(false, Ordering::Relaxed);
    }

    /// Check if the service is ready to serve traffic.
    pub async fn is_ready(&self) -> bool {
        self.accepting.load(Ordering::Relaxed) && self.store.is_healthy().await
    }

    /// Probe routes, merged into the service router.
    pub fn router(self: Arc<Self>) -> Router {
        Router::new()
            .route("/live", get(liveness))
            .route("/ready", get(readiness))
            .route("/health", get(health))
            .with_state(self)
    }
}

/// Liveness probe: always returns 200 if the process is running.
async fn liveness() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Readiness probe: 200 only while accepting traffic with a usable store.
async fn readiness(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    if state.is_ready().await {
        (StatusCode::OK, "READY")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "NOT READY")
    }
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_not_ready_after_shutdown_starts() {
        let state = HealthState::new(Arc::new(RecordStore::in_memory()));
        assert!(state.is_ready().await);

        state.mark_shutting_down();
        assert!(!state.is_ready().await);
    }
}
