//! Router assembly and the HTTP server loop.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tokio::sync::broadcast;
use tracing::{info, instrument};

use super::handlers;
use super::state::ApiState;
use crate::adapters::metrics::HealthState;

/// Reward endpoints plus health probes and `/metrics`.
pub fn router(state: ApiState, health: Arc<HealthState>) -> Router {
  let metrics = Arc::clone(&state.metrics);
  Router::new()
    .route("/api/v1/claim-free-share", post(handlers::claim_free_share))
    .route("/api/v1/share", post(handlers::buy_share))
    .route("/api/v1/claims/stats", get(handlers::claim_stats))
    .with_state(state)
    .merge(health.router())
    .merge(metrics.router())
}

/// Serve `app` on `bind_address` until the shutdown signal fires.
#[instrument(skip(app, shutdown_rx))]
pub async fn serve(
  bind_address: &str,
  app: Router,
  mut shutdown_rx: broadcast::Receiver<()>,
) -> anyhow::Result<()> {
  let listener = tokio::net::TcpListener::bind(bind_address).await?;
  info!(address = %bind_address, "HTTP server started");

  axum::serve(listener, app)
    .with_graceful_shutdown(async move {
      let _ = shutdown_rx.recv().await;
    })
    .await?;

  info!("HTTP server stopped");
  Ok(())
}
