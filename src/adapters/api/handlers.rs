//! Reward Endpoint Handlers
//!
//! Each handler validates its body, runs the use case and renders the
//! result as an `Outcome`. Malformed JSON is reported as a validation
//! failure instead of axum's default rejection.

use std::time::Instant;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{instrument, warn};

use super::state::ApiState;
use super::types::{ApiOutcome, ClaimRequest, ShareRequest};
use crate::domain::{Outcome, ShareReceipt};

/// `POST /api/v1/claim-free-share`
#[instrument(skip_all)]
pub async fn claim_free_share(
  State(state): State<ApiState>,
  payload: Result<Json<ClaimRequest>, JsonRejection>,
) -> ApiOutcome<ShareReceipt> {
  let request = match payload {
    Ok(Json(request)) => request,
    Err(rejection) => return rejected(&rejection),
  };
  let user = match request.validate() {
    Ok(user) => user,
    Err(reason) => return ApiOutcome::validation_error(reason),
  };

  let started = Instant::now();
  let result = state.allocator.claim_free_share(user).await;
  state
    .metrics
    .observe("claim", &result, started.elapsed().as_secs_f64());
  ApiOutcome(result.into())
}

/// `POST /api/v1/share`
#[instrument(skip_all)]
pub async fn buy_share(
  State(state): State<ApiState>,
  payload: Result<Json<ShareRequest>, JsonRejection>,
) -> ApiOutcome<ShareReceipt> {
  let request = match payload {
    Ok(Json(request)) => request,
    Err(rejection) => return rejected(&rejection),
  };
  let valid = match request.validate() {
    Ok(valid) => valid,
    Err(reason) => return ApiOutcome::validation_error(reason),
  };

  let started = Instant::now();
  let result = state
    .purchases
    .buy_share(valid.user, valid.quantity, valid.ticker_symbol)
    .await;
  state
    .metrics
    .observe("purchase", &result, started.elapsed().as_secs_f64());
  ApiOutcome(result.into())
}

/// `GET /api/v1/claims/stats`
pub async fn claim_stats(State(state): State<ApiState>) -> Response {
  match state.allocator.claim_totals().await {
    Ok(totals) => (StatusCode::OK, Json(totals)).into_response(),
    Err(e) => (
      StatusCode::INTERNAL_SERVER_ERROR,
      Json(Outcome::<()>::failure(e.code(), e.to_string())),
    )
      .into_response(),
  }
}

fn rejected<T>(rejection: &JsonRejection) -> ApiOutcome<T> {
  warn!(error = %rejection.body_text(), "Rejected request body");
  ApiOutcome::validation_error(rejection.body_text())
}
