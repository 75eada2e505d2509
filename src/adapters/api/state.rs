//! Shared handler state.

use std::sync::Arc;

use crate::adapters::metrics::MetricsRegistry;
use crate::usecases::{ClaimAllocator, SharePurchase};

/// Everything the reward handlers need, cheap to clone per request.
#[derive(Clone)]
pub struct ApiState {
  pub allocator: Arc<ClaimAllocator>,
  pub purchases: Arc<SharePurchase>,
  pub metrics: Arc<MetricsRegistry>,
}
