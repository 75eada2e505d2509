//! Market Clock Port - Trading Hours Interface
//!
//! Answers whether trading is permitted right now. Stateless; the
//! production adapter evaluates the simulated hours rule on the wall
//! clock.

use crate::domain::MarketStatus;

pub trait MarketClock: Send + Sync + 'static {
  /// Current market state and the next opening/closing times.
  fn is_open(&self) -> MarketStatus;
}
