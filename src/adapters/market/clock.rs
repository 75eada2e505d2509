//! System Market Clock - Simulated Trading Hours on the Wall Clock
//!
//! Evaluates the simulated hours rule against `Utc::now()`: the market
//! is open during even minutes and closed during odd ones.

use chrono::Utc;

use crate::domain::{MarketStatus, market_status_at};
use crate::ports::MarketClock;

/// Production clock. Stateless.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemMarketClock;

impl MarketClock for SystemMarketClock {
    fn is_open(&self) -> MarketStatus {
        market_status_at(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_times_follow_now() {
        let before = Utc::now();
        let status = SystemMarketClock.is_open();
        assert!(status.next_opening_time > before);
        assert!(status.next_closing_time > status.next_opening_time);
    }
}
