//! Simulated market hours.
//!
//! The market is open on even-numbered minutes of the wall clock and
//! closed on odd ones. The next opening/closing times are always reported
//! as one and two hours from now, whatever the current state.

use chrono::{DateTime, Duration, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Market state at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketStatus {
    pub open: bool,
    pub next_opening_time: DateTime<Utc>,
    pub next_closing_time: DateTime<Utc>,
}

/// Evaluate the market-hours rule at `now`.
pub fn market_status_at(now: DateTime<Utc>) -> MarketStatus {
    MarketStatus {
        open: now.minute() % 2 == 0,
        next_opening_time: now + Duration::hours(1),
        next_closing_time: now + Duration::hours(2),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_open_on_even_minutes() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 14, 42, 59).unwrap();
        assert!(market_status_at(now).open);
    }

    #[test]
    fn test_closed_on_odd_minutes() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 14, 43, 0).unwrap();
        assert!(!market_status_at(now).open);
    }

    #[test]
    fn test_next_times_ignore_state() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 23, 30, 0).unwrap();
        let status = market_status_at(now);
        assert_eq!(
            status.next_opening_time,
            Utc.with_ymd_and_hms(2024, 3, 2, 0, 30, 0).unwrap()
        );
        assert_eq!(
            status.next_closing_time,
            Utc.with_ymd_and_hms(2024, 3, 2, 1, 30, 0).unwrap()
        );
    }
}
