//! Random price walk used to simulate a live market.
//!
//! Each step moves the price up or down (equal odds) by a uniform amount
//! in `[0, 1)` with four decimal places, then clamps to a positive floor.

use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Lowest price the walk will ever produce by default.
pub const DEFAULT_PRICE_FLOOR: Decimal = dec!(0.01);

/// Scale of the step magnitude (ten-thousandths).
const STEP_SCALE: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceWalk {
    floor: Decimal,
}

impl PriceWalk {
    /// Create a walk clamped at `floor`. Non-positive floors are raised to
    /// the default so prices stay strictly positive.
    pub fn new(floor: Decimal) -> Self {
        let floor = if floor > Decimal::ZERO {
            floor
        } else {
            DEFAULT_PRICE_FLOOR
        };
        Self { floor }
    }

    pub const fn floor(&self) -> Decimal {
        self.floor
    }

    /// Apply a signed nudge and clamp. A sum that overflows leaves the
    /// price unchanged.
    pub fn apply(&self, price: Decimal, up: bool, magnitude: Decimal) -> Decimal {
        let delta = if up { magnitude } else { -magnitude };
        price.checked_add(delta).unwrap_or(price).max(self.floor)
    }

    /// One random step from `price`.
    pub fn step<R: Rng + ?Sized>(&self, price: Decimal, rng: &mut R) -> Decimal {
        let up = rng.gen_bool(0.5);
        let magnitude = Decimal::new(rng.gen_range(0..10_000), STEP_SCALE);
        self.apply(price, up, magnitude)
    }
}

impl Default for PriceWalk {
    fn default() -> Self {
        Self::new(DEFAULT_PRICE_FLOOR)
    }
}
