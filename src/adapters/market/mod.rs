//! Market Adapters
//!
//! Wall-clock implementation of the `MarketClock` port.

pub mod clock;

pub use clock::SystemMarketClock;
