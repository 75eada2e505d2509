//! Domain layer - Core reward allocation models and rules.
//!
//! Pure types and functions: accounts and lots, claims, market hours,
//! reward sizing buckets, asset selection and the price walk.
//! No I/O here (hexagonal architecture inner ring).

pub mod account;
pub mod claim;
pub mod market_hours;
pub mod outcome;
pub mod price_walk;
pub mod reward_bucket;
pub mod selection;

// Re-export core types for convenience
pub use account::{Account, Asset, Lot, TickerSymbol};
pub use claim::{Claim, ClaimTotals, ClaimedStock, ShareTransaction};
pub use market_hours::{MarketStatus, market_status_at};
pub use outcome::{AllocationError, ErrorCode, Outcome, ShareReceipt};
pub use price_walk::PriceWalk;
pub use reward_bucket::{BucketTable, RewardBucket};
pub use selection::{AssetPick, pick_affordable};
