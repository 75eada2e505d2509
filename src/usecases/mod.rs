//! Use Cases Layer - Application Business Logic
//!
//! Orchestrates domain logic with port interfaces to implement the
//! service's workflows. Each use case is a self-contained operation.
//!
//! Use cases:
//! - `AssetPriceOracle`: Tradable asset listing and live prices
//! - `AccountLedger`: Reward account buys, moves and refunds
//! - `ClaimAllocator`: One free share per user
//! - `SharePurchase`: Explicit share buy flow

pub mod account_ledger;
pub mod claim_allocator;
pub mod price_oracle;
pub mod share_purchase;

pub use account_ledger::{AccountLedger, LedgerError, Purchase};
pub use claim_allocator::ClaimAllocator;
pub use price_oracle::{AssetPriceOracle, UNKNOWN_PRICE};
pub use share_purchase::SharePurchase;
