//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the usecases layer requires
//! from the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `MarketClock`: Simulated trading hours
//! - `AccountRepository`, `AssetRepository`, `ClaimRepository`,
//!   `ShareRepository`: Entity persistence

pub mod market_clock;
pub mod repository;

pub use market_clock::MarketClock;
pub use repository::{
  AccountRepository, AssetRepository, ClaimRepository, RepoResult, RepositoryError,
  ShareRepository,
};
