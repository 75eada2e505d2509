//! Repository Ports - Persistence Interfaces
//!
//! One trait per stored entity. Every method returns a tagged
//! `Result<T, RepositoryError>`; services translate repository errors
//! into allocation-level codes and never retry.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::{Account, Asset, Claim, ErrorCode, ShareTransaction};

/// Failure reported by a repository adapter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
  /// No account with this name.
  #[error("There is no account that matches {0}")]
  AccountNotFound(String),

  /// No asset with this ticker.
  #[error("There is no asset that matches {0}")]
  AssetNotFound(String),

  /// No claim for this user.
  #[error("There is no claim that matches {0}")]
  ClaimNotFound(String),

  /// Unique key violation on the claims collection.
  #[error("A claim already exists for {0}")]
  DuplicateClaim(String),

  /// Unique key violation on accounts or assets.
  #[error("A record named {0} already exists")]
  AlreadyExists(String),

  /// Storage unavailable, serialization failure, I/O error.
  #[error("Database error: {0}")]
  Database(String),
}

impl RepositoryError {
  pub const fn code(&self) -> ErrorCode {
    match self {
      Self::AccountNotFound(_) => ErrorCode::AccountNotFound,
      Self::AssetNotFound(_) => ErrorCode::AssetNotFound,
      Self::ClaimNotFound(_) => ErrorCode::ClaimNotFound,
      Self::DuplicateClaim(_) => ErrorCode::DuplicateClaim,
      Self::AlreadyExists(_) | Self::Database(_) => ErrorCode::DatabaseError,
    }
  }

  pub const fn is_not_found(&self) -> bool {
    matches!(
      self,
      Self::AccountNotFound(_) | Self::AssetNotFound(_) | Self::ClaimNotFound(_)
    )
  }
}

/// Result alias for repository calls.
pub type RepoResult<T> = Result<T, RepositoryError>;

/// Account storage (firm reward account and user accounts).
#[async_trait]
pub trait AccountRepository: Send + Sync + 'static {
  /// Insert a new account. Fails with `AlreadyExists` on a name clash.
  async fn save(&self, account: &Account) -> RepoResult<()>;

  /// Overwrite an existing account. Fails with `AccountNotFound`.
  async fn update(&self, account: &Account) -> RepoResult<()>;

  async fn get_all(&self) -> RepoResult<Vec<Account>>;

  async fn get_by_name(&self, name: &str) -> RepoResult<Account>;
}

/// Asset storage. Enumeration order is insertion order.
#[async_trait]
pub trait AssetRepository: Send + Sync + 'static {
  /// Insert a new asset. Fails with `AlreadyExists` on a name clash.
  async fn save(&self, asset: &Asset) -> RepoResult<()>;

  /// Set the current price of an existing asset.
  async fn update_price(&self, name: &str, price: Decimal) -> RepoResult<()>;

  async fn get_all(&self) -> RepoResult<Vec<Asset>>;

  async fn get_by_name(&self, name: &str) -> RepoResult<Asset>;
}

/// Durable claim registry, keyed uniquely by user name.
#[async_trait]
pub trait ClaimRepository: Send + Sync + 'static {
  /// Insert a claim. Fails with `DuplicateClaim` if the user already has one.
  async fn save(&self, claim: &Claim) -> RepoResult<()>;

  async fn get_all(&self) -> RepoResult<Vec<Claim>>;

  async fn get_by_name(&self, name: &str) -> RepoResult<Claim>;
}

/// Append-only share transaction log.
#[async_trait]
pub trait ShareRepository: Send + Sync + 'static {
  async fn save(&self, transaction: &ShareTransaction) -> RepoResult<()>;

  async fn get_all(&self) -> RepoResult<Vec<ShareTransaction>>;

  /// All transactions credited to `account`, oldest first.
  async fn get_by_account(&self, account: &str) -> RepoResult<Vec<ShareTransaction>>;
}
