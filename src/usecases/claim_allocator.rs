//! Claim Allocator - One Free Share per User
//!
//! Orchestrates the free-share grant as a strictly sequential state
//! machine with a direct failure exit at every step:
//! 1. Idempotency gate (claim registry lookup)
//! 2. Market gate (market clock)
//! 3. Sizing (two-draw bucket selection)
//! 4. Price snapshot (concurrent per-asset price reads)
//! 5. Asset selection (first affordable asset in listing order)
//! 6. Buy into the reward account
//! 7. Move to the user account (refunds the buy on failure)
//! 8. Record the claim (unique per user)
//!
//! Nothing is retried. A registry write failure after step 7 leaves the
//! share with the user and no claim record; that window is logged.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use futures_util::future::join_all;
use rand::rngs::StdRng;
use rust_decimal::Decimal;
use tokio::sync::OwnedMutexGuard;
use tracing::{error, info, instrument, warn};

use crate::domain::{
  AllocationError, BucketTable, Claim, ClaimTotals, ShareReceipt, TickerSymbol, pick_affordable,
};
use crate::ports::{ClaimRepository, MarketClock, RepositoryError};

use super::account_ledger::AccountLedger;
use super::price_oracle::AssetPriceOracle;

/// Grants free shares, at most once per user.
pub struct ClaimAllocator {
  /// Claim registry (idempotency record).
  claims: Arc<dyn ClaimRepository>,
  /// Market hours.
  clock: Arc<dyn MarketClock>,
  /// Asset listing and prices.
  oracle: Arc<AssetPriceOracle>,
  /// Reward account fund movements.
  ledger: Arc<AccountLedger>,
  /// Configured sizing buckets.
  buckets: BucketTable,
  /// Seedable random source for sizing.
  rng: Mutex<StdRng>,
  /// Running totals, loaded from the registry on first use.
  totals: tokio::sync::Mutex<Option<ClaimTotals>>,
  /// Per-user locks serializing concurrent claims for the same name.
  user_locks: Mutex<HashMap<String, UserLock>>,
}

/// Lock for one user name, with the number of claims holding or awaiting it.
#[derive(Default)]
struct UserLock {
  lock: Arc<tokio::sync::Mutex<()>>,
  holders: usize,
}

/// Exclusive claim slot for one user.
///
/// Dropping the slot, including when the claim future is cancelled while
/// waiting or mid-allocation, releases the lock and forgets the entry once
/// no other claim holds it.
struct UserSlot<'a> {
  locks: &'a Mutex<HashMap<String, UserLock>>,
  user: String,
  guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for UserSlot<'_> {
  fn drop(&mut self) {
    self.guard.take();
    let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(entry) = locks.get_mut(&self.user) {
      entry.holders = entry.holders.saturating_sub(1);
      if entry.holders == 0 {
        locks.remove(&self.user);
      }
    }
  }
}

impl ClaimAllocator {
  pub fn new(
    claims: Arc<dyn ClaimRepository>,
    clock: Arc<dyn MarketClock>,
    oracle: Arc<AssetPriceOracle>,
    ledger: Arc<AccountLedger>,
    buckets: BucketTable,
    rng: StdRng,
  ) -> Self {
    Self {
      claims,
      clock,
      oracle,
      ledger,
      buckets,
      rng: Mutex::new(rng),
      totals: tokio::sync::Mutex::new(None),
      user_locks: Mutex::new(HashMap::new()),
    }
  }

  /// Draw a target reward value from the configured buckets.
  pub fn select_target_value(&self) -> u32 {
    let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
    self.buckets.draw(&mut *rng)
  }

  /// Grant `user` their free share.
  #[instrument(skip(self))]
  pub async fn claim_free_share(&self, user: &str) -> Result<ShareReceipt, AllocationError> {
    let slot = self.lock_user(user).await;
    let result = self.allocate(user).await;
    drop(slot);

    match &result {
      Ok(receipt) => info!(
        ticker = %receipt.ticker_symbol,
        quantity = receipt.quantity,
        paid = %receipt.share_price_paid,
        "Free share granted"
      ),
      Err(e) => warn!(code = %e.code(), reason = %e, "Free share refused"),
    }
    result
  }

  /// Totals over every claim granted so far.
  pub async fn claim_totals(&self) -> Result<ClaimTotals, AllocationError> {
    let mut totals = self.totals.lock().await;
    if let Some(current) = *totals {
      return Ok(current);
    }

    let claims = self
      .claims
      .get_all()
      .await
      .map_err(|e| AllocationError::Database(e.to_string()))?;
    let loaded = ClaimTotals::from_claims(&claims);
    *totals = Some(loaded);
    Ok(loaded)
  }

  async fn allocate(&self, user: &str) -> Result<ShareReceipt, AllocationError> {
    // 1. Idempotency gate
    match self.claims.get_by_name(user).await {
      Ok(_) => return Err(AllocationError::ClaimedAlready),
      Err(RepositoryError::ClaimNotFound(_)) => {}
      Err(e) => {
        error!(error = %e, code = %e.code(), "Claim lookup failed");
        return Err(AllocationError::Database(e.to_string()));
      }
    }

    // 2. Market gate
    let market = self.clock.is_open();
    if !market.open {
      return Err(AllocationError::MarketClosed {
        next_opening_time: market.next_opening_time,
      });
    }

    // 3. Sizing
    let target_value = self.select_target_value();

    // 4. Price snapshot
    let snapshot = self.price_snapshot().await;
    if snapshot.is_empty() {
      return Err(AllocationError::NoAssets);
    }

    // 5. Asset selection
    let Some(pick) = pick_affordable(&snapshot, target_value) else {
      return Err(AllocationError::NoAffordableAsset { target_value });
    };
    info!(
      target_value,
      ticker = %pick.ticker_symbol,
      price = %pick.price,
      quantity = pick.quantity,
      "Reward asset selected"
    );

    // 6. Buy
    let purchase = self
      .ledger
      .buy_shares_in_rewards_account(&pick.ticker_symbol, pick.quantity)
      .await
      .map_err(|e| {
        error!(error = %e, "Reward purchase failed");
        AllocationError::RewardPurchaseFailed
      })?;

    // 7. Move
    if let Err(e) = self
      .ledger
      .move_shares_from_rewards_account(user, &purchase.ticker_symbol, purchase.quantity)
      .await
    {
      error!(error = %e, "Share move failed, refunding purchase");
      if let Err(refund) = self.ledger.refund_purchase(&purchase).await {
        error!(error = %refund, "Refund failed, reward account stays debited");
      }
      return Err(AllocationError::MoveFailed);
    }

    // 8. Record. Totals stay locked until the new claim is counted.
    let claim = Claim::single(
      user,
      &purchase.ticker_symbol,
      purchase.quantity,
      purchase.share_price_paid,
    );
    let mut totals = self.totals.lock().await;
    if let Err(e) = self.claims.save(&claim).await {
      error!(
        error = %e,
        code = %e.code(),
        "Share transferred but claim not recorded"
      );
      return Err(match e {
        RepositoryError::DuplicateClaim(_) => AllocationError::DuplicateClaim,
        _ => AllocationError::ClaimNotSaved,
      });
    }
    if let Some(totals) = totals.as_mut() {
      totals.record(&claim);
    }
    drop(totals);

    Ok(ShareReceipt {
      success: true,
      quantity: purchase.quantity,
      share_price_paid: purchase.share_price_paid,
      ticker_symbol: purchase.ticker_symbol,
    })
  }

  /// Ordered `(ticker, price)` pairs; prices are fetched concurrently.
  async fn price_snapshot(&self) -> Vec<(TickerSymbol, Decimal)> {
    let tickers = self.oracle.list_tradable_assets().await;
    let prices = join_all(
      tickers
        .iter()
        .map(|ticker| self.oracle.get_latest_price(ticker)),
    )
    .await;
    tickers.into_iter().zip(prices).collect()
  }

  async fn lock_user(&self, user: &str) -> UserSlot<'_> {
    let lock = {
      let mut locks = self.user_locks.lock().unwrap_or_else(PoisonError::into_inner);
      let entry = locks.entry(user.to_string()).or_default();
      entry.holders += 1;
      Arc::clone(&entry.lock)
    };
    let mut slot = UserSlot {
      locks: &self.user_locks,
      user: user.to_string(),
      guard: None,
    };
    slot.guard = Some(lock.lock_owned().await);
    slot
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::adapters::persistence::RecordStore;
  use crate::domain::{MarketStatus, RewardBucket, market_status_at};
  use crate::ports::RepoResult;
  use async_trait::async_trait;
  use chrono::Utc;
  use futures_util::future::join;
  use rand::SeedableRng;
  use std::time::Duration;

  struct OpenClock;

  impl MarketClock for OpenClock {
    fn is_open(&self) -> MarketStatus {
      MarketStatus {
        open: true,
        ..market_status_at(Utc::now())
      }
    }
  }

  /// Claim registry whose lookups never complete.
  struct StalledClaims;

  #[async_trait]
  impl ClaimRepository for StalledClaims {
    async fn save(&self, _claim: &Claim) -> RepoResult<()> {
      Ok(())
    }

    async fn get_all(&self) -> RepoResult<Vec<Claim>> {
      Ok(Vec::new())
    }

    async fn get_by_name(&self, _name: &str) -> RepoResult<Claim> {
      std::future::pending().await
    }
  }

  fn allocator_with(
    claims: Option<Arc<dyn ClaimRepository>>,
    buckets: Vec<RewardBucket>,
  ) -> ClaimAllocator {
    let store = Arc::new(RecordStore::in_memory());
    let clock: Arc<dyn MarketClock> = Arc::new(OpenClock);
    let oracle = Arc::new(AssetPriceOracle::new(store.clone()));
    let ledger = Arc::new(AccountLedger::new(
      store.clone(),
      store.clone(),
      Arc::clone(&clock),
      "rewards",
    ));
    let claims = claims.unwrap_or_else(|| store.clone() as Arc<dyn ClaimRepository>);
    ClaimAllocator::new(
      claims,
      clock,
      oracle,
      ledger,
      BucketTable::new(buckets),
      StdRng::seed_from_u64(7),
    )
  }

  fn allocator(buckets: Vec<RewardBucket>) -> ClaimAllocator {
    allocator_with(None, buckets)
  }

  #[test]
  fn test_single_value_bucket_is_deterministic() {
    let allocator = allocator(vec![RewardBucket { p0: 0.0, p1: 1.0, min: 5, max: 6 }]);
    for _ in 0..50 {
      assert_eq!(allocator.select_target_value(), 5);
    }
  }

  #[test]
  fn test_empty_table_uses_fallback_range() {
    let allocator = allocator(Vec::new());
    for _ in 0..200 {
      let value = allocator.select_target_value();
      assert!((3..10).contains(&value), "value {value} outside fallback");
    }
  }

  #[tokio::test]
  async fn test_user_locks_are_released() {
    let allocator = allocator(Vec::new());
    let _ = allocator.claim_free_share("alice").await;
    assert!(allocator.user_locks.lock().unwrap().is_empty());
  }

  #[tokio::test]
  async fn test_cancelled_claims_release_user_locks() {
    let allocator = allocator_with(Some(Arc::new(StalledClaims)), Vec::new());

    let both = join(
      allocator.claim_free_share("alice"),
      allocator.claim_free_share("alice"),
    );
    assert!(tokio::time::timeout(Duration::from_millis(10), both).await.is_err());
    assert!(allocator.user_locks.lock().unwrap().is_empty());

    let single = allocator.claim_free_share("bob");
    assert!(tokio::time::timeout(Duration::from_millis(10), single).await.is_err());
    assert!(allocator.user_locks.lock().unwrap().is_empty());
  }
}
