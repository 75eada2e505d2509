//! Share Purchase - Explicit Buy Flow
//!
//! A user buys a chosen `(ticker, quantity)` through the reward account.
//! Shares the ledger primitives with the claim allocator:
//! market gate → buy → move → append a share transaction.
//! No balance check is made on the user's own cash.

use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use crate::domain::{AllocationError, ShareReceipt, ShareTransaction};
use crate::ports::{MarketClock, ShareRepository};

use super::account_ledger::AccountLedger;

pub struct SharePurchase {
  shares: Arc<dyn ShareRepository>,
  clock: Arc<dyn MarketClock>,
  ledger: Arc<AccountLedger>,
}

impl SharePurchase {
  pub fn new(
    shares: Arc<dyn ShareRepository>,
    clock: Arc<dyn MarketClock>,
    ledger: Arc<AccountLedger>,
  ) -> Self {
    Self {
      shares,
      clock,
      ledger,
    }
  }

  /// Buy `quantity` shares of `ticker` for `user`.
  #[instrument(skip(self))]
  pub async fn buy_share(
    &self,
    user: &str,
    quantity: u32,
    ticker: &str,
  ) -> Result<ShareReceipt, AllocationError> {
    let market = self.clock.is_open();
    if !market.open {
      return Err(AllocationError::MarketClosed {
        next_opening_time: market.next_opening_time,
      });
    }

    let purchase = self
      .ledger
      .buy_shares_in_rewards_account(ticker, quantity)
      .await
      .map_err(|e| {
        warn!(error = %e, "Cannot buy shares");
        AllocationError::PurchaseFailed
      })?;

    if let Err(e) = self
      .ledger
      .move_shares_from_rewards_account(user, ticker, quantity)
      .await
    {
      error!(error = %e, "Share move failed, refunding purchase");
      if let Err(refund) = self.ledger.refund_purchase(&purchase).await {
        error!(error = %refund, "Refund failed, reward account stays debited");
      }
      return Err(AllocationError::MoveFailed);
    }

    let transaction = ShareTransaction::single(user, ticker, quantity, purchase.share_price_paid);
    self.shares.save(&transaction).await.map_err(|e| {
      error!(
        error = %e,
        code = %e.code(),
        "Shares transferred but transaction not recorded"
      );
      AllocationError::ShareNotSaved
    })?;

    info!(
      transaction_id = %transaction.id,
      paid = %purchase.share_price_paid,
      "Share purchase completed"
    );

    Ok(ShareReceipt {
      success: true,
      quantity,
      share_price_paid: purchase.share_price_paid,
      ticker_symbol: ticker.to_string(),
    })
  }
}
