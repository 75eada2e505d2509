//! Account Ledger - Reward Account Fund Movements
//!
//! Owns every mutation of account balances and holdings:
//! - Buying a lot into the firm's reward account (market hours enforced)
//! - Moving a lot from the reward account to a user account
//! - Refunding a purchase (compensation step when a move fails)
//! - Provisioning the reward account at startup
//!
//! Each call reads, modifies and writes whole accounts. A buy is a single
//! account write. A move writes the destination first, then the reward
//! account; if the second write fails the destination is reverted on a
//! best-effort basis.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{error, info, instrument, warn};

use crate::domain::{Account, Lot, TickerSymbol};
use crate::ports::{AccountRepository, AssetRepository, MarketClock, RepositoryError};

/// Why a ledger operation was refused or failed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LedgerError {
  #[error("Market is closed")]
  MarketClosed,

  #[error("Quantity must be a positive whole number")]
  InvalidQuantity,

  #[error("Reward account {0} does not exist")]
  RewardsAccountMissing(String),

  #[error("Cannot get share price for {0}")]
  AssetMissing(String),

  #[error("No lot of {quantity} {ticker} in the reward account")]
  LotNotFound { ticker: TickerSymbol, quantity: u32 },

  #[error("Cannot move shares into the reward account itself")]
  SelfTransfer,

  #[error(transparent)]
  Storage(#[from] RepositoryError),
}

/// A lot bought into the reward account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
  pub ticker_symbol: TickerSymbol,
  pub quantity: u32,
  /// Total debited from the reward account (unit price × quantity).
  pub share_price_paid: Decimal,
}

/// Fund-movement primitives over the account and asset repositories.
pub struct AccountLedger {
  accounts: Arc<dyn AccountRepository>,
  assets: Arc<dyn AssetRepository>,
  clock: Arc<dyn MarketClock>,
  /// Name of the firm's reward account.
  rewards_account: String,
}

impl AccountLedger {
  pub fn new(
    accounts: Arc<dyn AccountRepository>,
    assets: Arc<dyn AssetRepository>,
    clock: Arc<dyn MarketClock>,
    rewards_account: impl Into<String>,
  ) -> Self {
    Self {
      accounts,
      assets,
      clock,
      rewards_account: rewards_account.into(),
    }
  }

  /// Create the reward account with `initial_cash` if it does not exist.
  ///
  /// Returns `true` when the account was created.
  #[instrument(skip(self))]
  pub async fn provision_rewards_account(&self, initial_cash: Decimal) -> Result<bool, LedgerError> {
    match self.accounts.get_by_name(&self.rewards_account).await {
      Ok(_) => Ok(false),
      Err(e) if e.is_not_found() => {
        self
          .accounts
          .save(&Account::with_cash(&self.rewards_account, initial_cash))
          .await?;
        info!(
          account = %self.rewards_account,
          cash = %initial_cash,
          "Reward account provisioned"
        );
        Ok(true)
      }
      Err(e) => Err(e.into()),
    }
  }

  /// Buy `quantity` shares of `ticker` into the reward account.
  ///
  /// Only allowed while the market is open. Appends a lot priced at the
  /// asset's current price and debits the total cost.
  #[instrument(skip(self))]
  pub async fn buy_shares_in_rewards_account(
    &self,
    ticker: &str,
    quantity: u32,
  ) -> Result<Purchase, LedgerError> {
    if quantity == 0 {
      return Err(LedgerError::InvalidQuantity);
    }
    if !self.clock.is_open().open {
      return Err(LedgerError::MarketClosed);
    }

    let mut account = self.load_rewards_account().await?;

    let asset = self.assets.get_by_name(ticker).await.map_err(|e| {
      error!(error = %e, "Impossible to get share price");
      if e.is_not_found() {
        LedgerError::AssetMissing(ticker.to_string())
      } else {
        LedgerError::Storage(e)
      }
    })?;

    let lot = Lot::new(ticker, quantity, asset.price);
    let cost = lot.cost();
    account.stocks.push(lot);
    account.cash -= cost;

    self.accounts.update(&account).await.map_err(|e| {
      error!(error = %e, "Impossible to update the reward account");
      LedgerError::from(e)
    })?;

    info!(
      unit_price = %asset.price,
      total = %cost,
      cash_left = %account.cash,
      "Shares bought into reward account"
    );

    Ok(Purchase {
      ticker_symbol: ticker.to_string(),
      quantity,
      share_price_paid: cost,
    })
  }

  /// Move the first reward lot matching `(ticker, quantity)` to `to_account`.
  ///
  /// The destination account is created empty if it does not exist yet.
  #[instrument(skip(self))]
  pub async fn move_shares_from_rewards_account(
    &self,
    to_account: &str,
    ticker: &str,
    quantity: u32,
  ) -> Result<Lot, LedgerError> {
    if to_account == self.rewards_account {
      return Err(LedgerError::SelfTransfer);
    }

    let mut rewards = self.load_rewards_account().await?;

    let Some(lot) = rewards.take_lot(ticker, quantity) else {
      error!("Stock not found in reward account");
      return Err(LedgerError::LotNotFound {
        ticker: ticker.to_string(),
        quantity,
      });
    };

    let mut destination = match self.accounts.get_by_name(to_account).await {
      Ok(account) => account,
      Err(e) if e.is_not_found() => {
        warn!("User account not found: going to create it");
        let account = Account::open(to_account);
        self.accounts.save(&account).await.map_err(|e| {
          error!(error = %e, "Failed to create user account");
          LedgerError::from(e)
        })?;
        account
      }
      Err(e) => return Err(e.into()),
    };

    destination.stocks.push(lot.clone());
    self.accounts.update(&destination).await.map_err(|e| {
      error!(error = %e, "Stock cannot move to user account");
      LedgerError::from(e)
    })?;

    if let Err(e) = self.accounts.update(&rewards).await {
      error!(error = %e, "Stock cannot move from reward account");
      destination.stocks.pop();
      if let Err(revert) = self.accounts.update(&destination).await {
        error!(
          error = %revert,
          account = %to_account,
          "Destination still holds the lot after a failed move"
        );
      }
      return Err(e.into());
    }

    info!(share_price = %lot.share_price, "Shares moved to user account");
    Ok(lot)
  }

  /// Undo a purchase: drop the bought lot and re-credit its cost.
  #[instrument(skip(self), fields(ticker = %purchase.ticker_symbol, quantity = purchase.quantity))]
  pub async fn refund_purchase(&self, purchase: &Purchase) -> Result<(), LedgerError> {
    let mut rewards = self.load_rewards_account().await?;

    if rewards
      .take_lot(&purchase.ticker_symbol, purchase.quantity)
      .is_none()
    {
      return Err(LedgerError::LotNotFound {
        ticker: purchase.ticker_symbol.clone(),
        quantity: purchase.quantity,
      });
    }
    rewards.cash += purchase.share_price_paid;

    self.accounts.update(&rewards).await?;
    info!(refunded = %purchase.share_price_paid, "Purchase refunded");
    Ok(())
  }

  /// Lots currently held by the reward account (empty if it is missing).
  pub async fn get_rewards_account_positions(&self) -> Vec<Lot> {
    match self.accounts.get_by_name(&self.rewards_account).await {
      Ok(account) => account.stocks,
      Err(e) => {
        warn!(error = %e, "Reward account positions unavailable");
        Vec::new()
      }
    }
  }

  async fn load_rewards_account(&self) -> Result<Account, LedgerError> {
    self
      .accounts
      .get_by_name(&self.rewards_account)
      .await
      .map_err(|e| {
        error!(error = %e, "Reward account does not exist");
        if e.is_not_found() {
          LedgerError::RewardsAccountMissing(self.rewards_account.clone())
        } else {
          LedgerError::Storage(e)
        }
      })
  }
}
