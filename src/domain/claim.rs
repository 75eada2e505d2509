//! Claim and share-transaction records.
//!
//! A `Claim` is the durable, one-per-user proof that a free share was
//! granted. `ShareTransaction` is the append-only record written by the
//! explicit buy flow.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::account::TickerSymbol;

/// One granted position inside a claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimedStock {
    pub ticker_symbol: TickerSymbol,
    pub quantity: u32,
}

/// Idempotency record: exists once per user who has claimed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    /// User name (unique key).
    pub name: String,
    /// Shares granted.
    pub stocks: Vec<ClaimedStock>,
    /// Total value granted, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
}

impl Claim {
    /// Claim for a single granted lot.
    pub fn single(name: &str, ticker_symbol: &str, quantity: u32, amount: Decimal) -> Self {
        Self {
            name: name.to_string(),
            stocks: vec![ClaimedStock {
                ticker_symbol: ticker_symbol.to_string(),
                quantity,
            }],
            amount: Some(amount),
        }
    }

    /// Total number of shares granted by this claim.
    pub fn share_count(&self) -> u64 {
        self.stocks.iter().map(|s| u64::from(s.quantity)).sum()
    }
}

/// Line item of a share transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub ticker_symbol: TickerSymbol,
    pub quantity: u32,
    /// Total paid for the line.
    pub share_price_paid: Decimal,
}

/// Append-only record of an explicit share purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareTransaction {
    pub id: Uuid,
    /// Account credited with the shares.
    pub account: String,
    pub order: Vec<OrderItem>,
    pub amount: Decimal,
    pub date: DateTime<Utc>,
}

impl ShareTransaction {
    /// Record a single-line purchase made now.
    pub fn single(account: &str, ticker_symbol: &str, quantity: u32, share_price_paid: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            account: account.to_string(),
            order: vec![OrderItem {
                ticker_symbol: ticker_symbol.to_string(),
                quantity,
                share_price_paid,
            }],
            amount: share_price_paid,
            date: Utc::now(),
        }
    }
}

/// Running totals over every claim granted so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimTotals {
    pub total_amount: Decimal,
    pub total_stock: u64,
    pub total_users: u64,
}

impl ClaimTotals {
    /// Fold a set of existing claims into totals.
    pub fn from_claims<'a>(claims: impl IntoIterator<Item = &'a Claim>) -> Self {
        let mut totals = Self::default();
        for claim in claims {
            totals.record(claim);
        }
        totals
    }

    /// Account for one more granted claim.
    pub fn record(&mut self, claim: &Claim) {
        self.total_amount += claim.amount.unwrap_or_default();
        self.total_stock += claim.share_count();
        self.total_users += 1;
    }
}
