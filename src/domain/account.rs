//! Account and asset domain types.
//!
//! An account owns a cash balance and an ordered list of lots. The
//! firm's reward account and every user account share this shape.
//! Assets are the tradable instruments, keyed by ticker symbol.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────
// Identifiers
// ────────────────────────────────────────────

/// Ticker symbol of a tradable asset (also the asset's unique name).
pub type TickerSymbol = String;

/// Unique account name. User accounts are named after the user.
pub type AccountName = String;

/// Price given to assets seeded without an explicit price.
pub const DEFAULT_ASSET_PRICE: Decimal = dec!(10);

// ────────────────────────────────────────────
// Lots and accounts
// ────────────────────────────────────────────

/// One discrete holding entry inside an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lot {
    /// Asset held.
    pub ticker_symbol: TickerSymbol,
    /// Whole number of shares (never fractional, never zero).
    pub quantity: u32,
    /// Unit price paid when the lot was bought.
    pub share_price: Decimal,
}

impl Lot {
    /// Create a lot bought at `share_price` per share.
    pub fn new(ticker_symbol: impl Into<TickerSymbol>, quantity: u32, share_price: Decimal) -> Self {
        Self {
            ticker_symbol: ticker_symbol.into(),
            quantity,
            share_price,
        }
    }

    /// Whether this lot is the `(ticker, quantity)` pair being looked up.
    pub fn matches(&self, ticker_symbol: &str, quantity: u32) -> bool {
        self.quantity == quantity && self.ticker_symbol == ticker_symbol
    }

    /// Total price paid for the lot.
    pub fn cost(&self) -> Decimal {
        self.share_price * Decimal::from(self.quantity)
    }
}

/// A firm or user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Storage identifier (same as the name).
    pub id: String,
    /// Unique account name.
    pub name: AccountName,
    /// Cash balance. Not clamped at zero.
    pub cash: Decimal,
    /// Holdings in purchase order.
    pub stocks: Vec<Lot>,
}

impl Account {
    /// Open an empty account with zero cash, as done for first-time claimers.
    pub fn open(name: &str) -> Self {
        Self::with_cash(name, Decimal::ZERO)
    }

    /// Open an account funded with `cash`.
    pub fn with_cash(name: &str, cash: Decimal) -> Self {
        Self {
            id: name.to_string(),
            name: name.to_string(),
            cash,
            stocks: Vec::new(),
        }
    }

    /// Remove and return the first lot matching `(ticker, quantity)`.
    ///
    /// Only that single lot is removed; identical lots later in the list
    /// stay in place.
    pub fn take_lot(&mut self, ticker_symbol: &str, quantity: u32) -> Option<Lot> {
        let index = self
            .stocks
            .iter()
            .position(|lot| lot.matches(ticker_symbol, quantity))?;
        Some(self.stocks.remove(index))
    }

    /// Number of shares of `ticker_symbol` held across all lots.
    pub fn shares_of(&self, ticker_symbol: &str) -> u64 {
        self.stocks
            .iter()
            .filter(|lot| lot.ticker_symbol == ticker_symbol)
            .map(|lot| u64::from(lot.quantity))
            .sum()
    }
}

// ────────────────────────────────────────────
// Assets
// ────────────────────────────────────────────

/// A tradable asset and its current price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// Storage identifier (same as the name).
    pub id: String,
    /// Ticker symbol.
    pub name: TickerSymbol,
    /// Current price, strictly positive.
    pub price: Decimal,
}

impl Asset {
    pub fn new(name: &str, price: Decimal) -> Self {
        Self {
            id: name.to_string(),
            name: name.to_string(),
            price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_account_is_empty() {
        let account = Account::open("alice");
        assert_eq!(account.name, "alice");
        assert_eq!(account.id, "alice");
        assert_eq!(account.cash, Decimal::ZERO);
        assert!(account.stocks.is_empty());
    }

    #[test]
    fn test_take_lot_removes_only_first_match() {
        let mut account = Account::with_cash("rewards", dec!(100));
        account.stocks.push(Lot::new("AAPL", 5, dec!(1)));
        account.stocks.push(Lot::new("MSFT", 1, dec!(100)));
        account.stocks.push(Lot::new("AAPL", 5, dec!(1.2)));

        let lot = account.take_lot("AAPL", 5).unwrap();
        assert_eq!(lot.share_price, dec!(1));
        assert_eq!(account.stocks.len(), 2);
        assert_eq!(account.stocks[0].ticker_symbol, "MSFT");
        assert_eq!(account.stocks[1].share_price, dec!(1.2));
    }

    #[test]
    fn test_take_lot_requires_exact_quantity() {
        let mut account = Account::open("rewards");
        account.stocks.push(Lot::new("AAPL", 5, dec!(1)));
        assert!(account.take_lot("AAPL", 4).is_none());
        assert_eq!(account.stocks.len(), 1);
    }

    #[test]
    fn test_lot_serializes_camel_case() {
        let json = serde_json::to_value(Lot::new("AAPL", 2, dec!(1.5))).unwrap();
        assert_eq!(json["tickerSymbol"], "AAPL");
        assert_eq!(json["sharePrice"], 1.5);
        assert_eq!(Lot::new("AAPL", 2, dec!(1.5)).cost(), dec!(3));
    }
}
