//! Affordable asset selection.
//!
//! Scans a price snapshot in listing order and picks the first asset
//! whose price fits the target reward value.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

use super::account::TickerSymbol;

/// Asset chosen for a reward, with the whole-share quantity to buy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetPick {
    pub ticker_symbol: TickerSymbol,
    pub price: Decimal,
    pub quantity: u32,
}

/// First asset with `0 < price <= target_value`, buying `floor(target / price)`.
///
/// Non-positive prices (the oracle's unknown-asset sentinel) are skipped.
pub fn pick_affordable(
    snapshot: &[(TickerSymbol, Decimal)],
    target_value: u32,
) -> Option<AssetPick> {
    let target = Decimal::from(target_value);
    snapshot.iter().find_map(|(ticker, price)| {
        if *price <= Decimal::ZERO {
            return None;
        }
        let quantity = target.checked_div(*price)?.floor().to_u32()?;
        (quantity >= 1).then(|| AssetPick {
            ticker_symbol: ticker.clone(),
            price: *price,
            quantity,
        })
    })
}
