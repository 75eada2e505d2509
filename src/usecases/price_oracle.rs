//! Asset Price Oracle - Tradable Assets and Live Prices
//!
//! Lists tradable assets and reads their latest prices from the asset
//! repository. Every read schedules a fire-and-forget price walk over
//! all known assets to simulate a live market:
//! - The walk runs on a spawned tokio task after a short delay
//! - Each asset is updated independently
//! - Failures are logged and swallowed, never surfaced to the reader
//!
//! Readers may observe either the pre- or post-walk price.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use rand::rngs::StdRng;
use rust_decimal::Decimal;
use tracing::{debug, error, instrument, warn};

use crate::domain::{PriceWalk, TickerSymbol};
use crate::ports::{AssetRepository, RepoResult};

/// Price returned for an unknown asset or a failed lookup.
pub const UNKNOWN_PRICE: Decimal = Decimal::NEGATIVE_ONE;

/// Background price walker shared with spawned tasks.
#[derive(Clone)]
struct Fluctuator {
  assets: Arc<dyn AssetRepository>,
  walk: PriceWalk,
  rng: Arc<Mutex<StdRng>>,
  delay: Duration,
}

impl Fluctuator {
  /// Walk every known asset once. Returns how many prices were updated.
  async fn run(&self) -> RepoResult<usize> {
    let assets = self.assets.get_all().await?;

    let next_prices: Vec<(TickerSymbol, Decimal)> = {
      let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
      assets
        .iter()
        .map(|asset| (asset.name.clone(), self.walk.step(asset.price, &mut *rng)))
        .collect()
    };

    let mut updated = 0;
    for (name, price) in &next_prices {
      match self.assets.update_price(name, *price).await {
        Ok(()) => updated += 1,
        Err(e) => warn!(asset = %name, error = %e, "Price update skipped"),
      }
    }

    Ok(updated)
  }
}

/// Reads asset listings and prices; nudges prices after each read.
pub struct AssetPriceOracle {
  assets: Arc<dyn AssetRepository>,
  fluctuator: Option<Fluctuator>,
}

impl AssetPriceOracle {
  /// Create an oracle with a static market (no price walk).
  pub fn new(assets: Arc<dyn AssetRepository>) -> Self {
    Self {
      assets,
      fluctuator: None,
    }
  }

  /// Enable the post-read price walk.
  pub fn with_fluctuation(mut self, walk: PriceWalk, rng: StdRng, delay: Duration) -> Self {
    self.fluctuator = Some(Fluctuator {
      assets: Arc::clone(&self.assets),
      walk,
      rng: Arc::new(Mutex::new(rng)),
      delay,
    });
    self
  }

  /// Ticker symbols in storage enumeration order.
  ///
  /// A storage failure is logged and reported as an empty listing.
  #[instrument(skip(self))]
  pub async fn list_tradable_assets(&self) -> Vec<TickerSymbol> {
    let result = self.assets.get_all().await;
    self.schedule_fluctuation();

    match result {
      Ok(assets) => assets.into_iter().map(|asset| asset.name).collect(),
      Err(e) => {
        error!(error = %e, "Cannot get assets");
        Vec::new()
      }
    }
  }

  /// Latest price of `ticker`, or `UNKNOWN_PRICE` if it cannot be read.
  #[instrument(skip(self))]
  pub async fn get_latest_price(&self, ticker: &str) -> Decimal {
    let result = self.assets.get_by_name(ticker).await;
    self.schedule_fluctuation();

    match result {
      Ok(asset) => asset.price,
      Err(e) => {
        debug!(error = %e, "Price unavailable");
        UNKNOWN_PRICE
      }
    }
  }

  /// Walk all prices immediately, bypassing the scheduling delay.
  ///
  /// Returns the number of assets updated, or 0 when the walk is disabled.
  pub async fn fluctuate_now(&self) -> RepoResult<usize> {
    match &self.fluctuator {
      Some(fluctuator) => fluctuator.run().await,
      None => Ok(0),
    }
  }

  /// Spawn the delayed price walk if enabled.
  fn schedule_fluctuation(&self) {
    let Some(fluctuator) = self.fluctuator.clone() else {
      return;
    };

    tokio::spawn(async move {
      tokio::time::sleep(fluctuator.delay).await;
      match fluctuator.run().await {
        Ok(updated) => debug!(updated, "Asset prices fluctuated"),
        Err(e) => warn!(error = %e, "Price fluctuation failed"),
      }
    });
  }
}
