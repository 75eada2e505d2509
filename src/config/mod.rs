//! Configuration Module - TOML-based Service Configuration
//!
//! Loads and validates configuration from `config.toml` (or the file
//! named by `FREE_SHARE_CONFIG`). Reward sizing buckets, the reward
//! account, seed assets and storage are externalized here; nothing is
//! hardcoded in the domain layer.

pub mod loader;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

use crate::domain::account::DEFAULT_ASSET_PRICE;
use crate::domain::price_walk::DEFAULT_PRICE_FLOOR;
use crate::domain::{Asset, BucketTable, RewardBucket};

/// Env var overriding the config file path.
pub const CONFIG_PATH_ENV: &str = "FREE_SHARE_CONFIG";

/// Config file used when `FREE_SHARE_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Top-level service configuration.
///
/// Every section is optional; a missing section takes its defaults.
/// All values are validated before the service starts.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
  /// Service identity and logging.
  pub service: ServiceConfig,
  /// HTTP listener.
  pub server: ServerConfig,
  /// Reward account settings.
  pub rewards: RewardsConfig,
  /// Free-share sizing.
  pub claims: ClaimsConfig,
  /// Price simulation.
  pub market: MarketConfig,
  /// Storage backend.
  pub persistence: PersistenceConfig,
  /// Assets seeded at startup when missing from storage.
  pub assets: Vec<AssetConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
  /// Human-readable service name.
  #[serde(default = "default_name")]
  pub name: String,
  /// Log level (trace, debug, info, warn, error), used when `RUST_LOG`
  /// is unset.
  #[serde(default = "default_log_level")]
  pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_bind_address")]
  pub bind_address: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RewardsConfig {
  /// Name of the firm account that buys and hands out reward shares.
  #[serde(default = "default_reward_account")]
  pub account: String,
  /// Cash given to the reward account when it is first created.
  #[serde(default = "default_initial_cash")]
  pub initial_cash: Decimal,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClaimsConfig {
  /// Ordered probability buckets. Empty means always use the fallback.
  #[serde(default)]
  pub buckets: Vec<RewardBucket>,
  /// Seed for the sizing draws; entropy when absent.
  pub seed: Option<u64>,
}

impl ClaimsConfig {
  pub fn bucket_table(&self) -> BucketTable {
    BucketTable::new(self.buckets.clone())
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarketConfig {
  /// Random-walk prices after each price read.
  #[serde(default = "default_true")]
  pub fluctuate: bool,
  /// Delay before a scheduled fluctuation runs (milliseconds).
  #[serde(default = "default_fluctuation_delay_ms")]
  pub fluctuation_delay_ms: u64,
  /// Lowest price the walk can reach.
  #[serde(default = "default_price_floor")]
  pub price_floor: Decimal,
  /// Seed for the price walk; entropy when absent.
  pub seed: Option<u64>,
}

/// Where records live.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
  #[default]
  Memory,
  File,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PersistenceConfig {
  #[serde(default)]
  pub backend: StorageBackend,
  /// Directory for JSON snapshots and the share log (file backend).
  #[serde(default = "default_data_dir")]
  pub data_dir: String,
}

/// Seed asset definition.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetConfig {
  /// Ticker symbol.
  pub name: String,
  /// Starting price; defaults to 10.0.
  pub price: Option<Decimal>,
}

impl AssetConfig {
  pub fn to_asset(&self) -> Asset {
    Asset::new(&self.name, self.price.unwrap_or(DEFAULT_ASSET_PRICE))
  }
}

impl Default for ServiceConfig {
  fn default() -> Self {
    Self {
      name: default_name(),
      log_level: default_log_level(),
    }
  }
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      bind_address: default_bind_address(),
    }
  }
}

impl Default for RewardsConfig {
  fn default() -> Self {
    Self {
      account: default_reward_account(),
      initial_cash: default_initial_cash(),
    }
  }
}

impl Default for MarketConfig {
  fn default() -> Self {
    Self {
      fluctuate: true,
      fluctuation_delay_ms: default_fluctuation_delay_ms(),
      price_floor: default_price_floor(),
      seed: None,
    }
  }
}

impl Default for PersistenceConfig {
  fn default() -> Self {
    Self {
      backend: StorageBackend::default(),
      data_dir: default_data_dir(),
    }
  }
}

// Default value functions for serde

fn default_name() -> String {
  "free-share-rewards".to_string()
}

fn default_log_level() -> String {
  "info".to_string()
}

fn default_bind_address() -> String {
  "0.0.0.0:8080".to_string()
}

fn default_reward_account() -> String {
  "rewards".to_string()
}

fn default_initial_cash() -> Decimal {
  dec!(1000000)
}

fn default_true() -> bool {
  true
}

fn default_fluctuation_delay_ms() -> u64 {
  100
}

fn default_price_floor() -> Decimal {
  DEFAULT_PRICE_FLOOR
}

fn default_data_dir() -> String {
  "data".to_string()
}
