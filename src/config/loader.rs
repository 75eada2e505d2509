//! Configuration Loader - File Loading and Validation
//!
//! Handles loading the TOML config, validating all parameters,
//! and providing clear error messages for misconfiguration.

use std::path::Path;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use tracing::info;

use super::{AppConfig, CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH};

/// Config path from `FREE_SHARE_CONFIG`, or `config.toml`.
pub fn config_path() -> String {
  std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
}

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let config = parse_config(&content)?;

  info!(
    path = %path.display(),
    buckets = config.claims.buckets.len(),
    assets = config.assets.len(),
    backend = ?config.persistence.backend,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Parse and validate configuration text.
pub fn parse_config(content: &str) -> Result<AppConfig> {
  let config: AppConfig = toml::from_str(content).context("Failed to parse config")?;
  validate_config(&config)?;
  Ok(config)
}

/// Validate all configuration parameters.
///
/// Checks for:
/// - A named reward account with non-negative starting cash
/// - Buckets inside [0, 1) with non-empty, non-overlapping ranges
/// - Positive seed prices and price floor
fn validate_config(config: &AppConfig) -> Result<()> {
  // Reward account
  anyhow::ensure!(
    !config.rewards.account.trim().is_empty(),
    "rewards.account must not be empty"
  );
  anyhow::ensure!(
    config.rewards.initial_cash >= Decimal::ZERO,
    "rewards.initial_cash must be non-negative, got {}",
    config.rewards.initial_cash
  );

  // Buckets
  for (i, bucket) in config.claims.buckets.iter().enumerate() {
    anyhow::ensure!(
      (0.0..1.0).contains(&bucket.p0) && bucket.p1 > 0.0 && bucket.p1 <= 1.0,
      "Bucket {i} probability range [{}, {}) is outside [0, 1)",
      bucket.p0,
      bucket.p1
    );
    anyhow::ensure!(
      bucket.p0 < bucket.p1,
      "Bucket {i} has inverted probability range [{}, {})",
      bucket.p0,
      bucket.p1
    );
    anyhow::ensure!(
      bucket.min < bucket.max,
      "Bucket {i} has empty value range [{}, {})",
      bucket.min,
      bucket.max
    );
  }

  let mut ranges: Vec<(f64, f64)> = config
    .claims
    .buckets
    .iter()
    .map(|b| (b.p0, b.p1))
    .collect();
  ranges.sort_by(|a, b| a.0.total_cmp(&b.0));
  for pair in ranges.windows(2) {
    anyhow::ensure!(
      pair[0].1 <= pair[1].0,
      "Buckets [{}, {}) and [{}, {}) overlap",
      pair[0].0,
      pair[0].1,
      pair[1].0,
      pair[1].1
    );
  }

  // Market
  anyhow::ensure!(
    config.market.price_floor > Decimal::ZERO,
    "market.price_floor must be positive, got {}",
    config.market.price_floor
  );

  // Assets
  for asset in &config.assets {
    anyhow::ensure!(!asset.name.trim().is_empty(), "Asset name must not be empty");
    if let Some(price) = asset.price {
      anyhow::ensure!(
        price > Decimal::ZERO,
        "Asset {} must have a positive price, got {}",
        asset.name,
        price
      );
    }
  }

  // Persistence
  anyhow::ensure!(
    !config.persistence.data_dir.trim().is_empty(),
    "persistence.data_dir must not be empty"
  );

  Ok(())
}
