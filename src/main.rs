//! Free Share Rewards - Entry Point
//!
//! Initializes configuration, logging, storage and the reward use
//! cases, then serves the HTTP API until SIGINT.
//!
//! Wiring sequence:
//! 1. Load config (FREE_SHARE_CONFIG or config.toml) + validate
//! 2. Init tracing (JSON structured logging)
//! 3. Open the record store (memory or file backend)
//! 4. Seed configured assets and provision the reward account
//! 5. Build the price oracle, ledger, claim allocator and share purchase
//! 6. Serve the API, probes and metrics on one listener
//! 7. Wait for SIGINT → readiness 503 → drain the server → exit

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use free_share_rewards::adapters::api::{self, ApiState};
use free_share_rewards::adapters::market::SystemMarketClock;
use free_share_rewards::adapters::metrics::{HealthState, MetricsRegistry};
use free_share_rewards::adapters::persistence::RecordStore;
use free_share_rewards::config::{self, AppConfig, AssetConfig, StorageBackend};
use free_share_rewards::domain::PriceWalk;
use free_share_rewards::ports::{AssetRepository, MarketClock};
use free_share_rewards::usecases::{AccountLedger, AssetPriceOracle, ClaimAllocator, SharePurchase};

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Load configuration ───────────────────────────────
    let config_path = config::loader::config_path();
    let config = config::loader::load_config(&config_path)
        .context("Failed to load configuration")?;

    // ── 2. Initialize structured JSON logging ───────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.service.log_level)),
        )
        .json()
        .init();

    info!(
        name = %config.service.name,
        version = env!("CARGO_PKG_VERSION"),
        config = %config_path,
        backend = ?config.persistence.backend,
        "Starting free share rewards service"
    );

    // ── 3. Open storage ─────────────────────────────────────
    let store = Arc::new(match config.persistence.backend {
        StorageBackend::Memory => RecordStore::in_memory(),
        StorageBackend::File => RecordStore::open(&config.persistence.data_dir)
            .await
            .context("Failed to open file store")?,
    });

    // ── 4. Seed assets + reward account ─────────────────────
    seed_assets(store.as_ref(), &config.assets).await?;

    let clock: Arc<dyn MarketClock> = Arc::new(SystemMarketClock);
    let ledger = Arc::new(AccountLedger::new(
        store.clone(),
        store.clone(),
        Arc::clone(&clock),
        config.rewards.account.clone(),
    ));
    ledger
        .provision_rewards_account(config.rewards.initial_cash)
        .await
        .context("Failed to provision reward account")?;

    // ── 5. Use cases ────────────────────────────────────────
    let oracle = Arc::new(build_oracle(&config, store.clone()));
    let allocator = Arc::new(ClaimAllocator::new(
        store.clone(),
        Arc::clone(&clock),
        oracle,
        Arc::clone(&ledger),
        config.claims.bucket_table(),
        seeded_rng(config.claims.seed),
    ));
    let purchases = Arc::new(SharePurchase::new(store.clone(), clock, ledger));

    // ── 6. HTTP server ──────────────────────────────────────
    let metrics = Arc::new(MetricsRegistry::new().context("Failed to register metrics")?);
    let health = Arc::new(HealthState::new(Arc::clone(&store)));
    let app = api::router(
        ApiState {
            allocator,
            purchases,
            metrics,
        },
        Arc::clone(&health),
    );

    let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(1);
    let bind_address = config.server.bind_address.clone();
    let server_handle = tokio::spawn(async move {
        if let Err(e) = api::serve(&bind_address, app, shutdown_rx).await {
            error!(error = %e, "HTTP server failed");
        }
    });

    info!("Service is running");

    // ── 7. Wait for SIGINT ──────────────────────────────────
    if let Err(e) = signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for SIGINT, shutting down");
    } else {
        info!("SIGINT received, initiating graceful shutdown");
    }

    health.mark_shutting_down();
    let _ = shutdown_tx.send(());

    if tokio::time::timeout(Duration::from_secs(10), server_handle)
        .await
        .is_err()
    {
        warn!("HTTP server did not drain within 10s");
    }

    info!("Shutdown complete");
    Ok(())
}

/// Save every configured asset that storage does not know yet.
async fn seed_assets(assets: &dyn AssetRepository, configured: &[AssetConfig]) -> Result<()> {
    let mut seeded = 0usize;
    for entry in configured {
        match assets.get_by_name(&entry.name).await {
            Ok(_) => {}
            Err(e) if e.is_not_found() => {
                assets
                    .save(&entry.to_asset())
                    .await
                    .with_context(|| format!("Failed to seed asset {}", entry.name))?;
                seeded += 1;
            }
            Err(e) => return Err(e).context("Failed to read assets"),
        }
    }
    info!(seeded, configured = configured.len(), "Assets seeded");
    Ok(())
}

fn build_oracle(config: &AppConfig, assets: Arc<dyn AssetRepository>) -> AssetPriceOracle {
    let oracle = AssetPriceOracle::new(assets);
    if !config.market.fluctuate {
        return oracle;
    }
    oracle.with_fluctuation(
        PriceWalk::new(config.market.price_floor),
        seeded_rng(config.market.seed),
        Duration::from_millis(config.market.fluctuation_delay_ms),
    )
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64)
}
