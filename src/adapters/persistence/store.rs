//! Record Store - Concrete Adapter for the Repository Ports
//!
//! Holds accounts, assets, claims and share transactions behind
//! `tokio::sync::RwLock`s and implements every repository trait from
//! `crate::ports::repository`.
//!
//! Two modes:
//! - in-memory: collections live only in the process
//! - file-backed: each write is persisted before it becomes visible
//!   (atomic JSON snapshots, append-only JSONL for share transactions)
//!
//! Collections keep insertion order, which is the enumeration order the
//! asset listing relies on. Claims are unique per user name.

use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::info;

use super::snapshot::SnapshotFile;
use super::transaction_log::TransactionLog;
use crate::domain::{Account, Asset, Claim, ShareTransaction};
use crate::ports::repository::{
    AccountRepository, AssetRepository, ClaimRepository, RepoResult, RepositoryError,
    ShareRepository,
};

/// On-disk files backing a persistent store.
struct StoreFiles {
    accounts: SnapshotFile,
    assets: SnapshotFile,
    claims: SnapshotFile,
    shares: TransactionLog,
}

/// In-process record store with optional file persistence.
pub struct RecordStore {
    accounts: RwLock<Vec<Account>>,
    assets: RwLock<Vec<Asset>>,
    claims: RwLock<Vec<Claim>>,
    shares: RwLock<Vec<ShareTransaction>>,
    files: Option<StoreFiles>,
}

impl RecordStore {
    /// Empty store that never touches the disk.
    pub fn in_memory() -> Self {
        Self {
            accounts: RwLock::new(Vec::new()),
            assets: RwLock::new(Vec::new()),
            claims: RwLock::new(Vec::new()),
            shares: RwLock::new(Vec::new()),
            files: None,
        }
    }

    /// Open (or create) a file-backed store in `data_dir`.
    pub async fn open(data_dir: &str) -> Result<Self> {
        let dir = Path::new(data_dir);
        fs::create_dir_all(dir)
            .await
            .context("Failed to create data directory")?;

        let files = StoreFiles {
            accounts: SnapshotFile::new(dir, "accounts"),
            assets: SnapshotFile::new(dir, "assets"),
            claims: SnapshotFile::new(dir, "claims"),
            shares: TransactionLog::new(dir),
        };

        let accounts: Vec<Account> = files.accounts.load().await?;
        let assets: Vec<Asset> = files.assets.load().await?;
        let claims: Vec<Claim> = files.claims.load().await?;
        let shares = files.shares.load_all().await?;

        info!(
            data_dir,
            accounts = accounts.len(),
            assets = assets.len(),
            claims = claims.len(),
            shares = shares.len(),
            "Record store opened"
        );

        Ok(Self {
            accounts: RwLock::new(accounts),
            assets: RwLock::new(assets),
            claims: RwLock::new(claims),
            shares: RwLock::new(shares),
            files: Some(files),
        })
    }

    pub const fn is_persistent(&self) -> bool {
        self.files.is_some()
    }

    /// Whether the backing files are readable and writable.
    pub async fn is_healthy(&self) -> bool {
        match &self.files {
            None => true,
            Some(files) => {
                files.accounts.is_healthy().await
                    && files.assets.is_healthy().await
                    && files.claims.is_healthy().await
                    && files.shares.is_healthy().await
            }
        }
    }
}

/// Persist `next` (if file-backed), then make it the visible collection.
async fn commit<T: Serialize + Sync>(
    file: Option<&SnapshotFile>,
    current: &mut Vec<T>,
    next: Vec<T>,
) -> RepoResult<()> {
    if let Some(file) = file {
        file.save(&next).await.map_err(database_error)?;
    }
    *current = next;
    Ok(())
}

fn database_error(e: anyhow::Error) -> RepositoryError {
    RepositoryError::Database(format!("{e:#}"))
}

#[async_trait]
impl AccountRepository for RecordStore {
    async fn save(&self, account: &Account) -> RepoResult<()> {
        let mut accounts = self.accounts.write().await;
        if accounts.iter().any(|a| a.name == account.name) {
            return Err(RepositoryError::AlreadyExists(account.name.clone()));
        }
        let mut next = accounts.clone();
        next.push(account.clone());
        commit(self.files.as_ref().map(|f| &f.accounts), &mut *accounts, next).await
    }

    async fn update(&self, account: &Account) -> RepoResult<()> {
        let mut accounts = self.accounts.write().await;
        let index = accounts
            .iter()
            .position(|a| a.name == account.name)
            .ok_or_else(|| RepositoryError::AccountNotFound(account.name.clone()))?;
        let mut next = accounts.clone();
        next[index] = account.clone();
        commit(self.files.as_ref().map(|f| &f.accounts), &mut *accounts, next).await
    }

    async fn get_all(&self) -> RepoResult<Vec<Account>> {
        Ok(self.accounts.read().await.clone())
    }

    async fn get_by_name(&self, name: &str) -> RepoResult<Account> {
        self.accounts
            .read()
            .await
            .iter()
            .find(|a| a.name == name)
            .cloned()
            .ok_or_else(|| RepositoryError::AccountNotFound(name.to_string()))
    }
}

#[async_trait]
impl AssetRepository for RecordStore {
    async fn save(&self, asset: &Asset) -> RepoResult<()> {
        let mut assets = self.assets.write().await;
        if assets.iter().any(|a| a.name == asset.name) {
            return Err(RepositoryError::AlreadyExists(asset.name.clone()));
        }
        let mut next = assets.clone();
        next.push(asset.clone());
        commit(self.files.as_ref().map(|f| &f.assets), &mut *assets, next).await
    }

    async fn update_price(&self, name: &str, price: Decimal) -> RepoResult<()> {
        let mut assets = self.assets.write().await;
        let index = assets
            .iter()
            .position(|a| a.name == name)
            .ok_or_else(|| RepositoryError::AssetNotFound(name.to_string()))?;
        let mut next = assets.clone();
        next[index].price = price;
        commit(self.files.as_ref().map(|f| &f.assets), &mut *assets, next).await
    }

    async fn get_all(&self) -> RepoResult<Vec<Asset>> {
        Ok(self.assets.read().await.clone())
    }

    async fn get_by_name(&self, name: &str) -> RepoResult<Asset> {
        self.assets
            .read()
            .await
            .iter()
            .find(|a| a.name == name)
            .cloned()
            .ok_or_else(|| RepositoryError::AssetNotFound(name.to_string()))
    }
}

#[async_trait]
impl ClaimRepository for RecordStore {
    async fn save(&self, claim: &Claim) -> RepoResult<()> {
        let mut claims = self.claims.write().await;
        if claims.iter().any(|c| c.name == claim.name) {
            return Err(RepositoryError::DuplicateClaim(claim.name.clone()));
        }
        let mut next = claims.clone();
        next.push(claim.clone());
        commit(self.files.as_ref().map(|f| &f.claims), &mut *claims, next).await
    }

    async fn get_all(&self) -> RepoResult<Vec<Claim>> {
        Ok(self.claims.read().await.clone())
    }

    async fn get_by_name(&self, name: &str) -> RepoResult<Claim> {
        self.claims
            .read()
            .await
            .iter()
            .find(|c| c.name == name)
            .cloned()
            .ok_or_else(|| RepositoryError::ClaimNotFound(name.to_string()))
    }
}

#[async_trait]
impl ShareRepository for RecordStore {
    async fn save(&self, transaction: &ShareTransaction) -> RepoResult<()> {
        let mut shares = self.shares.write().await;
        if let Some(files) = &self.files {
            files
                .shares
                .append(transaction)
                .await
                .map_err(database_error)?;
        }
        shares.push(transaction.clone());
        Ok(())
    }

    async fn get_all(&self) -> RepoResult<Vec<ShareTransaction>> {
        Ok(self.shares.read().await.clone())
    }

    async fn get_by_account(&self, account: &str) -> RepoResult<Vec<ShareTransaction>> {
        Ok(self
            .shares
            .read()
            .await
            .iter()
            .filter(|t| t.account == account)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Lot;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_account_round_trip_in_memory() {
        let store = RecordStore::in_memory();
        let mut account = Account::with_cash("rewards", dec!(250));
        account.stocks.push(Lot::new("AAPL", 3, dec!(1.5)));

        AccountRepository::save(&store, &account).await.unwrap();
        let loaded = AccountRepository::get_by_name(&store, "rewards").await.unwrap();
        assert_eq!(loaded, account);
    }

    #[tokio::test]
    async fn test_account_round_trip_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().to_str().unwrap();

        let mut account = Account::with_cash("rewards", dec!(99.5));
        account.stocks.push(Lot::new("WWW", 2, dec!(10.25)));
        {
            let store = RecordStore::open(data_dir).await.unwrap();
            assert!(store.is_persistent());
            AccountRepository::save(&store, &account).await.unwrap();
            ClaimRepository::save(&store, &Claim::single("alice", "WWW", 2, dec!(20.5)))
                .await
                .unwrap();
        }

        let reopened = RecordStore::open(data_dir).await.unwrap();
        let loaded = AccountRepository::get_by_name(&reopened, "rewards").await.unwrap();
        assert_eq!(loaded.cash, dec!(99.5));
        assert_eq!(loaded.stocks, account.stocks);
        assert!(ClaimRepository::get_by_name(&reopened, "alice").await.is_ok());
        assert!(reopened.is_healthy().await);
    }

    #[tokio::test]
    async fn test_claims_are_unique_per_user() {
        let store = RecordStore::in_memory();
        let claim = Claim::single("alice", "AAPL", 5, dec!(5));
        ClaimRepository::save(&store, &claim).await.unwrap();

        let err = ClaimRepository::save(&store, &claim).await.unwrap_err();
        assert_eq!(err, RepositoryError::DuplicateClaim("alice".to_string()));
        assert_eq!(ClaimRepository::get_all(&store).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_records_are_not_found() {
        let store = RecordStore::in_memory();
        let err = AccountRepository::update(&store, &Account::open("ghost"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(matches!(
            AssetRepository::get_by_name(&store, "NOPE").await,
            Err(RepositoryError::AssetNotFound(_))
        ));
        assert!(matches!(
            ClaimRepository::get_by_name(&store, "ghost").await,
            Err(RepositoryError::ClaimNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_assets_keep_insertion_order() {
        let store = RecordStore::in_memory();
        for (name, price) in [("MSFT", dec!(100)), ("AAPL", dec!(1)), ("WWW", dec!(10))] {
            AssetRepository::save(&store, &Asset::new(name, price)).await.unwrap();
        }
        AssetRepository::update_price(&store, "AAPL", dec!(1.25)).await.unwrap();

        let names: Vec<String> = AssetRepository::get_all(&store)
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(names, vec!["MSFT", "AAPL", "WWW"]);
        assert_eq!(
            AssetRepository::get_by_name(&store, "AAPL").await.unwrap().price,
            dec!(1.25)
        );
    }

    #[tokio::test]
    async fn test_share_transactions_by_account() {
        let store = RecordStore::in_memory();
        ShareRepository::save(&store, &ShareTransaction::single("alice", "AAPL", 1, dec!(1)))
            .await
            .unwrap();
        ShareRepository::save(&store, &ShareTransaction::single("bob", "AAPL", 2, dec!(2)))
            .await
            .unwrap();

        let alice = store.get_by_account("alice").await.unwrap();
        assert_eq!(alice.len(), 1);
        assert_eq!(alice[0].amount, dec!(1));
    }
}
