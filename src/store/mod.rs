// 🗄️ Ledger Store - persistence for accounts and transactions
//
// One async interface, two interchangeable backends picked from config:
//   SqliteStore   - file database, fresh connection per call
//   PostgresStore - network database behind a sqlx pool

pub mod sqlite;

#[cfg(feature = "postgres")]
pub mod postgres;

use crate::config::{Config, StorageBackend};
use crate::error::Result;
use crate::models::{Account, DateRange, NewTransaction, Transaction};
use async_trait::async_trait;
use std::sync::Arc;

pub use sqlite::SqliteStore;

#[cfg(feature = "postgres")]
pub use postgres::PostgresStore;

#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Create both tables if they are missing. Idempotent.
    async fn init_schema(&self) -> Result<()>;

    /// Fails with a validation error when the trimmed name is empty.
    async fn create_account(&self, name: &str) -> Result<Account>;

    /// Removes the account and every transaction touching it. No-op for unknown ids.
    async fn delete_account(&self, id: i64) -> Result<()>;

    /// `NotFound` when no account has this id.
    async fn get_account(&self, id: i64) -> Result<Account>;

    /// Ordered by id.
    async fn list_accounts(&self) -> Result<Vec<Account>>;

    /// Fails with a validation error when either account does not exist.
    async fn create_transaction(&self, tx: NewTransaction) -> Result<Transaction>;

    /// Returns how many rows were removed; unknown ids are ignored.
    async fn delete_transactions(&self, ids: &[i64]) -> Result<usize>;

    /// Ordered by date, then id. `None` lists everything.
    async fn list_transactions(&self, range: Option<DateRange>) -> Result<Vec<Transaction>>;
}

/// Build the store the config selects and make sure its schema exists.
pub async fn open_store(config: &Config) -> Result<Arc<dyn LedgerStore>> {
    let store: Arc<dyn LedgerStore> = match &config.backend {
        StorageBackend::Sqlite(path) => Arc::new(SqliteStore::new(path.clone())),
        #[cfg(feature = "postgres")]
        StorageBackend::Postgres(url) => Arc::new(PostgresStore::connect(url).await?),
        #[cfg(not(feature = "postgres"))]
        StorageBackend::Postgres(_) => {
            return Err(crate::error::LedgerError::validation(
                "postgres DATABASE_URL given but the postgres feature is disabled",
            ))
        }
    };

    store.init_schema().await?;
    tracing::info!(backend = config.backend.name(), "ledger store ready");

    Ok(store)
}
