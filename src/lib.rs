// Debt Ledger - Core Library
// Exposes all modules for use in the web server and tests

pub mod balance;   // Pairwise net balances, per-account ledgers
pub mod config;
pub mod error;
pub mod models;
pub mod report;    // Report façade used by the HTML pages
pub mod store;     // LedgerStore trait + SQLite / Postgres backends
pub mod telemetry;

#[cfg(feature = "server")]
pub mod web;

// Re-export commonly used types
pub use balance::{account_ledger, counterparty_summary, debt_summary, net_balance, CounterpartyRow, DebtRow, LedgerRow};
pub use config::{Config, StorageBackend};
pub use error::{LedgerError, Result};
pub use models::{Account, DateRange, NewTransaction, Transaction};
pub use report::{AccountSummaryReport, Dashboard, LedgerReport, ReportSelector, UNKNOWN_ACCOUNT};
pub use store::{open_store, LedgerStore, SqliteStore};

#[cfg(feature = "postgres")]
pub use store::PostgresStore;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
