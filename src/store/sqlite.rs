// SQLite backend
//
// The free functions work on a borrowed rusqlite Connection, so they can be
// tested against an in-memory database. `SqliteStore` wraps them: each call
// opens the file, runs on tokio's blocking pool, commits and closes.

use crate::error::{LedgerError, Result};
use crate::models::{validate_account_name, Account, DateRange, NewTransaction, Transaction};
use crate::store::LedgerStore;
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};

// ============================================================================
// SCHEMA
// ============================================================================

/// Per-connection settings. SQLite leaves foreign keys off unless asked.
pub fn configure_connection(conn: &Connection) -> Result<()> {
    conn.pragma_update(None, "foreign_keys", "ON")?;
    Ok(())
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // WAL keeps readers from blocking the single writer
    conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS accounts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS transactions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date TEXT NOT NULL,
            from_account INTEGER NOT NULL,
            to_account INTEGER NOT NULL,
            amount REAL NOT NULL,
            remark TEXT,
            FOREIGN KEY(from_account) REFERENCES accounts(id),
            FOREIGN KEY(to_account) REFERENCES accounts(id)
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date)",
        [],
    )?;

    Ok(())
}

// ============================================================================
// ACCOUNTS
// ============================================================================

pub fn insert_account(conn: &Connection, name: &str) -> Result<Account> {
    let name = validate_account_name(name)?;

    conn.execute("INSERT INTO accounts (name) VALUES (?1)", params![name])?;

    Ok(Account {
        id: conn.last_insert_rowid(),
        name,
    })
}

/// Delete an account and every transaction that references it, atomically.
/// Returns the number of transactions removed.
pub fn delete_account(conn: &mut Connection, id: i64) -> Result<usize> {
    let tx = conn.transaction()?;

    let removed = tx.execute(
        "DELETE FROM transactions WHERE from_account = ?1 OR to_account = ?1",
        params![id],
    )?;
    tx.execute("DELETE FROM accounts WHERE id = ?1", params![id])?;

    tx.commit()?;
    Ok(removed)
}

pub fn find_account(conn: &Connection, id: i64) -> Result<Account> {
    conn.query_row(
        "SELECT id, name FROM accounts WHERE id = ?1",
        params![id],
        |row| {
            Ok(Account {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        },
    )
    .optional()?
    .ok_or_else(|| LedgerError::NotFound(format!("account {}", id)))
}

pub fn get_all_accounts(conn: &Connection) -> Result<Vec<Account>> {
    let mut stmt = conn.prepare("SELECT id, name FROM accounts ORDER BY id")?;

    let accounts = stmt
        .query_map([], |row| {
            Ok(Account {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(accounts)
}

// ============================================================================
// TRANSACTIONS
// ============================================================================

fn account_exists(conn: &Connection, id: i64) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM accounts WHERE id = ?1",
        params![id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Insert a transaction after checking both accounts exist. Nothing is
/// written when the check fails.
pub fn insert_transaction(conn: &mut Connection, new: &NewTransaction) -> Result<Transaction> {
    let tx = conn.transaction()?;

    for id in [new.from_account, new.to_account] {
        if !account_exists(&tx, id)? {
            return Err(LedgerError::validation(format!("account {} does not exist", id)));
        }
    }

    let date = new.date_key();
    tx.execute(
        "INSERT INTO transactions (date, from_account, to_account, amount, remark)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![date, new.from_account, new.to_account, new.amount, new.remark],
    )?;
    let id = tx.last_insert_rowid();

    tx.commit()?;

    Ok(Transaction {
        id,
        date,
        from_account: new.from_account,
        to_account: new.to_account,
        amount: new.amount,
        remark: new.remark.clone(),
    })
}

pub fn delete_transactions(conn: &mut Connection, ids: &[i64]) -> Result<usize> {
    if ids.is_empty() {
        return Ok(0);
    }

    let tx = conn.transaction()?;
    let mut removed = 0;
    {
        let mut stmt = tx.prepare("DELETE FROM transactions WHERE id = ?1")?;
        for id in ids {
            removed += stmt.execute(params![id])?;
        }
    }
    tx.commit()?;

    Ok(removed)
}

fn transaction_from_row(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    let amount: Option<f64> = row.get(4)?;
    let remark: Option<String> = row.get(5)?;

    Ok(Transaction {
        id: row.get(0)?,
        date: row.get(1)?,
        from_account: row.get(2)?,
        to_account: row.get(3)?,
        amount: amount.unwrap_or(0.0),
        remark: remark.unwrap_or_default(),
    })
}

pub fn get_transactions(conn: &Connection, range: Option<DateRange>) -> Result<Vec<Transaction>> {
    let transactions = match range {
        Some(range) => {
            let mut stmt = conn.prepare(
                "SELECT id, date, from_account, to_account, amount, remark
                 FROM transactions
                 WHERE date BETWEEN ?1 AND ?2
                 ORDER BY date, id",
            )?;
            let rows = stmt
                .query_map(params![range.start_key(), range.end_key()], transaction_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows
        }
        None => {
            let mut stmt = conn.prepare(
                "SELECT id, date, from_account, to_account, amount, remark
                 FROM transactions
                 ORDER BY date, id",
            )?;
            let rows = stmt
                .query_map([], transaction_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows
        }
    };

    Ok(transactions)
}

#[cfg(test)]
fn verify_count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?;
    Ok(count)
}

// ============================================================================
// STORE
// ============================================================================

/// File-backed store. Holds only the path; connections live for one call.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SqliteStore { path: path.into() }
    }

    fn connect(path: &Path) -> Result<Connection> {
        let conn = Connection::open(path)?;
        configure_connection(&conn)?;
        Ok(conn)
    }

    async fn run<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = Self::connect(&path)?;
            op(&mut conn)
        })
        .await?
    }
}

#[async_trait]
impl LedgerStore for SqliteStore {
    async fn init_schema(&self) -> Result<()> {
        self.run(|conn| setup_database(conn)).await
    }

    async fn create_account(&self, name: &str) -> Result<Account> {
        let name = name.to_string();
        let account = self.run(move |conn| insert_account(conn, &name)).await?;
        tracing::info!(id = account.id, name = %account.name, "account created");
        Ok(account)
    }

    async fn delete_account(&self, id: i64) -> Result<()> {
        let removed = self.run(move |conn| delete_account(conn, id)).await?;
        tracing::info!(id, transactions_removed = removed, "account deleted");
        Ok(())
    }

    async fn get_account(&self, id: i64) -> Result<Account> {
        self.run(move |conn| find_account(conn, id)).await
    }

    async fn list_accounts(&self) -> Result<Vec<Account>> {
        self.run(|conn| get_all_accounts(conn)).await
    }

    async fn create_transaction(&self, tx: NewTransaction) -> Result<Transaction> {
        let created = self.run(move |conn| insert_transaction(conn, &tx)).await?;
        tracing::info!(
            id = created.id,
            from = created.from_account,
            to = created.to_account,
            amount = created.amount,
            "transaction created"
        );
        Ok(created)
    }

    async fn delete_transactions(&self, ids: &[i64]) -> Result<usize> {
        let ids = ids.to_vec();
        let removed = self.run(move |conn| delete_transactions(conn, &ids)).await?;
        tracing::info!(removed, "transactions deleted");
        Ok(removed)
    }

    async fn list_transactions(&self, range: Option<DateRange>) -> Result<Vec<Transaction>> {
        tracing::debug!(?range, "listing transactions");
        self.run(move |conn| get_transactions(conn, range)).await
    }
}
