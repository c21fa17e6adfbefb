//! Postgres backend.
//!
//! Same contract and schema shape as the SQLite store: `BIGSERIAL` ids,
//! `TEXT` dates in `YYYY-MM-DD` form, `DOUBLE PRECISION` amounts. Multi-statement
//! writes run inside one SQL transaction taken from the pool.

use crate::error::{LedgerError, Result};
use crate::models::{validate_account_name, Account, DateRange, NewTransaction, Transaction};
use crate::store::LedgerStore;
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;

pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new().max_connections(5).connect(url).await?;
        tracing::info!("postgres pool established");
        Ok(Self { pool })
    }
}

fn account_from_row(row: &PgRow) -> std::result::Result<Account, sqlx::Error> {
    Ok(Account {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
    })
}

fn transaction_from_row(row: &PgRow) -> std::result::Result<Transaction, sqlx::Error> {
    let amount: Option<f64> = row.try_get("amount")?;
    let remark: Option<String> = row.try_get("remark")?;

    Ok(Transaction {
        id: row.try_get("id")?,
        date: row.try_get("date")?,
        from_account: row.try_get("from_account")?,
        to_account: row.try_get("to_account")?,
        amount: amount.unwrap_or(0.0),
        remark: remark.unwrap_or_default(),
    })
}

#[async_trait]
impl LedgerStore for PostgresStore {
    async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS accounts (
                id BIGSERIAL PRIMARY KEY,
                name TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS transactions (
                id BIGSERIAL PRIMARY KEY,
                date TEXT NOT NULL,
                from_account BIGINT NOT NULL REFERENCES accounts(id),
                to_account BIGINT NOT NULL REFERENCES accounts(id),
                amount DOUBLE PRECISION NOT NULL,
                remark TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn create_account(&self, name: &str) -> Result<Account> {
        let name = validate_account_name(name)?;

        let id: i64 = sqlx::query_scalar("INSERT INTO accounts (name) VALUES ($1) RETURNING id")
            .bind(&name)
            .fetch_one(&self.pool)
            .await?;

        tracing::info!(id, name = %name, "account created");
        Ok(Account { id, name })
    }

    async fn delete_account(&self, id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM transactions WHERE from_account = $1 OR to_account = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(id, transactions_removed = removed, "account deleted");
        Ok(())
    }

    async fn get_account(&self, id: i64) -> Result<Account> {
        let row = sqlx::query("SELECT id, name FROM accounts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(account_from_row(&row)?),
            None => Err(LedgerError::NotFound(format!("account {}", id))),
        }
    }

    async fn list_accounts(&self) -> Result<Vec<Account>> {
        let rows = sqlx::query("SELECT id, name FROM accounts ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        let accounts = rows
            .iter()
            .map(account_from_row)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(accounts)
    }

    async fn create_transaction(&self, new: NewTransaction) -> Result<Transaction> {
        let mut tx = self.pool.begin().await?;

        for account_id in [new.from_account, new.to_account] {
            let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts WHERE id = $1")
                .bind(account_id)
                .fetch_one(&mut *tx)
                .await?;
            if count == 0 {
                // dropping `tx` rolls back
                return Err(LedgerError::validation(format!("account {} does not exist", account_id)));
            }
        }

        let date = new.date_key();
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO transactions (date, from_account, to_account, amount, remark)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&date)
        .bind(new.from_account)
        .bind(new.to_account)
        .bind(new.amount)
        .bind(&new.remark)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::info!(
            id,
            from = new.from_account,
            to = new.to_account,
            amount = new.amount,
            "transaction created"
        );

        Ok(Transaction {
            id,
            date,
            from_account: new.from_account,
            to_account: new.to_account,
            amount: new.amount,
            remark: new.remark,
        })
    }

    async fn delete_transactions(&self, ids: &[i64]) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        let removed = sqlx::query("DELETE FROM transactions WHERE id = ANY($1)")
            .bind(ids.to_vec())
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::info!(removed, "transactions deleted");
        Ok(removed as usize)
    }

    async fn list_transactions(&self, range: Option<DateRange>) -> Result<Vec<Transaction>> {
        tracing::debug!(?range, "listing transactions");

        let rows = match range {
            Some(range) => {
                sqlx::query(
                    r#"
                    SELECT id, date, from_account, to_account, amount, remark
                    FROM transactions
                    WHERE date BETWEEN $1 AND $2
                    ORDER BY date, id
                    "#,
                )
                .bind(range.start_key())
                .bind(range.end_key())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    r#"
                    SELECT id, date, from_account, to_account, amount, remark
                    FROM transactions
                    ORDER BY date, id
                    "#,
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        let transactions = rows
            .iter()
            .map(transaction_from_row)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(transactions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    /// Only runs against a real server: set LEDGER_TEST_POSTGRES_URL.
    async fn test_store() -> Option<PostgresStore> {
        let url = std::env::var("LEDGER_TEST_POSTGRES_URL").ok()?;
        let store = PostgresStore::connect(&url).await.ok()?;
        store.init_schema().await.ok()?;
        Some(store)
    }

    #[tokio::test]
    async fn test_postgres_roundtrip_and_cascade() {
        let Some(store) = test_store().await else {
            eprintln!("LEDGER_TEST_POSTGRES_URL not set, skipping");
            return;
        };

        let alice = store.create_account("pg-test-alice").await.unwrap();
        let bob = store.create_account("pg-test-bob").await.unwrap();

        let tx = store
            .create_transaction(NewTransaction {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                from_account: alice.id,
                to_account: bob.id,
                amount: 100.0,
                remark: "test".to_string(),
            })
            .await
            .unwrap();

        let err = store
            .create_transaction(NewTransaction {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                from_account: alice.id,
                to_account: i64::MAX,
                amount: 1.0,
                remark: String::new(),
            })
            .await
            .unwrap_err();
        assert!(err.is_validation());

        store.delete_account(alice.id).await.unwrap();
        let remaining = store.list_transactions(None).await.unwrap();
        assert!(remaining.iter().all(|t| t.id != tx.id));
        assert!(store.get_account(alice.id).await.unwrap_err().is_not_found());

        store.delete_account(bob.id).await.unwrap();
    }
}
