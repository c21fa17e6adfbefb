// ⚠️ Ledger errors
//
// Three families:
//   Validation  - bad form input, nothing was written
//   NotFound    - a lookup by id found no row
//   Storage     - the database itself failed (Sqlite / Postgres / Task)

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[cfg(feature = "postgres")]
    #[error("postgres error: {0}")]
    Postgres(#[from] sqlx::Error),

    #[error("storage task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl LedgerError {
    pub fn validation(message: impl Into<String>) -> Self {
        LedgerError::Validation(message.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, LedgerError::Validation(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, LedgerError::NotFound(_))
    }

    /// Connection or statement failures. Never recovered locally.
    pub fn is_storage(&self) -> bool {
        match self {
            LedgerError::Sqlite(_) | LedgerError::Task(_) => true,
            #[cfg(feature = "postgres")]
            LedgerError::Postgres(_) => true,
            LedgerError::Validation(_) | LedgerError::NotFound(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let validation = LedgerError::validation("amount must not be negative");
        assert!(validation.is_validation());
        assert!(!validation.is_storage());

        let missing = LedgerError::NotFound("account 7".to_string());
        assert!(missing.is_not_found());
        assert!(!missing.is_storage());

        let storage = LedgerError::from(rusqlite::Error::InvalidQuery);
        assert!(storage.is_storage());
    }

    #[test]
    fn test_error_messages() {
        let err = LedgerError::validation("account name is required");
        assert_eq!(err.to_string(), "validation failed: account name is required");
    }
}
