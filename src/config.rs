// ⚙️ Configuration - read once at startup, passed to the store explicitly

use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};

pub const DEFAULT_DATABASE_URL: &str = "accounting.db";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 10000;

/// Which storage implementation the connection string selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// SQLite database file (absolute path)
    Sqlite(PathBuf),

    /// Postgres connection string, passed to the driver untouched
    Postgres(String),
}

impl StorageBackend {
    /// Classify a `DATABASE_URL` value. Relative SQLite paths are joined
    /// onto `cwd`.
    pub fn from_url(url: &str, cwd: &Path) -> Self {
        let url = url.trim();
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            return StorageBackend::Postgres(url.to_string());
        }

        let path = url.strip_prefix("sqlite://").unwrap_or(url);
        let path = Path::new(path);
        if path.is_absolute() {
            StorageBackend::Sqlite(path.to_path_buf())
        } else {
            StorageBackend::Sqlite(cwd.join(path))
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            StorageBackend::Sqlite(_) => "sqlite",
            StorageBackend::Postgres(_) => "postgres",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub backend: StorageBackend,
    pub host: String,
    pub port: u16,
}

impl Config {
    /// Build the config from the process environment (and `.env`, if present).
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let cwd = env::current_dir().context("Failed to read current directory")?;
        let url = env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
        let host = env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
        let port = match env::var("PORT") {
            Ok(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("PORT must be a port number, got {:?}", raw))?,
            Err(_) => DEFAULT_PORT,
        };

        Ok(Config {
            backend: StorageBackend::from_url(&url, &cwd),
            host,
            port,
        })
    }

    /// Config for a SQLite file, used by tests and tooling.
    pub fn sqlite(path: impl Into<PathBuf>) -> Self {
        Config {
            backend: StorageBackend::Sqlite(path.into()),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_sqlite_path_joins_cwd() {
        let backend = StorageBackend::from_url("accounting.db", Path::new("/srv/app"));
        assert_eq!(
            backend,
            StorageBackend::Sqlite(PathBuf::from("/srv/app/accounting.db"))
        );
        assert_eq!(backend.name(), "sqlite");
    }

    #[test]
    fn test_absolute_sqlite_path_is_kept() {
        let backend = StorageBackend::from_url("sqlite:///var/lib/ledger.db", Path::new("/srv/app"));
        assert_eq!(
            backend,
            StorageBackend::Sqlite(PathBuf::from("/var/lib/ledger.db"))
        );
    }

    #[test]
    fn test_postgres_urls_select_postgres() {
        for url in [
            "postgres://user:pw@localhost/ledger",
            "postgresql://localhost:5432/ledger",
        ] {
            let backend = StorageBackend::from_url(url, Path::new("/"));
            assert_eq!(backend, StorageBackend::Postgres(url.to_string()));
            assert_eq!(backend.name(), "postgres");
        }
    }

    #[test]
    fn test_bind_addr() {
        let mut config = Config::sqlite("/tmp/ledger.db");
        config.host = "127.0.0.1".to_string();
        config.port = 8080;
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        assert_eq!(Config::sqlite("x.db").port, 10000);
    }
}
