// Debt Ledger - Web Server
// DATABASE_URL picks the backend (SQLite file or postgres://), PORT/HOST the socket.

use anyhow::{Context, Result};
use debt_ledger::{open_store, telemetry, web, Config};

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init();

    let config = Config::from_env()?;
    tracing::info!(
        version = debt_ledger::VERSION,
        backend = config.backend.name(),
        "starting debt ledger"
    );

    let store = open_store(&config)
        .await
        .context("Failed to open ledger store")?;

    let app = web::router(store);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!("listening on http://{}", addr);

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}
