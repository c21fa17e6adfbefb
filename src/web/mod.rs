// 🌐 Web layer - axum router over the report façade and the store

pub mod forms;
pub mod handlers;
pub mod views;

use crate::store::LedgerStore;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared application state. The store owns no per-request state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn LedgerStore>,
}

pub fn router(store: Arc<dyn LedgerStore>) -> Router {
    let state = AppState { store };

    Router::new()
        .route("/", get(handlers::index).post(handlers::index))
        .route("/add_account", post(handlers::add_account))
        .route("/delete_account/:id", get(handlers::delete_account))
        .route("/add_transaction", post(handlers::add_transaction))
        .route("/delete_transaction", post(handlers::delete_transaction))
        .route("/ledger_report", get(handlers::ledger_report).post(handlers::ledger_report))
        .route("/account_summary", get(handlers::account_summary).post(handlers::account_summary))
        .route("/api/health", get(handlers::health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
