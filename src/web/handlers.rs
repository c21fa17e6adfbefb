// HTTP handlers. Mutations redirect to `/`; rejected input comes back as
// `/?error=...` and nothing is written.

use crate::error::LedgerError;
use crate::report;
use crate::web::forms::{transaction_ids, AccountForm, DashboardForm, ReportForm, TransactionForm};
use crate::web::views;
use crate::web::AppState;
use axum::{
    extract::{rejection::FormRejection, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Redirect, Response},
    Form,
};
use serde::Serialize;

// ============================================================================
// ERRORS
// ============================================================================

pub struct WebError(LedgerError);

impl From<LedgerError> for WebError {
    fn from(err: LedgerError) -> Self {
        WebError(err)
    }
}

pub fn redirect_with_error(message: &str) -> Redirect {
    Redirect::to(&format!("/?error={}", urlencoding::encode(message)))
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        match &self.0 {
            LedgerError::Validation(message) => {
                tracing::warn!(%message, "rejected input");
                redirect_with_error(message).into_response()
            }
            LedgerError::NotFound(what) => (StatusCode::NOT_FOUND, format!("{} not found", what)).into_response(),
            err => {
                debug_assert!(err.is_storage());
                tracing::error!(error = %err, "storage failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "storage error").into_response()
            }
        }
    }
}

type WebResult<T> = Result<T, WebError>;

/// A body the form decoder refuses (repeated scalar field, wrong content
/// type) is bad input like any other.
fn accept_form<T>(form: Result<Form<T>, FormRejection>) -> Result<T, LedgerError> {
    form.map(|Form(inner)| inner)
        .map_err(|rejection| LedgerError::validation(rejection.body_text()))
}

/// API Response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T> {
    success: bool,
    data: T,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self { success: true, data }
    }
}

// ============================================================================
// PAGES
// ============================================================================

/// GET/POST / - accounts, filtered transactions, debt summary
pub async fn index(State(state): State<AppState>, Form(form): Form<DashboardForm>) -> WebResult<Html<String>> {
    let view = report::dashboard(state.store.as_ref(), form.range()).await?;
    Ok(Html(views::render_dashboard(&view, &form)))
}

/// GET/POST /ledger_report - per-date sent/received for one account
pub async fn ledger_report(State(state): State<AppState>, Form(form): Form<ReportForm>) -> WebResult<Html<String>> {
    let report = report::ledger_report(state.store.as_ref(), form.selector()).await?;
    Ok(Html(views::render_ledger_report(&report, &form)))
}

/// GET/POST /account_summary - per-counterparty sent/received for one account
pub async fn account_summary(State(state): State<AppState>, Form(form): Form<ReportForm>) -> WebResult<Html<String>> {
    let report = report::account_summary(state.store.as_ref(), form.selector()).await?;
    Ok(Html(views::render_account_summary(&report, &form)))
}

// ============================================================================
// MUTATIONS
// ============================================================================

/// POST /add_account
pub async fn add_account(
    State(state): State<AppState>,
    form: Result<Form<AccountForm>, FormRejection>,
) -> WebResult<Redirect> {
    let form = accept_form(form)?;
    state
        .store
        .create_account(form.account_name.as_deref().unwrap_or(""))
        .await?;
    Ok(Redirect::to("/"))
}

/// GET /delete_account/:id
pub async fn delete_account(State(state): State<AppState>, Path(id): Path<i64>) -> WebResult<Redirect> {
    state.store.delete_account(id).await?;
    Ok(Redirect::to("/"))
}

/// POST /add_transaction
pub async fn add_transaction(
    State(state): State<AppState>,
    form: Result<Form<TransactionForm>, FormRejection>,
) -> WebResult<Redirect> {
    let new = accept_form(form)?.parse()?;
    state.store.create_transaction(new).await?;
    Ok(Redirect::to("/"))
}

/// POST /delete_transaction - `transaction_ids` may repeat
pub async fn delete_transaction(
    State(state): State<AppState>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> WebResult<Redirect> {
    let ids = transaction_ids(&pairs);
    if !ids.is_empty() {
        state.store.delete_transactions(&ids).await?;
    }
    Ok(Redirect::to("/"))
}

/// GET /api/health - Health check
pub async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}
