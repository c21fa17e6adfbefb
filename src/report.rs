// 📊 Report Façade - turns form input into the data each page shows
//
// Reports never fail on a bad selector: a missing or invalid account/date
// selection yields the empty report state (`rows: None`). Only storage
// failures propagate.

use crate::balance::{account_ledger, counterparty_summary, debt_summary, CounterpartyRow, DebtRow, LedgerRow};
use crate::error::Result;
use crate::models::{Account, DateRange, Transaction};
use crate::store::LedgerStore;
use std::collections::HashMap;

/// Label shown for an account id that no longer resolves.
pub const UNKNOWN_ACCOUNT: &str = "Unknown";

// ============================================================================
// NAME RESOLUTION
// ============================================================================

/// id -> name lookup with a placeholder for ids that do not resolve.
pub struct AccountNames {
    names: HashMap<i64, String>,
}

impl AccountNames {
    pub fn new(accounts: &[Account]) -> Self {
        AccountNames {
            names: accounts.iter().map(|a| (a.id, a.name.clone())).collect(),
        }
    }

    pub fn label(&self, id: i64) -> &str {
        self.names.get(&id).map(String::as_str).unwrap_or(UNKNOWN_ACCOUNT)
    }
}

// ============================================================================
// DASHBOARD
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct TransactionView {
    pub transaction: Transaction,
    pub from_name: String,
    pub to_name: String,
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    pub accounts: Vec<Account>,
    pub transactions: Vec<TransactionView>,
    /// Always computed over every transaction, including ones outside the filter.
    pub debts: Vec<DebtRow>,
}

pub async fn dashboard(store: &dyn LedgerStore, range: Option<DateRange>) -> Result<Dashboard> {
    let accounts = store.list_accounts().await?;
    let all = store.list_transactions(None).await?;

    let debts = debt_summary(&accounts, &all);

    let names = AccountNames::new(&accounts);
    let transactions = all
        .into_iter()
        .filter(|tx| range.map_or(true, |r| r.contains(&tx.date)))
        .map(|tx| TransactionView {
            from_name: names.label(tx.from_account).to_string(),
            to_name: names.label(tx.to_account).to_string(),
            transaction: tx,
        })
        .collect();

    Ok(Dashboard {
        accounts,
        transactions,
        debts,
    })
}

// ============================================================================
// PER-ACCOUNT REPORTS
// ============================================================================

/// Account plus date range picked on a report form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportSelector {
    pub account_id: i64,
    pub range: DateRange,
}

impl ReportSelector {
    /// `None` unless every field is present and well-formed.
    pub fn from_fields(account_id: Option<&str>, start_date: Option<&str>, end_date: Option<&str>) -> Option<Self> {
        let account_id = account_id?.trim().parse::<i64>().ok()?;
        let range = DateRange::parse(start_date, end_date)?;
        Some(ReportSelector { account_id, range })
    }
}

#[derive(Debug, Clone)]
pub struct Report<Row> {
    /// For the selector form.
    pub accounts: Vec<Account>,
    pub selector: Option<ReportSelector>,
    pub account_name: Option<String>,
    /// `None` means nothing was selected; `Some(vec![])` means no activity.
    pub rows: Option<Vec<Row>>,
}

impl<Row> Report<Row> {
    fn empty(accounts: Vec<Account>) -> Self {
        Report {
            accounts,
            selector: None,
            account_name: None,
            rows: None,
        }
    }
}

pub type LedgerReport = Report<LedgerRow>;
pub type AccountSummaryReport = Report<CounterpartyRow>;

/// Resolve the selected account. An id that no longer exists downgrades
/// the request to the empty report state.
async fn selected_account(store: &dyn LedgerStore, selector: &ReportSelector) -> Result<Option<Account>> {
    match store.get_account(selector.account_id).await {
        Ok(account) => Ok(Some(account)),
        Err(err) if err.is_not_found() => {
            tracing::warn!(account_id = selector.account_id, "report requested for unknown account");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

pub async fn ledger_report(store: &dyn LedgerStore, selector: Option<ReportSelector>) -> Result<LedgerReport> {
    let accounts = store.list_accounts().await?;
    let Some(selector) = selector else {
        return Ok(Report::empty(accounts));
    };
    let Some(account) = selected_account(store, &selector).await? else {
        return Ok(Report::empty(accounts));
    };

    let transactions = store.list_transactions(Some(selector.range)).await?;
    let rows = account_ledger(account.id, &transactions, Some(&selector.range));

    Ok(Report {
        accounts,
        selector: Some(selector),
        account_name: Some(account.name),
        rows: Some(rows),
    })
}

pub async fn account_summary(store: &dyn LedgerStore, selector: Option<ReportSelector>) -> Result<AccountSummaryReport> {
    let accounts = store.list_accounts().await?;
    let Some(selector) = selector else {
        return Ok(Report::empty(accounts));
    };
    let Some(account) = selected_account(store, &selector).await? else {
        return Ok(Report::empty(accounts));
    };

    let transactions = store.list_transactions(Some(selector.range)).await?;
    let rows = counterparty_summary(&accounts, account.id, &transactions, Some(&selector.range), UNKNOWN_ACCOUNT);

    Ok(Report {
        accounts,
        selector: Some(selector),
        account_name: Some(account.name),
        rows: Some(rows),
    })
}
