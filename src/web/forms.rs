// Form bodies accepted by the HTML endpoints.
//
// Every field is optional at the serde level so a missing field becomes a
// validation error (or an empty report) instead of a 422 from the extractor.

use crate::error::{LedgerError, Result};
use crate::models::{DateRange, NewTransaction};
use crate::report::ReportSelector;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct DashboardForm {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    /// Set by the redirect after a rejected mutation.
    pub error: Option<String>,
}

impl DashboardForm {
    pub fn range(&self) -> Option<DateRange> {
        DateRange::parse(self.start_date.as_deref(), self.end_date.as_deref())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AccountForm {
    pub account_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TransactionForm {
    pub date: Option<String>,
    pub from_account: Option<String>,
    pub to_account: Option<String>,
    pub amount: Option<String>,
    pub remark: Option<String>,
}

fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str> {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(LedgerError::validation(format!("{} is required", field))),
    }
}

impl TransactionForm {
    pub fn parse(&self) -> Result<NewTransaction> {
        NewTransaction::parse(
            required(&self.date, "date")?,
            required(&self.from_account, "from_account")?,
            required(&self.to_account, "to_account")?,
            required(&self.amount, "amount")?,
            self.remark.as_deref().unwrap_or(""),
        )
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ReportForm {
    pub account_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl ReportForm {
    pub fn selector(&self) -> Option<ReportSelector> {
        ReportSelector::from_fields(
            self.account_id.as_deref(),
            self.start_date.as_deref(),
            self.end_date.as_deref(),
        )
    }
}

/// All `transaction_ids` values that parse as ids; others are logged and dropped.
/// Takes the decoded pairs so repeated keys survive.
pub fn transaction_ids(pairs: &[(String, String)]) -> Vec<i64> {
    pairs
        .iter()
        .filter(|(key, _)| key == "transaction_ids")
        .filter_map(|(_, value)| match value.trim().parse::<i64>() {
            Ok(id) => Some(id),
            Err(_) => {
                tracing::warn!(value = %value, "ignoring malformed transaction id");
                None
            }
        })
        .collect()
}
