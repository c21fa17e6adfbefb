// 📒 Ledger entities - Account, Transaction and the input types that create them

use crate::error::{LedgerError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Dates are stored as `YYYY-MM-DD` text so string order is date order.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// ACCOUNT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub name: String,
}

/// Trim an account name and reject it if nothing is left.
pub fn validate_account_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(LedgerError::validation("account name is required"));
    }
    Ok(name.to_string())
}

// ============================================================================
// TRANSACTION
// ============================================================================

/// A dated money movement from one account to another. Never updated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub date: String,
    pub from_account: i64,
    pub to_account: i64,
    pub amount: f64,
    pub remark: String,
}

impl Transaction {
    pub fn involves(&self, account_id: i64) -> bool {
        self.from_account == account_id || self.to_account == account_id
    }
}

/// Validated input for a new transaction. Account existence is checked by
/// the store, inside the insert's SQL transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub date: NaiveDate,
    pub from_account: i64,
    pub to_account: i64,
    pub amount: f64,
    pub remark: String,
}

impl NewTransaction {
    /// Parse raw form values.
    pub fn parse(date: &str, from_account: &str, to_account: &str, amount: &str, remark: &str) -> Result<Self> {
        let date = parse_date(date)
            .ok_or_else(|| LedgerError::validation(format!("invalid date {:?}, expected YYYY-MM-DD", date.trim())))?;
        let from_account = parse_account_id(from_account, "from_account")?;
        let to_account = parse_account_id(to_account, "to_account")?;
        let amount = parse_amount(amount)?;

        Ok(NewTransaction {
            date,
            from_account,
            to_account,
            amount,
            remark: remark.trim().to_string(),
        })
    }

    pub fn date_key(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }
}

fn parse_account_id(raw: &str, field: &str) -> Result<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| LedgerError::validation(format!("{} must be an account id, got {:?}", field, raw.trim())))
}

fn parse_amount(raw: &str) -> Result<f64> {
    let amount = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| LedgerError::validation(format!("amount must be a number, got {:?}", raw.trim())))?;

    if !amount.is_finite() {
        return Err(LedgerError::validation("amount must be a finite number"));
    }
    if amount < 0.0 {
        return Err(LedgerError::validation("amount must not be negative"));
    }

    // -0.0 parses fine; store it as plain zero
    Ok(amount.abs())
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

// ============================================================================
// DATE RANGE
// ============================================================================

/// Inclusive on both ends. A range whose start is after its end matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange { start, end }
    }

    /// Both bounds must be present and well-formed.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Option<Self> {
        let start = parse_date(start?)?;
        let end = parse_date(end?)?;
        Some(DateRange { start, end })
    }

    pub fn start_key(&self) -> String {
        self.start.format(DATE_FORMAT).to_string()
    }

    pub fn end_key(&self) -> String {
        self.end.format(DATE_FORMAT).to_string()
    }

    /// Compare against a stored date string.
    pub fn contains(&self, date: &str) -> bool {
        date >= self.start_key().as_str() && date <= self.end_key().as_str()
    }
}
