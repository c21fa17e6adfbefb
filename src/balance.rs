// ⚖️ Balance Aggregator - who owes whom, per-date ledgers, per-counterparty totals
//
// Pure functions over a transaction slice, so both storage backends share
// one implementation. For an unordered pair {A, B}:
//
//   net(A, B) = sum(A -> B) - sum(B -> A)      and      net(B, A) = -net(A, B)
//
// Only the direction with a strictly positive net is reported.

use crate::models::{Account, DateRange, Transaction};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

// ============================================================================
// ROWS
// ============================================================================

/// `from` has sent `balance` more to `to` than it received back.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DebtRow {
    pub from_id: i64,
    pub from_name: String,
    pub to_id: i64,
    pub to_name: String,
    pub balance: f64,
}

/// Totals for one account on one date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerRow {
    pub date: String,
    pub sent: f64,
    pub received: f64,
}

/// Totals between one account and one counterparty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CounterpartyRow {
    pub account_id: i64,
    pub account_name: String,
    pub sent: f64,
    pub received: f64,
}

// ============================================================================
// PAIRWISE NET BALANCES
// ============================================================================

/// Net flow per unordered pair, keyed `(low id, high id)`, measured low -> high.
/// Self-transfers and transactions naming unknown accounts are skipped.
fn pair_nets(accounts: &[Account], transactions: &[Transaction]) -> BTreeMap<(i64, i64), f64> {
    let known: HashSet<i64> = accounts.iter().map(|a| a.id).collect();
    let mut nets: BTreeMap<(i64, i64), f64> = BTreeMap::new();

    for tx in transactions {
        if tx.from_account == tx.to_account {
            continue;
        }
        if !known.contains(&tx.from_account) || !known.contains(&tx.to_account) {
            continue;
        }

        if tx.from_account < tx.to_account {
            *nets.entry((tx.from_account, tx.to_account)).or_insert(0.0) += tx.amount;
        } else {
            *nets.entry((tx.to_account, tx.from_account)).or_insert(0.0) -= tx.amount;
        }
    }

    nets
}

/// `sum(a -> b) - sum(b -> a)` over the given transactions.
pub fn net_balance(transactions: &[Transaction], a: i64, b: i64) -> f64 {
    if a == b {
        return 0.0;
    }
    let (low, high) = if a < b { (a, b) } else { (b, a) };

    let mut net = 0.0;
    for tx in transactions {
        if tx.from_account == low && tx.to_account == high {
            net += tx.amount;
        } else if tx.from_account == high && tx.to_account == low {
            net -= tx.amount;
        }
    }

    if a == low {
        net
    } else {
        -net
    }
}

/// Every pair with a non-zero net, reported once in its positive direction.
/// At most N·(N-1)/2 rows; ordered by (from name, to name).
pub fn debt_summary(accounts: &[Account], transactions: &[Transaction]) -> Vec<DebtRow> {
    let names: HashMap<i64, &str> = accounts.iter().map(|a| (a.id, a.name.as_str())).collect();

    let mut rows: Vec<DebtRow> = pair_nets(accounts, transactions)
        .into_iter()
        .filter_map(|((low, high), net)| {
            let (from_id, to_id, balance) = if net > 0.0 {
                (low, high, net)
            } else if net < 0.0 {
                (high, low, -net)
            } else {
                return None;
            };

            Some(DebtRow {
                from_id,
                from_name: names.get(&from_id).copied().unwrap_or_default().to_string(),
                to_id,
                to_name: names.get(&to_id).copied().unwrap_or_default().to_string(),
                balance,
            })
        })
        .collect();

    rows.sort_by(|a, b| {
        (a.from_name.as_str(), a.to_name.as_str(), a.from_id, a.to_id)
            .cmp(&(b.from_name.as_str(), b.to_name.as_str(), b.from_id, b.to_id))
    });
    rows
}

// ============================================================================
// PER-ACCOUNT REPORTS
// ============================================================================

fn in_range(tx: &Transaction, range: Option<&DateRange>) -> bool {
    range.map_or(true, |r| r.contains(&tx.date))
}

/// Sent and received totals for `account_id`, one row per date, oldest first.
/// A self-transfer counts on both sides.
pub fn account_ledger(account_id: i64, transactions: &[Transaction], range: Option<&DateRange>) -> Vec<LedgerRow> {
    let mut by_date: BTreeMap<&str, (f64, f64)> = BTreeMap::new();

    for tx in transactions.iter().filter(|tx| tx.involves(account_id) && in_range(tx, range)) {
        let entry = by_date.entry(tx.date.as_str()).or_insert((0.0, 0.0));
        if tx.from_account == account_id {
            entry.0 += tx.amount;
        }
        if tx.to_account == account_id {
            entry.1 += tx.amount;
        }
    }

    by_date
        .into_iter()
        .map(|(date, (sent, received))| LedgerRow {
            date: date.to_string(),
            sent,
            received,
        })
        .collect()
}

/// Sent to / received from each counterparty of `account_id`, ordered by
/// counterparty name. Counterparties that no longer exist are labelled by
/// `unknown_label`.
pub fn counterparty_summary(
    accounts: &[Account],
    account_id: i64,
    transactions: &[Transaction],
    range: Option<&DateRange>,
    unknown_label: &str,
) -> Vec<CounterpartyRow> {
    let names: HashMap<i64, &str> = accounts.iter().map(|a| (a.id, a.name.as_str())).collect();
    let mut totals: HashMap<i64, (f64, f64)> = HashMap::new();

    for tx in transactions.iter().filter(|tx| in_range(tx, range)) {
        if tx.from_account == account_id && tx.to_account != account_id {
            totals.entry(tx.to_account).or_insert((0.0, 0.0)).0 += tx.amount;
        } else if tx.to_account == account_id && tx.from_account != account_id {
            totals.entry(tx.from_account).or_insert((0.0, 0.0)).1 += tx.amount;
        }
    }

    let mut rows: Vec<CounterpartyRow> = totals
        .into_iter()
        .map(|(id, (sent, received))| CounterpartyRow {
            account_id: id,
            account_name: names.get(&id).copied().unwrap_or(unknown_label).to_string(),
            sent,
            received,
        })
        .collect();

    rows.sort_by(|a, b| (a.account_name.as_str(), a.account_id).cmp(&(b.account_name.as_str(), b.account_id)));
    rows
}
