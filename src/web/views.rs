// Server-rendered HTML pages. All pages share templates/layout.html.

use crate::models::Account;
use crate::report::{AccountSummaryReport, Dashboard, LedgerReport, Report};
use crate::web::forms::{DashboardForm, ReportForm};
use std::fmt::Write;

const LAYOUT: &str = include_str!("../../templates/layout.html");

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn page(title: &str, content: &str) -> String {
    LAYOUT
        .replace("{{title}}", &escape_html(title))
        .replace("{{content}}", content)
}

fn money(amount: f64) -> String {
    format!("{:.2}", amount)
}

fn account_options(accounts: &[Account], selected: Option<i64>) -> String {
    let mut html = String::new();
    for account in accounts {
        let marker = if selected == Some(account.id) { " selected" } else { "" };
        let _ = write!(
            html,
            r#"<option value="{}"{}>{}</option>"#,
            account.id,
            marker,
            escape_html(&account.name)
        );
    }
    html
}

// ============================================================================
// DASHBOARD
// ============================================================================

pub fn render_dashboard(view: &Dashboard, form: &DashboardForm) -> String {
    let mut html = String::new();

    if let Some(error) = form.error.as_deref().filter(|e| !e.is_empty()) {
        let _ = writeln!(html, r#"<p class="error">{}</p>"#, escape_html(error));
    }

    // Accounts
    html.push_str("<section>\n<h2>Accounts</h2>\n");
    html.push_str(
        r#"<form method="post" action="/add_account">
    <input type="text" name="account_name" placeholder="Account name" required>
    <button type="submit">Add account</button>
</form>
"#,
    );
    if view.accounts.is_empty() {
        html.push_str("<p class=\"empty\">No accounts yet.</p>\n");
    } else {
        html.push_str("<table>\n<tr><th>ID</th><th>Name</th><th></th></tr>\n");
        for account in &view.accounts {
            let _ = writeln!(
                html,
                r#"<tr><td>{id}</td><td>{name}</td><td><a href="/delete_account/{id}">Delete</a></td></tr>"#,
                id = account.id,
                name = escape_html(&account.name)
            );
        }
        html.push_str("</table>\n");
    }
    html.push_str("</section>\n");

    // New transaction
    let options = account_options(&view.accounts, None);
    let _ = write!(
        html,
        r#"<section>
<h2>Add transaction</h2>
<form method="post" action="/add_transaction">
    <input type="date" name="date" required>
    <select name="from_account" required>{options}</select>
    <select name="to_account" required>{options}</select>
    <input type="number" name="amount" min="0" step="0.01" placeholder="Amount" required>
    <input type="text" name="remark" placeholder="Remark">
    <button type="submit">Add</button>
</form>
</section>
"#,
        options = options
    );

    // Filter + transactions
    let start = escape_html(form.start_date.as_deref().unwrap_or(""));
    let end = escape_html(form.end_date.as_deref().unwrap_or(""));
    let _ = write!(
        html,
        r#"<section>
<h2>Transactions</h2>
<form method="post" action="/">
    <input type="date" name="start_date" value="{start}">
    <input type="date" name="end_date" value="{end}">
    <button type="submit">Filter</button>
</form>
"#,
        start = start,
        end = end
    );

    if view.transactions.is_empty() {
        html.push_str("<p class=\"empty\">No transactions.</p>\n");
    } else {
        html.push_str(r#"<form method="post" action="/delete_transaction">"#);
        html.push_str(
            "\n<table>\n<tr><th></th><th>Date</th><th>From</th><th>To</th><th class=\"amount\">Amount</th><th>Remark</th></tr>\n",
        );
        for row in &view.transactions {
            let tx = &row.transaction;
            let _ = writeln!(
                html,
                r#"<tr><td><input type="checkbox" name="transaction_ids" value="{}"></td><td>{}</td><td>{}</td><td>{}</td><td class="amount">{}</td><td>{}</td></tr>"#,
                tx.id,
                escape_html(&tx.date),
                escape_html(&row.from_name),
                escape_html(&row.to_name),
                money(tx.amount),
                escape_html(&tx.remark)
            );
        }
        html.push_str("</table>\n<button type=\"submit\">Delete selected</button>\n</form>\n");
    }
    html.push_str("</section>\n");

    // Debts
    html.push_str("<section>\n<h2>Debt summary</h2>\n");
    if view.debts.is_empty() {
        html.push_str("<p class=\"empty\">Everyone is settled up.</p>\n");
    } else {
        html.push_str("<table>\n<tr><th>From</th><th>To</th><th class=\"amount\">Balance</th></tr>\n");
        for debt in &view.debts {
            let _ = writeln!(
                html,
                r#"<tr><td>{}</td><td>{}</td><td class="amount">{}</td></tr>"#,
                escape_html(&debt.from_name),
                escape_html(&debt.to_name),
                money(debt.balance)
            );
        }
        html.push_str("</table>\n");
    }
    html.push_str("</section>\n");

    page("Dashboard", &html)
}

// ============================================================================
// REPORTS
// ============================================================================

fn report_form<Row>(action: &str, report: &Report<Row>, form: &ReportForm) -> String {
    let selected = report.selector.map(|s| s.account_id);
    format!(
        r#"<form method="post" action="{action}">
    <select name="account_id" required>{options}</select>
    <input type="date" name="start_date" value="{start}" required>
    <input type="date" name="end_date" value="{end}" required>
    <button type="submit">Show</button>
</form>
"#,
        action = action,
        options = account_options(&report.accounts, selected),
        start = escape_html(form.start_date.as_deref().unwrap_or("")),
        end = escape_html(form.end_date.as_deref().unwrap_or(""))
    )
}

fn report_heading<Row>(report: &Report<Row>) -> String {
    match (&report.account_name, &report.selector) {
        (Some(name), Some(selector)) => format!(
            "<h2>{} ({} to {})</h2>\n",
            escape_html(name),
            selector.range.start_key(),
            selector.range.end_key()
        ),
        _ => String::new(),
    }
}

pub fn render_ledger_report(report: &LedgerReport, form: &ReportForm) -> String {
    let mut html = report_form("/ledger_report", report, form);

    if let Some(rows) = &report.rows {
        html.push_str(&report_heading(report));
        if rows.is_empty() {
            html.push_str("<p class=\"empty\">No transactions in this range.</p>\n");
        } else {
            html.push_str("<table>\n<tr><th>Date</th><th class=\"amount\">Sent</th><th class=\"amount\">Received</th></tr>\n");
            for row in rows {
                let _ = writeln!(
                    html,
                    r#"<tr><td>{}</td><td class="amount">{}</td><td class="amount">{}</td></tr>"#,
                    escape_html(&row.date),
                    money(row.sent),
                    money(row.received)
                );
            }
            html.push_str("</table>\n");
        }
    }

    page("Ledger report", &html)
}

pub fn render_account_summary(report: &AccountSummaryReport, form: &ReportForm) -> String {
    let mut html = report_form("/account_summary", report, form);

    if let Some(rows) = &report.rows {
        html.push_str(&report_heading(report));
        if rows.is_empty() {
            html.push_str("<p class=\"empty\">No transactions in this range.</p>\n");
        } else {
            html.push_str(
                "<table>\n<tr><th>Counterparty</th><th class=\"amount\">Sent</th><th class=\"amount\">Received</th></tr>\n",
            );
            for row in rows {
                let _ = writeln!(
                    html,
                    r#"<tr><td>{}</td><td class="amount">{}</td><td class="amount">{}</td></tr>"#,
                    escape_html(&row.account_name),
                    money(row.sent),
                    money(row.received)
                );
            }
            html.push_str("</table>\n");
        }
    }

    page("Account summary", &html)
}
