//! Plain-text tables for terminal output

use musabaha_client::DocumentLink;
use musabaha_core::utils::{format_date, format_naira};
use musabaha_core::{AggregateStats, AssetResolver, PaymentRecord, UserRegistration};
use std::fmt::Write as _;

const EMPTY: &str = "-";

/// Column-aligned text table
#[derive(Debug, Clone, Default)]
pub(crate) struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub(crate) fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub(crate) fn render(&self) -> String {
        let columns = self.headers.len();
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().take(columns).enumerate() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }

        let mut out = String::new();
        write_row(&mut out, &self.headers, &widths);
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        write_row(&mut out, &rule, &widths);
        for row in &self.rows {
            write_row(&mut out, row, &widths);
        }
        out
    }
}

fn write_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let mut line = String::new();
    for (i, width) in widths.iter().enumerate() {
        let cell = cells.get(i).map_or(EMPTY, String::as_str);
        if i > 0 {
            line.push_str("  ");
        }
        let _ = write!(line, "{cell:<width$}");
    }
    out.push_str(line.trim_end());
    out.push('\n');
}

fn text(value: Option<&str>) -> String {
    value.unwrap_or(EMPTY).to_string()
}

/// Records that can be listed in a table
pub(crate) trait ListView {
    /// Table of records
    fn table(records: &[&Self], assets: &AssetResolver) -> Table;
}

impl ListView for PaymentRecord {
    fn table(records: &[&Self], assets: &AssetResolver) -> Table {
        let mut table = Table::new([
            "ID",
            "User",
            "Contact",
            "Amount",
            "Method",
            "Reference",
            "Date",
            "Status",
            "Receipt",
        ]);
        for payment in records {
            table.push(vec![
                payment.id.to_string(),
                text(payment.user_name.as_deref()),
                text(payment.user_contact.as_deref()),
                format_naira(payment.amount),
                text(payment.payment_method.as_deref()),
                text(payment.transaction_reference.as_deref()),
                format_date(payment.created_at.as_ref()),
                payment.status.to_string(),
                text(
                    payment
                        .receipt_file
                        .as_deref()
                        .and_then(|file| assets.receipt_url(file))
                        .as_deref(),
                ),
            ]);
        }
        table
    }
}

impl ListView for UserRegistration {
    fn table(records: &[&Self], _assets: &AssetResolver) -> Table {
        let mut table = Table::new([
            "ID",
            "Name",
            "Email",
            "Telephone",
            "Estate",
            "Plots",
            "Documents",
            "Status",
        ]);
        for user in records {
            table.push(vec![
                user.id.to_string(),
                text(user.name.as_deref()),
                text(user.email.as_deref()),
                text(user.telephone.as_deref()),
                text(user.estate_name.as_deref()),
                user.number_of_plots.to_string(),
                user.documents().count().to_string(),
                user.status.to_string(),
            ]);
        }
        table
    }
}

/// Dashboard cards as text
pub(crate) fn stats_block(stats: &AggregateStats) -> String {
    let mut table = Table::new(["Metric", "Value"]);
    table.push(vec![
        "Total Deposited".to_string(),
        format_naira(stats.total_deposited),
    ]);
    table.push(vec![
        "Pending Payments".to_string(),
        stats.pending_payments.to_string(),
    ]);
    table.push(vec![
        "Approved Payments".to_string(),
        stats.approved_payments.to_string(),
    ]);
    table.push(vec!["Total Users".to_string(), stats.total_users.to_string()]);
    table.render()
}

/// Every field of a registration
pub(crate) fn detail_table(user: &UserRegistration) -> Table {
    let mut table = Table::new(["Field", "Value"]);
    for (field, value) in user.detail_rows() {
        table.push(vec![field, value]);
    }
    table
}

/// Documents with resolved links and optional reachability
pub(crate) fn documents_table(links: &[DocumentLink], reachable: Option<&[bool]>) -> Table {
    let mut headers = vec!["Document", "Link"];
    if reachable.is_some() {
        headers.push("Reachable");
    }
    let mut table = Table::new(headers);
    for (i, link) in links.iter().enumerate() {
        let mut row = vec![
            link.kind.label().to_string(),
            link.url
                .clone()
                .unwrap_or_else(|| format!("unresolvable: {}", link.stored)),
        ];
        if let Some(flags) = reachable {
            let flag = flags.get(i).copied().unwrap_or(false);
            row.push(if flag { "yes" } else { "no" }.to_string());
        }
        table.push(row);
    }
    table
}

/// Summary line under a filtered payment list
pub(crate) fn found_summary(count: usize) -> String {
    format!("{count} payment(s) found")
}
