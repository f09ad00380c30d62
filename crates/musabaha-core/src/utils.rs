//! Formatting and filtering helpers shared by the admin front ends

use crate::types::ApprovalStatus;
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;
use std::str::FromStr;

/// Naira sign used in amount displays
pub const NAIRA: char = '₦';

/// Format an amount as naira with two decimals and grouped thousands
///
/// `5000` becomes `₦5,000.00` and `-1234.5` becomes `-₦1,234.50`.
#[must_use]
pub fn format_naira(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let text = format!("{:.2}", rounded.abs());
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    format!("{sign}{NAIRA}{}.{fraction}", group_thousands(whole))
}

/// Insert `,` between groups of three digits
#[must_use]
pub fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// Format a timestamp as a calendar date, or `N/A`
#[must_use]
pub fn format_date(timestamp: Option<&DateTime<Utc>>) -> String {
    timestamp.map_or_else(
        || "N/A".to_string(),
        |value| value.format("%Y-%m-%d").to_string(),
    )
}

/// Status filter for list views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    /// Every record
    #[default]
    All,
    /// Only records with the given status
    Only(ApprovalStatus),
}

impl StatusFilter {
    /// Whether a record with `status` passes the filter
    #[must_use]
    pub fn matches(self, status: ApprovalStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == status,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(status) => fmt::Display::fmt(status, f),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            s.parse().map(Self::Only)
        }
    }
}
