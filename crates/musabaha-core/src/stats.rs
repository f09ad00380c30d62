//! Aggregate statistics over the payment list

use crate::types::{ApprovalStatus, PaymentRecord};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::warn;

/// Dashboard totals derived from a payment list
///
/// Never stored or patched: always computed from the full list with
/// [`AggregateStats::from_payments`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateStats {
    /// Sum of approved payment amounts
    pub total_deposited: Decimal,

    /// Number of payments awaiting review
    pub pending_payments: usize,

    /// Number of approved payments
    pub approved_payments: usize,

    /// Number of distinct payers
    pub total_users: usize,
}

impl AggregateStats {
    /// Compute totals for a payment list
    #[must_use]
    pub fn from_payments(payments: &[PaymentRecord]) -> Self {
        let mut stats = Self::default();
        let mut users = HashSet::new();

        for payment in payments {
            match payment.status {
                ApprovalStatus::Approved => {
                    stats.total_deposited = stats
                        .total_deposited
                        .checked_add(payment.amount)
                        .unwrap_or_else(|| {
                            warn!(id = %payment.id, "Deposit total overflowed, saturating");
                            Decimal::MAX
                        });
                    stats.approved_payments += 1;
                }
                ApprovalStatus::Pending => stats.pending_payments += 1,
                ApprovalStatus::Rejected => {}
            }

            if let Some(key) = payment.user_key() {
                users.insert(key);
            }
        }

        stats.total_users = users.len();
        stats
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{RecordId, UserKey};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn payment(id: u64, amount: &str, status: ApprovalStatus) -> PaymentRecord {
        let mut record = PaymentRecord::new(id, amount.parse().unwrap());
        record.status = status;
        record
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(AggregateStats::from_payments(&[]), AggregateStats::default());
    }

    #[test]
    fn test_approved_and_pending_example() {
        let payments: Vec<PaymentRecord> = serde_json::from_str(
            r#"[{"id":1, "amount":"5000", "status":"approved"},
                {"id":2, "amount":"3000", "status":"pending"}]"#,
        )
        .unwrap();

        let stats = AggregateStats::from_payments(&payments);

        assert_eq!(stats.total_deposited, Decimal::from(5000));
        assert_eq!(stats.pending_payments, 1);
        assert_eq!(stats.approved_payments, 1);
        assert_eq!(stats.total_users, 0);
    }

    #[test]
    fn test_rejected_payments_are_ignored() {
        let payments = vec![
            payment(1, "100", ApprovalStatus::Rejected),
            payment(2, "250.75", ApprovalStatus::Approved),
        ];

        let stats = AggregateStats::from_payments(&payments);

        assert_eq!(stats.total_deposited, "250.75".parse::<Decimal>().unwrap());
        assert_eq!(stats.pending_payments, 0);
        assert_eq!(stats.approved_payments, 1);
    }

    #[test]
    fn test_overflowing_total_saturates() {
        let huge = "50000000000000000000000000000";
        let payments = vec![
            payment(1, huge, ApprovalStatus::Approved),
            payment(2, huge, ApprovalStatus::Approved),
            payment(3, "1", ApprovalStatus::Approved),
        ];

        let stats = AggregateStats::from_payments(&payments);

        assert_eq!(stats.total_deposited, Decimal::MAX);
        assert_eq!(stats.approved_payments, 3);
    }

    #[test]
    fn test_distinct_users_by_id_then_contact() {
        let mut first = payment(1, "10", ApprovalStatus::Pending);
        first.user_id = Some(RecordId::from(7_u64));
        let mut second = payment(2, "10", ApprovalStatus::Approved);
        second.user_id = Some(RecordId::from(7_u64));
        second.user_contact = Some("0803".to_string());
        let mut third = payment(3, "10", ApprovalStatus::Approved);
        third.user_contact = Some("0803".to_string());
        let fourth = payment(4, "10", ApprovalStatus::Approved);

        let stats = AggregateStats::from_payments(&[first, second, third, fourth]);

        assert_eq!(stats.total_users, 2);
    }

    #[test]
    fn test_serializes_with_dashboard_names() {
        let stats = AggregateStats {
            total_deposited: Decimal::from(5000),
            pending_payments: 1,
            approved_payments: 1,
            total_users: 2,
        };

        let json = serde_json::to_value(&stats).unwrap();

        assert_eq!(json["pendingPayments"], 1);
        assert_eq!(json["approvedPayments"], 1);
        assert_eq!(json["totalUsers"], 2);
        assert!(json.get("totalDeposited").is_some());
    }

    fn arb_status() -> impl Strategy<Value = ApprovalStatus> {
        prop_oneof![
            Just(ApprovalStatus::Pending),
            Just(ApprovalStatus::Approved),
            Just(ApprovalStatus::Rejected),
        ]
    }

    fn arb_payment() -> impl Strategy<Value = PaymentRecord> {
        (
            0_u64..1_000,
            0_i64..10_000_000,
            arb_status(),
            proptest::option::of(0_u64..20),
            proptest::option::of("[a-c]{1,2}"),
        )
            .prop_map(|(id, cents, status, user_id, contact)| {
                let mut record = PaymentRecord::new(id, Decimal::new(cents, 2));
                record.status = status;
                record.user_id = user_id.map(RecordId::from);
                record.user_contact = contact;
                record
            })
    }

    proptest! {
        #[test]
        fn prop_stats_match_independent_totals(payments in proptest::collection::vec(arb_payment(), 0..50)) {
            let stats = AggregateStats::from_payments(&payments);

            let approved: Vec<_> = payments
                .iter()
                .filter(|p| p.status == ApprovalStatus::Approved)
                .collect();
            let total: Decimal = approved.iter().map(|p| p.amount).sum();
            let pending = payments
                .iter()
                .filter(|p| p.status == ApprovalStatus::Pending)
                .count();
            let users: HashSet<UserKey> = payments.iter().filter_map(PaymentRecord::user_key).collect();

            prop_assert_eq!(stats.total_deposited, total);
            prop_assert_eq!(stats.approved_payments, approved.len());
            prop_assert_eq!(stats.pending_payments, pending);
            prop_assert_eq!(stats.total_users, users.len());
        }

        #[test]
        fn prop_stats_are_order_independent(payments in proptest::collection::vec(arb_payment(), 0..30)) {
            let mut reversed = payments.clone();
            reversed.reverse();

            prop_assert_eq!(
                AggregateStats::from_payments(&payments),
                AggregateStats::from_payments(&reversed)
            );
        }
    }
}
