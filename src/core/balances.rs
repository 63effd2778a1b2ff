//! Read-side balance figures. Every function works on a bill population that
//! the caller has already narrowed to the wanted scope and window; archived
//! bills must not be passed in.

use crate::core::models::bill::{Bill, Share};
use crate::core::models::summary::{BalanceSummary, CategoryTotal};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

pub const UNCATEGORIZED: &str = "Uncategorized";

/// Sum of the person's own pending shares.
pub fn total_to_pay(bills: &[Bill], person: &str) -> Decimal {
    bills
        .iter()
        .flat_map(|b| b.shares.iter())
        .filter(|s| s.user_id == person && s.is_pending())
        .map(|s| s.amount)
        .sum()
}

/// Pending shares of other members on bills the person receives. A receiver
/// who also holds a share never receives from themselves.
pub fn total_to_receive(bills: &[Bill], person: &str) -> Decimal {
    bills
        .iter()
        .filter(|b| b.is_receiver(person))
        .flat_map(|b| b.shares.iter())
        .filter(|s| s.user_id != person && s.is_pending())
        .map(|s| s.amount)
        .sum()
}

pub fn summarize(bills: &[Bill], person: &str) -> BalanceSummary {
    let total_to_pay = total_to_pay(bills, person);
    let total_to_receive = total_to_receive(bills, person);
    BalanceSummary {
        total_to_pay,
        total_to_receive,
        net_balance: total_to_receive - total_to_pay,
    }
}

pub fn category_label(category: Option<&str>) -> String {
    match category.map(str::trim) {
        Some(c) if !c.is_empty() => c.to_string(),
        _ => UNCATEGORIZED.to_string(),
    }
}

/// `total_to_pay` split by bill category, ordered by category name.
pub fn category_breakdown(bills: &[Bill], person: &str) -> Vec<CategoryTotal> {
    let mut totals: BTreeMap<String, Decimal> = BTreeMap::new();
    for (bill, share) in pending_shares_of(bills, person) {
        *totals.entry(category_label(bill.category.as_deref())).or_default() += share.amount;
    }
    totals
        .into_iter()
        .map(|(category, amount)| CategoryTotal { category, amount })
        .collect()
}

/// The person's pending shares, oldest due date first, then bill creation.
pub fn pending_shares_of<'a>(bills: &'a [Bill], person: &str) -> Vec<(&'a Bill, &'a Share)> {
    let mut lines: Vec<(&Bill, &Share)> = bills
        .iter()
        .flat_map(|b| b.shares.iter().map(move |s| (b, s)))
        .filter(|(_, s)| s.user_id == person && s.is_pending())
        .collect();
    lines.sort_by(|(a, _), (b, _)| {
        a.due_date
            .cmp(&b.due_date)
            .then(a.created_at.cmp(&b.created_at))
    });
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::bill::{BillStatus, ShareStatus};
    use chrono::{Duration, NaiveDate, Utc};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn share(user: &str, amount: &str, status: ShareStatus) -> Share {
        Share {
            id: format!("share-{}", user),
            bill_id: "bill".to_string(),
            user_id: user.to_string(),
            percentage: Decimal::ZERO,
            amount: dec(amount),
            status,
            created_at: Utc::now(),
        }
    }

    fn bill(id: &str, receiver: Option<&str>, category: Option<&str>, due_day: u32, shares: Vec<Share>) -> Bill {
        let now = Utc::now();
        Bill {
            id: id.to_string(),
            group_id: "g".to_string(),
            environment_id: "e".to_string(),
            title: id.to_string(),
            due_date: NaiveDate::from_ymd_opt(2024, 3, due_day).unwrap(),
            total_amount: shares.iter().map(|s| s.amount).sum(),
            installments: 1,
            pix_key: None,
            payment_link: None,
            attachment_url: None,
            owner_id: "a".to_string(),
            receiver_id: receiver.map(String::from),
            receiver_name: None,
            category: category.map(String::from),
            status: BillStatus::Open,
            archived: false,
            recurring_bill_id: None,
            shares,
            created_at: now + Duration::seconds(due_day as i64),
            updated_at: now,
        }
    }

    #[test]
    fn receiver_own_share_is_excluded() {
        let bills = vec![bill(
            "rent",
            Some("a"),
            None,
            5,
            vec![
                share("a", "50", ShareStatus::Pending),
                share("b", "50", ShareStatus::Pending),
            ],
        )];
        let summary = summarize(&bills, "a");
        assert_eq!(summary.total_to_receive, dec("50"));
        assert_eq!(summary.total_to_pay, dec("50"));
        assert_eq!(summary.net_balance, Decimal::ZERO);

        let b = summarize(&bills, "b");
        assert_eq!(b.total_to_pay, dec("50"));
        assert_eq!(b.total_to_receive, Decimal::ZERO);
        assert_eq!(b.net_balance, dec("-50"));
    }

    #[test]
    fn paid_shares_do_not_count() {
        let bills = vec![bill(
            "power",
            Some("a"),
            None,
            5,
            vec![
                share("b", "30", ShareStatus::Paid),
                share("c", "20", ShareStatus::Pending),
            ],
        )];
        assert_eq!(total_to_receive(&bills, "a"), dec("20"));
        assert_eq!(total_to_pay(&bills, "b"), Decimal::ZERO);
    }

    #[test]
    fn breakdown_uses_uncategorized_bucket() {
        let bills = vec![
            bill("a", None, Some("Food"), 1, vec![share("p", "10", ShareStatus::Pending)]),
            bill("b", None, Some("  "), 2, vec![share("p", "5", ShareStatus::Pending)]),
            bill("c", None, None, 3, vec![share("p", "2.50", ShareStatus::Pending)]),
            bill("d", None, Some(" Food "), 4, vec![share("p", "1", ShareStatus::Pending)]),
        ];
        let breakdown = category_breakdown(&bills, "p");
        assert_eq!(
            breakdown,
            vec![
                CategoryTotal { category: "Food".to_string(), amount: dec("11") },
                CategoryTotal { category: UNCATEGORIZED.to_string(), amount: dec("7.50") },
            ]
        );
    }

    #[test]
    fn pending_shares_are_ordered_by_due_date() {
        let bills = vec![
            bill("late", None, None, 20, vec![share("p", "1", ShareStatus::Pending)]),
            bill("early", None, None, 2, vec![share("p", "1", ShareStatus::Pending)]),
        ];
        let lines = pending_shares_of(&bills, "p");
        assert_eq!(lines[0].0.id, "early");
        assert_eq!(lines[1].0.id, "late");
    }

    #[test]
    fn empty_scope_is_zero() {
        assert_eq!(summarize(&[], "nobody"), BalanceSummary::default());
        assert!(category_breakdown(&[], "nobody").is_empty());
    }
}
