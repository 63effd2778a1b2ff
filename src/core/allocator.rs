use crate::core::errors::BillsplitError;
use crate::core::models::bill::ShareInput;
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::HashSet;

/// Currency minor unit: amounts carry two decimal places.
pub const MONEY_SCALE: u32 = 2;

#[derive(Clone, Debug, PartialEq)]
pub struct Allocation {
    pub user_id: String,
    pub percentage: Decimal,
    pub amount: Decimal,
}

/// Rounds a monetary value to the minor unit, halves away from zero.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

pub fn share_amount(total: Decimal, percentage: Decimal) -> Decimal {
    round_money(total * percentage / Decimal::ONE_HUNDRED)
}

/// Checks that a share set is usable: non-empty, one entry per member, every
/// percentage in `0..=100`, and the sum rounding to exactly 100.
pub fn validate_percentages(shares: &[ShareInput]) -> Result<(), BillsplitError> {
    if shares.is_empty() {
        return Err(BillsplitError::InvalidAllocation(
            "at least one share is required".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for share in shares {
        if share.percentage < Decimal::ZERO || share.percentage > Decimal::ONE_HUNDRED {
            return Err(BillsplitError::InvalidAllocation(format!(
                "percentage {} for user {} is outside 0..100",
                share.percentage, share.user_id
            )));
        }
        if !seen.insert(share.user_id.as_str()) {
            return Err(BillsplitError::InvalidAllocation(format!(
                "user {} appears in more than one share",
                share.user_id
            )));
        }
    }

    let sum: Decimal = shares.iter().map(|s| s.percentage).sum();
    let rounded = sum.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    if rounded != Decimal::ONE_HUNDRED {
        return Err(BillsplitError::InvalidAllocation(format!(
            "share percentages sum to {}, expected 100",
            sum
        )));
    }
    Ok(())
}

/// Derives per-member amounts from `total`. Each amount is rounded on its
/// own; the rounding residual is left in place, so the sum may differ from
/// `total` by at most one minor unit per share.
pub fn allocate(total: Decimal, shares: &[ShareInput]) -> Result<Vec<Allocation>, BillsplitError> {
    validate_percentages(shares)?;
    Ok(shares
        .iter()
        .map(|s| Allocation {
            user_id: s.user_id.clone(),
            percentage: s.percentage,
            amount: share_amount(total, s.percentage),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn input(user: &str, pct: &str) -> ShareInput {
        ShareInput {
            user_id: user.to_string(),
            percentage: dec(pct),
        }
    }

    #[test]
    fn splits_300_by_34_33_33() {
        let shares = vec![input("a", "34"), input("b", "33"), input("c", "33")];
        let allocations = allocate(dec("300.00"), &shares).unwrap();
        let amounts: Vec<Decimal> = allocations.iter().map(|a| a.amount).collect();
        assert_eq!(amounts, vec![dec("102.00"), dec("99.00"), dec("99.00")]);
        assert_eq!(amounts.iter().copied().sum::<Decimal>(), dec("300.00"));
    }

    #[test]
    fn fractional_percentages_sum_exactly() {
        let shares = vec![input("a", "33.34"), input("b", "33.33"), input("c", "33.33")];
        let allocations = allocate(dec("100.00"), &shares).unwrap();
        let amounts: Vec<Decimal> = allocations.iter().map(|a| a.amount).collect();
        assert_eq!(amounts, vec![dec("33.34"), dec("33.33"), dec("33.33")]);
        assert_eq!(amounts.iter().copied().sum::<Decimal>(), dec("100.00"));
    }

    #[test]
    fn residual_is_not_reconciled() {
        let shares = vec![input("a", "50"), input("b", "50")];
        let allocations = allocate(dec("0.05"), &shares).unwrap();
        assert_eq!(allocations[0].amount, dec("0.03"));
        assert_eq!(allocations[1].amount, dec("0.03"));
        let sum: Decimal = allocations.iter().map(|a| a.amount).sum();
        let residual = (sum - dec("0.05")).abs();
        assert!(residual <= dec("0.01") * Decimal::from(allocations.len()));
    }

    #[test]
    fn sum_is_rounded_before_comparison() {
        let shares = vec![input("a", "33.3"), input("b", "33.3"), input("c", "33.3")];
        assert!(validate_percentages(&shares).is_ok());
    }

    #[test]
    fn rejects_sums_other_than_100() {
        let shares = vec![input("a", "50"), input("b", "40")];
        assert!(matches!(
            allocate(dec("100"), &shares),
            Err(BillsplitError::InvalidAllocation(_))
        ));
        let over = vec![input("a", "60"), input("b", "41")];
        assert!(matches!(
            validate_percentages(&over),
            Err(BillsplitError::InvalidAllocation(_))
        ));
    }

    #[test]
    fn rejects_empty_duplicate_and_out_of_range() {
        assert!(validate_percentages(&[]).is_err());
        assert!(validate_percentages(&[input("a", "50"), input("a", "50")]).is_err());
        assert!(validate_percentages(&[input("a", "120"), input("b", "-20")]).is_err());
    }
}
