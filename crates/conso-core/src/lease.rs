//! IFRS 16 lease reclassification.
//!
//! For each in-scope entity, the recognized operating lease expense for
//! the month is replaced by an equal depreciation charge: EBITDA excludes
//! the rent, EBIT is unchanged. Straight pass-through, no amortization
//! schedule.

use serde::{Deserialize, Serialize};

use crate::types::{LedgerRow, Money, Period};

/// Lease account prefix of an IFRS-16-in-scope entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaseAccount {
    pub entity: String,
    pub account_prefix: String,
}

impl LeaseAccount {
    pub fn new(entity: &str, account_prefix: &str) -> Self {
        LeaseAccount {
            entity: entity.to_string(),
            account_prefix: account_prefix.to_string(),
        }
    }
}

/// Two equal-and-opposite pseudo-lines for one entity and period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaseReclassification {
    pub entity: String,
    /// Reversal of the operating lease expense, out of EBITDA.
    pub rent_neutralization: Money,
    /// Right-of-use depreciation of identical magnitude, opposite sign.
    pub rou_depreciation: Money,
}

/// Extract the monthly lease expense per in-scope entity and build the
/// EBIT-neutral substitution lines. Amounts are rounded to 2 decimals.
pub fn reclassify_leases(
    rows: &[LedgerRow],
    period: Period,
    leases: &[LeaseAccount],
) -> Vec<LeaseReclassification> {
    leases
        .iter()
        .map(|lease| {
            let rent: Money = rows
                .iter()
                .filter(|r| {
                    r.entity == lease.entity
                        && r.account.starts_with(&lease.account_prefix)
                        && period.contains(r.date)
                })
                .map(|r| r.movement())
                .sum();
            let rent = rent.round_dp(2);
            LeaseReclassification {
                entity: lease.entity.clone(),
                rent_neutralization: rent,
                rou_depreciation: -rent,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn row(entity: &str, account: &str, month: u32, debit: Money, credit: Money) -> LedgerRow {
        LedgerRow {
            entity: entity.into(),
            account: account.into(),
            account_label: "Locations".into(),
            journal: "AC".into(),
            date: NaiveDate::from_ymd_opt(2026, month, 10).unwrap(),
            debit,
            credit,
            narrative: None,
        }
    }

    #[test]
    fn test_monthly_rent_produces_opposite_pseudo_lines() {
        let period = Period::parse("202601").unwrap();
        let rows = vec![
            row("PID", "613430", 1, dec!(600), dec!(0)),
            row("PID", "613431", 1, dec!(400), dec!(0)),
        ];
        let leases = vec![LeaseAccount::new("PID", "61343")];

        let result = reclassify_leases(&rows, period, &leases);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].rent_neutralization, dec!(1000.00));
        assert_eq!(result[0].rou_depreciation, dec!(-1000.00));
    }

    #[test]
    fn test_ebit_neutrality_invariant() {
        let period = Period::parse("202601").unwrap();
        let rows = vec![
            row("PID", "613430", 1, dec!(812.37), dec!(0)),
            row("CELSIUS", "613200", 1, dec!(455.10), dec!(12.22)),
        ];
        let leases = vec![
            LeaseAccount::new("PID", "61343"),
            LeaseAccount::new("CELSIUS", "61320"),
        ];

        for adj in reclassify_leases(&rows, period, &leases) {
            assert_eq!(adj.rent_neutralization + adj.rou_depreciation, dec!(0));
        }
    }

    #[test]
    fn test_scope_restricted_to_entity_prefix_and_month() {
        let period = Period::parse("202601").unwrap();
        let rows = vec![
            row("PID", "613430", 1, dec!(1000), dec!(0)),
            // Other entity, other prefix, other month: all out of scope.
            row("CELSIUS", "613430", 1, dec!(500), dec!(0)),
            row("PID", "613500", 1, dec!(500), dec!(0)),
            row("PID", "613430", 2, dec!(500), dec!(0)),
        ];
        let leases = vec![LeaseAccount::new("PID", "61343")];

        let result = reclassify_leases(&rows, period, &leases);
        assert_eq!(result[0].rent_neutralization, dec!(1000));
    }

    #[test]
    fn test_entity_without_movement_yields_zero_lines() {
        let period = Period::parse("202601").unwrap();
        let leases = vec![LeaseAccount::new("PID", "61343")];

        let result = reclassify_leases(&[], period, &leases);
        assert_eq!(result[0].rent_neutralization, dec!(0));
        assert_eq!(result[0].rou_depreciation, dec!(0));
    }
}
