//! Temporal windows over the normalized ledger and per-account aggregation.
//!
//! The P&L reads the monthly window (opening-balance journal excluded); the
//! balance sheet reads the cumulative window up to period end (opening
//! entries included). Every function returns a fresh table: stages own
//! their output and never mutate what they were handed.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::config::ConsolidationConfig;
use crate::types::{AccountBalance, AccountMovement, LedgerRow, Period};

/// Rows posted inside the period month, opening-balance entries excluded.
pub fn monthly_window(
    rows: &[LedgerRow],
    period: Period,
    opening_journal: &str,
) -> Vec<LedgerRow> {
    rows.iter()
        .filter(|r| period.contains(r.date) && r.journal != opening_journal)
        .cloned()
        .collect()
}

/// Rows posted on or before period end, opening-balance entries included.
pub fn ytd_window(rows: &[LedgerRow], period: Period) -> Vec<LedgerRow> {
    rows.iter()
        .filter(|r| r.date <= period.last_day())
        .cloned()
        .collect()
}

/// Aggregate monthly rows per (entity, account), summing debit, credit and
/// net movement. Output is sorted by entity then account.
pub fn movements_by_account(rows: &[LedgerRow]) -> Vec<AccountMovement> {
    let mut grouped: BTreeMap<(String, String), AccountMovement> = BTreeMap::new();

    for row in rows {
        let key = (row.entity.clone(), row.account.clone());
        let entry = grouped.entry(key).or_insert_with(|| AccountMovement {
            entity: row.entity.clone(),
            account: row.account.clone(),
            account_label: row.account_label.clone(),
            debit: Decimal::ZERO,
            credit: Decimal::ZERO,
            movement: Decimal::ZERO,
        });
        entry.debit += row.debit;
        entry.credit += row.credit;
        entry.movement += row.movement();
    }

    grouped.into_values().collect()
}

/// Cumulative balances per (entity, account), restricted to balance-sheet
/// account classes.
pub fn balances_by_account(
    rows: &[LedgerRow],
    config: &ConsolidationConfig,
) -> Vec<AccountBalance> {
    let mut grouped: BTreeMap<(String, String), AccountBalance> = BTreeMap::new();

    for row in rows {
        let in_scope = row.class().map_or(false, |c| config.is_bs_class(c));
        if !in_scope {
            continue;
        }
        let key = (row.entity.clone(), row.account.clone());
        let entry = grouped.entry(key).or_insert_with(|| AccountBalance {
            entity: row.entity.clone(),
            account: row.account.clone(),
            account_label: row.account_label.clone(),
            debit_cumulative: Decimal::ZERO,
            credit_cumulative: Decimal::ZERO,
            balance: Decimal::ZERO,
        });
        entry.debit_cumulative += row.debit;
        entry.credit_cumulative += row.credit;
        entry.balance += row.movement();
    }

    grouped.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use crate::types::Money;

    fn row(
        entity: &str,
        account: &str,
        journal: &str,
        day: u32,
        debit: Money,
        credit: Money,
    ) -> LedgerRow {
        LedgerRow {
            entity: entity.into(),
            account: account.into(),
            account_label: format!("Account {account}"),
            journal: journal.into(),
            date: NaiveDate::from_ymd_opt(2026, 1, day).unwrap(),
            debit,
            credit,
            narrative: None,
        }
    }

    fn sample_ledger() -> Vec<LedgerRow> {
        vec![
            // Opening balance, January
            LedgerRow {
                date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
                ..row("FR", "411000", "AN", 1, dec!(500), dec!(0))
            },
            row("FR", "706000", "VE", 10, dec!(0), dec!(1000)),
            row("FR", "706000", "VE", 20, dec!(0), dec!(200)),
            row("FR", "601000", "AC", 15, dec!(300), dec!(0)),
            // February row, outside the monthly window
            LedgerRow {
                date: NaiveDate::from_ymd_opt(2026, 2, 5).unwrap(),
                ..row("FR", "706000", "VE", 5, dec!(0), dec!(50))
            },
        ]
    }

    #[test]
    fn test_monthly_window_excludes_opening_journal() {
        let period = Period::parse("202601").unwrap();
        let monthly = monthly_window(&sample_ledger(), period, "AN");
        assert_eq!(monthly.len(), 3);
        assert!(monthly.iter().all(|r| r.journal != "AN"));
    }

    #[test]
    fn test_ytd_window_keeps_opening_journal() {
        let period = Period::parse("202601").unwrap();
        let ytd = ytd_window(&sample_ledger(), period);
        assert_eq!(ytd.len(), 4);
        assert!(ytd.iter().any(|r| r.journal == "AN"));
    }

    #[test]
    fn test_movements_by_account_sums_per_account() {
        let period = Period::parse("202601").unwrap();
        let monthly = monthly_window(&sample_ledger(), period, "AN");
        let movements = movements_by_account(&monthly);

        assert_eq!(movements.len(), 2);
        let sales = movements.iter().find(|m| m.account == "706000").unwrap();
        assert_eq!(sales.credit, dec!(1200));
        assert_eq!(sales.movement, dec!(-1200));
        assert_eq!(sales.class(), Some('7'));
    }

    #[test]
    fn test_balances_restricted_to_balance_sheet_classes() {
        let config = ConsolidationConfig::default();
        let period = Period::parse("202601").unwrap();
        let ytd = ytd_window(&sample_ledger(), period);
        let balances = balances_by_account(&ytd, &config);

        assert_eq!(balances.len(), 1);
        assert_eq!(balances[0].account, "411000");
        assert_eq!(balances[0].balance, dec!(500));
    }
}
