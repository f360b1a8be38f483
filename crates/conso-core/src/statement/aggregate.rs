//! Aggregation of mapped movements into statement lines.
//!
//! The ledger stores revenue accounts credit-side, so class-7 movements are
//! negative; the aggregator flips them so revenue and costs both read as
//! positive magnitudes in the statement convention. Balance-sheet
//! aggregation keeps the ledger sign.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::ConsolidationConfig;
use crate::mapping::{ChartOfAccounts, MappedMovement};
use crate::types::{AccountBalance, Money};

/// Revenue account class whose sign is flipped into the statement
/// convention.
const REVENUE_CLASS: char = '7';

/// One aggregated P&L statement line for an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlAggregate {
    pub entity: String,
    pub category: Option<String>,
    pub detail: String,
    pub amount: Money,
}

/// One aggregated balance-sheet line for an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BsAggregate {
    pub entity: String,
    pub category: Option<String>,
    pub detail: String,
    pub balance: Money,
}

/// Collapse mapped movements into P&L lines per (entity, category, detail).
///
/// Only P&L account classes with a resolved P&L detail contribute, so the
/// output never invents a line absent from the mapping tables.
pub fn aggregate_pl(
    mapped: &[MappedMovement],
    config: &ConsolidationConfig,
) -> Vec<PlAggregate> {
    let mut grouped: BTreeMap<(String, String, String), Money> = BTreeMap::new();

    for m in mapped {
        let class = match m.class() {
            Some(c) if config.is_pl_class(c) => c,
            _ => continue,
        };
        let detail = match &m.pl_detail {
            Some(d) => d.clone(),
            None => continue,
        };
        let contribution = if class == REVENUE_CLASS {
            -m.movement
        } else {
            m.movement
        };
        let key = (
            m.entity.clone(),
            m.pl_category.clone().unwrap_or_default(),
            detail,
        );
        *grouped.entry(key).or_insert(Decimal::ZERO) += contribution;
    }

    grouped
        .into_iter()
        .map(|((entity, category, detail), amount)| PlAggregate {
            entity,
            category: if category.is_empty() {
                None
            } else {
                Some(category)
            },
            detail,
            amount,
        })
        .collect()
}

/// Collapse per-account balances into balance-sheet lines, joining each
/// entity's balances against its own mapping table. No sign flip.
pub fn aggregate_bs(
    balances: &[AccountBalance],
    charts: &[ChartOfAccounts],
    config: &ConsolidationConfig,
) -> Vec<BsAggregate> {
    let mut grouped: BTreeMap<(String, String, String), Money> = BTreeMap::new();

    for chart in charts {
        for balance in balances.iter().filter(|b| b.entity == chart.entity) {
            let in_scope = balance.class().map_or(false, |c| config.is_bs_class(c));
            if !in_scope {
                continue;
            }
            let entry = match chart.resolve(&balance.account) {
                Some(e) => e,
                None => continue,
            };
            let detail = match &entry.bs_detail {
                Some(d) => d.clone(),
                None => continue,
            };
            let key = (
                balance.entity.clone(),
                entry.bs_category.clone().unwrap_or_default(),
                detail,
            );
            *grouped.entry(key).or_insert(Decimal::ZERO) += balance.balance;
        }
    }

    grouped
        .into_iter()
        .map(|((entity, category, detail), balance)| BsAggregate {
            entity,
            category: if category.is_empty() {
                None
            } else {
                Some(category)
            },
            detail,
            balance,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    use crate::mapping::MappingEntry;

    fn mapped(
        entity: &str,
        account: &str,
        movement: Money,
        pl_detail: Option<&str>,
    ) -> MappedMovement {
        MappedMovement {
            entity: entity.into(),
            account: account.into(),
            account_label: format!("Account {account}"),
            debit: dec!(0),
            credit: dec!(0),
            movement,
            pl_category: pl_detail.map(|_| "Operations".to_string()),
            pl_detail: pl_detail.map(|d| d.to_string()),
            bs_category: None,
            bs_detail: None,
        }
    }

    #[test]
    fn test_revenue_sign_flipped_costs_untouched() {
        let config = ConsolidationConfig::default();
        let rows = vec![
            mapped("FR", "706000", dec!(-1200), Some("SALES")),
            mapped("FR", "601000", dec!(300), Some("COGS")),
        ];
        let pl = aggregate_pl(&rows, &config);

        let sales = pl.iter().find(|l| l.detail == "SALES").unwrap();
        let cogs = pl.iter().find(|l| l.detail == "COGS").unwrap();
        assert_eq!(sales.amount, dec!(1200));
        assert_eq!(cogs.amount, dec!(300));
    }

    #[test]
    fn test_non_pl_classes_excluded() {
        let config = ConsolidationConfig::default();
        let rows = vec![
            mapped("FR", "411000", dec!(500), Some("SALES")),
            mapped("FR", "706000", dec!(-100), None),
        ];
        assert!(aggregate_pl(&rows, &config).is_empty());
    }

    #[test]
    fn test_pl_groups_accounts_sharing_a_detail() {
        let config = ConsolidationConfig::default();
        let rows = vec![
            mapped("FR", "706000", dec!(-100), Some("SALES")),
            mapped("FR", "707000", dec!(-50), Some("SALES")),
            mapped("PID", "706000", dec!(-30), Some("SALES")),
        ];
        let pl = aggregate_pl(&rows, &config);

        assert_eq!(pl.len(), 2);
        let fr = pl.iter().find(|l| l.entity == "FR").unwrap();
        assert_eq!(fr.amount, dec!(150));
    }

    #[test]
    fn test_bs_aggregation_keeps_ledger_sign() {
        let config = ConsolidationConfig::default();
        let chart = ChartOfAccounts::new(
            "FR",
            vec![MappingEntry::from_raw(
                "411000",
                "Clients",
                "NA",
                "NA",
                "Current assets",
                "Trade receivables",
            )],
        );
        let balances = vec![AccountBalance {
            entity: "FR".into(),
            account: "411000".into(),
            account_label: "Clients".into(),
            debit_cumulative: dec!(800),
            credit_cumulative: dec!(300),
            balance: dec!(500),
        }];
        let bs = aggregate_bs(&balances, &[chart], &config);

        assert_eq!(bs.len(), 1);
        assert_eq!(bs[0].detail, "Trade receivables");
        assert_eq!(bs[0].category.as_deref(), Some("Current assets"));
        assert_eq!(bs[0].balance, dec!(500));
    }
}
