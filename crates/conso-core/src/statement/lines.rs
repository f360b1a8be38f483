//! Statement-line dictionary and assembly.
//!
//! A [`StatementLines`] is an insertion-ordered map from canonical line
//! name to signed amount, built per reporting group. Subtotals are a pure
//! function of that dictionary and the fixed formula chain; assembly walks
//! the configured row structure to produce presentation-ready rows.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::ConsolidationConfig;
use crate::lease::LeaseReclassification;
use crate::payroll::{CostCenterKind, StaffCostLine};
use crate::statement::aggregate::{BsAggregate, PlAggregate};
use crate::types::Money;

// Canonical statement lines.
pub const SALES: &str = "Sales";
pub const B2C_REVENUE: &str = "B2C Revenue";
pub const B2B_REVENUE: &str = "B2B Revenue";
pub const COGS: &str = "COGS";
pub const STAFF_COSTS_OPERATING: &str = "Staff costs (Operating)";
pub const STAFF_COSTS_NON_OP: &str = "Staff costs (Non-op.)";
pub const MARKETING_COSTS: &str = "Marketing costs";
pub const FREELANCE: &str = "Freelance";
pub const SERVERS_SOFTWARES: &str = "Servers & softwares";
pub const STRUCTURE_COSTS: &str = "Structure costs";
pub const ACCOMMODATION_COSTS: &str = "Accommodation costs";
pub const PROFIT_SHARING: &str = "Profit-sharing";
pub const RENTS_CHARGES: &str = "Rents & charges";
pub const DA_FIXED_ASSETS: &str = "D&A on fixed assets";
pub const DA_MILESTONES: &str = "D&A - Milestones";
pub const DA_ROU: &str = "D&A ROU (IFRS 16)";
pub const FINANCIAL_INCOME: &str = "Financial income (loss)";
pub const TAX: &str = "Tax";

// Derived subtotal lines.
pub const GROSS_PROFIT: &str = "GROSS PROFIT";
pub const CONTRIBUTION_MARGIN: &str = "CONTRIBUTION MARGIN";
pub const EBITDA: &str = "EBITDA";
pub const EBIT: &str = "EBIT";
pub const EBT: &str = "EBT";
pub const NET_INCOME: &str = "NET INCOME";

/// Where a P&L detail label lands in the statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineTarget {
    /// Fold into the named canonical statement line.
    Line(String),
    /// Deliberately excluded (e.g. ledger staff costs replaced by the
    /// payroll split).
    Skip,
}

/// One normalization rule: detail label to statement target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineRule {
    pub detail: String,
    pub target: LineTarget,
}

/// Presentation role of a statement row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowKind {
    Section,
    Item,
    Subtotal,
    Total,
    Spacer,
}

/// One row of the fixed statement structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementRowSpec {
    pub label: String,
    pub kind: RowKind,
}

/// A presentation-ready statement row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementRow {
    pub label: String,
    pub kind: RowKind,
    /// Absent for sections and spacers.
    pub amount: Option<Money>,
}

/// Insertion-ordered map from canonical line name to signed amount.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatementLines {
    order: Vec<String>,
    amounts: HashMap<String, Money>,
}

impl StatementLines {
    pub fn new() -> Self {
        StatementLines::default()
    }

    /// Amount for a line, zero when the line was never touched.
    pub fn get(&self, line: &str) -> Money {
        self.amounts.get(line).copied().unwrap_or(Decimal::ZERO)
    }

    pub fn add(&mut self, line: &str, amount: Money) {
        if !self.amounts.contains_key(line) {
            self.order.push(line.to_string());
        }
        *self
            .amounts
            .entry(line.to_string())
            .or_insert(Decimal::ZERO) += amount;
    }

    pub fn set(&mut self, line: &str, amount: Money) {
        if !self.amounts.contains_key(line) {
            self.order.push(line.to_string());
        }
        self.amounts.insert(line.to_string(), amount);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Money)> + '_ {
        self.order
            .iter()
            .map(move |l| (l.as_str(), self.get(l)))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Build the line dictionary for a reporting group: normalized P&L lines,
/// payroll staff costs, lease reclassification, then the subtotal chain.
pub fn build_group_lines(
    entities: &[String],
    pl: &[PlAggregate],
    staff_costs: &[StaffCostLine],
    leases: &[LeaseReclassification],
    config: &ConsolidationConfig,
) -> StatementLines {
    let rules: HashMap<&str, &LineTarget> = config
        .line_normalization
        .iter()
        .map(|r| (r.detail.as_str(), &r.target))
        .collect();

    let mut lines = StatementLines::new();

    for agg in pl.iter().filter(|l| entities.contains(&l.entity)) {
        match rules.get(agg.detail.as_str()) {
            Some(LineTarget::Line(name)) => lines.add(name, agg.amount),
            // Unknown details stay out of the statement, like explicit skips.
            Some(LineTarget::Skip) | None => {}
        }
    }

    let mut operating = Decimal::ZERO;
    let mut non_operating = Decimal::ZERO;
    for staff in staff_costs.iter().filter(|s| entities.contains(&s.entity)) {
        match staff.cost_center {
            CostCenterKind::Operating => operating += staff.amount,
            CostCenterKind::NonOperating => non_operating += staff.amount,
        }
    }
    lines.set(&config.operating_staff_line, operating);
    lines.set(&config.non_operating_staff_line, non_operating);

    // Lease reclassification: the rent leaves the operating cost line and
    // returns below EBITDA as an equal depreciation charge.
    let mut rou = Decimal::ZERO;
    for adj in leases.iter().filter(|l| entities.contains(&l.entity)) {
        lines.add(&config.rents_line, -adj.rent_neutralization);
        rou += -adj.rou_depreciation;
    }
    lines.set(&config.rou_line, rou);

    apply_subtotals(&mut lines);
    lines
}

/// Compute the fixed subtotal chain over the line dictionary.
pub fn apply_subtotals(lines: &mut StatementLines) {
    let gross_profit = lines.get(SALES) + lines.get(B2C_REVENUE) + lines.get(B2B_REVENUE)
        - lines.get(COGS);
    lines.set(GROSS_PROFIT, gross_profit);

    let contribution_margin = gross_profit
        - lines.get(STAFF_COSTS_OPERATING)
        - lines.get(MARKETING_COSTS)
        - lines.get(FREELANCE)
        - lines.get(SERVERS_SOFTWARES);
    lines.set(CONTRIBUTION_MARGIN, contribution_margin);

    let ebitda = contribution_margin
        - lines.get(STAFF_COSTS_NON_OP)
        - lines.get(STRUCTURE_COSTS)
        - lines.get(ACCOMMODATION_COSTS)
        - lines.get(PROFIT_SHARING)
        - lines.get(RENTS_CHARGES);
    lines.set(EBITDA, ebitda);

    let ebit = ebitda - lines.get(DA_FIXED_ASSETS) - lines.get(DA_MILESTONES)
        - lines.get(DA_ROU);
    lines.set(EBIT, ebit);

    let ebt = ebit + lines.get(FINANCIAL_INCOME);
    lines.set(EBT, ebt);

    lines.set(NET_INCOME, ebt - lines.get(TAX));
}

/// Walk the fixed row structure and attach amounts from the dictionary.
pub fn assemble(
    lines: &StatementLines,
    structure: &[StatementRowSpec],
) -> Vec<StatementRow> {
    structure
        .iter()
        .map(|spec| StatementRow {
            label: spec.label.clone(),
            kind: spec.kind,
            amount: match spec.kind {
                RowKind::Section | RowKind::Spacer => None,
                _ => Some(lines.get(&spec.label)),
            },
        })
        .collect()
}

/// One balance-sheet pivot row: a statement line with one column per
/// entity (in `entities` order) plus the group total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceSheetRow {
    pub line: String,
    pub by_entity: Vec<Money>,
    pub total: Money,
}

/// Pivot aggregated balance-sheet lines into one row per detail line with
/// a column per entity and a consolidated total.
pub fn balance_sheet_pivot(
    bs: &[BsAggregate],
    entities: &[String],
) -> Vec<BalanceSheetRow> {
    let mut order: Vec<String> = Vec::new();
    for agg in bs {
        if !order.contains(&agg.detail) {
            order.push(agg.detail.clone());
        }
    }

    order
        .into_iter()
        .map(|line| {
            let by_entity: Vec<Money> = entities
                .iter()
                .map(|entity| {
                    bs.iter()
                        .filter(|a| &a.entity == entity && a.detail == line)
                        .map(|a| a.balance)
                        .sum()
                })
                .collect();
            let total = by_entity.iter().copied().sum();
            BalanceSheetRow {
                line,
                by_entity,
                total,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn pl_line(entity: &str, detail: &str, amount: Money) -> PlAggregate {
        PlAggregate {
            entity: entity.into(),
            category: None,
            detail: detail.into(),
            amount,
        }
    }

    #[test]
    fn test_subtotal_chain() {
        let mut lines = StatementLines::new();
        lines.set(SALES, dec!(1000));
        lines.set(COGS, dec!(400));
        lines.set(STAFF_COSTS_OPERATING, dec!(200));
        lines.set(RENTS_CHARGES, dec!(50));
        lines.set(DA_FIXED_ASSETS, dec!(30));
        lines.set(FINANCIAL_INCOME, dec!(-10));
        lines.set(TAX, dec!(20));
        apply_subtotals(&mut lines);

        assert_eq!(lines.get(GROSS_PROFIT), dec!(600));
        assert_eq!(lines.get(CONTRIBUTION_MARGIN), dec!(400));
        assert_eq!(lines.get(EBITDA), dec!(350));
        assert_eq!(lines.get(EBIT), dec!(320));
        assert_eq!(lines.get(EBT), dec!(310));
        assert_eq!(lines.get(NET_INCOME), dec!(290));
    }

    #[test]
    fn test_lease_reclassification_leaves_ebit_unchanged() {
        let config = ConsolidationConfig::default();
        let entities = vec!["PID".to_string()];
        let pl = vec![
            pl_line("PID", "SALES", dec!(1000)),
            pl_line("PID", "Rents & charges", dec!(300)),
        ];

        let before = build_group_lines(&entities, &pl, &[], &[], &config);

        let leases = vec![LeaseReclassification {
            entity: "PID".to_string(),
            rent_neutralization: dec!(300),
            rou_depreciation: dec!(-300),
        }];
        let after = build_group_lines(&entities, &pl, &[], &leases, &config);

        assert_eq!(after.get(RENTS_CHARGES), dec!(0));
        assert_eq!(after.get(DA_ROU), dec!(300));
        assert_eq!(after.get(EBITDA), before.get(EBITDA) + dec!(300));
        assert_eq!(after.get(EBIT), before.get(EBIT));
    }

    #[test]
    fn test_group_lines_filter_entities_and_skip_rules() {
        let config = ConsolidationConfig::default();
        let entities = vec!["FR".to_string()];
        let pl = vec![
            pl_line("FR", "SALES", dec!(100)),
            pl_line("FR", "Staff costs", dec!(40)),
            pl_line("PID", "SALES", dec!(999)),
        ];
        let lines = build_group_lines(&entities, &pl, &[], &[], &config);

        assert_eq!(lines.get(SALES), dec!(100));
        // Ledger staff costs are skipped; the payroll split owns that line.
        assert_eq!(lines.get(STAFF_COSTS_OPERATING), dec!(0));
    }

    #[test]
    fn test_staff_costs_split_by_cost_center_kind() {
        let config = ConsolidationConfig::default();
        let entities = vec!["FR".to_string()];
        let staff = vec![
            StaffCostLine {
                entity: "FR".into(),
                business_unit: "Publishing".into(),
                cost_center: CostCenterKind::Operating,
                amount: dec!(120),
            },
            StaffCostLine {
                entity: "FR".into(),
                business_unit: "Support".into(),
                cost_center: CostCenterKind::NonOperating,
                amount: dec!(80),
            },
        ];
        let lines = build_group_lines(&entities, &[], &staff, &[], &config);

        assert_eq!(lines.get(STAFF_COSTS_OPERATING), dec!(120));
        assert_eq!(lines.get(STAFF_COSTS_NON_OP), dec!(80));
    }

    #[test]
    fn test_assemble_follows_structure() {
        let config = ConsolidationConfig::default();
        let mut lines = StatementLines::new();
        lines.set(SALES, dec!(500));
        apply_subtotals(&mut lines);

        let rows = assemble(&lines, &config.statement_rows);
        assert_eq!(rows.len(), config.statement_rows.len());

        let sales = rows.iter().find(|r| r.label == SALES).unwrap();
        assert_eq!(sales.amount, Some(dec!(500)));
        let section = rows.iter().find(|r| r.kind == RowKind::Section).unwrap();
        assert_eq!(section.amount, None);
    }

    #[test]
    fn test_balance_sheet_pivot_totals_per_line() {
        let entities = vec!["FR".to_string(), "PID".to_string()];
        let bs = vec![
            BsAggregate {
                entity: "FR".into(),
                category: None,
                detail: "Trade receivables".into(),
                balance: dec!(500),
            },
            BsAggregate {
                entity: "PID".into(),
                category: None,
                detail: "Trade receivables".into(),
                balance: dec!(250),
            },
        ];
        let pivot = balance_sheet_pivot(&bs, &entities);

        assert_eq!(pivot.len(), 1);
        assert_eq!(pivot[0].by_entity, vec![dec!(500), dec!(250)]);
        assert_eq!(pivot[0].total, dec!(750));
    }

    #[test]
    fn test_statement_lines_preserve_insertion_order() {
        let mut lines = StatementLines::new();
        lines.add("B", dec!(1));
        lines.add("A", dec!(2));
        lines.add("B", dec!(3));

        let order: Vec<&str> = lines.iter().map(|(l, _)| l).collect();
        assert_eq!(order, vec!["B", "A"]);
        assert_eq!(lines.get("B"), dec!(4));
    }
}
