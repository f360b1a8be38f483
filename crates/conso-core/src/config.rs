use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::allocation::{BuAlias, FlowType, SubGroup, SubGroupSplit};
use crate::lease::LeaseAccount;
use crate::statement::lines::{
    self, LineRule, LineTarget, RowKind, StatementRowSpec,
};
use crate::types::Money;

/// A named subset of entities whose statement lines are also summed
/// together for combined reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportingGroup {
    pub name: String,
    pub entities: Vec<String>,
}

/// Immutable engine configuration, passed explicitly into each stage.
///
/// Serde fills any omitted field from `Default`, so run specifications only
/// need to override what differs from the standard group setup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsolidationConfig {
    /// Fixed set of consolidated legal entities.
    pub entities: Vec<String>,
    /// Account class digits routed to the P&L.
    pub pl_classes: Vec<char>,
    /// Account class digits routed to the balance sheet.
    pub bs_classes: Vec<char>,
    /// Journal code of opening-balance entries, excluded from the monthly
    /// P&L window.
    pub opening_journal: String,
    /// Absolute residual at or below which an intercompany rule is balanced.
    pub tolerance: Money,
    /// P&L detail lines that make up the revenue accounting total.
    pub revenue_lines: Vec<String>,
    /// P&L detail lines that make up the cost-of-goods accounting total.
    pub cogs_lines: Vec<String>,
    /// Statement line carried by allocated revenue rows.
    pub allocated_revenue_line: String,
    /// Statement line carried by allocated cost-of-goods rows.
    pub allocated_cogs_line: String,
    /// Raw business-unit labels regrouped into canonical units.
    pub bu_aliases: Vec<BuAlias>,
    /// Sub-group roll-up allocation for the one entity that needs it.
    pub subgroup_split: Option<SubGroupSplit>,
    /// Lease account prefix per IFRS-16-in-scope entity.
    pub lease_accounts: Vec<LeaseAccount>,
    /// P&L detail label to canonical statement line.
    pub line_normalization: Vec<LineRule>,
    pub operating_staff_line: String,
    pub non_operating_staff_line: String,
    pub rents_line: String,
    pub rou_line: String,
    /// Fixed presentation structure of the assembled statement.
    pub statement_rows: Vec<StatementRowSpec>,
    pub reporting_groups: Vec<ReportingGroup>,
}

impl ConsolidationConfig {
    pub fn is_pl_class(&self, class: char) -> bool {
        self.pl_classes.contains(&class)
    }

    pub fn is_bs_class(&self, class: char) -> bool {
        self.bs_classes.contains(&class)
    }

    /// Detail lines summed into the accounting total for a flow type.
    pub fn flow_lines(&self, flow: FlowType) -> &[String] {
        match flow {
            FlowType::Revenue => &self.revenue_lines,
            FlowType::CostOfGoods => &self.cogs_lines,
        }
    }

    /// Statement line attached to allocation rows for a flow type.
    pub fn flow_output_line(&self, flow: FlowType) -> &str {
        match flow {
            FlowType::Revenue => &self.allocated_revenue_line,
            FlowType::CostOfGoods => &self.allocated_cogs_line,
        }
    }

    /// Regroup a raw business-unit label into its canonical unit.
    pub fn canonical_bu(&self, raw: &str) -> String {
        self.bu_aliases
            .iter()
            .find(|a| a.raw == raw)
            .map(|a| a.canonical.clone())
            .unwrap_or_else(|| raw.to_string())
    }
}

impl Default for ConsolidationConfig {
    fn default() -> Self {
        let strings = |items: &[&str]| -> Vec<String> {
            items.iter().map(|s| s.to_string()).collect()
        };

        let keep = |detail: &str, line: &str| LineRule {
            detail: detail.to_string(),
            target: LineTarget::Line(line.to_string()),
        };

        let row = |label: &str, kind: RowKind| StatementRowSpec {
            label: label.to_string(),
            kind,
        };

        ConsolidationConfig {
            entities: strings(&["FR", "PID", "CELSIUS", "VERTICAL"]),
            pl_classes: vec!['6', '7'],
            bs_classes: vec!['1', '2', '3', '4', '5'],
            opening_journal: "AN".to_string(),
            tolerance: dec!(0.01),
            revenue_lines: strings(&["SALES", "B2B Revenue", "B2C Revenue"]),
            cogs_lines: strings(&["COGS"]),
            allocated_revenue_line: "SALES".to_string(),
            allocated_cogs_line: "COGS".to_string(),
            bu_aliases: vec![
                BuAlias::new("DV", "Publishing"),
                BuAlias::new("PID GAMES", "Publishing"),
                BuAlias::new("DISTRIBUTION", "Distribution"),
            ],
            subgroup_split: Some(SubGroupSplit {
                entity: "CELSIUS".to_string(),
                flow: FlowType::Revenue,
                groups: vec![
                    SubGroup {
                        source_line: "B2C Revenue".to_string(),
                        business_units: strings(&["MGG", "RR", "Autres B2C"]),
                        rollup_label: Some("Total B2C".to_string()),
                    },
                    SubGroup {
                        source_line: "B2B Revenue".to_string(),
                        business_units: strings(&["B2B"]),
                        rollup_label: None,
                    },
                ],
            }),
            lease_accounts: vec![
                LeaseAccount::new("PID", "61343"),
                LeaseAccount::new("CELSIUS", "61320"),
            ],
            line_normalization: vec![
                keep("SALES", lines::SALES),
                keep("B2C Revenue", lines::B2C_REVENUE),
                keep("B2B Revenue", lines::B2B_REVENUE),
                keep("COGS", lines::COGS),
                keep("Marketing costs", lines::MARKETING_COSTS),
                keep("Freelance", lines::FREELANCE),
                keep("Servers & softwares", lines::SERVERS_SOFTWARES),
                keep("Structure costs", lines::STRUCTURE_COSTS),
                keep("Accommodation costs", lines::ACCOMMODATION_COSTS),
                keep("Profit-sharing", lines::PROFIT_SHARING),
                keep("Rents & charges", lines::RENTS_CHARGES),
                keep("D&A on fixed assets", lines::DA_FIXED_ASSETS),
                keep("D&A - Milestones", lines::DA_MILESTONES),
                keep("Financial income (loss)", lines::FINANCIAL_INCOME),
                keep("Tax", lines::TAX),
                // Staff costs come from the payroll split, not the ledger.
                LineRule {
                    detail: "Staff costs".to_string(),
                    target: LineTarget::Skip,
                },
            ],
            operating_staff_line: lines::STAFF_COSTS_OPERATING.to_string(),
            non_operating_staff_line: lines::STAFF_COSTS_NON_OP.to_string(),
            rents_line: lines::RENTS_CHARGES.to_string(),
            rou_line: lines::DA_ROU.to_string(),
            statement_rows: vec![
                row("REVENUE", RowKind::Section),
                row(lines::SALES, RowKind::Item),
                row(lines::B2C_REVENUE, RowKind::Item),
                row(lines::B2B_REVENUE, RowKind::Item),
                row(lines::COGS, RowKind::Item),
                row(lines::GROSS_PROFIT, RowKind::Subtotal),
                row("", RowKind::Spacer),
                row("OPERATING COSTS", RowKind::Section),
                row(lines::STAFF_COSTS_OPERATING, RowKind::Item),
                row(lines::MARKETING_COSTS, RowKind::Item),
                row(lines::FREELANCE, RowKind::Item),
                row(lines::SERVERS_SOFTWARES, RowKind::Item),
                row(lines::CONTRIBUTION_MARGIN, RowKind::Subtotal),
                row("", RowKind::Spacer),
                row("STRUCTURE COSTS", RowKind::Section),
                row(lines::STAFF_COSTS_NON_OP, RowKind::Item),
                row(lines::STRUCTURE_COSTS, RowKind::Item),
                row(lines::ACCOMMODATION_COSTS, RowKind::Item),
                row(lines::PROFIT_SHARING, RowKind::Item),
                row(lines::RENTS_CHARGES, RowKind::Item),
                row(lines::EBITDA, RowKind::Subtotal),
                row("", RowKind::Spacer),
                row(lines::DA_FIXED_ASSETS, RowKind::Item),
                row(lines::DA_MILESTONES, RowKind::Item),
                row(lines::DA_ROU, RowKind::Item),
                row(lines::EBIT, RowKind::Subtotal),
                row(lines::FINANCIAL_INCOME, RowKind::Item),
                row(lines::EBT, RowKind::Subtotal),
                row(lines::TAX, RowKind::Item),
                row(lines::NET_INCOME, RowKind::Total),
            ],
            reporting_groups: vec![
                ReportingGroup {
                    name: "PID & FR".to_string(),
                    entities: strings(&["PID", "FR"]),
                },
                ReportingGroup {
                    name: "CELSIUS & VERTICAL".to_string(),
                    entities: strings(&["CELSIUS", "VERTICAL"]),
                },
                ReportingGroup {
                    name: "Consolidated".to_string(),
                    entities: strings(&["FR", "PID", "CELSIUS", "VERTICAL"]),
                },
            ],
        }
    }
}
