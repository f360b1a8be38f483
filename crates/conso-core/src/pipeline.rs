//! End-to-end consolidation pipeline.
//!
//! Strictly sequential: windows → per-account aggregation → mapping →
//! eliminations → statement aggregation → BU allocation → payroll split →
//! lease reclassification → statement assembly. Each stage owns its
//! output table; nothing is mutated after being handed downstream.

use std::time::Instant;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::allocation::{self, AllocatedAmount, FlowType, WeightRow};
use crate::capex::{self, CapexDisbursement};
use crate::config::ConsolidationConfig;
use crate::error::ConsolidationError;
use crate::interco::{self, EliminationRule, Reconciliation};
use crate::lease::{self, LeaseReclassification};
use crate::ledger;
use crate::mapping::{self, ChartOfAccounts, UnmappedAccount};
use crate::payroll::{self, PayrollSplit, WorkforceCost, WorkforceMapping};
use crate::statement::aggregate::{self, BsAggregate, PlAggregate};
use crate::statement::lines::{self, BalanceSheetRow, StatementLines, StatementRow};
use crate::types::{with_metadata, ComputationOutput, LedgerRow, Money, Period};
use crate::ConsolidationResult;

/// Everything the engine consumes for one reporting period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodInput {
    pub period: Period,
    /// Normalized ledger rows, unfiltered; the engine derives both the
    /// monthly and year-to-date windows itself.
    pub ledger: Vec<LedgerRow>,
    pub charts: Vec<ChartOfAccounts>,
    pub pl_rules: Vec<EliminationRule>,
    pub bs_rules: Vec<EliminationRule>,
    #[serde(default)]
    pub weights: Vec<WeightRow>,
    #[serde(default)]
    pub workforce_costs: Vec<WorkforceCost>,
    #[serde(default)]
    pub workforce_mappings: Vec<WorkforceMapping>,
    /// Cumulative CAPEX disbursement table, one row per period.
    #[serde(default)]
    pub capex_disbursements: Vec<CapexDisbursement>,
}

/// Assembled statement of one reporting group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupStatement {
    pub group: String,
    pub entities: Vec<String>,
    pub lines: StatementLines,
    pub rows: Vec<StatementRow>,
}

/// Every table produced by the engine for one period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsolidationOutput {
    pub period: Period,
    pub pl: Vec<PlAggregate>,
    pub balance_sheet: Vec<BsAggregate>,
    pub balance_sheet_pivot: Vec<BalanceSheetRow>,
    pub unmapped_accounts: Vec<UnmappedAccount>,
    pub pl_reconciliation: Vec<Reconciliation>,
    pub bs_reconciliation: Vec<Reconciliation>,
    pub revenue_allocation: Vec<AllocatedAmount>,
    pub cogs_allocation: Vec<AllocatedAmount>,
    pub subgroup_allocation: Vec<AllocatedAmount>,
    pub payroll: PayrollSplit,
    pub leases: Vec<LeaseReclassification>,
    /// CAPEX disbursed in the reporting month; zero when the table has no
    /// row for the period.
    pub capex_disbursed: Money,
    pub statements: Vec<GroupStatement>,
}

#[derive(Serialize)]
struct Assumptions<'a> {
    period: String,
    tolerance: Decimal,
    entities: &'a [String],
}

fn validate(input: &PeriodInput, config: &ConsolidationConfig) -> ConsolidationResult<()> {
    if config.entities.is_empty() {
        return Err(ConsolidationError::MissingConfiguration(
            "entity list is empty".to_string(),
        ));
    }
    if config.tolerance < Decimal::ZERO {
        return Err(ConsolidationError::InvalidInput {
            field: "tolerance".to_string(),
            reason: "must be non-negative".to_string(),
        });
    }
    if input.ledger.is_empty() {
        return Err(ConsolidationError::MissingConfiguration(format!(
            "no ledger rows for period {}",
            input.period
        )));
    }
    for row in &input.ledger {
        if !config.entities.contains(&row.entity) {
            return Err(ConsolidationError::InvalidInput {
                field: "ledger".to_string(),
                reason: format!("unknown entity '{}'", row.entity),
            });
        }
    }
    for lease in &config.lease_accounts {
        if !config.entities.contains(&lease.entity) {
            return Err(ConsolidationError::InvalidInput {
                field: "lease_accounts".to_string(),
                reason: format!("unknown entity '{}'", lease.entity),
            });
        }
    }
    if let Some(split) = &config.subgroup_split {
        if !config.entities.contains(&split.entity) {
            return Err(ConsolidationError::InvalidInput {
                field: "subgroup_split".to_string(),
                reason: format!("unknown entity '{}'", split.entity),
            });
        }
    }
    Ok(())
}

/// Run the full consolidation for one period.
pub fn run_consolidation(
    input: &PeriodInput,
    config: &ConsolidationConfig,
) -> ConsolidationResult<ComputationOutput<ConsolidationOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate(input, config)?;

    // Temporal windows and per-account aggregation.
    let monthly = ledger::monthly_window(&input.ledger, input.period, &config.opening_journal);
    let ytd = ledger::ytd_window(&input.ledger, input.period);
    let movements = ledger::movements_by_account(&monthly);
    let balances = ledger::balances_by_account(&ytd, config);

    // Chart-of-accounts mapping.
    for entity in &config.entities {
        let has_rows = movements.iter().any(|m| &m.entity == entity);
        let has_chart = input.charts.iter().any(|c| &c.entity == entity);
        if has_rows && !has_chart {
            warnings.push(format!(
                "no mapping table for entity {entity}; its movements are excluded"
            ));
        }
    }
    let outcome = mapping::apply_mapping(&movements, &input.charts);
    if !outcome.unmapped.is_empty() {
        warnings.push(format!(
            "{} unmapped account(s) excluded from the mapped statement",
            outcome.unmapped.len()
        ));
    }

    // Intercompany eliminations, then statement aggregation.
    let (pl_eliminated, pl_reconciliation) = interco::eliminate_pl(
        &monthly,
        &outcome.mapped,
        &input.pl_rules,
        config.tolerance,
    );
    let (bs_eliminated, bs_reconciliation) =
        interco::eliminate_bs(&ytd, &balances, &input.bs_rules, config.tolerance);

    let forced_pl = pl_reconciliation.iter().filter(|r| r.is_forced()).count();
    if forced_pl > 0 {
        warnings.push(format!(
            "{forced_pl} forced P&L elimination(s) with residual beyond tolerance"
        ));
    }
    let forced_bs = bs_reconciliation.iter().filter(|r| r.is_forced()).count();
    if forced_bs > 0 {
        warnings.push(format!(
            "{forced_bs} forced balance-sheet elimination(s) with residual beyond tolerance"
        ));
    }

    let pl = aggregate::aggregate_pl(&pl_eliminated, config);
    let balance_sheet = aggregate::aggregate_bs(&bs_eliminated, &input.charts, config);
    let balance_sheet_pivot = lines::balance_sheet_pivot(&balance_sheet, &config.entities);

    // BU allocation. The sub-group entity keeps its own revenue algorithm;
    // its revenue weights are excluded from the generic proration.
    let generic_weights: Vec<WeightRow> = input
        .weights
        .iter()
        .filter(|w| {
            config.subgroup_split.as_ref().map_or(true, |split| {
                !(w.entity == split.entity && w.flow == split.flow)
            })
        })
        .cloned()
        .collect();

    let revenue_allocation = allocation::allocate(
        &pl,
        &generic_weights,
        FlowType::Revenue,
        input.period,
        config,
    );
    let cogs_allocation = allocation::allocate(
        &pl,
        &generic_weights,
        FlowType::CostOfGoods,
        input.period,
        config,
    );
    let subgroup_allocation = config
        .subgroup_split
        .as_ref()
        .map(|split| allocation::allocate_subgroups(&pl, &input.weights, split, input.period))
        .unwrap_or_default();

    // Payroll split and lease reclassification.
    let payroll = payroll::split_payroll(&input.workforce_costs, &input.workforce_mappings);
    if !payroll.unmatched.is_empty() {
        warnings.push(format!(
            "{} workforce record(s) without mapping excluded from the payroll split",
            payroll.unmatched.len()
        ));
    }
    if !payroll.off_unity.is_empty() {
        warnings.push(format!(
            "{} workforce record(s) with capex+opex percentages off unity",
            payroll.off_unity.len()
        ));
    }

    let leases = lease::reclassify_leases(&input.ledger, input.period, &config.lease_accounts);

    let capex_disbursed =
        match capex::monthly_disbursement(&input.capex_disbursements, input.period) {
            Some(amount) => amount,
            None => {
                if !input.capex_disbursements.is_empty() {
                    warnings.push(format!(
                        "no CAPEX disbursement row for period {}; amount set to 0",
                        input.period
                    ));
                }
                Decimal::ZERO
            }
        };

    // Statement assembly per reporting group.
    let statements = config
        .reporting_groups
        .iter()
        .map(|group| {
            let group_lines = lines::build_group_lines(
                &group.entities,
                &pl,
                &payroll.opex,
                &leases,
                config,
            );
            let rows = lines::assemble(&group_lines, &config.statement_rows);
            GroupStatement {
                group: group.name.clone(),
                entities: group.entities.clone(),
                lines: group_lines,
                rows,
            }
        })
        .collect();

    let result = ConsolidationOutput {
        period: input.period,
        pl,
        balance_sheet,
        balance_sheet_pivot,
        unmapped_accounts: outcome.unmapped,
        pl_reconciliation,
        bs_reconciliation,
        revenue_allocation,
        cogs_allocation,
        subgroup_allocation,
        payroll,
        leases,
        capex_disbursed,
        statements,
    };

    let assumptions = Assumptions {
        period: input.period.to_string(),
        tolerance: config.tolerance,
        entities: &config.entities,
    };

    Ok(with_metadata(
        "monthly_group_consolidation",
        &assumptions,
        warnings,
        start.elapsed().as_micros() as u64,
        result,
    ))
}
