//! Business-unit allocation of reconciled accounting totals.
//!
//! Weights come from an independent source and express relative shares
//! only; the absolute amounts distributed always come from the
//! elimination-adjusted P&L. The generic engine prorates per entity and
//! regroups aliased business units; the sub-group variant is a distinct
//! algorithm with per-sub-group denominators and explicit roll-up rows.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::ConsolidationConfig;
use crate::statement::aggregate::PlAggregate;
use crate::types::{Money, Period};

/// Flow type a weight row distributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowType {
    Revenue,
    CostOfGoods,
}

/// One business-unit weight row from the allocation source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightRow {
    pub entity: String,
    pub flow: FlowType,
    pub business_unit: String,
    pub period: Period,
    pub weight: Money,
}

/// Regrouping of a raw business-unit label into a canonical unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuAlias {
    pub raw: String,
    pub canonical: String,
}

impl BuAlias {
    pub fn new(raw: &str, canonical: &str) -> Self {
        BuAlias {
            raw: raw.to_string(),
            canonical: canonical.to_string(),
        }
    }
}

/// One allocated amount per (entity, business unit, statement line).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocatedAmount {
    pub entity: String,
    pub business_unit: String,
    pub statement_line: String,
    pub amount: Money,
}

/// A sub-group of business units normalized against its own denominator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubGroup {
    /// P&L detail line carrying the sub-group's accounting total.
    pub source_line: String,
    pub business_units: Vec<String>,
    /// When set, an extra pseudo-row carrying the full sub-group total.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub rollup_label: Option<String>,
}

/// Sub-group roll-up specification for a single entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubGroupSplit {
    pub entity: String,
    pub flow: FlowType,
    pub groups: Vec<SubGroup>,
}

fn accounting_total(pl: &[PlAggregate], entity: &str, lines: &[String]) -> Money {
    pl.iter()
        .filter(|l| l.entity == entity && lines.contains(&l.detail))
        .map(|l| l.amount)
        .sum()
}

/// Prorate the accounting total of a flow type across business units.
///
/// For each entity present in the weight source, each unit receives
/// `total * weight / denominator`; entities whose weights sum to zero are
/// skipped. Aliased units are regrouped and re-aggregated, never left as
/// duplicate rows.
pub fn allocate(
    pl: &[PlAggregate],
    weights: &[WeightRow],
    flow: FlowType,
    period: Period,
    config: &ConsolidationConfig,
) -> Vec<AllocatedAmount> {
    let in_scope: Vec<&WeightRow> = weights
        .iter()
        .filter(|w| w.flow == flow && w.period == period)
        .collect();

    let mut entities: Vec<String> = Vec::new();
    for w in &in_scope {
        if !entities.contains(&w.entity) {
            entities.push(w.entity.clone());
        }
    }

    let output_line = config.flow_output_line(flow).to_string();
    let mut grouped: BTreeMap<(String, String), Money> = BTreeMap::new();

    for entity in entities {
        let entity_weights: Vec<&&WeightRow> =
            in_scope.iter().filter(|w| w.entity == entity).collect();
        let denominator: Money = entity_weights.iter().map(|w| w.weight).sum();
        if denominator.is_zero() {
            continue;
        }

        let total = accounting_total(pl, &entity, config.flow_lines(flow));

        for w in entity_weights {
            let share = w.weight / denominator;
            let allocated = total * share;
            let canonical = config.canonical_bu(&w.business_unit);
            *grouped
                .entry((entity.clone(), canonical))
                .or_insert(Decimal::ZERO) += allocated;
        }
    }

    grouped
        .into_iter()
        .map(|((entity, business_unit), amount)| AllocatedAmount {
            entity,
            business_unit,
            statement_line: output_line.clone(),
            amount,
        })
        .collect()
}

/// Sub-group roll-up allocation.
///
/// Each sub-group's detail rows are normalized against the sub-group's own
/// denominator, not the entity-wide one. A zero sub-group denominator
/// yields zero-amount detail rows (rows are still emitted), and the
/// roll-up pseudo-row always carries the full sub-group accounting total.
pub fn allocate_subgroups(
    pl: &[PlAggregate],
    weights: &[WeightRow],
    split: &SubGroupSplit,
    period: Period,
) -> Vec<AllocatedAmount> {
    let mut rows = Vec::new();

    for group in &split.groups {
        let total = accounting_total(pl, &split.entity, &[group.source_line.clone()]);

        let group_weights: Vec<&WeightRow> = weights
            .iter()
            .filter(|w| {
                w.entity == split.entity
                    && w.flow == split.flow
                    && w.period == period
                    && group.business_units.contains(&w.business_unit)
            })
            .collect();
        let denominator: Money = group_weights.iter().map(|w| w.weight).sum();

        for w in &group_weights {
            let share = if denominator.is_zero() {
                Decimal::ZERO
            } else {
                w.weight / denominator
            };
            rows.push(AllocatedAmount {
                entity: split.entity.clone(),
                business_unit: w.business_unit.clone(),
                statement_line: group.source_line.clone(),
                amount: total * share,
            });
        }

        if let Some(label) = &group.rollup_label {
            rows.push(AllocatedAmount {
                entity: split.entity.clone(),
                business_unit: label.clone(),
                statement_line: group.source_line.clone(),
                amount: total,
            });
        }
    }

    rows
}
