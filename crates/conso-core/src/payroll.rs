//! Payroll capitalization split.
//!
//! Workforce cost joins the workforce mapping on employee identifier;
//! matched employees split into a capitalized portion (`cost * capex_pct`)
//! and an operating portion (`cost * opex_pct`). Absent percentages
//! default to 0 and 1 respectively. Nothing requires the two percentages
//! to sum to 1; records off unity are reported, not corrected.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::Money;

/// Cost-center classification of an employee, typed at the ingestion
/// boundary instead of substring-matched downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostCenterKind {
    Operating,
    NonOperating,
}

/// One employee cost record from the payroll source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkforceCost {
    pub employee_id: String,
    pub name: String,
    pub entity: String,
    pub cost: Money,
}

/// One employee row of the workforce mapping table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkforceMapping {
    pub employee_id: String,
    pub business_unit: String,
    pub cost_center: CostCenterKind,
    /// IFRS capitalization flag carried from the mapping source for
    /// review output; the split itself only reads the percentages.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub ifrs_flag: Option<String>,
    /// Capitalized share of cost; absent defaults to 0.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub capex_pct: Option<Decimal>,
    /// Operating share of cost; absent defaults to 1.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub opex_pct: Option<Decimal>,
}

/// Operating staff cost per (entity, business unit, cost-center kind).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffCostLine {
    pub entity: String,
    pub business_unit: String,
    pub cost_center: CostCenterKind,
    pub amount: Money,
}

/// Capitalized staff cost per (entity, business unit).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapitalizedCostLine {
    pub entity: String,
    pub business_unit: String,
    pub amount: Money,
}

/// An employee present in the cost source but absent from the mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnmatchedEmployee {
    pub employee_id: String,
    pub name: String,
    pub entity: String,
    pub cost: Money,
}

/// Result of the payroll split.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrollSplit {
    pub opex: Vec<StaffCostLine>,
    pub capex: Vec<CapitalizedCostLine>,
    /// Excluded from the split, reported rather than silently dropped.
    pub unmatched: Vec<UnmatchedEmployee>,
    /// Employees whose capex and opex percentages do not sum to 1 —
    /// a deliberate leakage/double-count band surfaced for review.
    pub off_unity: Vec<String>,
}

/// Split workforce cost into operating and capitalized portions.
pub fn split_payroll(
    costs: &[WorkforceCost],
    mappings: &[WorkforceMapping],
) -> PayrollSplit {
    let by_employee: HashMap<&str, &WorkforceMapping> = mappings
        .iter()
        .map(|m| (m.employee_id.as_str(), m))
        .collect();

    let mut opex: BTreeMap<(String, String, CostCenterKind), Money> = BTreeMap::new();
    let mut capex: BTreeMap<(String, String), Money> = BTreeMap::new();
    let mut unmatched = Vec::new();
    let mut off_unity = Vec::new();

    for cost in costs {
        let mapping = match by_employee.get(cost.employee_id.as_str()) {
            Some(m) => m,
            None => {
                unmatched.push(UnmatchedEmployee {
                    employee_id: cost.employee_id.clone(),
                    name: cost.name.clone(),
                    entity: cost.entity.clone(),
                    cost: cost.cost,
                });
                continue;
            }
        };

        let capex_pct = mapping.capex_pct.unwrap_or(Decimal::ZERO);
        let opex_pct = mapping.opex_pct.unwrap_or(Decimal::ONE);
        if capex_pct + opex_pct != Decimal::ONE {
            off_unity.push(cost.employee_id.clone());
        }

        *opex
            .entry((
                cost.entity.clone(),
                mapping.business_unit.clone(),
                mapping.cost_center,
            ))
            .or_insert(Decimal::ZERO) += cost.cost * opex_pct;

        *capex
            .entry((cost.entity.clone(), mapping.business_unit.clone()))
            .or_insert(Decimal::ZERO) += cost.cost * capex_pct;
    }

    PayrollSplit {
        opex: opex
            .into_iter()
            .map(|((entity, business_unit, cost_center), amount)| StaffCostLine {
                entity,
                business_unit,
                cost_center,
                amount,
            })
            .collect(),
        capex: capex
            .into_iter()
            .map(|((entity, business_unit), amount)| CapitalizedCostLine {
                entity,
                business_unit,
                amount,
            })
            .collect(),
        unmatched,
        off_unity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn cost(id: &str, entity: &str, amount: Money) -> WorkforceCost {
        WorkforceCost {
            employee_id: id.into(),
            name: format!("Employee {id}"),
            entity: entity.into(),
            cost: amount,
        }
    }

    fn mapping(
        id: &str,
        bu: &str,
        kind: CostCenterKind,
        capex_pct: Option<Decimal>,
        opex_pct: Option<Decimal>,
    ) -> WorkforceMapping {
        WorkforceMapping {
            employee_id: id.into(),
            business_unit: bu.into(),
            cost_center: kind,
            ifrs_flag: None,
            capex_pct,
            opex_pct,
        }
    }

    #[test]
    fn test_split_applies_percentages() {
        let costs = vec![cost("001", "PID", dec!(5000))];
        let mappings = vec![mapping(
            "001",
            "Publishing",
            CostCenterKind::Operating,
            Some(dec!(0.4)),
            Some(dec!(0.6)),
        )];

        let split = split_payroll(&costs, &mappings);

        assert_eq!(split.capex[0].amount, dec!(2000.0));
        assert_eq!(split.opex[0].amount, dec!(3000.0));
        assert_eq!(split.opex[0].cost_center, CostCenterKind::Operating);
        assert!(split.unmatched.is_empty());
        assert!(split.off_unity.is_empty());
    }

    #[test]
    fn test_missing_percentages_default_to_zero_and_one() {
        let costs = vec![cost("002", "FR", dec!(4000))];
        let mappings = vec![mapping("002", "Support", CostCenterKind::NonOperating, None, None)];

        let split = split_payroll(&costs, &mappings);

        assert_eq!(split.capex[0].amount, dec!(0));
        assert_eq!(split.opex[0].amount, dec!(4000));
    }

    #[test]
    fn test_unmatched_employee_reported_and_excluded() {
        let costs = vec![cost("001", "PID", dec!(5000)), cost("999", "PID", dec!(3000))];
        let mappings = vec![mapping(
            "001",
            "Publishing",
            CostCenterKind::Operating,
            None,
            None,
        )];

        let split = split_payroll(&costs, &mappings);

        assert_eq!(split.unmatched.len(), 1);
        assert_eq!(split.unmatched[0].employee_id, "999");
        let opex_total: Money = split.opex.iter().map(|l| l.amount).sum();
        assert_eq!(opex_total, dec!(5000));
    }

    #[test]
    fn test_percentages_off_unity_are_flagged_not_fixed() {
        let costs = vec![cost("003", "CELSIUS", dec!(1000))];
        let mappings = vec![mapping(
            "003",
            "MGG",
            CostCenterKind::Operating,
            Some(dec!(0.5)),
            Some(dec!(0.8)),
        )];

        let split = split_payroll(&costs, &mappings);

        assert_eq!(split.off_unity, vec!["003".to_string()]);
        // Amounts stay exactly as configured: 1300 total, by design.
        assert_eq!(split.capex[0].amount, dec!(500.0));
        assert_eq!(split.opex[0].amount, dec!(800.0));
    }

    #[test]
    fn test_ifrs_flag_carried_but_not_consumed() {
        let costs = vec![cost("004", "PID", dec!(1000))];
        let mut with_flag = mapping("004", "Publishing", CostCenterKind::Operating, None, None);
        with_flag.ifrs_flag = Some("Oui".to_string());

        let flagged = split_payroll(&costs, &[with_flag]);
        let unflagged = split_payroll(
            &costs,
            &[mapping("004", "Publishing", CostCenterKind::Operating, None, None)],
        );

        assert_eq!(flagged.opex, unflagged.opex);
        assert_eq!(flagged.capex, unflagged.capex);
    }

    #[test]
    fn test_groups_by_entity_bu_and_kind() {
        let costs = vec![
            cost("001", "PID", dec!(1000)),
            cost("002", "PID", dec!(2000)),
            cost("003", "PID", dec!(4000)),
        ];
        let mappings = vec![
            mapping("001", "Publishing", CostCenterKind::Operating, None, None),
            mapping("002", "Publishing", CostCenterKind::Operating, None, None),
            mapping("003", "Publishing", CostCenterKind::NonOperating, None, None),
        ];

        let split = split_payroll(&costs, &mappings);

        assert_eq!(split.opex.len(), 2);
        let operating = split
            .opex
            .iter()
            .find(|l| l.cost_center == CostCenterKind::Operating)
            .unwrap();
        assert_eq!(operating.amount, dec!(3000));
    }
}
