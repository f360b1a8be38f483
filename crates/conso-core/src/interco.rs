//! Intercompany elimination reconciliation.
//!
//! Each rule pairs two (entity, account) sides, optionally narrowed by
//! comma-separated narrative keywords. Measurement is row-level and
//! filtered; elimination is account-level and unfiltered, because the
//! target table is already aggregated per account and carries no
//! narrative. That asymmetry is load-bearing and must not be "fixed".
//!
//! Rules are applied strictly in configured order. Measurement always
//! reads the immutable ledger window, never the mutated target, so rules
//! sharing an (entity, account) pair re-measure the original amounts and
//! later rules may re-zero accounts earlier rules already touched.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::mapping::MappedMovement;
use crate::types::{AccountBalance, LedgerRow, Money};

/// One side of an intercompany rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSide {
    pub entity: String,
    pub account: String,
    /// Comma-separated keywords matched case-insensitively against the
    /// posting narrative. Empty or absent matches every row.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub narrative_filter: Option<String>,
}

impl RuleSide {
    fn keywords(&self) -> Vec<String> {
        self.narrative_filter
            .as_deref()
            .unwrap_or("")
            .split(',')
            .map(|k| k.trim().to_uppercase())
            .filter(|k| !k.is_empty())
            .collect()
    }

    /// Row-level match: entity, account, and any keyword as substring of
    /// the narrative.
    pub fn matches(&self, row: &LedgerRow) -> bool {
        if row.entity != self.entity || row.account != self.account {
            return false;
        }
        let keywords = self.keywords();
        if keywords.is_empty() {
            return true;
        }
        let narrative = row
            .narrative
            .as_deref()
            .unwrap_or("")
            .to_uppercase();
        keywords.iter().any(|k| narrative.contains(k))
    }
}

/// An ordered intercompany elimination rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EliminationRule {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub comment: Option<String>,
    pub side_a: RuleSide,
    pub side_b: RuleSide,
}

/// Outcome severity of a processed rule. Rules with zero amounts on both
/// sides are skipped and never reach the reconciliation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleStatus {
    /// Residual within tolerance.
    Balanced,
    /// Residual beyond tolerance, or only one side populated; both sides
    /// zeroed anyway and flagged for operator review.
    ForcedElimination,
}

/// One row of the reconciliation table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reconciliation {
    pub description: String,
    pub entity_a: String,
    pub account_a: String,
    pub amount_a: Money,
    pub entity_b: String,
    pub account_b: String,
    pub amount_b: Money,
    /// Signed sum of both sides; zero when the legs offset exactly.
    pub residual: Money,
    pub status: RuleStatus,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub comment: Option<String>,
}

impl Reconciliation {
    pub fn is_forced(&self) -> bool {
        self.status == RuleStatus::ForcedElimination
    }
}

/// Sum of net movement over ledger rows matching one rule side.
pub fn measure(ledger: &[LedgerRow], side: &RuleSide) -> Money {
    ledger
        .iter()
        .filter(|r| side.matches(r))
        .map(|r| r.movement())
        .sum()
}

fn reconcile_rules<F>(
    ledger: &[LedgerRow],
    rules: &[EliminationRule],
    tolerance: Money,
    mut zero_account: F,
) -> Vec<Reconciliation>
where
    F: FnMut(&str, &str),
{
    let mut recap = Vec::new();

    for rule in rules {
        let amount_a = measure(ledger, &rule.side_a);
        let amount_b = measure(ledger, &rule.side_b);

        // No movement on either side this period: the rule is a no-op.
        if amount_a.is_zero() && amount_b.is_zero() {
            continue;
        }

        let residual = amount_a + amount_b;
        let status = if residual.abs() <= tolerance {
            RuleStatus::Balanced
        } else {
            RuleStatus::ForcedElimination
        };

        // Account-level zeroing, keyword filter deliberately not reapplied.
        zero_account(&rule.side_a.entity, &rule.side_a.account);
        zero_account(&rule.side_b.entity, &rule.side_b.account);

        recap.push(Reconciliation {
            description: rule.description.clone(),
            entity_a: rule.side_a.entity.clone(),
            account_a: rule.side_a.account.clone(),
            amount_a,
            entity_b: rule.side_b.entity.clone(),
            account_b: rule.side_b.account.clone(),
            amount_b,
            residual,
            status,
            comment: rule.comment.clone(),
        });
    }

    recap
}

/// Eliminate P&L intercompany movements.
///
/// Amounts are measured on the monthly ledger window; zeroing clears the
/// net movement of every aggregated row for each side's (entity, account)
/// pair. All other fields are untouched.
pub fn eliminate_pl(
    monthly: &[LedgerRow],
    mapped: &[MappedMovement],
    rules: &[EliminationRule],
    tolerance: Money,
) -> (Vec<MappedMovement>, Vec<Reconciliation>) {
    let mut eliminated = mapped.to_vec();

    let recap = reconcile_rules(monthly, rules, tolerance, |entity, account| {
        for row in eliminated
            .iter_mut()
            .filter(|r| r.entity == entity && r.account == account)
        {
            row.movement = Decimal::ZERO;
        }
    });

    (eliminated, recap)
}

/// Eliminate balance-sheet intercompany balances.
///
/// Same matching logic as the P&L pass, but amounts are measured on the
/// year-to-date ledger window and zeroing targets the per-account YTD
/// balance table.
pub fn eliminate_bs(
    ytd: &[LedgerRow],
    balances: &[AccountBalance],
    rules: &[EliminationRule],
    tolerance: Money,
) -> (Vec<AccountBalance>, Vec<Reconciliation>) {
    let mut eliminated = balances.to_vec();

    let recap = reconcile_rules(ytd, rules, tolerance, |entity, account| {
        for row in eliminated
            .iter_mut()
            .filter(|r| r.entity == entity && r.account == account)
        {
            row.balance = Decimal::ZERO;
        }
    });

    (eliminated, recap)
}
