//! Chart-of-accounts mapping.
//!
//! Each (entity, account) resolves to a two-level P&L classification and a
//! two-level balance-sheet classification through the entity's own mapping
//! table; there is no cross-entity fallback. Textual null markers in the
//! source tables are converted to real absence at this boundary, so every
//! downstream "is this account mapped" check reasons over `Option` only.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{AccountMovement, Money};

/// Case-insensitive markers treated as absent mapping values.
const NULL_MARKERS: [&str; 4] = ["NA", "N/A", "NAN", ""];

/// Trim a raw mapping cell and collapse textual null markers to `None`.
pub fn normalize_label(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if NULL_MARKERS.contains(&trimmed.to_uppercase().as_str()) {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// One row of an entity's mapping table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingEntry {
    pub account: String,
    pub label: String,
    pub pl_category: Option<String>,
    pub pl_detail: Option<String>,
    pub bs_category: Option<String>,
    pub bs_detail: Option<String>,
}

impl MappingEntry {
    /// Build an entry from raw source cells, normalizing null markers.
    pub fn from_raw(
        account: &str,
        label: &str,
        pl_category: &str,
        pl_detail: &str,
        bs_category: &str,
        bs_detail: &str,
    ) -> Self {
        MappingEntry {
            account: account.trim().to_string(),
            label: label.trim().to_string(),
            pl_category: normalize_label(pl_category),
            pl_detail: normalize_label(pl_detail),
            bs_category: normalize_label(bs_category),
            bs_detail: normalize_label(bs_detail),
        }
    }
}

/// Mapping table of a single entity, keyed by account number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartOfAccounts {
    pub entity: String,
    entries: HashMap<String, MappingEntry>,
}

impl ChartOfAccounts {
    pub fn new(entity: &str, entries: Vec<MappingEntry>) -> Self {
        ChartOfAccounts {
            entity: entity.to_string(),
            entries: entries
                .into_iter()
                .map(|e| (e.account.clone(), e))
                .collect(),
        }
    }

    pub fn resolve(&self, account: &str) -> Option<&MappingEntry> {
        self.entries.get(account)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// An aggregated movement annotated with its resolved classifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappedMovement {
    pub entity: String,
    pub account: String,
    pub account_label: String,
    pub debit: Money,
    pub credit: Money,
    pub movement: Money,
    pub pl_category: Option<String>,
    pub pl_detail: Option<String>,
    pub bs_category: Option<String>,
    pub bs_detail: Option<String>,
}

impl MappedMovement {
    /// Account class digit: first character of the account number.
    pub fn class(&self) -> Option<char> {
        self.account.chars().next()
    }

    /// Unmapped accounts carry neither a P&L nor a balance-sheet detail.
    pub fn is_unmapped(&self) -> bool {
        self.pl_detail.is_none() && self.bs_detail.is_none()
    }
}

/// An account with no P&L and no balance-sheet resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnmappedAccount {
    pub entity: String,
    pub account: String,
    pub account_label: String,
    pub movement: Money,
}

/// Result of the mapping pass: every movement annotated, plus the alert
/// list of accounts excluded from the mapped statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingOutcome {
    pub mapped: Vec<MappedMovement>,
    pub unmapped: Vec<UnmappedAccount>,
}

/// Left-join movements onto each entity's mapping table.
///
/// Movements of entities without a mapping table are dropped; callers
/// surface those entities as warnings. Unmapped accounts stay in the
/// annotated table (with absent classifications) and are listed in the
/// alert list, so the partition mapped-or-alerted is total and disjoint.
pub fn apply_mapping(
    movements: &[AccountMovement],
    charts: &[ChartOfAccounts],
) -> MappingOutcome {
    let mut mapped = Vec::new();
    let mut unmapped = Vec::new();

    for chart in charts {
        for movement in movements.iter().filter(|m| m.entity == chart.entity) {
            let entry = chart.resolve(&movement.account);
            let annotated = MappedMovement {
                entity: movement.entity.clone(),
                account: movement.account.clone(),
                account_label: movement.account_label.clone(),
                debit: movement.debit,
                credit: movement.credit,
                movement: movement.movement,
                pl_category: entry.and_then(|e| e.pl_category.clone()),
                pl_detail: entry.and_then(|e| e.pl_detail.clone()),
                bs_category: entry.and_then(|e| e.bs_category.clone()),
                bs_detail: entry.and_then(|e| e.bs_detail.clone()),
            };

            if annotated.is_unmapped() {
                unmapped.push(UnmappedAccount {
                    entity: annotated.entity.clone(),
                    account: annotated.account.clone(),
                    account_label: annotated.account_label.clone(),
                    movement: annotated.movement,
                });
            }
            mapped.push(annotated);
        }
    }

    MappingOutcome { mapped, unmapped }
}
