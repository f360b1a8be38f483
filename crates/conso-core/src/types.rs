use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ConsolidationError;
use crate::ConsolidationResult;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Reporting period, serialized as `{ year, month }`, displayed as `YYYYMM`.
///
/// Deserialization routes through [`Period::new`], so an out-of-range
/// month in a JSON run specification is rejected up front instead of
/// producing a degenerate window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPeriod")]
pub struct Period {
    year: i32,
    month: u32,
}

#[derive(Deserialize)]
struct RawPeriod {
    year: i32,
    month: u32,
}

impl TryFrom<RawPeriod> for Period {
    type Error = ConsolidationError;

    fn try_from(raw: RawPeriod) -> ConsolidationResult<Self> {
        Period::new(raw.year, raw.month)
    }
}

impl Period {
    pub fn new(year: i32, month: u32) -> ConsolidationResult<Self> {
        if !(1..=12).contains(&month) || !(1900..=9999).contains(&year) {
            return Err(ConsolidationError::InvalidPeriod(format!(
                "{year:04}{month:02}"
            )));
        }
        Ok(Period { year, month })
    }

    /// Parse a `YYYYMM` string.
    pub fn parse(s: &str) -> ConsolidationResult<Self> {
        if s.len() != 6 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ConsolidationError::InvalidPeriod(s.to_string()));
        }
        let year = s[..4]
            .parse::<i32>()
            .map_err(|_| ConsolidationError::InvalidPeriod(s.to_string()))?;
        let month = s[4..]
            .parse::<u32>()
            .map_err(|_| ConsolidationError::InvalidPeriod(s.to_string()))?;
        Period::new(year, month)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        // Month is validated in the constructor, the fallback is unreachable.
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        let (next_year, next_month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(next_year, next_month, 1)
            .and_then(|d| d.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    /// True if `date` falls inside the period month.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.first_day() && date <= self.last_day()
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}{:02}", self.year, self.month)
    }
}

/// One posted ledger line from the normalized extract.
///
/// The net movement is always derived as debit − credit; it is a method
/// rather than a field so the invariant holds by construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerRow {
    pub entity: String,
    pub account: String,
    pub account_label: String,
    pub journal: String,
    pub date: NaiveDate,
    pub debit: Money,
    pub credit: Money,
    /// Free-text posting narrative, used by intercompany keyword filters.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub narrative: Option<String>,
}

impl LedgerRow {
    pub fn movement(&self) -> Money {
        self.debit - self.credit
    }

    /// Account class digit: first character of the account number.
    pub fn class(&self) -> Option<char> {
        self.account.chars().next()
    }
}

/// Monthly movement aggregated per (entity, account).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountMovement {
    pub entity: String,
    pub account: String,
    pub account_label: String,
    pub debit: Money,
    pub credit: Money,
    pub movement: Money,
}

impl AccountMovement {
    pub fn class(&self) -> Option<char> {
        self.account.chars().next()
    }
}

/// Year-to-date balance per (entity, account), opening entries included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountBalance {
    pub entity: String,
    pub account: String,
    pub account_label: String,
    pub debit_cumulative: Money,
    pub credit_cumulative: Money,
    pub balance: Money,
}

impl AccountBalance {
    pub fn class(&self) -> Option<char> {
        self.account.chars().next()
    }
}

/// Standard computation output envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
