//! Monthly CAPEX cash disbursements.
//!
//! The disbursement source is cumulative, one row per period; the engine
//! surfaces only the current month's figure, rounded to 2 decimals.

use serde::{Deserialize, Serialize};

use crate::types::{Money, Period};

/// One row of the cumulative CAPEX disbursement table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapexDisbursement {
    pub period: Period,
    pub amount: Money,
}

/// Disbursed CAPEX for the reporting month. `None` when the table carries
/// no row for the period; the caller decides how loudly to report that.
pub fn monthly_disbursement(
    rows: &[CapexDisbursement],
    period: Period,
) -> Option<Money> {
    rows.iter()
        .find(|r| r.period == period)
        .map(|r| r.amount.round_dp(2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn row(period: &str, amount: Money) -> CapexDisbursement {
        CapexDisbursement {
            period: Period::parse(period).unwrap(),
            amount,
        }
    }

    #[test]
    fn test_current_month_amount_rounded() {
        let rows = vec![row("202512", dec!(80000)), row("202601", dec!(12345.678))];
        let period = Period::parse("202601").unwrap();
        assert_eq!(monthly_disbursement(&rows, period), Some(dec!(12345.68)));
    }

    #[test]
    fn test_absent_period_yields_none() {
        let rows = vec![row("202512", dec!(80000))];
        let period = Period::parse("202601").unwrap();
        assert_eq!(monthly_disbursement(&rows, period), None);
    }

    #[test]
    fn test_first_matching_row_wins() {
        let rows = vec![row("202601", dec!(100)), row("202601", dec!(999))];
        let period = Period::parse("202601").unwrap();
        assert_eq!(monthly_disbursement(&rows, period), Some(dec!(100)));
    }
}
