//! Net present value evaluation
//!
//! Discounting follows the Actual/365 convention: elapsed days from the
//! schedule anchor divided by 365 give the exponent in years.

use crate::contract::CashflowSchedule;
use crate::error::EngineError;

/// Days per year under Actual/365
const DAYS_PER_YEAR: f64 = 365.0;

/// Net present value of a schedule at a candidate rate.
///
/// Each entry contributes `amount / (1 + rate)^n` where `n` is its Actual/365
/// year fraction from the anchor entry; the anchor itself contributes
/// undiscounted. Returns `RateOutOfDomain` when `1 + rate` is not positive,
/// since a fractional power of a non-positive base is undefined.
///
/// Pure and reentrant: identical inputs yield bit-identical output.
pub fn net_present_value(schedule: &CashflowSchedule, rate: f64) -> Result<f64, EngineError> {
    let base = 1.0 + rate;
    if base <= 0.0 {
        return Err(EngineError::RateOutOfDomain { rate });
    }

    let anchor = schedule.anchor();
    let npv = schedule
        .entries()
        .iter()
        .map(|entry| {
            let years = (entry.day_offset - anchor) as f64 / DAYS_PER_YEAR;
            entry.amount / base.powf(years)
        })
        .sum();

    Ok(npv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_anchor_contributes_undiscounted() {
        let schedule = CashflowSchedule::from_pairs(&[(0, -123400.0)]).unwrap();
        let npv = net_present_value(&schedule, 0.25).unwrap();
        assert_eq!(npv, -123400.0);
    }

    #[test]
    fn test_one_year_discount() {
        // 110 one year out at 10% discounts to exactly 100
        let schedule = CashflowSchedule::from_pairs(&[(0, -100.0), (365, 110.0)]).unwrap();
        let npv = net_present_value(&schedule, 0.10).unwrap();
        assert_relative_eq!(npv, 0.0, epsilon = 1e-10);
    }

    #[test]
    fn test_sample_schedule_at_seed_rates() {
        let schedule = CashflowSchedule::from_pairs(&[
            (0, -123400.0),
            (365, 36200.0),
            (730, 54800.0),
            (1095, 48100.0),
        ])
        .unwrap();
        assert_relative_eq!(
            net_present_value(&schedule, 0.25).unwrap(),
            -34740.8,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            net_present_value(&schedule, 0.20).unwrap(),
            -27342.12962962962,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_unsorted_schedule_anchors_on_first_entry() {
        // First entry is the anchor even when a later date precedes it
        let schedule = CashflowSchedule::from_pairs(&[(365, 110.0), (0, -100.0)]).unwrap();
        let npv = net_present_value(&schedule, 0.10).unwrap();
        // Second entry sits one year before the anchor, so it compounds up
        assert_relative_eq!(npv, 110.0 - 100.0 * 1.10, epsilon = 1e-10);
    }

    #[test]
    fn test_rate_at_or_below_minus_one_is_domain_error() {
        let schedule = CashflowSchedule::from_pairs(&[(0, -100.0), (365, 110.0)]).unwrap();
        assert_eq!(
            net_present_value(&schedule, -1.0).unwrap_err(),
            EngineError::RateOutOfDomain { rate: -1.0 }
        );
        assert_eq!(
            net_present_value(&schedule, -1.5).unwrap_err(),
            EngineError::RateOutOfDomain { rate: -1.5 }
        );
    }

    #[test]
    fn test_evaluation_is_bit_identical() {
        let schedule = CashflowSchedule::from_pairs(&[
            (0, -123400.0),
            (365, 36200.0),
            (730, 54800.0),
            (1095, 48100.0),
        ])
        .unwrap();
        let first = net_present_value(&schedule, 0.0596).unwrap();
        let second = net_present_value(&schedule, 0.0596).unwrap();
        assert_eq!(first.to_bits(), second.to_bits());
    }
}
