//! Time value of money primitives
//!
//! Supports:
//! - Future value of a lump sum plus a level payment stream
//! - Present value of a lump sum plus a level payment stream
//! - Level payment reconciling a present and future value
//!
//! Payments may fall at the end of each period (ordinary annuity) or at the
//! beginning (annuity due). A zero rate is handled without dividing by it.

use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, EngineError, Result};

/// When level payments occur within each period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentTiming {
    /// Ordinary annuity
    #[default]
    End,
    /// Annuity due
    Begin,
}

impl PaymentTiming {
    /// Multiplier converting an ordinary-annuity factor to this timing
    fn factor(self, rate: f64) -> f64 {
        match self {
            PaymentTiming::End => 1.0,
            PaymentTiming::Begin => 1.0 + rate,
        }
    }
}

/// Validate a periodic rate against the `[0, 1)` contract
pub fn validate_rate(field: &'static str, rate: f64) -> Result<()> {
    ensure_finite(field, rate)?;
    if rate < 0.0 {
        return Err(EngineError::invalid(field, format!("must be >= 0, got {}", rate)));
    }
    if rate >= 1.0 {
        return Err(EngineError::invalid(field, format!("must be < 1, got {}", rate)));
    }
    Ok(())
}

/// Period count as a `powi` exponent, rejecting counts beyond `i32::MAX`
fn exponent(periods: u32) -> Result<i32> {
    i32::try_from(periods)
        .map_err(|_| EngineError::invalid("periods", format!("must be <= {}, got {}", i32::MAX, periods)))
}

/// Future value of `present_value` plus `payment` each period for `periods` periods
///
/// # Arguments
/// * `present_value` - Amount invested now
/// * `rate` - Periodic rate as a decimal, in `[0, 1)`
/// * `periods` - Number of compounding periods
/// * `payment` - Level payment per period (0 for a lump sum)
/// * `timing` - End (ordinary) or Begin (due)
pub fn future_value(
    present_value: f64,
    rate: f64,
    periods: u32,
    payment: f64,
    timing: PaymentTiming,
) -> Result<f64> {
    validate_rate("rate", rate)?;
    ensure_finite("present_value", present_value)?;
    ensure_finite("payment", payment)?;
    let n = exponent(periods)?;

    if rate == 0.0 {
        return Ok(present_value + payment * periods as f64);
    }

    let growth = (1.0 + rate).powi(n);
    let fv_lump = present_value * growth;

    if payment == 0.0 {
        return Ok(fv_lump);
    }

    let annuity_factor = (growth - 1.0) / rate;
    Ok(fv_lump + payment * annuity_factor * timing.factor(rate))
}

/// Present value of `future_value` plus `payment` each period for `periods` periods
pub fn present_value(
    future_value: f64,
    rate: f64,
    periods: u32,
    payment: f64,
    timing: PaymentTiming,
) -> Result<f64> {
    validate_rate("rate", rate)?;
    ensure_finite("future_value", future_value)?;
    ensure_finite("payment", payment)?;
    let n = exponent(periods)?;

    if rate == 0.0 {
        return Ok(future_value - payment * periods as f64);
    }

    let v_n = (1.0 + rate).powi(n).recip();
    let pv_lump = future_value * v_n;

    if payment == 0.0 {
        return Ok(pv_lump);
    }

    let annuity_factor = (1.0 - v_n) / rate;
    Ok(pv_lump + payment * annuity_factor * timing.factor(rate))
}

/// Level payment that grows `present_value` into `future_value` over `periods`
///
/// Consistent with [`future_value`]: feeding the result back in as `payment`
/// reproduces `future_value`. Zero periods yield a zero payment.
pub fn payment(
    present_value: f64,
    future_value: f64,
    rate: f64,
    periods: u32,
    timing: PaymentTiming,
) -> Result<f64> {
    validate_rate("rate", rate)?;
    ensure_finite("present_value", present_value)?;
    ensure_finite("future_value", future_value)?;
    let n = exponent(periods)?;

    if periods == 0 {
        return Ok(0.0);
    }

    if rate == 0.0 {
        return Ok((future_value - present_value) / periods as f64);
    }

    let growth = (1.0 + rate).powi(n);
    let annuity_factor = (growth - 1.0) / rate * timing.factor(rate);
    Ok((future_value - present_value * growth) / annuity_factor)
}

/// Compound `amount` by `rate` for `years` (inflation or growth projection)
///
/// Unlike the TVM contract this accepts any rate above -100%, since growth
/// and inflation assumptions are validated by their own records.
pub fn compound(amount: f64, rate: f64, years: u32) -> f64 {
    amount * (1.0 + rate).powf(f64::from(years))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_future_value_lump_sum() {
        // $1000 at 5% for 10 years
        let fv = future_value(1000.0, 0.05, 10, 0.0, PaymentTiming::End).unwrap();
        assert_relative_eq!(fv, 1628.894627, epsilon = 1e-5);
    }

    #[test]
    fn test_zero_rate_is_linear() {
        let fv = future_value(500.0, 0.0, 12, 100.0, PaymentTiming::End).unwrap();
        assert_relative_eq!(fv, 500.0 + 100.0 * 12.0);

        let pv = present_value(2000.0, 0.0, 12, 100.0, PaymentTiming::Begin).unwrap();
        assert_relative_eq!(pv, 2000.0 - 1200.0);

        let pmt = payment(100.0, 1300.0, 0.0, 12, PaymentTiming::End).unwrap();
        assert_relative_eq!(pmt, 100.0);
    }

    #[test]
    fn test_round_trip_present_future() {
        for &(pv, rate, n) in &[(1000.0, 0.05, 10), (250_000.0, 0.025, 30), (1.0, 0.3, 1), (42.0, 0.0001, 400)] {
            let fv = future_value(pv, rate, n, 0.0, PaymentTiming::End).unwrap();
            let back = present_value(fv, rate, n, 0.0, PaymentTiming::End).unwrap();
            assert_relative_eq!(back, pv, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_annuity_due_exceeds_ordinary() {
        let ordinary = future_value(0.0, 0.06, 10, 100.0, PaymentTiming::End).unwrap();
        let due = future_value(0.0, 0.06, 10, 100.0, PaymentTiming::Begin).unwrap();
        // s(10, 6%) = 13.180795
        assert_relative_eq!(ordinary, 1318.0795, epsilon = 1e-3);
        assert_relative_eq!(due, ordinary * 1.06, max_relative = 1e-12);
    }

    #[test]
    fn test_present_value_of_annuity() {
        // $100/period for 12 periods at 0.5%
        let pv = present_value(0.0, 0.005, 12, 100.0, PaymentTiming::End).unwrap();
        assert!((pv - 1161.89).abs() < 0.01, "got {}", pv);
    }

    #[test]
    fn test_payment_reconciles_future_value() {
        for timing in [PaymentTiming::End, PaymentTiming::Begin] {
            let pmt = payment(10_000.0, 100_000.0, 0.04, 15, timing).unwrap();
            let fv = future_value(10_000.0, 0.04, 15, pmt, timing).unwrap();
            assert_relative_eq!(fv, 100_000.0, max_relative = 1e-10);
        }
    }

    #[test]
    fn test_zero_periods_is_noop() {
        assert_relative_eq!(future_value(123.0, 0.07, 0, 50.0, PaymentTiming::End).unwrap(), 123.0);
        assert_relative_eq!(present_value(456.0, 0.07, 0, 50.0, PaymentTiming::Begin).unwrap(), 456.0);
        assert_eq!(payment(1.0, 2.0, 0.07, 0, PaymentTiming::End).unwrap(), 0.0);
    }

    #[test]
    fn test_rejects_out_of_contract_rates() {
        assert!(future_value(1.0, -0.01, 5, 0.0, PaymentTiming::End).is_err());
        assert!(present_value(1.0, 1.0, 5, 0.0, PaymentTiming::End).is_err());
        assert!(payment(1.0, 2.0, f64::NAN, 5, PaymentTiming::End).is_err());
    }

    #[test]
    fn test_rejects_periods_beyond_exponent_range() {
        let too_many = i32::MAX as u32 + 1;
        assert!(present_value(1.0, 0.05, too_many, 0.0, PaymentTiming::End).is_err());
        assert!(future_value(1.0, 0.05, 3_000_000_000, 0.0, PaymentTiming::End).is_err());
        assert!(payment(1.0, 2.0, 0.05, too_many, PaymentTiming::Begin).is_err());
        assert!(future_value(1.0, 0.0, too_many, 1.0, PaymentTiming::End).is_err());
    }

    #[test]
    fn test_largest_period_count_saturates() {
        let fv = future_value(1.0, 0.05, i32::MAX as u32, 0.0, PaymentTiming::End).unwrap();
        assert_eq!(fv, f64::INFINITY);
        let pv = present_value(1.0, 0.05, i32::MAX as u32, 0.0, PaymentTiming::End).unwrap();
        assert_eq!(pv, 0.0);
        assert_eq!(compound(100.0, 0.03, 3_000_000_000), f64::INFINITY);
    }
}
