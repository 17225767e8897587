//! Safe withdrawal rate analysis and the inflation-indexed withdrawal schedule

use serde::{Deserialize, Serialize};

use crate::config::SUSTAINABLE_RATE_FLOOR;
use crate::error::{ensure_finite, ensure_non_negative, CalculationStatus, DegradedReason, EngineError, Result};
use crate::tvm::{future_value, validate_rate, PaymentTiming};

/// Expected return assumed by the withdrawal baseline when none is given
pub const DEFAULT_BASELINE_RETURN: f64 = 0.04;

fn ensure_rate_above_total_loss(field: &'static str, rate: f64) -> Result<()> {
    ensure_finite(field, rate)?;
    if rate <= -1.0 {
        return Err(EngineError::invalid(field, format!("must be > -1, got {}", rate)));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SafeWithdrawalParams {
    pub portfolio_value: f64,
    pub annual_expenses: f64,
    pub expected_return: f64,
    pub inflation_rate: f64,
    /// Withdrawal horizon in years; recorded on the result
    pub years: u32,
}

impl SafeWithdrawalParams {
    pub fn new(portfolio_value: f64, annual_expenses: f64, expected_return: f64, inflation_rate: f64, years: u32) -> Self {
        Self {
            portfolio_value,
            annual_expenses,
            expected_return,
            inflation_rate,
            years,
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure_non_negative("portfolio_value", self.portfolio_value)?;
        ensure_non_negative("annual_expenses", self.annual_expenses)?;
        ensure_rate_above_total_loss("expected_return", self.expected_return)?;
        ensure_rate_above_total_loss("inflation_rate", self.inflation_rate)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SafeWithdrawalAnalysis {
    /// Annual expenses over portfolio value
    pub current_withdrawal_rate: f64,
    /// Fisher real return
    pub real_return: f64,
    /// Real return when positive, else the floor
    pub sustainable_rate: f64,
    pub is_sustainable: bool,
    pub recommended_rate: f64,
    pub years: u32,
    pub status: CalculationStatus,
}

/// Compare the current withdrawal rate against the real return
pub fn safe_withdrawal_rate(params: &SafeWithdrawalParams) -> Result<SafeWithdrawalAnalysis> {
    params.validate()?;

    let real_return = (1.0 + params.expected_return) / (1.0 + params.inflation_rate) - 1.0;
    let sustainable_rate = if real_return > 0.0 {
        real_return
    } else {
        SUSTAINABLE_RATE_FLOOR
    };

    if params.portfolio_value == 0.0 {
        log::warn!("safe withdrawal rate requested for an empty portfolio");
        return Ok(SafeWithdrawalAnalysis {
            current_withdrawal_rate: 0.0,
            real_return,
            sustainable_rate,
            is_sustainable: false,
            recommended_rate: 0.0,
            years: params.years,
            status: CalculationStatus::Degraded {
                reason: DegradedReason::ZeroDenominator,
            },
        });
    }

    let current = params.annual_expenses / params.portfolio_value;
    log::debug!(
        "withdrawal rate {:.4} vs sustainable {:.4} (real return {:.4})",
        current,
        sustainable_rate,
        real_return
    );

    Ok(SafeWithdrawalAnalysis {
        current_withdrawal_rate: current,
        real_return,
        sustainable_rate,
        is_sustainable: current <= sustainable_rate,
        recommended_rate: current.min(sustainable_rate),
        years: params.years,
        status: CalculationStatus::Nominal,
    })
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WithdrawalBaselineParams {
    pub target_monthly_income: f64,
    pub inflation_rate: f64,
    pub withdrawal_period: u32,
    pub portfolio_value: f64,
    #[serde(default = "default_baseline_return")]
    pub expected_return: f64,
}

fn default_baseline_return() -> f64 {
    DEFAULT_BASELINE_RETURN
}

impl WithdrawalBaselineParams {
    pub fn new(target_monthly_income: f64, inflation_rate: f64, withdrawal_period: u32, portfolio_value: f64) -> Self {
        Self {
            target_monthly_income,
            inflation_rate,
            withdrawal_period,
            portfolio_value,
            expected_return: DEFAULT_BASELINE_RETURN,
        }
    }

    pub fn with_expected_return(mut self, rate: f64) -> Self {
        self.expected_return = rate;
        self
    }
}

/// One year of the withdrawal schedule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalYear {
    /// 1-based year of retirement
    pub year: u32,
    /// Today's money
    pub real_amount: f64,
    /// Inflated by `year - 1` years
    pub nominal_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalBaseline {
    pub target_monthly_income: f64,
    pub target_annual_income: f64,
    pub withdrawal_period: u32,
    pub inflation_rate: f64,
    pub schedule: Vec<WithdrawalYear>,
    pub safe_withdrawal: SafeWithdrawalAnalysis,
}

/// Inflation-indexed withdrawal schedule with its SWR check
pub fn withdrawal_baseline(params: &WithdrawalBaselineParams) -> Result<WithdrawalBaseline> {
    ensure_non_negative("target_monthly_income", params.target_monthly_income)?;
    validate_rate("inflation_rate", params.inflation_rate)?;

    let annual = params.target_monthly_income * 12.0;

    let schedule = (0..params.withdrawal_period)
        .map(|y| {
            Ok(WithdrawalYear {
                year: y + 1,
                real_amount: annual,
                nominal_amount: future_value(annual, params.inflation_rate, y, 0.0, PaymentTiming::End)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let safe_withdrawal = safe_withdrawal_rate(&SafeWithdrawalParams::new(
        params.portfolio_value,
        annual,
        params.expected_return,
        params.inflation_rate,
        params.withdrawal_period,
    ))?;

    Ok(WithdrawalBaseline {
        target_monthly_income: params.target_monthly_income,
        target_annual_income: annual,
        withdrawal_period: params.withdrawal_period,
        inflation_rate: params.inflation_rate,
        schedule,
        safe_withdrawal,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sustainable_four_percent() {
        let a = safe_withdrawal_rate(&SafeWithdrawalParams::new(1_000_000_000.0, 30_000_000.0, 0.06, 0.025, 30)).unwrap();
        assert_relative_eq!(a.current_withdrawal_rate, 0.03, epsilon = 1e-12);
        assert_relative_eq!(a.real_return, 1.06 / 1.025 - 1.0, epsilon = 1e-12);
        assert!(a.is_sustainable);
        assert_relative_eq!(a.recommended_rate, 0.03, epsilon = 1e-12);
    }

    #[test]
    fn test_negative_real_return_uses_floor() {
        let a = safe_withdrawal_rate(&SafeWithdrawalParams::new(100.0, 5.0, 0.02, 0.03, 25)).unwrap();
        assert!(a.real_return < 0.0);
        assert_eq!(a.sustainable_rate, SUSTAINABLE_RATE_FLOOR);
        assert!(!a.is_sustainable);
        assert_relative_eq!(a.recommended_rate, SUSTAINABLE_RATE_FLOOR);
    }

    #[test]
    fn test_empty_portfolio_is_degraded() {
        let a = safe_withdrawal_rate(&SafeWithdrawalParams::new(0.0, 5.0, 0.04, 0.02, 25)).unwrap();
        assert_eq!(a.current_withdrawal_rate, 0.0);
        assert!(!a.is_sustainable);
        assert!(a.status.is_degraded());

        assert!(safe_withdrawal_rate(&SafeWithdrawalParams::new(-1.0, 5.0, 0.04, 0.02, 25)).is_err());
    }

    #[test]
    fn test_baseline_schedule_inflates_from_year_one() {
        let params = WithdrawalBaselineParams::new(4_000_000.0, 0.025, 3, 1_200_000_000.0);
        let b = withdrawal_baseline(&params).unwrap();

        assert_relative_eq!(b.target_annual_income, 48_000_000.0);
        assert_eq!(b.schedule.len(), 3);
        assert_eq!(b.schedule[0].year, 1);
        assert_relative_eq!(b.schedule[0].nominal_amount, 48_000_000.0);
        assert_relative_eq!(b.schedule[2].nominal_amount, 48_000_000.0 * 1.025_f64.powi(2), epsilon = 1e-6);
        assert!(b.schedule.iter().all(|y| y.real_amount == 48_000_000.0));
        // 4% of portfolio
        assert_relative_eq!(b.safe_withdrawal.current_withdrawal_rate, 0.04, epsilon = 1e-12);
    }
}
