//! Required retirement capital
//!
//! Two independent estimates are blended:
//! - Safe-withdrawal-rate method: income at retirement / SWR
//! - Annuity method: PV of an ordinary annuity paying that income over the
//!   retirement period at the post-retirement return
//!
//! The recommended figure is their arithmetic mean.

use serde::{Deserialize, Serialize};

use crate::assumptions::EconomicAssumptions;
use crate::config::DEFAULT_SAFE_WITHDRAWAL_RATE;
use crate::error::{ensure_in_range, ensure_non_negative, EngineError, Result};
use crate::tvm::{self, PaymentTiming};

/// Inputs for [`calculate_retirement_goal`]
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RetirementGoalParams {
    /// Annual income needed, in today's money
    pub annual_income_needed: f64,
    pub inflation_rate: f64,
    pub years_to_retirement: u32,
    /// Years the capital must fund
    pub retirement_period: u32,
    pub post_retirement_return: f64,
    #[serde(default = "default_swr")]
    pub safe_withdrawal_rate: f64,
}

fn default_swr() -> f64 {
    DEFAULT_SAFE_WITHDRAWAL_RATE
}

impl RetirementGoalParams {
    pub fn new(
        annual_income_needed: f64,
        inflation_rate: f64,
        years_to_retirement: u32,
        retirement_period: u32,
        post_retirement_return: f64,
    ) -> Self {
        Self {
            annual_income_needed,
            inflation_rate,
            years_to_retirement,
            retirement_period,
            post_retirement_return,
            safe_withdrawal_rate: DEFAULT_SAFE_WITHDRAWAL_RATE,
        }
    }

    pub fn with_safe_withdrawal_rate(mut self, rate: f64) -> Self {
        self.safe_withdrawal_rate = rate;
        self
    }

    pub fn validate(&self) -> Result<()> {
        ensure_non_negative("annual_income_needed", self.annual_income_needed)?;
        ensure_in_range("inflation_rate", self.inflation_rate, 0.0, 1.0)?;
        tvm::validate_rate("post_retirement_return", self.post_retirement_return)?;
        ensure_in_range("safe_withdrawal_rate", self.safe_withdrawal_rate, 0.0, 1.0)?;
        if self.safe_withdrawal_rate == 0.0 {
            return Err(EngineError::invalid("safe_withdrawal_rate", "must be > 0"));
        }
        Ok(())
    }
}

/// Capital required at retirement under both methods
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetirementGoalResult {
    /// Annual income need inflated to the retirement date
    pub real_income_at_retirement: f64,
    pub swr_required_capital: f64,
    pub pv_required_capital: f64,
    /// Mean of the two methods
    pub recommended_capital: f64,
}

/// Calculate required capital at retirement
pub fn calculate_retirement_goal(params: &RetirementGoalParams) -> Result<RetirementGoalResult> {
    params.validate()?;

    let real_income_at_retirement = tvm::compound(
        params.annual_income_needed,
        params.inflation_rate,
        params.years_to_retirement,
    );

    let swr_required_capital = real_income_at_retirement / params.safe_withdrawal_rate;

    let pv_required_capital = tvm::present_value(
        0.0,
        params.post_retirement_return,
        params.retirement_period,
        real_income_at_retirement,
        PaymentTiming::End,
    )?;

    let recommended_capital = (swr_required_capital + pv_required_capital) / 2.0;

    log::debug!(
        "retirement goal: income {:.0} -> {:.0}, swr {:.0}, pv {:.0}",
        params.annual_income_needed,
        real_income_at_retirement,
        swr_required_capital,
        pv_required_capital
    );

    Ok(RetirementGoalResult {
        real_income_at_retirement,
        swr_required_capital,
        pv_required_capital,
        recommended_capital,
    })
}

/// Inputs for building a [`RetirementGoal`] from a monthly income target
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GoalPlanParams {
    pub current_age: u32,
    pub target_retirement_age: u32,
    pub target_monthly_income: f64,
    pub retirement_period_years: u32,
    #[serde(default)]
    pub medical_reserve: f64,
}

impl GoalPlanParams {
    pub fn validate(&self) -> Result<()> {
        if !(50..=80).contains(&self.target_retirement_age) {
            return Err(EngineError::invalid(
                "target_retirement_age",
                format!("must be in [50, 80], got {}", self.target_retirement_age),
            ));
        }
        if self.current_age > self.target_retirement_age {
            return Err(EngineError::invalid(
                "current_age",
                format!(
                    "must not exceed target_retirement_age ({} > {})",
                    self.current_age, self.target_retirement_age
                ),
            ));
        }
        if !(10..=50).contains(&self.retirement_period_years) {
            return Err(EngineError::invalid(
                "retirement_period_years",
                format!("must be in [10, 50], got {}", self.retirement_period_years),
            ));
        }
        ensure_non_negative("target_monthly_income", self.target_monthly_income)?;
        if self.target_monthly_income == 0.0 {
            return Err(EngineError::invalid("target_monthly_income", "must be > 0"));
        }
        ensure_non_negative("medical_reserve", self.medical_reserve)
    }

    pub fn years_to_retirement(&self) -> u32 {
        self.target_retirement_age.saturating_sub(self.current_age)
    }
}

/// Retirement goal record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetirementGoal {
    pub target_retirement_age: u32,
    pub target_monthly_income: f64,
    pub target_annual_income: f64,
    pub retirement_period_years: u32,
    /// Recommended capital from the blended calculation
    pub required_capital: f64,
    pub medical_reserve: f64,
    pub swr_required: f64,
    pub pv_required: f64,
}

impl RetirementGoal {
    /// Build a goal from a monthly target under the given assumptions
    pub fn plan(
        params: &GoalPlanParams,
        assumptions: &EconomicAssumptions,
        safe_withdrawal_rate: f64,
    ) -> Result<Self> {
        params.validate()?;
        assumptions.validate()?;

        let target_annual_income = params.target_monthly_income * 12.0;
        let result = calculate_retirement_goal(
            &RetirementGoalParams::new(
                target_annual_income,
                assumptions.inflation_rate,
                params.years_to_retirement(),
                params.retirement_period_years,
                assumptions.post_retirement_return,
            )
            .with_safe_withdrawal_rate(safe_withdrawal_rate),
        )?;

        Ok(Self {
            target_retirement_age: params.target_retirement_age,
            target_monthly_income: params.target_monthly_income,
            target_annual_income,
            retirement_period_years: params.retirement_period_years,
            required_capital: result.recommended_capital,
            medical_reserve: params.medical_reserve,
            swr_required: result.swr_required_capital,
            pv_required: result.pv_required_capital,
        })
    }

    /// Required capital plus the medical reserve
    pub fn total_required_capital(&self) -> f64 {
        self.required_capital + self.medical_reserve
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_reference_scenario() {
        let params = RetirementGoalParams::new(48_000_000.0, 0.025, 20, 25, 0.025);
        let result = calculate_retirement_goal(&params).unwrap();

        // Independently: 1.025^20 = 1.6386164403
        let income = 48_000_000.0 * 1.638_616_440_3;
        let swr = income / 0.04;
        let annuity = (1.0 - 1.025_f64.powi(-25)) / 0.025;
        let pv = income * annuity;

        assert_relative_eq!(result.real_income_at_retirement, income, max_relative = 1e-9);
        assert_relative_eq!(result.real_income_at_retirement, 78_653_589.13, epsilon = 1.0);
        assert_relative_eq!(result.swr_required_capital, swr, max_relative = 1e-9);
        assert_relative_eq!(result.swr_required_capital, 1_966_339_728.0, epsilon = 50.0);
        assert_relative_eq!(result.pv_required_capital, pv, max_relative = 1e-9);
        // a(25, 2.5%) = 18.4244
        assert_relative_eq!(annuity, 18.424_4, epsilon = 1e-4);
        assert_relative_eq!(result.recommended_capital, (swr + pv) / 2.0, max_relative = 1e-9);
    }

    #[test]
    fn test_zero_return_annuity_is_sum_of_payments() {
        let params = RetirementGoalParams::new(1_000.0, 0.0, 0, 30, 0.0);
        let result = calculate_retirement_goal(&params).unwrap();
        assert_relative_eq!(result.pv_required_capital, 30_000.0);
        assert_relative_eq!(result.swr_required_capital, 25_000.0);
        assert_relative_eq!(result.recommended_capital, 27_500.0);
    }

    #[test]
    fn test_rejects_zero_withdrawal_rate() {
        let params = RetirementGoalParams::new(1_000.0, 0.02, 10, 30, 0.03).with_safe_withdrawal_rate(0.0);
        assert!(calculate_retirement_goal(&params).is_err());
    }

    #[test]
    fn test_goal_record_includes_medical_reserve() {
        let params = GoalPlanParams {
            current_age: 45,
            target_retirement_age: 65,
            target_monthly_income: 4_000_000.0,
            retirement_period_years: 25,
            medical_reserve: 100_000_000.0,
        };
        let goal = RetirementGoal::plan(&params, &EconomicAssumptions::default(), 0.04).unwrap();

        assert_relative_eq!(goal.target_annual_income, 48_000_000.0);
        assert_relative_eq!(goal.required_capital, (goal.swr_required + goal.pv_required) / 2.0);
        assert_relative_eq!(goal.total_required_capital(), goal.required_capital + 100_000_000.0);
    }

    #[test]
    fn test_goal_record_validation() {
        let params = GoalPlanParams {
            current_age: 70,
            target_retirement_age: 65,
            target_monthly_income: 1.0,
            retirement_period_years: 25,
            medical_reserve: 0.0,
        };
        assert!(params.validate().is_err());

        let params = GoalPlanParams { current_age: 40, retirement_period_years: 5, ..params };
        assert!(params.validate().is_err());
    }
}
