//! Documented default parameters for every calculator
//!
//! Nothing in the engine reads global state; callers either take these
//! defaults or pass their own values into the parameter records.

use serde::{Deserialize, Serialize};

use crate::error::{ensure_in_range, ensure_non_negative, Result};

/// Default safe withdrawal rate used by the retirement goal calculator
pub const DEFAULT_SAFE_WITHDRAWAL_RATE: f64 = 0.04;

/// Default annual growth of savings contributions
pub const DEFAULT_CONTRIBUTION_GROWTH_RATE: f64 = 0.03;

/// Default risk-free rate for Sharpe/Sortino ratios
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.02;

/// Default guardrail band around the target portfolio value
pub const DEFAULT_GUARDRAIL_THRESHOLD: f64 = 0.2;

/// Floor used when the real return is not positive
pub const SUSTAINABLE_RATE_FLOOR: f64 = 0.03;

/// Solver settings for the mean-variance optimizer
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    /// Stop once successive iterates move less than this (L2 norm)
    pub tolerance: f64,
    /// Iteration cap; reaching it is reported as non-convergence
    pub max_iterations: u32,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            max_iterations: 10_000,
        }
    }
}

/// Guardrail rule parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardrailSettings {
    /// Relative deviation from target that triggers an adjustment
    pub threshold: f64,
    /// Multiplier applied when the portfolio is ahead of target
    pub increase_factor: f64,
    /// Multiplier applied when the portfolio is behind target
    pub decrease_factor: f64,
}

impl Default for GuardrailSettings {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_GUARDRAIL_THRESHOLD,
            increase_factor: 1.1,
            decrease_factor: 0.9,
        }
    }
}

/// Three-bucket plan parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct BucketSettings {
    /// Years of expenses held in cash
    pub bucket1_years: u32,
    /// Years of expenses held in short/intermediate bonds
    pub bucket2_years: u32,
    pub cash_expected_return: f64,
    pub bonds_expected_return: f64,
    pub growth_expected_return: f64,
}

impl Default for BucketSettings {
    fn default() -> Self {
        Self {
            bucket1_years: 2,
            bucket2_years: 3,
            cash_expected_return: 0.03,
            bonds_expected_return: 0.05,
            growth_expected_return: 0.08,
        }
    }
}

/// Tax-aware withdrawal waterfall limits
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceSettings {
    /// Pension income eligible for the deduction in step 3
    pub pension_deduction_cap: f64,
    /// Pension income tax rate in step 3
    pub pension_tax_rate: f64,
}

impl Default for SequenceSettings {
    fn default() -> Self {
        Self {
            pension_deduction_cap: 12_000_000.0,
            pension_tax_rate: 0.06,
        }
    }
}

/// Split of an extra savings contribution across accounts
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SavingsPlanSettings {
    pub pension_savings_share: f64,
    /// Annual pension savings limit
    pub pension_savings_limit: f64,
    pub irp_share: f64,
    /// Annual IRP limit
    pub irp_limit: f64,
}

impl Default for SavingsPlanSettings {
    fn default() -> Self {
        Self {
            pension_savings_share: 0.4,
            pension_savings_limit: 7_000_000.0,
            irp_share: 0.3,
            irp_limit: 3_000_000.0,
        }
    }
}

impl SavingsPlanSettings {
    pub fn validate(&self) -> Result<()> {
        ensure_in_range("pension_savings_share", self.pension_savings_share, 0.0, 1.0)?;
        ensure_in_range("irp_share", self.irp_share, 0.0, 1.0)?;
        ensure_non_negative("pension_savings_limit", self.pension_savings_limit)?;
        ensure_non_negative("irp_limit", self.irp_limit)
    }
}

/// Tax-advantaged account sizing from savings capacity
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountUtilizationSettings {
    pub irp_share: f64,
    pub irp_limit: f64,
    pub pension_savings_share: f64,
    pub pension_savings_limit: f64,
    /// Credit on deposits into either tax-advantaged account
    pub tax_credit_rate: f64,
}

impl Default for AccountUtilizationSettings {
    fn default() -> Self {
        Self {
            irp_share: 0.4,
            irp_limit: 7_000_000.0,
            pension_savings_share: 0.3,
            pension_savings_limit: 7_000_000.0,
            tax_credit_rate: 0.15,
        }
    }
}

impl AccountUtilizationSettings {
    pub fn validate(&self) -> Result<()> {
        ensure_in_range("irp_share", self.irp_share, 0.0, 1.0)?;
        ensure_in_range("pension_savings_share", self.pension_savings_share, 0.0, 1.0)?;
        ensure_non_negative("irp_limit", self.irp_limit)?;
        ensure_non_negative("pension_savings_limit", self.pension_savings_limit)?;
        ensure_in_range("tax_credit_rate", self.tax_credit_rate, 0.0, 1.0)
    }
}

/// All engine defaults in one place
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineDefaults {
    pub safe_withdrawal_rate: f64,
    pub contribution_growth_rate: f64,
    pub risk_free_rate: f64,
    pub solver: SolverSettings,
    pub guardrail: GuardrailSettings,
    pub buckets: BucketSettings,
    pub sequence: SequenceSettings,
    pub savings_plan: SavingsPlanSettings,
    pub account_utilization: AccountUtilizationSettings,
    /// Worker cap for batch scenario runs
    pub max_concurrency: usize,
}

impl Default for EngineDefaults {
    fn default() -> Self {
        Self {
            safe_withdrawal_rate: DEFAULT_SAFE_WITHDRAWAL_RATE,
            contribution_growth_rate: DEFAULT_CONTRIBUTION_GROWTH_RATE,
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
            solver: SolverSettings::default(),
            guardrail: GuardrailSettings::default(),
            buckets: BucketSettings::default(),
            sequence: SequenceSettings::default(),
            savings_plan: SavingsPlanSettings::default(),
            account_utilization: AccountUtilizationSettings::default(),
            max_concurrency: 4,
        }
    }
}
