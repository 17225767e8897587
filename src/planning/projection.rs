//! Projection of retirement assets to the retirement date

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_CONTRIBUTION_GROWTH_RATE;
use crate::error::{ensure_in_range, ensure_non_negative, Result};
use crate::tvm::{self, PaymentTiming};

/// Inputs for [`project_retirement_assets`]
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ProjectionParams {
    pub current_assets: f64,
    /// First-year contribution
    pub annual_contribution: f64,
    pub years_to_retirement: u32,
    pub expected_return: f64,
    /// Annual growth of the contribution amount
    #[serde(default = "default_growth")]
    pub contribution_growth_rate: f64,
}

fn default_growth() -> f64 {
    DEFAULT_CONTRIBUTION_GROWTH_RATE
}

impl ProjectionParams {
    pub fn new(
        current_assets: f64,
        annual_contribution: f64,
        years_to_retirement: u32,
        expected_return: f64,
    ) -> Self {
        Self {
            current_assets,
            annual_contribution,
            years_to_retirement,
            expected_return,
            contribution_growth_rate: DEFAULT_CONTRIBUTION_GROWTH_RATE,
        }
    }

    pub fn with_contribution_growth(mut self, rate: f64) -> Self {
        self.contribution_growth_rate = rate;
        self
    }

    pub fn validate(&self) -> Result<()> {
        ensure_non_negative("current_assets", self.current_assets)?;
        ensure_non_negative("annual_contribution", self.annual_contribution)?;
        tvm::validate_rate("expected_return", self.expected_return)?;
        ensure_in_range("contribution_growth_rate", self.contribution_growth_rate, 0.0, 1.0)
    }
}

/// One contribution year in the projection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContributionYear {
    /// 0-indexed year from today
    pub year: u32,
    pub contribution: f64,
    /// Years this contribution is paid in before retirement
    pub remaining_years: u32,
    pub future_value: f64,
}

/// Projected assets at retirement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetProjection {
    pub current_assets: f64,
    pub annual_contribution: f64,
    pub years_to_retirement: u32,
    pub expected_return: f64,
    /// Current assets compounded to retirement
    pub current_assets_fv: f64,
    /// Sum of each year's compounded contribution
    pub contributions_fv: f64,
    pub total_projected_assets: f64,
    pub schedule: Vec<ContributionYear>,
}

impl AssetProjection {
    /// Growth of the projected total over today's assets
    pub fn funding_gap(&self) -> f64 {
        self.total_projected_assets - self.current_assets
    }
}

/// Project assets forward with geometrically growing contributions
///
/// Each year's contribution is paid as a level end-of-year stream over its
/// own remaining horizon, and the stream values are summed. Contribution
/// growth and horizon both vary per year, so there is no closed form.
pub fn project_retirement_assets(params: &ProjectionParams) -> Result<AssetProjection> {
    params.validate()?;

    let n = params.years_to_retirement;
    let current_assets_fv = tvm::future_value(
        params.current_assets,
        params.expected_return,
        n,
        0.0,
        PaymentTiming::End,
    )?;

    let mut schedule = Vec::with_capacity(n as usize);
    let mut contributions_fv = 0.0;

    for year in 0..n {
        let contribution = tvm::compound(params.annual_contribution, params.contribution_growth_rate, year);
        let remaining_years = n - year;
        let future_value = tvm::future_value(
            0.0,
            params.expected_return,
            remaining_years,
            contribution,
            PaymentTiming::End,
        )?;

        contributions_fv += future_value;
        schedule.push(ContributionYear {
            year,
            contribution,
            remaining_years,
            future_value,
        });
    }

    Ok(AssetProjection {
        current_assets: params.current_assets,
        annual_contribution: params.annual_contribution,
        years_to_retirement: n,
        expected_return: params.expected_return,
        current_assets_fv,
        contributions_fv,
        total_projected_assets: current_assets_fv + contributions_fv,
        schedule,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_flat_contributions_sum_annuities() {
        // No growth: year y pays an ordinary annuity over n - y years
        let params = ProjectionParams::new(0.0, 1_000.0, 3, 0.05).with_contribution_growth(0.0);
        let projection = project_retirement_assets(&params).unwrap();

        // 3152.5 + 2050 + 1000
        assert_relative_eq!(projection.contributions_fv, 6_202.5, max_relative = 1e-12);
        assert_eq!(projection.schedule.len(), 3);
        assert_eq!(projection.schedule[0].remaining_years, 3);
        assert_relative_eq!(projection.schedule[0].future_value, 3_152.5, max_relative = 1e-12);
        assert_eq!(projection.schedule[2].remaining_years, 1);
        assert_relative_eq!(projection.schedule[2].future_value, 1_000.0, max_relative = 1e-12);
    }

    #[test]
    fn test_growing_contributions() {
        let params = ProjectionParams::new(100_000.0, 10_000.0, 3, 0.04);
        let projection = project_retirement_assets(&params).unwrap();

        let annuity = |years: i32| (1.04_f64.powi(years) - 1.0) / 0.04;
        let expected_contrib = 10_000.0 * annuity(3) + 10_300.0 * annuity(2) + 10_609.0 * annuity(1);
        assert_relative_eq!(projection.current_assets_fv, 100_000.0 * 1.04_f64.powi(3), max_relative = 1e-12);
        assert_relative_eq!(projection.contributions_fv, expected_contrib, max_relative = 1e-12);
        assert_relative_eq!(
            projection.total_projected_assets,
            projection.current_assets_fv + projection.contributions_fv
        );
        assert_relative_eq!(
            projection.funding_gap(),
            projection.total_projected_assets - 100_000.0
        );
    }

    #[test]
    fn test_zero_years_returns_current_assets() {
        let projection = project_retirement_assets(&ProjectionParams::new(5_000.0, 1_000.0, 0, 0.05)).unwrap();
        assert_eq!(projection.total_projected_assets, 5_000.0);
        assert!(projection.schedule.is_empty());
    }

    #[test]
    fn test_rejects_negative_assets() {
        assert!(project_retirement_assets(&ProjectionParams::new(-1.0, 0.0, 5, 0.05)).is_err());
    }
}
