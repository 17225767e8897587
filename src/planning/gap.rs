//! Funding gap between projected assets and required capital

use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, ensure_non_negative, CalculationStatus, DegradedReason, Result};

/// Comparison of projected assets against required capital
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FundingGap {
    pub required_capital: f64,
    pub projected_assets: f64,
    /// Projected minus required (negative when short)
    pub funding_gap: f64,
    /// Gap as a percentage of required capital (0 when required is 0)
    pub gap_percentage: f64,
    pub is_sufficient: bool,
    /// Magnitude of a negative gap, else 0
    pub shortfall: f64,
    pub status: CalculationStatus,
}

/// Calculate the funding gap
pub fn calculate_funding_gap(required_capital: f64, projected_assets: f64) -> Result<FundingGap> {
    ensure_non_negative("required_capital", required_capital)?;
    ensure_finite("projected_assets", projected_assets)?;

    let gap = projected_assets - required_capital;

    let (gap_percentage, status) = if required_capital > 0.0 {
        (gap / required_capital * 100.0, CalculationStatus::Nominal)
    } else {
        (
            0.0,
            CalculationStatus::Degraded {
                reason: DegradedReason::ZeroDenominator,
            },
        )
    };

    Ok(FundingGap {
        required_capital,
        projected_assets,
        funding_gap: gap,
        gap_percentage,
        is_sufficient: gap >= 0.0,
        shortfall: if gap < 0.0 { gap.abs() } else { 0.0 },
        status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_shortfall_scenario() {
        let gap = calculate_funding_gap(700_000_000.0, 650_000_000.0).unwrap();
        assert_relative_eq!(gap.funding_gap, -50_000_000.0);
        assert!(!gap.is_sufficient);
        assert_relative_eq!(gap.shortfall, 50_000_000.0);
        assert_relative_eq!(gap.gap_percentage, -7.142857, epsilon = 1e-5);
        assert!(gap.status.is_nominal());
    }

    #[test]
    fn test_surplus_has_no_shortfall() {
        let gap = calculate_funding_gap(100.0, 100.0).unwrap();
        assert!(gap.is_sufficient);
        assert_eq!(gap.shortfall, 0.0);
        assert_eq!(gap.gap_percentage, 0.0);
    }

    #[test]
    fn test_zero_required_is_degraded() {
        let gap = calculate_funding_gap(0.0, 1_000.0).unwrap();
        assert_eq!(gap.gap_percentage, 0.0);
        assert!(gap.is_sufficient);
        assert_eq!(
            gap.status,
            CalculationStatus::Degraded { reason: DegradedReason::ZeroDenominator }
        );
    }
}
