//! Risk profile scoring, model portfolios and volatility tilts

use serde::{Deserialize, Serialize};

use super::allocation::PortfolioAllocation;
use crate::error::{ensure_finite, ensure_in_range, ensure_non_negative, Result};
use crate::planning::SavingsAccount;

/// Monthly income above which income counts as stable
const STABLE_MONTHLY_INCOME: f64 = 3_000_000.0;

/// Market volatility above which the stock weight is trimmed
pub const DEFAULT_VOLATILITY_THRESHOLD: f64 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskProfile {
    Conservative,
    Moderate,
    Aggressive,
}

impl RiskProfile {
    pub fn from_score(score: f64) -> Self {
        if score >= 70.0 {
            RiskProfile::Aggressive
        } else if score >= 40.0 {
            RiskProfile::Moderate
        } else {
            RiskProfile::Conservative
        }
    }

    /// Upper bound on the stock weight for the profile
    pub fn max_stock_ratio(&self) -> f64 {
        match self {
            RiskProfile::Conservative => 0.25,
            RiskProfile::Moderate => 0.40,
            RiskProfile::Aggressive => 0.60,
        }
    }
}

/// Inputs to [`assess_risk_profile`]
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RiskProfileInputs {
    pub current_age: u32,
    pub monthly_income: f64,
    pub total_assets: f64,
    pub annual_income: f64,
    /// Optional self-reported score on a 0-100 scale
    #[serde(default)]
    pub questionnaire_score: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub risk_score: f64,
    pub risk_profile: RiskProfile,
    pub max_stock_ratio: f64,
    pub age_factor: f64,
    pub income_stability: f64,
    pub asset_ratio: f64,
}

/// Score risk capacity
///
/// Age contributes `40 * (65 - age) / 30` points, floored at zero from 65 and
/// not capped, so savers under 35 score above 40 here. Income stability adds
/// up to 30 and assets relative to annual income up to 30 (full at 10x).
pub fn assess_risk_profile(inputs: &RiskProfileInputs) -> Result<RiskAssessment> {
    ensure_non_negative("monthly_income", inputs.monthly_income)?;
    ensure_non_negative("total_assets", inputs.total_assets)?;
    ensure_non_negative("annual_income", inputs.annual_income)?;
    if let Some(q) = inputs.questionnaire_score {
        ensure_in_range("questionnaire_score", q, 0.0, 100.0)?;
    }

    let age_factor = ((65.0 - inputs.current_age as f64) / 30.0).max(0.0);
    let income_stability = if inputs.monthly_income > STABLE_MONTHLY_INCOME {
        1.0
    } else {
        0.7
    };
    let asset_ratio = inputs.total_assets / inputs.annual_income.max(1.0);

    let mut risk_score = age_factor * 40.0 + income_stability * 30.0 + (asset_ratio / 10.0).min(1.0) * 30.0;
    if let Some(q) = inputs.questionnaire_score {
        risk_score = (risk_score + q) / 2.0;
    }

    let risk_profile = RiskProfile::from_score(risk_score);

    Ok(RiskAssessment {
        risk_score,
        risk_profile,
        max_stock_ratio: risk_profile.max_stock_ratio(),
        age_factor,
        income_stability,
        asset_ratio,
    })
}

/// Reference allocation for a risk profile
#[derive(Debug, Clone, Serialize)]
pub struct ModelPortfolio {
    pub risk_profile: RiskProfile,
    pub allocation: PortfolioAllocation,
    pub expected_return: f64,
    pub volatility: f64,
}

impl ModelPortfolio {
    pub fn for_profile(risk_profile: RiskProfile) -> Self {
        let (table, expected_return, volatility): (&[(&str, f64)], f64, f64) = match risk_profile {
            RiskProfile::Conservative => (
                &[("stocks", 0.20), ("bonds", 0.55), ("cash", 0.10), ("alternatives", 0.15)],
                0.045,
                0.08,
            ),
            RiskProfile::Moderate => (
                &[("stocks", 0.35), ("bonds", 0.40), ("cash", 0.10), ("alternatives", 0.15)],
                0.065,
                0.12,
            ),
            RiskProfile::Aggressive => (
                &[("stocks", 0.50), ("bonds", 0.30), ("cash", 0.05), ("alternatives", 0.15)],
                0.085,
                0.18,
            ),
        };

        Self {
            risk_profile,
            allocation: PortfolioAllocation::from_table(table),
            expected_return,
            volatility,
        }
    }
}

/// Share of a model portfolio held inside one account
///
/// Weights are fractions of the whole model portfolio, not of the account.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccountSleeve {
    pub account: SavingsAccount,
    pub stocks: f64,
    pub bonds: f64,
    pub cash: f64,
    pub alternatives: f64,
}

impl ModelPortfolio {
    /// Place the model's stocks and bonds across accounts
    ///
    /// IRP holds 60% of the stock weight and 40% of the bond weight, pension
    /// savings the reverse. The general account carries the full model.
    pub fn account_sleeves(&self) -> Vec<AccountSleeve> {
        let weight = |asset: &str| self.allocation.get(asset).unwrap_or(0.0);
        let (stocks, bonds) = (weight("stocks"), weight("bonds"));

        vec![
            AccountSleeve {
                account: SavingsAccount::Irp,
                stocks: stocks * 0.6,
                bonds: bonds * 0.4,
                cash: 0.0,
                alternatives: 0.0,
            },
            AccountSleeve {
                account: SavingsAccount::PensionSavings,
                stocks: stocks * 0.4,
                bonds: bonds * 0.6,
                cash: 0.0,
                alternatives: 0.0,
            },
            AccountSleeve {
                account: SavingsAccount::General,
                stocks,
                bonds,
                cash: weight("cash"),
                alternatives: weight("alternatives"),
            },
        ]
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VolatilityAdjustment {
    pub original: PortfolioAllocation,
    pub adjusted: PortfolioAllocation,
    pub market_volatility: f64,
    /// True when the threshold was exceeded
    pub is_adjusted: bool,
    pub stocks_change: f64,
    pub bonds_change: f64,
    pub cash_change: f64,
}

/// Trim stocks in a high-volatility market
///
/// Above `threshold` the stock weight drops by `min(0.05, stocks * 0.1)`;
/// 60% of the reduction moves to bonds and 40% to cash.
pub fn adjust_for_volatility(
    base: &PortfolioAllocation,
    market_volatility: f64,
    threshold: f64,
) -> Result<VolatilityAdjustment> {
    ensure_finite("market_volatility", market_volatility)?;
    ensure_non_negative("volatility_threshold", threshold)?;

    let stocks = base.get("stocks").unwrap_or(0.0);
    let bonds = base.get("bonds").unwrap_or(0.0);
    let cash = base.get("cash").unwrap_or(0.0);

    let mut adjusted = base.clone();
    let is_adjusted = market_volatility > threshold;
    if is_adjusted {
        let reduction = (stocks * 0.1).min(0.05);
        adjusted.set("stocks", stocks - reduction);
        adjusted.set("bonds", bonds + reduction * 0.6);
        adjusted.set("cash", cash + reduction * 0.4);
        log::debug!(
            "market volatility {:.4} above {:.4}: stocks reduced by {:.4}",
            market_volatility,
            threshold,
            reduction
        );
    }

    Ok(VolatilityAdjustment {
        stocks_change: adjusted.get("stocks").unwrap_or(0.0) - stocks,
        bonds_change: adjusted.get("bonds").unwrap_or(0.0) - bonds,
        cash_change: adjusted.get("cash").unwrap_or(0.0) - cash,
        original: base.clone(),
        adjusted,
        market_volatility,
        is_adjusted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_young_wealthy_saver_is_aggressive() {
        let inputs = RiskProfileInputs {
            current_age: 35,
            monthly_income: 5_000_000.0,
            total_assets: 600_000_000.0,
            annual_income: 60_000_000.0,
            questionnaire_score: None,
        };
        let a = assess_risk_profile(&inputs).unwrap();
        assert_relative_eq!(a.age_factor, 1.0);
        assert_relative_eq!(a.risk_score, 100.0);
        assert_eq!(a.risk_profile, RiskProfile::Aggressive);
        assert_relative_eq!(a.max_stock_ratio, 0.60);
    }

    #[test]
    fn test_age_factor_is_uncapped_below_35() {
        let inputs = RiskProfileInputs {
            current_age: 25,
            monthly_income: 2_000_000.0,
            total_assets: 0.0,
            annual_income: 30_000_000.0,
            questionnaire_score: None,
        };
        let a = assess_risk_profile(&inputs).unwrap();
        assert_relative_eq!(a.age_factor, 40.0 / 30.0, epsilon = 1e-12);
        // 53.33 from age plus 21 from income
        assert_relative_eq!(a.risk_score, 40.0 / 30.0 * 40.0 + 21.0, epsilon = 1e-9);
        assert_eq!(a.risk_profile, RiskProfile::Aggressive);
    }

    #[test]
    fn test_questionnaire_is_averaged() {
        let inputs = RiskProfileInputs {
            current_age: 50,
            monthly_income: 2_000_000.0,
            total_assets: 100_000_000.0,
            annual_income: 50_000_000.0,
            questionnaire_score: Some(65.0),
        };
        // 0.5 * 40 + 0.7 * 30 + 0.2 * 30 = 47, averaged with 65
        let a = assess_risk_profile(&inputs).unwrap();
        assert_relative_eq!(a.risk_score, 56.0, epsilon = 1e-9);
        assert_eq!(a.risk_profile, RiskProfile::Moderate);
    }

    #[test]
    fn test_retiree_is_conservative() {
        let inputs = RiskProfileInputs {
            current_age: 70,
            monthly_income: 1_000_000.0,
            total_assets: 0.0,
            annual_income: 0.0,
            questionnaire_score: None,
        };
        let a = assess_risk_profile(&inputs).unwrap();
        assert_eq!(a.age_factor, 0.0);
        assert_eq!(a.risk_profile, RiskProfile::Conservative);
    }

    #[test]
    fn test_model_portfolios_sum_to_one() {
        for profile in [RiskProfile::Conservative, RiskProfile::Moderate, RiskProfile::Aggressive] {
            let model = ModelPortfolio::for_profile(profile);
            assert_relative_eq!(model.allocation.total(), 1.0, epsilon = 1e-12);
            assert!(model.allocation.get("stocks").unwrap() <= profile.max_stock_ratio());
        }
    }

    #[test]
    fn test_account_sleeves_split_stocks_and_bonds() {
        let sleeves = ModelPortfolio::for_profile(RiskProfile::Moderate).account_sleeves();
        assert_eq!(sleeves.len(), 3);

        let irp = sleeves.iter().find(|s| s.account == SavingsAccount::Irp).unwrap();
        assert_relative_eq!(irp.stocks, 0.35 * 0.6, epsilon = 1e-12);
        assert_relative_eq!(irp.bonds, 0.40 * 0.4, epsilon = 1e-12);
        assert_eq!(irp.cash, 0.0);

        let pension = sleeves.iter().find(|s| s.account == SavingsAccount::PensionSavings).unwrap();
        assert_relative_eq!(pension.stocks, 0.35 * 0.4, epsilon = 1e-12);
        assert_relative_eq!(pension.bonds, 0.40 * 0.6, epsilon = 1e-12);

        let general = sleeves.iter().find(|s| s.account == SavingsAccount::General).unwrap();
        assert_relative_eq!(general.stocks + general.bonds + general.cash + general.alternatives, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_high_volatility_trims_stocks() {
        let base = ModelPortfolio::for_profile(RiskProfile::Moderate).allocation;
        let adj = adjust_for_volatility(&base, 0.025, DEFAULT_VOLATILITY_THRESHOLD).unwrap();

        assert!(adj.is_adjusted);
        // min(0.05, 0.035)
        assert_relative_eq!(adj.stocks_change, -0.035, epsilon = 1e-12);
        assert_relative_eq!(adj.bonds_change, 0.021, epsilon = 1e-12);
        assert_relative_eq!(adj.cash_change, 0.014, epsilon = 1e-12);
        assert_relative_eq!(adj.adjusted.total(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_calm_market_keeps_base() {
        let base = ModelPortfolio::for_profile(RiskProfile::Aggressive).allocation;
        let adj = adjust_for_volatility(&base, 0.015, DEFAULT_VOLATILITY_THRESHOLD).unwrap();
        assert!(!adj.is_adjusted);
        assert_eq!(adj.adjusted, base);
    }
}
