//! Structure of the assets available at retirement

use serde::{Deserialize, Serialize};

use crate::error::{ensure_non_negative, CalculationStatus, DegradedReason, Result};

/// Percentage share held by each class under a perfectly even split
const EVEN_SHARE_PCT: f64 = 33.33;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Liquidity {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxTreatment {
    Taxable,
    TaxDeferred,
    CapitalGains,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetStructureFlag {
    /// Liquid share below 20%
    LowLiquidity,
    /// Liquid share above 50%
    HighLiquidity,
    /// Pension share below 10%
    LowPensionShare,
    /// Real estate share above 70%
    RealEstateConcentration,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RetirementAssets {
    pub liquid_assets: f64,
    pub pension_assets: f64,
    pub real_estate: f64,
}

impl RetirementAssets {
    pub fn total(&self) -> f64 {
        self.liquid_assets + self.pension_assets + self.real_estate
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssetClassBreakdown {
    pub amount: f64,
    pub percentage: f64,
    pub liquidity: Liquidity,
    pub tax_treatment: TaxTreatment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetStructureAnalysis {
    pub total_assets: f64,
    pub liquid_assets: AssetClassBreakdown,
    pub pension_assets: AssetClassBreakdown,
    pub real_estate: AssetClassBreakdown,
    /// Liquid share in percent
    pub liquidity_ratio: f64,
    /// 100 for an even three-way split, falling 2 points per point of concentration
    pub diversification_score: f64,
    pub flags: Vec<AssetStructureFlag>,
    pub status: CalculationStatus,
}

/// Break down liquid, pension and real estate holdings
///
/// An empty balance sheet yields zero percentages, a zero score, no flags
/// and a degraded status.
pub fn analyze_retirement_assets(assets: &RetirementAssets) -> Result<AssetStructureAnalysis> {
    ensure_non_negative("liquid_assets", assets.liquid_assets)?;
    ensure_non_negative("pension_assets", assets.pension_assets)?;
    ensure_non_negative("real_estate", assets.real_estate)?;

    let total = assets.total();
    let pct = |amount: f64| if total > 0.0 { amount / total * 100.0 } else { 0.0 };

    let liquid = AssetClassBreakdown {
        amount: assets.liquid_assets,
        percentage: pct(assets.liquid_assets),
        liquidity: Liquidity::High,
        tax_treatment: TaxTreatment::Taxable,
    };
    let pension = AssetClassBreakdown {
        amount: assets.pension_assets,
        percentage: pct(assets.pension_assets),
        liquidity: Liquidity::Medium,
        tax_treatment: TaxTreatment::TaxDeferred,
    };
    let real_estate = AssetClassBreakdown {
        amount: assets.real_estate,
        percentage: pct(assets.real_estate),
        liquidity: Liquidity::Low,
        tax_treatment: TaxTreatment::CapitalGains,
    };

    if total == 0.0 {
        return Ok(AssetStructureAnalysis {
            total_assets: 0.0,
            liquid_assets: liquid,
            pension_assets: pension,
            real_estate,
            liquidity_ratio: 0.0,
            diversification_score: 0.0,
            flags: Vec::new(),
            status: CalculationStatus::Degraded {
                reason: DegradedReason::ZeroDenominator,
            },
        });
    }

    let max_pct = liquid.percentage.max(pension.percentage).max(real_estate.percentage);
    let diversification_score = (100.0 - (max_pct - EVEN_SHARE_PCT) * 2.0).clamp(0.0, 100.0);

    let mut flags = Vec::new();
    if liquid.percentage < 20.0 {
        flags.push(AssetStructureFlag::LowLiquidity);
    } else if liquid.percentage > 50.0 {
        flags.push(AssetStructureFlag::HighLiquidity);
    }
    if pension.percentage < 10.0 {
        flags.push(AssetStructureFlag::LowPensionShare);
    }
    if real_estate.percentage > 70.0 {
        flags.push(AssetStructureFlag::RealEstateConcentration);
    }

    Ok(AssetStructureAnalysis {
        total_assets: total,
        liquidity_ratio: liquid.percentage,
        liquid_assets: liquid,
        pension_assets: pension,
        real_estate,
        diversification_score,
        flags,
        status: CalculationStatus::Nominal,
    })
}
