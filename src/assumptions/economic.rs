//! Economic scenario assumptions (inflation, returns, wage growth)

use serde::{Deserialize, Serialize};

use crate::error::{ensure_in_range, EngineError, Result};

/// Built-in economic scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioType {
    Conservative,
    Moderate,
    Aggressive,
}

impl ScenarioType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioType::Conservative => "conservative",
            ScenarioType::Moderate => "moderate",
            ScenarioType::Aggressive => "aggressive",
        }
    }
}

impl std::str::FromStr for ScenarioType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "conservative" => Ok(ScenarioType::Conservative),
            "moderate" => Ok(ScenarioType::Moderate),
            "aggressive" => Ok(ScenarioType::Aggressive),
            other => Err(EngineError::invalid(
                "scenario_type",
                format!("unknown scenario `{}`", other),
            )),
        }
    }
}

/// Annual economic rates used across the planning calculators
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EconomicAssumptions {
    pub inflation_rate: f64,
    /// Expected return while accumulating
    pub pre_retirement_return: f64,
    /// Expected return while decumulating (never above the pre-retirement return)
    pub post_retirement_return: f64,
    pub wage_growth_rate: f64,
}

/// Optional per-field overrides applied on top of a preset
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AssumptionOverrides {
    pub inflation_rate: Option<f64>,
    pub pre_retirement_return: Option<f64>,
    pub post_retirement_return: Option<f64>,
    pub wage_growth_rate: Option<f64>,
}

impl EconomicAssumptions {
    /// Construct and validate
    pub fn new(
        inflation_rate: f64,
        pre_retirement_return: f64,
        post_retirement_return: f64,
        wage_growth_rate: f64,
    ) -> Result<Self> {
        let assumptions = Self {
            inflation_rate,
            pre_retirement_return,
            post_retirement_return,
            wage_growth_rate,
        };
        assumptions.validate()?;
        Ok(assumptions)
    }

    /// Preset values for a scenario
    pub fn preset(scenario: ScenarioType) -> Self {
        match scenario {
            ScenarioType::Conservative => Self {
                inflation_rate: 0.020,
                pre_retirement_return: 0.025,
                post_retirement_return: 0.015,
                wage_growth_rate: 0.030,
            },
            ScenarioType::Moderate => Self {
                inflation_rate: 0.025,
                pre_retirement_return: 0.040,
                post_retirement_return: 0.025,
                wage_growth_rate: 0.040,
            },
            ScenarioType::Aggressive => Self {
                inflation_rate: 0.030,
                pre_retirement_return: 0.055,
                post_retirement_return: 0.035,
                wage_growth_rate: 0.050,
            },
        }
    }

    /// Apply custom values over this set, then re-validate
    pub fn with_overrides(self, overrides: AssumptionOverrides) -> Result<Self> {
        let updated = Self {
            inflation_rate: overrides.inflation_rate.unwrap_or(self.inflation_rate),
            pre_retirement_return: overrides
                .pre_retirement_return
                .unwrap_or(self.pre_retirement_return),
            post_retirement_return: overrides
                .post_retirement_return
                .unwrap_or(self.post_retirement_return),
            wage_growth_rate: overrides.wage_growth_rate.unwrap_or(self.wage_growth_rate),
        };
        updated.validate()?;
        Ok(updated)
    }

    /// Inflation and wage growth in [0, 0.2]; returns in [0, 0.3]; post <= pre
    pub fn validate(&self) -> Result<()> {
        ensure_in_range("inflation_rate", self.inflation_rate, 0.0, 0.2)?;
        ensure_in_range("pre_retirement_return", self.pre_retirement_return, 0.0, 0.3)?;
        ensure_in_range("post_retirement_return", self.post_retirement_return, 0.0, 0.3)?;
        ensure_in_range("wage_growth_rate", self.wage_growth_rate, 0.0, 0.2)?;

        if self.post_retirement_return > self.pre_retirement_return {
            return Err(EngineError::invalid(
                "post_retirement_return",
                format!(
                    "must not exceed pre_retirement_return ({} > {})",
                    self.post_retirement_return, self.pre_retirement_return
                ),
            ));
        }
        Ok(())
    }
}

impl Default for EconomicAssumptions {
    fn default() -> Self {
        Self::preset(ScenarioType::Moderate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        for scenario in [ScenarioType::Conservative, ScenarioType::Moderate, ScenarioType::Aggressive] {
            let preset = EconomicAssumptions::preset(scenario);
            assert!(preset.validate().is_ok(), "{:?} preset invalid", scenario);
        }
    }

    #[test]
    fn test_post_return_cannot_exceed_pre() {
        let result = EconomicAssumptions::new(0.02, 0.03, 0.04, 0.03);
        assert!(result.is_err());
    }

    #[test]
    fn test_overrides_revalidate() {
        let base = EconomicAssumptions::preset(ScenarioType::Moderate);

        let custom = base
            .with_overrides(AssumptionOverrides {
                inflation_rate: Some(0.03),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(custom.inflation_rate, 0.03);
        assert_eq!(custom.pre_retirement_return, 0.040);

        let broken = base.with_overrides(AssumptionOverrides {
            pre_retirement_return: Some(0.35),
            ..Default::default()
        });
        assert!(broken.is_err());
    }

    #[test]
    fn test_scenario_parse() {
        assert_eq!("aggressive".parse::<ScenarioType>().unwrap(), ScenarioType::Aggressive);
        assert!("reckless".parse::<ScenarioType>().is_err());
    }
}
