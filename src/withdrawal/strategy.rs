//! Withdrawal strategy record

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ensure_in_range, EngineError, Result};

pub const MIN_WITHDRAWAL_RATE: f64 = 0.01;
pub const MAX_WITHDRAWAL_RATE: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WithdrawalMethod {
    #[default]
    Fixed,
    Variable,
    InflationAdjusted,
}

impl WithdrawalMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            WithdrawalMethod::Fixed => "fixed",
            WithdrawalMethod::Variable => "variable",
            WithdrawalMethod::InflationAdjusted => "inflation_adjusted",
        }
    }
}

impl fmt::Display for WithdrawalMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WithdrawalMethod {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixed" => Ok(WithdrawalMethod::Fixed),
            "variable" => Ok(WithdrawalMethod::Variable),
            "inflation_adjusted" => Ok(WithdrawalMethod::InflationAdjusted),
            other => Err(EngineError::invalid(
                "withdrawal_method",
                format!("unknown method `{}` (expected fixed, variable or inflation_adjusted)", other),
            )),
        }
    }
}

fn default_true() -> bool {
    true
}

/// How a retiree intends to draw down the portfolio
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalStrategy {
    /// Initial annual rate, in [0.01, 0.1]
    pub withdrawal_rate: f64,
    #[serde(default)]
    pub withdrawal_method: WithdrawalMethod,
    /// Sequence withdrawals across accounts for tax
    #[serde(default = "default_true")]
    pub tax_optimization: bool,
    /// Hold expenses in a three-bucket plan
    #[serde(default = "default_true")]
    pub bucket_strategy: bool,
}

impl WithdrawalStrategy {
    pub fn new(withdrawal_rate: f64, withdrawal_method: WithdrawalMethod) -> Result<Self> {
        let strategy = Self {
            withdrawal_rate,
            withdrawal_method,
            tax_optimization: true,
            bucket_strategy: true,
        };
        strategy.validate()?;
        Ok(strategy)
    }

    pub fn with_tax_optimization(mut self, enabled: bool) -> Self {
        self.tax_optimization = enabled;
        self
    }

    pub fn with_bucket_strategy(mut self, enabled: bool) -> Self {
        self.bucket_strategy = enabled;
        self
    }

    pub fn validate(&self) -> Result<()> {
        ensure_in_range("withdrawal_rate", self.withdrawal_rate, MIN_WITHDRAWAL_RATE, MAX_WITHDRAWAL_RATE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_bounds() {
        assert!(WithdrawalStrategy::new(0.04, WithdrawalMethod::Fixed).is_ok());
        assert!(WithdrawalStrategy::new(0.005, WithdrawalMethod::Fixed).is_err());
        assert!(WithdrawalStrategy::new(0.11, WithdrawalMethod::Variable).is_err());
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!("inflation_adjusted".parse::<WithdrawalMethod>().unwrap(), WithdrawalMethod::InflationAdjusted);
        assert_eq!(" Fixed ".parse::<WithdrawalMethod>().unwrap(), WithdrawalMethod::Fixed);
        assert!("monthly".parse::<WithdrawalMethod>().is_err());
        assert_eq!(WithdrawalMethod::Variable.to_string(), "variable");
    }

    #[test]
    fn test_deserialize_defaults() {
        let s: WithdrawalStrategy = serde_json::from_str(r#"{"withdrawal_rate":0.035}"#).unwrap();
        assert_eq!(s.withdrawal_method, WithdrawalMethod::Fixed);
        assert!(s.tax_optimization);
        assert!(s.bucket_strategy);
    }
}
