//! Three-bucket decumulation plan
//!
//! Bucket 1 holds `bucket1_years` of expenses in cash, bucket 2 holds
//! `bucket2_years` in bonds, and bucket 3 takes the remainder for growth.
//! The three amounts always sum to the total portfolio; bucket 3 goes
//! negative when the first two buckets exceed it.

use serde::{Deserialize, Serialize};

use crate::config::BucketSettings;
use crate::error::{ensure_non_negative, CalculationStatus, DegradedReason, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    VeryLow,
    Low,
    High,
}

/// One bucket of the plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    pub name: String,
    pub amount: f64,
    /// Amount over total portfolio (0 for an empty portfolio)
    pub ratio: f64,
    pub purpose: String,
    pub risk_level: RiskLevel,
    pub expected_return: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketPlan {
    pub total_portfolio: f64,
    pub annual_expenses: f64,
    pub bucket1_cash: f64,
    pub bucket2_bonds: f64,
    pub bucket3_growth: f64,
    pub bucket1_ratio: f64,
    pub bucket2_ratio: f64,
    pub bucket3_ratio: f64,
    pub buckets: Vec<Bucket>,
    /// Ratio-weighted expected return of the buckets
    pub expected_portfolio_return: f64,
    pub status: CalculationStatus,
}

/// Split `total_portfolio` into cash, bond and growth buckets
pub fn bucket_strategy(total_portfolio: f64, annual_expenses: f64, settings: &BucketSettings) -> Result<BucketPlan> {
    ensure_non_negative("total_portfolio", total_portfolio)?;
    ensure_non_negative("annual_expenses", annual_expenses)?;

    let bucket1 = annual_expenses * settings.bucket1_years as f64;
    let bucket2 = annual_expenses * settings.bucket2_years as f64;
    let bucket3 = total_portfolio - bucket1 - bucket2;

    if bucket3 < 0.0 {
        log::warn!(
            "cash and bond buckets ({:.0}) exceed the portfolio ({:.0}); growth bucket is negative",
            bucket1 + bucket2,
            total_portfolio
        );
    }

    let (ratio, status) = if total_portfolio > 0.0 {
        (
            [bucket1 / total_portfolio, bucket2 / total_portfolio, bucket3 / total_portfolio],
            CalculationStatus::Nominal,
        )
    } else {
        (
            [0.0; 3],
            CalculationStatus::Degraded {
                reason: DegradedReason::ZeroDenominator,
            },
        )
    };

    let buckets = vec![
        Bucket {
            name: "cash".to_string(),
            amount: bucket1,
            ratio: ratio[0],
            purpose: format!("{} years of living expenses", settings.bucket1_years),
            risk_level: RiskLevel::VeryLow,
            expected_return: settings.cash_expected_return,
        },
        Bucket {
            name: "bonds".to_string(),
            amount: bucket2,
            ratio: ratio[1],
            purpose: format!("{} years of living expenses", settings.bucket2_years),
            risk_level: RiskLevel::Low,
            expected_return: settings.bonds_expected_return,
        },
        Bucket {
            name: "growth".to_string(),
            amount: bucket3,
            ratio: ratio[2],
            purpose: "long-term growth".to_string(),
            risk_level: RiskLevel::High,
            expected_return: settings.growth_expected_return,
        },
    ];

    let expected_portfolio_return = buckets.iter().map(|b| b.ratio * b.expected_return).sum();

    Ok(BucketPlan {
        total_portfolio,
        annual_expenses,
        bucket1_cash: bucket1,
        bucket2_bonds: bucket2,
        bucket3_growth: bucket3,
        bucket1_ratio: ratio[0],
        bucket2_ratio: ratio[1],
        bucket3_ratio: ratio[2],
        buckets,
        expected_portfolio_return,
        status,
    })
}
