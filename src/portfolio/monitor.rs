//! Performance review against a benchmark and market regime classification

use serde::{Deserialize, Serialize};

use super::metrics::{calculate_portfolio_metrics, population_std, PortfolioMetrics};
use crate::error::{EngineError, Result};

/// Mean per-series volatility above which the market is treated as volatile
pub const HIGH_VOLATILITY_THRESHOLD: f64 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceRating {
    Excellent,
    Good,
    Fair,
    NeedsImprovement,
}

impl PerformanceRating {
    pub fn from_metrics(metrics: &PortfolioMetrics) -> Self {
        let sharpe = metrics.sharpe_ratio;
        let drawdown = metrics.max_drawdown.abs();

        if sharpe > 1.0 && drawdown < 0.1 {
            PerformanceRating::Excellent
        } else if sharpe > 0.5 && drawdown < 0.2 {
            PerformanceRating::Good
        } else if sharpe > 0.0 && drawdown < 0.3 {
            PerformanceRating::Fair
        } else {
            PerformanceRating::NeedsImprovement
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkComparison {
    pub benchmark: PortfolioMetrics,
    /// Portfolio mean return minus benchmark mean return
    pub excess_return: f64,
    /// Absolute difference in volatility
    pub tracking_error: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub portfolio: PortfolioMetrics,
    /// Present only when the benchmark series has the same length
    pub benchmark: Option<BenchmarkComparison>,
    pub rating: PerformanceRating,
}

/// Evaluate a return series, optionally against a benchmark of equal length
pub fn monitor_performance(
    portfolio_returns: &[f64],
    benchmark_returns: Option<&[f64]>,
    risk_free_rate: f64,
) -> Result<PerformanceReport> {
    let portfolio = calculate_portfolio_metrics(portfolio_returns, risk_free_rate)?;

    let benchmark = match benchmark_returns {
        Some(bench) if bench.len() == portfolio_returns.len() => {
            let metrics = calculate_portfolio_metrics(bench, risk_free_rate)?;
            Some(BenchmarkComparison {
                excess_return: portfolio.mean_return - metrics.mean_return,
                tracking_error: (portfolio.volatility - metrics.volatility).abs(),
                benchmark: metrics,
            })
        }
        Some(bench) => {
            log::debug!(
                "benchmark length {} differs from portfolio length {}; skipping comparison",
                bench.len(),
                portfolio_returns.len()
            );
            None
        }
        None => None,
    };

    Ok(PerformanceReport {
        rating: PerformanceRating::from_metrics(&portfolio),
        portfolio,
        benchmark,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketRegime {
    pub average_volatility: f64,
    pub high_volatility: bool,
}

/// Classify the market from several return series (e.g. one per asset class)
pub fn market_regime<S: AsRef<[f64]>>(series: &[S]) -> Result<MarketRegime> {
    if series.is_empty() {
        return Err(EngineError::EmptyInput("market series"));
    }
    if series.iter().any(|s| s.as_ref().is_empty()) {
        return Err(EngineError::EmptyInput("market series returns"));
    }

    let average_volatility =
        series.iter().map(|s| population_std(s.as_ref())).sum::<f64>() / series.len() as f64;

    Ok(MarketRegime {
        average_volatility,
        high_volatility: average_volatility > HIGH_VOLATILITY_THRESHOLD,
    })
}
