//! Return, risk and drawdown statistics for a series of period returns

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_RISK_FREE_RATE;
use crate::error::{ensure_finite, CalculationStatus, DegradedReason, EngineError, Result};

/// Performance statistics of a return series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortfolioMetrics {
    pub mean_return: f64,
    /// Population standard deviation
    pub volatility: f64,
    /// 0 when volatility is 0
    pub sharpe_ratio: f64,
    /// Most negative peak-to-trough decline of the cumulative return index (<= 0)
    pub max_drawdown: f64,
    /// Uses the dispersion of negative returns only; 0 without downside dispersion
    pub sortino_ratio: f64,
    pub status: CalculationStatus,
}

/// Mean of a slice (caller guarantees non-empty)
pub(crate) fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divides by n)
pub(crate) fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Largest relative decline from a running peak of the compounded index
fn max_drawdown(returns: &[f64]) -> f64 {
    let mut index = 1.0;
    let mut peak = f64::MIN;
    let mut worst = 0.0_f64;

    for &r in returns {
        index *= 1.0 + r;
        peak = peak.max(index);
        let drawdown = (index - peak) / peak;
        worst = worst.min(drawdown);
    }

    worst
}

/// Calculate portfolio statistics
///
/// # Arguments
/// * `returns` - Period returns as decimals (e.g. 0.01 for 1%)
/// * `risk_free_rate` - Per-period risk-free rate on the same basis
pub fn calculate_portfolio_metrics(returns: &[f64], risk_free_rate: f64) -> Result<PortfolioMetrics> {
    if returns.is_empty() {
        return Err(EngineError::EmptyInput("returns"));
    }
    ensure_finite("risk_free_rate", risk_free_rate)?;
    for &r in returns {
        ensure_finite("returns", r)?;
        if r <= -1.0 {
            return Err(EngineError::invalid("returns", format!("period return {} is a total loss or worse", r)));
        }
    }

    let mean_return = mean(returns);
    let volatility = population_std(returns);
    let excess = mean_return - risk_free_rate;

    let (sharpe_ratio, status) = if volatility > 0.0 {
        (excess / volatility, CalculationStatus::Nominal)
    } else {
        (
            0.0,
            CalculationStatus::Degraded {
                reason: DegradedReason::ZeroVolatility,
            },
        )
    };

    let negative: Vec<f64> = returns.iter().copied().filter(|&r| r < 0.0).collect();
    let downside_deviation = population_std(&negative);
    let sortino_ratio = if downside_deviation > 0.0 {
        excess / downside_deviation
    } else {
        0.0
    };

    Ok(PortfolioMetrics {
        mean_return,
        volatility,
        sharpe_ratio,
        max_drawdown: max_drawdown(returns),
        sortino_ratio,
        status,
    })
}

/// [`calculate_portfolio_metrics`] with the default 2% risk-free rate
pub fn portfolio_metrics(returns: &[f64]) -> Result<PortfolioMetrics> {
    calculate_portfolio_metrics(returns, DEFAULT_RISK_FREE_RATE)
}
