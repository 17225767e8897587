//! Guardrail adjustment of the withdrawal rate

use serde::{Deserialize, Serialize};

use crate::config::GuardrailSettings;
use crate::error::{ensure_non_negative, EngineError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardrailAction {
    Increase,
    Decrease,
    Hold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardrailStatus {
    /// Deviation beyond the band
    Active,
    Normal,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GuardrailInputs {
    pub current_portfolio_value: f64,
    pub target_portfolio_value: f64,
    pub current_withdrawal_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GuardrailDecision {
    /// (current - target) / target
    pub portfolio_performance: f64,
    pub current_withdrawal_rate: f64,
    pub adjusted_withdrawal_rate: f64,
    pub adjustment_factor: f64,
    pub action: GuardrailAction,
    pub guardrail_status: GuardrailStatus,
}

/// Scale the withdrawal rate when the portfolio leaves the guardrail band
///
/// Comparisons are strict: a deviation exactly at the threshold holds.
pub fn apply_guardrail(inputs: &GuardrailInputs, settings: &GuardrailSettings) -> Result<GuardrailDecision> {
    ensure_non_negative("current_portfolio_value", inputs.current_portfolio_value)?;
    ensure_non_negative("target_portfolio_value", inputs.target_portfolio_value)?;
    ensure_non_negative("current_withdrawal_rate", inputs.current_withdrawal_rate)?;
    ensure_non_negative("guardrail_threshold", settings.threshold)?;
    if inputs.target_portfolio_value == 0.0 {
        return Err(EngineError::invalid("target_portfolio_value", "must be > 0"));
    }

    let performance =
        (inputs.current_portfolio_value - inputs.target_portfolio_value) / inputs.target_portfolio_value;

    let (action, factor) = if performance > settings.threshold {
        (GuardrailAction::Increase, settings.increase_factor)
    } else if performance < -settings.threshold {
        (GuardrailAction::Decrease, settings.decrease_factor)
    } else {
        (GuardrailAction::Hold, 1.0)
    };

    let guardrail_status = if performance.abs() > settings.threshold {
        GuardrailStatus::Active
    } else {
        GuardrailStatus::Normal
    };

    log::debug!("guardrail: performance {:.4}, action {:?}", performance, action);

    Ok(GuardrailDecision {
        portfolio_performance: performance,
        current_withdrawal_rate: inputs.current_withdrawal_rate,
        adjusted_withdrawal_rate: inputs.current_withdrawal_rate * factor,
        adjustment_factor: factor,
        action,
        guardrail_status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn decide(current: f64, target: f64) -> GuardrailDecision {
        let inputs = GuardrailInputs {
            current_portfolio_value: current,
            target_portfolio_value: target,
            current_withdrawal_rate: 0.04,
        };
        apply_guardrail(&inputs, &GuardrailSettings::default()).unwrap()
    }

    #[test]
    fn test_ahead_of_target_increases() {
        let d = decide(1_250.0, 1_000.0);
        assert_relative_eq!(d.portfolio_performance, 0.25);
        assert_eq!(d.action, GuardrailAction::Increase);
        assert_relative_eq!(d.adjusted_withdrawal_rate, 0.044, epsilon = 1e-12);
        assert_eq!(d.guardrail_status, GuardrailStatus::Active);
    }

    #[test]
    fn test_behind_target_decreases() {
        let d = decide(750.0, 1_000.0);
        assert_eq!(d.action, GuardrailAction::Decrease);
        assert_relative_eq!(d.adjusted_withdrawal_rate, 0.036, epsilon = 1e-12);
    }

    #[test]
    fn test_inside_band_holds() {
        let d = decide(1_050.0, 1_000.0);
        assert_eq!(d.action, GuardrailAction::Hold);
        assert_eq!(d.adjusted_withdrawal_rate, 0.04);
        assert_eq!(d.guardrail_status, GuardrailStatus::Normal);
    }

    #[test]
    fn test_exactly_at_threshold_holds() {
        assert_eq!(decide(1_200.0, 1_000.0).action, GuardrailAction::Hold);
        assert_eq!(decide(800.0, 1_000.0).action, GuardrailAction::Hold);
    }

    #[test]
    fn test_zero_target_rejected() {
        let inputs = GuardrailInputs {
            current_portfolio_value: 100.0,
            target_portfolio_value: 0.0,
            current_withdrawal_rate: 0.04,
        };
        assert!(apply_guardrail(&inputs, &GuardrailSettings::default()).is_err());
    }
}
