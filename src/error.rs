//! Error and status types shared by every calculator
//!
//! Invalid inputs are returned as `Err(EngineError)`. Fallback answers
//! (equal-weight allocation, zero percentages) and unresolved withdrawal
//! shortfalls are successful results that carry a [`CalculationStatus`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result alias used throughout the engine
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors raised by input validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// A scalar input was outside its documented range
    #[error("invalid argument `{field}`: {reason}")]
    InvalidArgument {
        field: &'static str,
        reason: String,
    },

    /// Vector/matrix inputs disagree in shape
    #[error("dimension mismatch for {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A sequence that must contain data was empty
    #[error("empty input: {0}")]
    EmptyInput(&'static str),
}

/// Coarse error classification for callers that only branch on the kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    InvalidArgument,
}

impl EngineError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        EngineError::InvalidArgument {
            field,
            reason: reason.into(),
        }
    }

    /// Every validation failure is an invalid-argument failure; none are retryable
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidArgument
    }
}

/// Why a calculation returned a fallback instead of the nominal answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegradedReason {
    /// Iterative solver hit its iteration cap
    SolverNotConverged,
    /// Solver reported a numerical failure (non-finite values, bad problem)
    SolverFailed,
    /// A ratio's denominator was zero; the ratio was reported as 0
    ZeroDenominator,
    /// Return series had zero dispersion; risk-adjusted ratios are 0
    ZeroVolatility,
}

/// Outcome flag attached to every result record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CalculationStatus {
    Nominal,
    Degraded { reason: DegradedReason },
    Unresolved { remainder: f64 },
}

impl Default for CalculationStatus {
    fn default() -> Self {
        CalculationStatus::Nominal
    }
}

impl CalculationStatus {
    pub fn is_nominal(&self) -> bool {
        matches!(self, CalculationStatus::Nominal)
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, CalculationStatus::Degraded { .. })
    }

    /// Unmet amount, if the calculation could not satisfy the request
    pub fn unresolved_remainder(&self) -> Option<f64> {
        match self {
            CalculationStatus::Unresolved { remainder } => Some(*remainder),
            _ => None,
        }
    }
}

/// Reject NaN/infinite inputs
pub(crate) fn ensure_finite(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(EngineError::invalid(field, format!("must be finite, got {}", value)))
    }
}

/// Reject negative (or non-finite) inputs
pub(crate) fn ensure_non_negative(field: &'static str, value: f64) -> Result<()> {
    ensure_finite(field, value)?;
    if value < 0.0 {
        return Err(EngineError::invalid(field, format!("must be >= 0, got {}", value)));
    }
    Ok(())
}

/// Require `value` in the closed interval `[min, max]`
pub(crate) fn ensure_in_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<()> {
    ensure_finite(field, value)?;
    if value < min || value > max {
        return Err(EngineError::invalid(
            field,
            format!("must be in [{}, {}], got {}", min, max, value),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_checks() {
        assert!(ensure_in_range("rate", 0.05, 0.0, 0.3).is_ok());
        assert!(ensure_in_range("rate", 0.31, 0.0, 0.3).is_err());
        assert!(ensure_non_negative("amount", -1.0).is_err());
        assert!(ensure_finite("amount", f64::NAN).is_err());
    }

    #[test]
    fn test_error_message_names_field() {
        let err = EngineError::invalid("rate", "must be >= 0");
        assert_eq!(err.to_string(), "invalid argument `rate`: must be >= 0");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_status_serializes_with_tag() {
        let status = CalculationStatus::Unresolved { remainder: 22.0 };
        let json = serde_json::to_string(&status).unwrap();
        assert_eq!(json, r#"{"status":"unresolved","remainder":22.0}"#);
        assert_eq!(status.unresolved_remainder(), Some(22.0));

        let degraded = CalculationStatus::Degraded { reason: DegradedReason::SolverFailed };
        assert!(degraded.is_degraded());
        assert!(!degraded.is_nominal());
    }
}
