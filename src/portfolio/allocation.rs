//! Asset-class weight records

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::{ensure_in_range, ensure_non_negative, EngineError, Result};

/// Tolerance on the sum of weights
pub const WEIGHT_SUM_TOLERANCE: f64 = 0.01;

/// Default drift allowed before rebalancing
pub const DEFAULT_REBALANCING_THRESHOLD: f64 = 0.05;

/// Ordered asset class -> weight mapping
///
/// Weights lie in [0, 1] and sum to 1 within [`WEIGHT_SUM_TOLERANCE`].
/// Serializes as a JSON object in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioAllocation {
    weights: Vec<(String, f64)>,
}

impl PortfolioAllocation {
    /// Validate and build
    pub fn new(weights: Vec<(String, f64)>) -> Result<Self> {
        if weights.is_empty() {
            return Err(EngineError::EmptyInput("allocation weights"));
        }
        for (i, (name, weight)) in weights.iter().enumerate() {
            ensure_in_range("weight", *weight, 0.0, 1.0)?;
            if weights[..i].iter().any(|(other, _)| other == name) {
                return Err(EngineError::invalid("asset", format!("duplicate asset class `{}`", name)));
            }
        }

        let total: f64 = weights.iter().map(|(_, w)| w).sum();
        if (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(EngineError::invalid(
                "weights",
                format!("must sum to 1 (+/- {}), got {:.4}", WEIGHT_SUM_TOLERANCE, total),
            ));
        }

        Ok(Self { weights })
    }

    /// Equal weights across `assets` (caller guarantees non-empty, unique)
    pub(crate) fn equal_weight<S: AsRef<str>>(assets: &[S]) -> Self {
        let w = 1.0 / assets.len() as f64;
        Self {
            weights: assets.iter().map(|a| (a.as_ref().to_string(), w)).collect(),
        }
    }

    /// Build from solver output without re-validating (solver output is on the simplex)
    pub(crate) fn from_solution<S: AsRef<str>>(assets: &[S], weights: &[f64]) -> Self {
        Self {
            weights: assets
                .iter()
                .zip(weights)
                .map(|(a, &w)| (a.as_ref().to_string(), w))
                .collect(),
        }
    }

    /// Fixed table of weights known to be on the simplex
    pub(crate) fn from_table(table: &[(&str, f64)]) -> Self {
        Self {
            weights: table.iter().map(|(a, w)| (a.to_string(), *w)).collect(),
        }
    }

    /// Overwrite (or append) one weight; caller keeps the total at 1
    pub(crate) fn set(&mut self, asset: &str, weight: f64) {
        match self.weights.iter_mut().find(|(name, _)| name == asset) {
            Some((_, w)) => *w = weight,
            None => self.weights.push((asset.to_string(), weight)),
        }
    }

    pub fn get(&self, asset: &str) -> Option<f64> {
        self.weights.iter().find(|(name, _)| name == asset).map(|(_, w)| *w)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.weights.iter().map(|(name, w)| (name.as_str(), *w))
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.weights.iter().map(|(_, w)| w).sum()
    }

    /// True when any target weight drifts from `current` by more than `threshold`
    ///
    /// Asset classes missing from `current` count as weight 0.
    pub fn needs_rebalancing(&self, current: &PortfolioAllocation, threshold: f64) -> Result<bool> {
        ensure_non_negative("rebalancing_threshold", threshold)?;
        Ok(self
            .iter()
            .any(|(asset, target)| (current.get(asset).unwrap_or(0.0) - target).abs() > threshold))
    }
}

impl Serialize for PortfolioAllocation {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.weights.len()))?;
        for (name, weight) in &self.weights {
            map.serialize_entry(name, weight)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alloc(pairs: &[(&str, f64)]) -> Result<PortfolioAllocation> {
        PortfolioAllocation::new(pairs.iter().map(|(n, w)| (n.to_string(), *w)).collect())
    }

    #[test]
    fn test_weight_sum_tolerance() {
        assert!(alloc(&[("stocks", 0.6), ("bonds", 0.395)]).is_ok());
        assert!(alloc(&[("stocks", 0.6), ("bonds", 0.3)]).is_err());
        assert!(alloc(&[("stocks", 1.2), ("bonds", -0.2)]).is_err());
        assert!(alloc(&[("stocks", 0.5), ("stocks", 0.5)]).is_err());
    }

    #[test]
    fn test_serializes_in_order() {
        let a = alloc(&[("stocks", 0.5), ("bonds", 0.3), ("cash", 0.2)]).unwrap();
        let json = serde_json::to_string(&a).unwrap();
        assert_eq!(json, r#"{"stocks":0.5,"bonds":0.3,"cash":0.2}"#);
    }

    #[test]
    fn test_needs_rebalancing() {
        let target = alloc(&[("stocks", 0.5), ("bonds", 0.5)]).unwrap();
        let close = alloc(&[("stocks", 0.53), ("bonds", 0.47)]).unwrap();
        let drifted = alloc(&[("stocks", 0.58), ("bonds", 0.42)]).unwrap();

        assert!(!target.needs_rebalancing(&close, DEFAULT_REBALANCING_THRESHOLD).unwrap());
        assert!(target.needs_rebalancing(&drifted, DEFAULT_REBALANCING_THRESHOLD).unwrap());
    }
}
