//! Mean-variance allocation
//!
//! Maximizes `w.mu - lambda * w' Sigma w` over the budget simplex
//! (`sum w = 1`, `0 <= w <= 1`). The solver is pluggable through
//! [`ConstrainedSolver`]; the default is projected gradient ascent.
//!
//! Solver failures never surface as errors: the caller receives the
//! equal-weight allocation with a degraded status.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::allocation::PortfolioAllocation;
use crate::config::SolverSettings;
use crate::error::{ensure_in_range, CalculationStatus, DegradedReason, EngineError, Result};

/// Smooth objective to maximize
pub trait Objective {
    fn dimension(&self) -> usize;

    fn value(&self, weights: &[f64]) -> f64;

    /// Write the gradient at `weights` into `out`
    fn gradient(&self, weights: &[f64], out: &mut [f64]);

    /// Upper bound on the gradient's Lipschitz constant, if known
    fn smoothness(&self) -> Option<f64> {
        None
    }
}

/// Solver output
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub weights: Vec<f64>,
    pub objective: f64,
    pub iterations: u32,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverFailure {
    #[error("solver did not converge within {iterations} iterations")]
    NotConverged { iterations: u32 },

    #[error("numerical failure: {0}")]
    Numerical(String),
}

impl SolverFailure {
    fn degraded_reason(&self) -> DegradedReason {
        match self {
            SolverFailure::NotConverged { .. } => DegradedReason::SolverNotConverged,
            SolverFailure::Numerical(_) => DegradedReason::SolverFailed,
        }
    }
}

/// Maximizes an objective over the unit simplex `{w : sum w = 1, 0 <= w <= 1}`
pub trait ConstrainedSolver: Send + Sync {
    fn maximize(&self, objective: &dyn Objective, start: &[f64]) -> std::result::Result<Solution, SolverFailure>;
}

/// Euclidean projection onto the unit simplex (sort-based)
pub fn project_onto_simplex(v: &[f64]) -> Vec<f64> {
    let mut sorted = v.to_vec();
    sorted.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));

    let mut cumulative = 0.0;
    let mut theta = 0.0;
    for (j, &u) in sorted.iter().enumerate() {
        cumulative += u;
        let candidate = (cumulative - 1.0) / (j + 1) as f64;
        if u - candidate > 0.0 {
            theta = candidate;
        }
    }

    v.iter().map(|&x| (x - theta).max(0.0)).collect()
}

/// Projected gradient ascent with a fixed 1/L step
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectedGradientSolver {
    pub settings: SolverSettings,
}

impl ProjectedGradientSolver {
    pub fn new(settings: SolverSettings) -> Self {
        Self { settings }
    }
}

impl ConstrainedSolver for ProjectedGradientSolver {
    fn maximize(&self, objective: &dyn Objective, start: &[f64]) -> std::result::Result<Solution, SolverFailure> {
        let n = objective.dimension();
        if start.len() != n {
            return Err(SolverFailure::Numerical(format!(
                "start point has {} entries, objective has {}",
                start.len(),
                n
            )));
        }

        let step = match objective.smoothness() {
            Some(l) if l.is_finite() && l > 0.0 => 1.0 / l,
            Some(l) if !l.is_finite() => {
                return Err(SolverFailure::Numerical(format!("smoothness bound is {}", l)))
            }
            // Linear objective: any step reaches the optimal face
            _ => 1.0,
        };

        let mut weights = project_onto_simplex(start);
        let mut grad = vec![0.0; n];

        for iteration in 1..=self.settings.max_iterations {
            objective.gradient(&weights, &mut grad);
            if grad.iter().any(|g| !g.is_finite()) {
                return Err(SolverFailure::Numerical("non-finite gradient".to_string()));
            }

            let stepped: Vec<f64> = weights.iter().zip(&grad).map(|(w, g)| w + step * g).collect();
            let next = project_onto_simplex(&stepped);

            let movement = next
                .iter()
                .zip(&weights)
                .map(|(a, b)| (a - b).powi(2))
                .sum::<f64>()
                .sqrt();
            weights = next;

            if movement < self.settings.tolerance {
                let value = objective.value(&weights);
                if !value.is_finite() {
                    return Err(SolverFailure::Numerical("non-finite objective".to_string()));
                }
                return Ok(Solution {
                    weights,
                    objective: value,
                    iterations: iteration,
                });
            }
        }

        Err(SolverFailure::NotConverged {
            iterations: self.settings.max_iterations,
        })
    }
}

/// `w.mu - lambda * w' Sigma w`
pub struct MeanVarianceObjective<'a> {
    pub expected_returns: &'a [f64],
    pub covariance: &'a [Vec<f64>],
    pub risk_tolerance: f64,
}

impl MeanVarianceObjective<'_> {
    pub fn variance(&self, weights: &[f64]) -> f64 {
        self.covariance
            .iter()
            .zip(weights)
            .map(|(row, wi)| wi * row.iter().zip(weights).map(|(c, wj)| c * wj).sum::<f64>())
            .sum()
    }

    pub fn expected_return(&self, weights: &[f64]) -> f64 {
        self.expected_returns.iter().zip(weights).map(|(m, w)| m * w).sum()
    }
}

impl Objective for MeanVarianceObjective<'_> {
    fn dimension(&self) -> usize {
        self.expected_returns.len()
    }

    fn value(&self, weights: &[f64]) -> f64 {
        self.expected_return(weights) - self.risk_tolerance * self.variance(weights)
    }

    fn gradient(&self, weights: &[f64], out: &mut [f64]) {
        // d/dw (w' S w) = (S + S') w
        let n = weights.len();
        for i in 0..n {
            let mut quad = 0.0;
            for j in 0..n {
                quad += (self.covariance[i][j] + self.covariance[j][i]) * weights[j];
            }
            out[i] = self.expected_returns[i] - self.risk_tolerance * quad;
        }
    }

    fn smoothness(&self) -> Option<f64> {
        // Spectral norm of (S + S') is bounded by its max absolute row sum
        let n = self.covariance.len();
        let bound = (0..n)
            .map(|i| {
                (0..n)
                    .map(|j| (self.covariance[i][j] + self.covariance[j][i]).abs())
                    .sum::<f64>()
            })
            .fold(0.0_f64, |acc, row| {
                if acc.is_nan() || row.is_nan() {
                    f64::NAN
                } else {
                    acc.max(row)
                }
            });
        Some(self.risk_tolerance * bound)
    }
}

/// Inputs for [`optimize_allocation`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationRequest {
    /// Asset class names, in output order
    pub assets: Vec<String>,
    /// Expected return per asset, aligned with `assets`
    pub expected_returns: Vec<f64>,
    /// Square covariance matrix aligned with `assets`
    pub covariance: Vec<Vec<f64>>,
    /// Variance penalty in [0, 1]
    pub risk_tolerance: f64,
}

impl AllocationRequest {
    /// Shape and range validation
    pub fn validate(&self) -> Result<()> {
        let n = self.assets.len();
        if n == 0 {
            return Err(EngineError::EmptyInput("assets"));
        }
        for (i, name) in self.assets.iter().enumerate() {
            if self.assets[..i].contains(name) {
                return Err(EngineError::invalid("assets", format!("duplicate asset class `{}`", name)));
            }
        }
        if self.expected_returns.len() != n {
            return Err(EngineError::DimensionMismatch {
                what: "expected_returns",
                expected: n,
                actual: self.expected_returns.len(),
            });
        }
        if self.covariance.len() != n {
            return Err(EngineError::DimensionMismatch {
                what: "covariance rows",
                expected: n,
                actual: self.covariance.len(),
            });
        }
        if let Some(row) = self.covariance.iter().find(|row| row.len() != n) {
            return Err(EngineError::DimensionMismatch {
                what: "covariance columns",
                expected: n,
                actual: row.len(),
            });
        }
        ensure_in_range("risk_tolerance", self.risk_tolerance, 0.0, 1.0)
    }
}

/// Optimizer output
#[derive(Debug, Clone, Serialize)]
pub struct OptimizedAllocation {
    pub allocation: PortfolioAllocation,
    pub expected_return: f64,
    pub variance: f64,
    pub iterations: u32,
    pub status: CalculationStatus,
}

/// Solve for mean-variance weights with the given solver
pub fn optimize_allocation_with(
    request: &AllocationRequest,
    solver: &dyn ConstrainedSolver,
) -> Result<OptimizedAllocation> {
    request.validate()?;

    let objective = MeanVarianceObjective {
        expected_returns: &request.expected_returns,
        covariance: &request.covariance,
        risk_tolerance: request.risk_tolerance,
    };

    let n = request.assets.len();
    let start = vec![1.0 / n as f64; n];

    match solver.maximize(&objective, &start) {
        Ok(solution) => Ok(OptimizedAllocation {
            expected_return: objective.expected_return(&solution.weights),
            variance: objective.variance(&solution.weights),
            allocation: PortfolioAllocation::from_solution(&request.assets, &solution.weights),
            iterations: solution.iterations,
            status: CalculationStatus::Nominal,
        }),
        Err(failure) => {
            log::warn!("allocation solver failed ({}); using equal weights", failure);
            Ok(OptimizedAllocation {
                expected_return: objective.expected_return(&start),
                variance: objective.variance(&start),
                allocation: PortfolioAllocation::equal_weight(&request.assets),
                iterations: match failure {
                    SolverFailure::NotConverged { iterations } => iterations,
                    SolverFailure::Numerical(_) => 0,
                },
                status: CalculationStatus::Degraded {
                    reason: failure.degraded_reason(),
                },
            })
        }
    }
}

/// Solve with the default projected-gradient solver
pub fn optimize_allocation(request: &AllocationRequest, settings: SolverSettings) -> Result<OptimizedAllocation> {
    optimize_allocation_with(request, &ProjectedGradientSolver::new(settings))
}
