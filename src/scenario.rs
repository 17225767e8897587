//! Batch runner for optimizer, metrics and goal scenarios
//!
//! Owns a bounded rayon pool, so batch work never competes with the global
//! pool and the worker count is fixed at construction. Every batch returns
//! one result per input, in input order.

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};

use crate::assumptions::{EconomicAssumptions, LoadedAssumptions, ScenarioType};
use crate::config::EngineDefaults;
use crate::error::Result;
use crate::planning::{GoalPlanParams, RetirementGoal};
use crate::portfolio::{calculate_portfolio_metrics, optimize_allocation, AllocationRequest, OptimizedAllocation, PortfolioMetrics};

/// Pre-configured runner for batches of independent calculations
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new(EngineDefaults::default())?;
/// let results = runner.optimize_batch(&requests);
/// ```
#[derive(Debug)]
pub struct ScenarioRunner {
    defaults: EngineDefaults,
    assumptions: Option<LoadedAssumptions>,
    pool: ThreadPool,
}

impl ScenarioRunner {
    /// Build a runner with `defaults.max_concurrency` workers (at least one)
    pub fn new(defaults: EngineDefaults) -> std::result::Result<Self, ThreadPoolBuildError> {
        let workers = defaults.max_concurrency.max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("scenario-worker-{}", i))
            .build()?;
        log::debug!("scenario runner started with {} workers", workers);

        Ok(Self {
            defaults,
            assumptions: None,
            pool,
        })
    }

    /// Use loaded scenario tables instead of the built-in presets
    pub fn with_assumptions(mut self, assumptions: LoadedAssumptions) -> Self {
        self.assumptions = Some(assumptions);
        self
    }

    pub fn defaults(&self) -> &EngineDefaults {
        &self.defaults
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Mean-variance optimization for each request
    pub fn optimize_batch(&self, requests: &[AllocationRequest]) -> Vec<Result<OptimizedAllocation>> {
        let solver = self.defaults.solver;
        self.pool
            .install(|| requests.par_iter().map(|r| optimize_allocation(r, solver)).collect())
    }

    /// Portfolio statistics for each return series
    pub fn metrics_batch<S: AsRef<[f64]> + Sync>(&self, series: &[S]) -> Vec<Result<PortfolioMetrics>> {
        let risk_free_rate = self.defaults.risk_free_rate;
        self.pool.install(|| {
            series
                .par_iter()
                .map(|s| calculate_portfolio_metrics(s.as_ref(), risk_free_rate))
                .collect()
        })
    }

    /// One retirement goal per economic scenario
    pub fn goal_scenarios(
        &self,
        params: &GoalPlanParams,
        scenarios: &[ScenarioType],
    ) -> Vec<(ScenarioType, Result<RetirementGoal>)> {
        let swr = self.defaults.safe_withdrawal_rate;
        self.pool.install(|| {
            scenarios
                .par_iter()
                .map(|&scenario| {
                    let economic = match &self.assumptions {
                        Some(loaded) => loaded.scenario(scenario),
                        None => EconomicAssumptions::preset(scenario),
                    };
                    (scenario, RetirementGoal::plan(params, &economic, swr))
                })
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SolverSettings;

    fn runner() -> ScenarioRunner {
        ScenarioRunner::new(EngineDefaults {
            max_concurrency: 2,
            ..EngineDefaults::default()
        })
        .unwrap()
    }

    fn request(risk_tolerance: f64) -> AllocationRequest {
        AllocationRequest {
            assets: vec!["stocks".into(), "bonds".into()],
            expected_returns: vec![0.08, 0.04],
            covariance: vec![vec![0.04, 0.0], vec![0.0, 0.01]],
            risk_tolerance,
        }
    }

    #[test]
    fn test_pool_is_bounded() {
        assert_eq!(runner().workers(), 2);
    }

    #[test]
    fn test_optimize_batch_matches_sequential() {
        let runner = runner();
        let requests: Vec<_> = [0.0, 0.25, 0.5, 0.75, 1.0].iter().map(|&l| request(l)).collect();

        let batch = runner.optimize_batch(&requests);
        assert_eq!(batch.len(), requests.len());

        for (req, result) in requests.iter().zip(&batch) {
            let expected = optimize_allocation(req, SolverSettings::default()).unwrap();
            let got = result.as_ref().unwrap();
            assert_eq!(got.allocation, expected.allocation);
        }
    }

    #[test]
    fn test_metrics_batch_keeps_errors_in_place() {
        let series = vec![vec![0.01, 0.02, -0.01], vec![], vec![0.03, 0.01]];
        let results = runner().metrics_batch(&series);

        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert!(results[2].is_ok());
    }

    #[test]
    fn test_goal_scenarios_one_per_input() {
        let params = GoalPlanParams {
            current_age: 45,
            target_retirement_age: 65,
            target_monthly_income: 4_000_000.0,
            retirement_period_years: 25,
            medical_reserve: 0.0,
        };
        let results = runner().goal_scenarios(
            &params,
            &[ScenarioType::Conservative, ScenarioType::Moderate, ScenarioType::Aggressive],
        );

        assert_eq!(results[0].0, ScenarioType::Conservative);
        assert!(results.iter().all(|(_, r)| r.is_ok()));
    }
}
