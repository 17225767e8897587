//! Portfolio analytics and allocation
//!
//! - `metrics`: mean, volatility, Sharpe, Sortino and drawdown of a return series
//! - `optimizer`: mean-variance weights on the budget simplex
//! - `profile`: risk scoring, model portfolios and their per-account split
//! - `monitor`: benchmark comparison and market regime

mod allocation;
mod metrics;
mod monitor;
mod optimizer;
mod profile;

pub use allocation::{PortfolioAllocation, DEFAULT_REBALANCING_THRESHOLD, WEIGHT_SUM_TOLERANCE};
pub use metrics::{calculate_portfolio_metrics, portfolio_metrics, PortfolioMetrics};
pub use monitor::{
    market_regime, monitor_performance, BenchmarkComparison, MarketRegime, PerformanceRating,
    PerformanceReport, HIGH_VOLATILITY_THRESHOLD,
};
pub use optimizer::{
    optimize_allocation, optimize_allocation_with, project_onto_simplex, AllocationRequest,
    ConstrainedSolver, MeanVarianceObjective, Objective, OptimizedAllocation, ProjectedGradientSolver,
    Solution, SolverFailure,
};
pub use profile::{
    adjust_for_volatility, assess_risk_profile, AccountSleeve, ModelPortfolio, RiskAssessment, RiskProfile,
    RiskProfileInputs, VolatilityAdjustment, DEFAULT_VOLATILITY_THRESHOLD,
};
