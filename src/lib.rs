//! Retirement Engine - calculation core for retirement planning
//!
//! This library provides:
//! - Time value of money primitives (future/present value, level payment)
//! - Required capital, asset projection and funding gap at retirement
//! - Portfolio statistics and a mean-variance allocator
//! - Withdrawal rates, bucket plans, guardrails and tax-aware sequencing
//! - Batch scenario runner on a bounded worker pool

pub mod error;
pub mod config;
pub mod tvm;
pub mod assumptions;
pub mod planning;
pub mod portfolio;
pub mod withdrawal;
pub mod scenario;

// Re-export commonly used types
pub use error::{CalculationStatus, DegradedReason, EngineError, Result};
pub use config::EngineDefaults;
pub use assumptions::{Assumptions, EconomicAssumptions, ScenarioType, TaxBracketTable};
pub use planning::{calculate_funding_gap, calculate_retirement_goal, project_retirement_assets, RetirementGoal};
pub use portfolio::{calculate_portfolio_metrics, optimize_allocation, PortfolioAllocation};
pub use withdrawal::{apply_guardrail, bucket_strategy, optimize_withdrawal_sequence, safe_withdrawal_rate};
pub use scenario::ScenarioRunner;
