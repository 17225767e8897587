//! Accumulation-phase calculators: required capital, asset projection,
//! funding gap and account routing of savings

mod accounts;
mod goal;
mod projection;
mod gap;

pub use accounts::{
    optimize_account_utilization, optimize_savings_plan, AccountContribution, AccountUtilization,
    AccountUtilizationParams, SavingsAccount, SavingsPlan, SavingsPlanParams,
};
pub use goal::{
    calculate_retirement_goal, GoalPlanParams, RetirementGoal, RetirementGoalParams,
    RetirementGoalResult,
};
pub use projection::{project_retirement_assets, AssetProjection, ContributionYear, ProjectionParams};
pub use gap::{calculate_funding_gap, FundingGap};
