//! Retirement plan CLI
//!
//! Reads a JSON plan request, runs the accumulation and withdrawal
//! calculators, and prints a JSON report.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};

use retirement_engine::assumptions::{AssumptionOverrides, LoadedAssumptions};
use retirement_engine::planning::{
    calculate_funding_gap, optimize_account_utilization, optimize_savings_plan, project_retirement_assets,
    AccountUtilization, AccountUtilizationParams, AssetProjection, FundingGap, GoalPlanParams, ProjectionParams,
    RetirementGoal, SavingsPlan, SavingsPlanParams,
};
use retirement_engine::portfolio::{AllocationRequest, OptimizedAllocation};
use retirement_engine::tvm::compound;
use retirement_engine::withdrawal::{
    analyze_retirement_assets, apply_guardrail, bucket_strategy, optimize_withdrawal_sequence, withdrawal_baseline,
    AssetStructureAnalysis, BucketPlan, GuardrailDecision, GuardrailInputs, RetirementAssets, SequenceParams,
    WithdrawalBaseline, WithdrawalBaselineParams, WithdrawalMethod, WithdrawalSequence, WithdrawalStrategy,
};
use retirement_engine::{EconomicAssumptions, EngineDefaults, ScenarioRunner, ScenarioType, TaxBracketTable};

#[derive(Debug, Parser)]
#[command(name = "retirement-plan", version, about = "Run a retirement plan from a JSON request")]
struct Cli {
    /// Path to the JSON plan request
    request: PathBuf,

    /// Economic scenario preset (conservative, moderate, aggressive)
    #[arg(long, default_value = "moderate")]
    scenario: ScenarioType,

    /// Directory holding tax_brackets.csv and economic_scenarios.csv
    #[arg(long)]
    assumptions_dir: Option<PathBuf>,

    /// Pretty-print the report
    #[arg(long)]
    pretty: bool,
}

/// Plan request read from disk
#[derive(Debug, Deserialize)]
struct PlanRequest {
    goal: GoalPlanParams,
    current_assets: f64,
    annual_contribution: f64,

    #[serde(default)]
    overrides: AssumptionOverrides,

    /// Guaranteed annual income available in retirement (today's money)
    #[serde(default)]
    guaranteed_income: f64,

    #[serde(default)]
    strategy: Option<WithdrawalStrategy>,

    #[serde(default)]
    retirement_assets: Option<RetirementAssets>,

    #[serde(default)]
    allocations: Vec<AllocationRequest>,

    /// Annual saving target to split across accounts
    #[serde(default)]
    target_contribution: Option<f64>,

    #[serde(default)]
    household: Option<AccountUtilizationParams>,

    #[serde(default)]
    defaults: EngineDefaults,
}

#[derive(Debug, Serialize)]
struct PlanReport {
    scenario: ScenarioType,
    assumptions: EconomicAssumptions,
    goal: RetirementGoal,
    total_required_capital: f64,
    projection: AssetProjection,
    funding_gap: FundingGap,
    strategy: WithdrawalStrategy,
    withdrawal: WithdrawalBaseline,
    guardrail: GuardrailDecision,
    #[serde(skip_serializing_if = "Option::is_none")]
    buckets: Option<BucketPlan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sequence: Option<WithdrawalSequence>,
    #[serde(skip_serializing_if = "Option::is_none")]
    asset_structure: Option<AssetStructureAnalysis>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    allocations: Vec<OptimizedAllocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    savings_plan: Option<SavingsPlan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    account_utilization: Option<AccountUtilization>,
}

fn load_tables(cli: &Cli) -> Result<(EconomicAssumptions, TaxBracketTable)> {
    match &cli.assumptions_dir {
        Some(dir) => {
            let loaded = LoadedAssumptions::load_from(dir)
                .with_context(|| format!("loading assumptions from {}", dir.display()))?;
            Ok((loaded.scenario(cli.scenario), loaded.tax_brackets))
        }
        None => Ok((EconomicAssumptions::preset(cli.scenario), TaxBracketTable::default())),
    }
}

fn run(cli: &Cli, request: PlanRequest) -> Result<PlanReport> {
    let defaults = request.defaults;
    let (economic, tax_brackets) = load_tables(cli)?;
    let economic = economic
        .with_overrides(request.overrides)
        .context("applying assumption overrides")?;

    let goal = RetirementGoal::plan(&request.goal, &economic, defaults.safe_withdrawal_rate)
        .context("retirement goal")?;
    let years = request.goal.years_to_retirement();

    let projection = project_retirement_assets(
        &ProjectionParams::new(
            request.current_assets,
            request.annual_contribution,
            years,
            economic.pre_retirement_return,
        )
        .with_contribution_growth(defaults.contribution_growth_rate),
    )
    .context("asset projection")?;
    let projected = projection.total_projected_assets;

    let funding_gap = calculate_funding_gap(goal.total_required_capital(), projected).context("funding gap")?;

    let strategy = match request.strategy {
        Some(strategy) => {
            strategy.validate().context("withdrawal strategy")?;
            strategy
        }
        None => WithdrawalStrategy::new(defaults.safe_withdrawal_rate, WithdrawalMethod::Fixed)?,
    };

    let withdrawal = withdrawal_baseline(
        &WithdrawalBaselineParams::new(
            request.goal.target_monthly_income,
            economic.inflation_rate,
            request.goal.retirement_period_years,
            projected,
        )
        .with_expected_return(economic.post_retirement_return),
    )
    .context("withdrawal baseline")?;

    let guardrail = apply_guardrail(
        &GuardrailInputs {
            current_portfolio_value: projected,
            target_portfolio_value: goal.total_required_capital(),
            current_withdrawal_rate: strategy.withdrawal_rate,
        },
        &defaults.guardrail,
    )
    .context("guardrail")?;

    // First-year spending in retirement-date money
    let first_year_need = compound(goal.target_annual_income, economic.inflation_rate, years);

    let buckets = if strategy.bucket_strategy {
        Some(bucket_strategy(projected, first_year_need, &defaults.buckets).context("bucket plan")?)
    } else {
        None
    };

    let sequence = if strategy.tax_optimization {
        let params = SequenceParams {
            annual_withdrawal_needed: first_year_need,
            guaranteed_income: compound(request.guaranteed_income, economic.inflation_rate, years),
        };
        Some(optimize_withdrawal_sequence(&params, &tax_brackets, &defaults.sequence).context("withdrawal sequence")?)
    } else {
        None
    };

    let asset_structure = request
        .retirement_assets
        .as_ref()
        .map(analyze_retirement_assets)
        .transpose()
        .context("asset structure")?;

    let savings_plan = request
        .target_contribution
        .map(|target| {
            let params = SavingsPlanParams {
                target_contribution: target,
                current_contribution: request.annual_contribution,
            };
            optimize_savings_plan(&params, &defaults.savings_plan)
        })
        .transpose()
        .context("savings plan")?;

    let account_utilization = request
        .household
        .as_ref()
        .map(|household| optimize_account_utilization(household, &defaults.account_utilization))
        .transpose()
        .context("account utilization")?;

    let allocations = if request.allocations.is_empty() {
        Vec::new()
    } else {
        let runner = ScenarioRunner::new(defaults.clone()).context("starting worker pool")?;
        runner
            .optimize_batch(&request.allocations)
            .into_iter()
            .enumerate()
            .map(|(i, r)| r.with_context(|| format!("allocation request {}", i)))
            .collect::<Result<Vec<_>>>()?
    };

    Ok(PlanReport {
        scenario: cli.scenario,
        assumptions: economic,
        total_required_capital: goal.total_required_capital(),
        goal,
        projection,
        funding_gap,
        strategy,
        withdrawal,
        guardrail,
        buckets,
        sequence,
        asset_structure,
        allocations,
        savings_plan,
        account_utilization,
    })
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let raw = fs::read_to_string(&cli.request)
        .with_context(|| format!("reading plan request {}", cli.request.display()))?;
    let request: PlanRequest = serde_json::from_str(&raw).context("parsing plan request")?;

    let report = run(&cli, request)?;
    log::info!(
        "plan complete: required {:.0}, projected {:.0}, gap {:.0}",
        report.total_required_capital,
        report.projection.total_projected_assets,
        report.funding_gap.funding_gap
    );

    let json = if cli.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{}", json);

    Ok(())
}
