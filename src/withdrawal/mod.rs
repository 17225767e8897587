//! Decumulation: withdrawal rates, buckets, guardrails and tax sequencing

mod assets;
mod bucket;
mod guardrail;
mod rate;
mod sequence;
mod strategy;

pub use assets::{
    analyze_retirement_assets, AssetClassBreakdown, AssetStructureAnalysis, AssetStructureFlag, Liquidity,
    RetirementAssets, TaxTreatment,
};
pub use bucket::{bucket_strategy, Bucket, BucketPlan, RiskLevel};
pub use guardrail::{apply_guardrail, GuardrailAction, GuardrailDecision, GuardrailInputs, GuardrailStatus};
pub use rate::{
    safe_withdrawal_rate, withdrawal_baseline, SafeWithdrawalAnalysis, SafeWithdrawalParams, WithdrawalBaseline,
    WithdrawalBaselineParams, WithdrawalYear, DEFAULT_BASELINE_RETURN,
};
pub use sequence::{optimize_withdrawal_sequence, AccountType, SequenceParams, WithdrawalSequence, WithdrawalStep};
pub use strategy::{WithdrawalMethod, WithdrawalStrategy, MAX_WITHDRAWAL_RATE, MIN_WITHDRAWAL_RATE};
