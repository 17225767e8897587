//! Tax-aware withdrawal waterfall
//!
//! Draws the annual need from, in order:
//! 1. guaranteed income (public pension and the like), untaxed
//! 2. the taxable account, up to the ceiling of the lowest tax bracket
//! 3. the pension account, up to the pension deduction cap
//!
//! The waterfall never withdraws more than the need. Whatever the three
//! sources cannot cover is returned as an unresolved remainder.

use serde::{Deserialize, Serialize};

use crate::assumptions::TaxBracketTable;
use crate::config::SequenceSettings;
use crate::error::{ensure_non_negative, CalculationStatus, DegradedReason, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    GuaranteedIncome,
    TaxableAccount,
    PensionAccount,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SequenceParams {
    pub annual_withdrawal_needed: f64,
    /// Guaranteed income available this year
    #[serde(default)]
    pub guaranteed_income: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalStep {
    pub step: u8,
    pub account_type: AccountType,
    pub amount: f64,
    pub tax_rate: f64,
    pub after_tax_amount: f64,
}

impl WithdrawalStep {
    fn new(step: u8, account_type: AccountType, amount: f64, tax_rate: f64) -> Self {
        Self {
            step,
            account_type,
            amount,
            tax_rate,
            after_tax_amount: amount * (1.0 - tax_rate),
        }
    }

    pub fn tax(&self) -> f64 {
        self.amount * self.tax_rate
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalSequence {
    pub annual_withdrawal_needed: f64,
    pub steps: Vec<WithdrawalStep>,
    pub total_withdrawn: f64,
    pub total_tax: f64,
    pub total_after_tax: f64,
    /// After-tax total as a percentage of the need (0 when the need is 0)
    pub tax_efficiency: f64,
    /// Need left uncovered by the waterfall
    pub remainder: f64,
    pub status: CalculationStatus,
}

/// Order withdrawals across accounts to keep income in the lowest brackets
pub fn optimize_withdrawal_sequence(
    params: &SequenceParams,
    tax_table: &TaxBracketTable,
    settings: &SequenceSettings,
) -> Result<WithdrawalSequence> {
    ensure_non_negative("annual_withdrawal_needed", params.annual_withdrawal_needed)?;
    ensure_non_negative("guaranteed_income", params.guaranteed_income)?;
    ensure_non_negative("pension_deduction_cap", settings.pension_deduction_cap)?;

    let lowest = tax_table.lowest();
    let taxable_ceiling = lowest.max_income.unwrap_or(f64::INFINITY);

    let sources = [
        (AccountType::GuaranteedIncome, params.guaranteed_income, 0.0),
        (AccountType::TaxableAccount, taxable_ceiling, lowest.rate),
        (AccountType::PensionAccount, settings.pension_deduction_cap, settings.pension_tax_rate),
    ];

    let mut remaining = params.annual_withdrawal_needed;
    let mut steps = Vec::with_capacity(sources.len());
    for (i, (account_type, limit, rate)) in sources.into_iter().enumerate() {
        if remaining <= 0.0 {
            break;
        }
        let amount = remaining.min(limit);
        if amount <= 0.0 {
            continue;
        }
        steps.push(WithdrawalStep::new(i as u8 + 1, account_type, amount, rate));
        remaining -= amount;
    }

    let total_withdrawn: f64 = steps.iter().map(|s| s.amount).sum();
    let total_tax: f64 = steps.iter().map(WithdrawalStep::tax).sum();
    let total_after_tax: f64 = steps.iter().map(|s| s.after_tax_amount).sum();

    let tax_efficiency = if params.annual_withdrawal_needed > 0.0 {
        total_after_tax / params.annual_withdrawal_needed * 100.0
    } else {
        0.0
    };

    let status = if remaining > 0.0 {
        log::warn!(
            "withdrawal sequence leaves {:.0} of {:.0} uncovered",
            remaining,
            params.annual_withdrawal_needed
        );
        CalculationStatus::Unresolved { remainder: remaining }
    } else if params.annual_withdrawal_needed == 0.0 {
        CalculationStatus::Degraded {
            reason: DegradedReason::ZeroDenominator,
        }
    } else {
        CalculationStatus::Nominal
    };

    Ok(WithdrawalSequence {
        annual_withdrawal_needed: params.annual_withdrawal_needed,
        steps,
        total_withdrawn,
        total_tax,
        total_after_tax,
        tax_efficiency,
        remainder: remaining.max(0.0),
        status,
    })
}
