//! Routing of savings into tax-advantaged accounts
//!
//! Two calculators share the same account vocabulary:
//! - `optimize_savings_plan` splits the extra contribution needed to reach a
//!   savings target across pension savings, IRP and a general account
//! - `optimize_account_utilization` sizes IRP and pension savings deposits
//!   from the household's savings capacity and prices the tax credit

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{AccountUtilizationSettings, SavingsPlanSettings};
use crate::error::{ensure_non_negative, Result};

/// Savings account wrapper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SavingsAccount {
    /// Personal pension savings, tax credit eligible
    PensionSavings,
    /// Individual retirement pension, tax credit eligible
    Irp,
    /// Ordinary taxable brokerage account
    General,
}

impl SavingsAccount {
    pub fn as_str(&self) -> &'static str {
        match self {
            SavingsAccount::PensionSavings => "pension_savings",
            SavingsAccount::Irp => "irp",
            SavingsAccount::General => "general",
        }
    }

    pub fn is_tax_advantaged(&self) -> bool {
        !matches!(self, SavingsAccount::General)
    }
}

impl fmt::Display for SavingsAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Annual deposit into one account
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccountContribution {
    pub account: SavingsAccount,
    pub annual: f64,
    pub monthly: f64,
}

impl AccountContribution {
    fn new(account: SavingsAccount, annual: f64) -> Self {
        Self {
            account,
            annual,
            monthly: annual / 12.0,
        }
    }
}

/// Inputs for [`optimize_savings_plan`]
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SavingsPlanParams {
    /// Annual saving needed to close the funding gap
    pub target_contribution: f64,
    /// Annual saving today
    pub current_contribution: f64,
}

/// Extra contribution split across accounts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsPlan {
    pub current_contribution: f64,
    pub target_contribution: f64,
    /// Target minus current; negative when already ahead of target
    pub additional_contribution: f64,
    /// Pension savings, IRP, then general
    pub allocations: Vec<AccountContribution>,
    pub allocated_total: f64,
    /// Part of the extra contribution no account rule picks up
    pub unallocated: f64,
}

impl SavingsPlan {
    pub fn monthly_current(&self) -> f64 {
        self.current_contribution / 12.0
    }

    pub fn monthly_target(&self) -> f64 {
        self.target_contribution / 12.0
    }

    pub fn monthly_additional(&self) -> f64 {
        self.additional_contribution / 12.0
    }

    pub fn allocation(&self, account: SavingsAccount) -> Option<&AccountContribution> {
        self.allocations.iter().find(|a| a.account == account)
    }
}

/// Split the extra annual contribution across accounts
///
/// Pension savings takes its share up to its limit and IRP likewise. The
/// general account only receives what exceeds the two limits combined, so
/// below that level part of the extra contribution stays unallocated.
pub fn optimize_savings_plan(params: &SavingsPlanParams, settings: &SavingsPlanSettings) -> Result<SavingsPlan> {
    ensure_non_negative("target_contribution", params.target_contribution)?;
    ensure_non_negative("current_contribution", params.current_contribution)?;
    settings.validate()?;

    let additional = params.target_contribution - params.current_contribution;
    let extra = additional.max(0.0);

    let pension = (extra * settings.pension_savings_share).min(settings.pension_savings_limit);
    let irp = (extra * settings.irp_share).min(settings.irp_limit);
    let general = (extra - settings.pension_savings_limit - settings.irp_limit).max(0.0);

    let allocations = vec![
        AccountContribution::new(SavingsAccount::PensionSavings, pension),
        AccountContribution::new(SavingsAccount::Irp, irp),
        AccountContribution::new(SavingsAccount::General, general),
    ];
    let allocated_total = pension + irp + general;

    log::debug!(
        "savings plan: extra {:.0}, pension {:.0}, irp {:.0}, general {:.0}",
        extra,
        pension,
        irp,
        general
    );

    Ok(SavingsPlan {
        current_contribution: params.current_contribution,
        target_contribution: params.target_contribution,
        additional_contribution: additional,
        allocations,
        allocated_total,
        unallocated: extra - allocated_total,
    })
}

/// Inputs for [`optimize_account_utilization`]
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AccountUtilizationParams {
    pub annual_income: f64,
    pub monthly_expenses: f64,
}

/// Tax-advantaged deposits and the credit they earn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountUtilization {
    /// Income minus twelve months of expenses; negative when spending exceeds income
    pub annual_savings_capacity: f64,
    /// IRP, pension savings, then general
    pub allocations: Vec<AccountContribution>,
    pub irp_tax_credit: f64,
    pub pension_savings_tax_credit: f64,
    pub total_tax_credit: f64,
}

impl AccountUtilization {
    pub fn allocation(&self, account: SavingsAccount) -> Option<&AccountContribution> {
        self.allocations.iter().find(|a| a.account == account)
    }
}

/// Fill IRP and pension savings from savings capacity
///
/// The general account receives capacity beyond both annual limits.
pub fn optimize_account_utilization(
    params: &AccountUtilizationParams,
    settings: &AccountUtilizationSettings,
) -> Result<AccountUtilization> {
    ensure_non_negative("annual_income", params.annual_income)?;
    ensure_non_negative("monthly_expenses", params.monthly_expenses)?;
    settings.validate()?;

    let capacity = params.annual_income - params.monthly_expenses * 12.0;
    if capacity < 0.0 {
        log::warn!("expenses exceed income by {:.0}; nothing to allocate", -capacity);
    }
    let available = capacity.max(0.0);

    let irp = (available * settings.irp_share).min(settings.irp_limit);
    let pension = (available * settings.pension_savings_share).min(settings.pension_savings_limit);
    let general = (available - settings.irp_limit - settings.pension_savings_limit).max(0.0);

    let irp_tax_credit = irp * settings.tax_credit_rate;
    let pension_savings_tax_credit = pension * settings.tax_credit_rate;

    Ok(AccountUtilization {
        annual_savings_capacity: capacity,
        allocations: vec![
            AccountContribution::new(SavingsAccount::Irp, irp),
            AccountContribution::new(SavingsAccount::PensionSavings, pension),
            AccountContribution::new(SavingsAccount::General, general),
        ],
        irp_tax_credit,
        pension_savings_tax_credit,
        total_tax_credit: irp_tax_credit + pension_savings_tax_credit,
    })
}
