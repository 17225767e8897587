//! Planning assumptions: economic scenarios and tax bracket schedules

mod economic;
mod tax;
pub mod loader;

pub use economic::{AssumptionOverrides, EconomicAssumptions, ScenarioType};
pub use tax::{TaxBracket, TaxBracketTable};
pub use loader::{LoadError, LoadedAssumptions};

/// Container for the assumption tables a full plan needs
#[derive(Debug, Clone, Default)]
pub struct Assumptions {
    pub economic: EconomicAssumptions,
    pub tax_brackets: TaxBracketTable,
}

impl Assumptions {
    /// Built-in tables for a scenario
    pub fn for_scenario(scenario: ScenarioType) -> Self {
        Self {
            economic: EconomicAssumptions::preset(scenario),
            tax_brackets: TaxBracketTable::default(),
        }
    }

    /// Tables loaded from CSV files in `path`
    pub fn from_csv_path(path: &std::path::Path, scenario: ScenarioType) -> Result<Self, LoadError> {
        let loaded = LoadedAssumptions::load_from(path)?;
        Ok(Self {
            economic: loaded.scenario(scenario),
            tax_brackets: loaded.tax_brackets,
        })
    }
}
