//! CSV-based assumption loader
//!
//! Loads tax bracket schedules and economic scenario presets from CSV files.
//! Paths are always supplied by the caller.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use super::{EconomicAssumptions, ScenarioType, TaxBracket, TaxBracketTable};
use crate::error::EngineError;

/// File name of the bracket schedule inside an assumptions directory
pub const TAX_BRACKETS_FILE: &str = "tax_brackets.csv";

/// File name of the economic scenarios inside an assumptions directory
pub const ECONOMIC_SCENARIOS_FILE: &str = "economic_scenarios.csv";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open assumptions file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid assumption values: {0}")]
    Invalid(#[from] EngineError),
}

/// Raw row of tax_brackets.csv; an empty `max_income` marks the top bracket
#[derive(Debug, Deserialize)]
struct BracketRow {
    min_income: f64,
    max_income: Option<f64>,
    rate: f64,
}

/// Raw row of economic_scenarios.csv
#[derive(Debug, Deserialize)]
struct ScenarioRow {
    scenario: String,
    inflation_rate: f64,
    pre_retirement_return: f64,
    post_retirement_return: f64,
    wage_growth_rate: f64,
}

/// Load a bracket schedule from any reader
pub fn load_tax_brackets_from_reader<R: Read>(reader: R) -> Result<TaxBracketTable, LoadError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut brackets = Vec::new();

    for result in csv_reader.deserialize() {
        let row: BracketRow = result?;
        brackets.push(TaxBracket {
            min_income: row.min_income,
            max_income: row.max_income,
            rate: row.rate,
        });
    }

    Ok(TaxBracketTable::new(brackets)?)
}

/// Load scenario presets from any reader
pub fn load_economic_scenarios_from_reader<R: Read>(
    reader: R,
) -> Result<HashMap<ScenarioType, EconomicAssumptions>, LoadError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut scenarios = HashMap::new();

    for result in csv_reader.deserialize() {
        let row: ScenarioRow = result?;
        let scenario: ScenarioType = row.scenario.parse()?;
        let assumptions = EconomicAssumptions::new(
            row.inflation_rate,
            row.pre_retirement_return,
            row.post_retirement_return,
            row.wage_growth_rate,
        )?;
        scenarios.insert(scenario, assumptions);
    }

    Ok(scenarios)
}

/// Everything loadable from an assumptions directory
#[derive(Debug, Clone)]
pub struct LoadedAssumptions {
    pub tax_brackets: TaxBracketTable,
    pub economic_scenarios: HashMap<ScenarioType, EconomicAssumptions>,
}

impl LoadedAssumptions {
    /// Load both files from `dir`
    pub fn load_from(dir: &Path) -> Result<Self, LoadError> {
        let brackets = File::open(dir.join(TAX_BRACKETS_FILE))?;
        let scenarios = File::open(dir.join(ECONOMIC_SCENARIOS_FILE))?;

        let loaded = Self {
            tax_brackets: load_tax_brackets_from_reader(brackets)?,
            economic_scenarios: load_economic_scenarios_from_reader(scenarios)?,
        };
        log::debug!(
            "loaded {} tax brackets and {} economic scenarios from {}",
            loaded.tax_brackets.brackets().len(),
            loaded.economic_scenarios.len(),
            dir.display()
        );
        Ok(loaded)
    }

    /// Scenario preset, falling back to the built-in values when the file omits it
    pub fn scenario(&self, scenario: ScenarioType) -> EconomicAssumptions {
        self.economic_scenarios
            .get(&scenario)
            .copied()
            .unwrap_or_else(|| EconomicAssumptions::preset(scenario))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BRACKETS_CSV: &str = "\
min_income,max_income,rate
0,14000000,0.06
14000000,50000000,0.15
50000000,,0.24
";

    const SCENARIOS_CSV: &str = "\
scenario,inflation_rate,pre_retirement_return,post_retirement_return,wage_growth_rate
conservative,0.02,0.025,0.015,0.03
aggressive,0.03,0.06,0.04,0.05
";

    #[test]
    fn test_load_tax_brackets() {
        let table = load_tax_brackets_from_reader(BRACKETS_CSV.as_bytes()).unwrap();
        assert_eq!(table.brackets().len(), 3);
        assert_eq!(table.brackets()[2].max_income, None);
        assert_eq!(table.lowest().max_income, Some(14_000_000.0));
    }

    #[test]
    fn test_load_rejects_invalid_table() {
        let bad = "min_income,max_income,rate\n0,100,0.1\n";
        let err = load_tax_brackets_from_reader(bad.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::Invalid(_)));
    }

    #[test]
    fn test_load_scenarios() {
        let scenarios = load_economic_scenarios_from_reader(SCENARIOS_CSV.as_bytes()).unwrap();
        assert_eq!(scenarios.len(), 2);
        assert_eq!(scenarios[&ScenarioType::Aggressive].pre_retirement_return, 0.06);

        let loaded = LoadedAssumptions {
            tax_brackets: TaxBracketTable::default(),
            economic_scenarios: scenarios,
        };
        // Missing scenario falls back to the built-in preset
        assert_eq!(
            loaded.scenario(ScenarioType::Moderate),
            EconomicAssumptions::preset(ScenarioType::Moderate)
        );
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let err = LoadedAssumptions::load_from(Path::new("/nonexistent/assumptions")).unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }

    #[test]
    fn test_load_demo_directory() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/assumptions");
        let loaded = LoadedAssumptions::load_from(&dir).unwrap();
        assert_eq!(loaded.tax_brackets, TaxBracketTable::default());
        assert_eq!(
            loaded.scenario(ScenarioType::Conservative),
            EconomicAssumptions::preset(ScenarioType::Conservative)
        );
    }
}
