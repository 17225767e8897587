//! Income tax bracket schedules

use serde::{Deserialize, Serialize};

use crate::error::{ensure_in_range, ensure_non_negative, EngineError, Result};

/// One marginal bracket; `max_income` of `None` means unbounded
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub min_income: f64,
    pub max_income: Option<f64>,
    pub rate: f64,
}

impl TaxBracket {
    pub fn contains(&self, income: f64) -> bool {
        income >= self.min_income && self.max_income.map_or(true, |max| income < max)
    }

    /// Width of the bracket, or infinity for the top bracket
    pub fn width(&self) -> f64 {
        self.max_income.map_or(f64::INFINITY, |max| max - self.min_income)
    }
}

/// Ordered, contiguous bracket schedule covering `[0, inf)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TaxBracket>", into = "Vec<TaxBracket>")]
pub struct TaxBracketTable {
    brackets: Vec<TaxBracket>,
}

impl TaxBracketTable {
    /// Validate ordering, contiguity and coverage
    pub fn new(brackets: Vec<TaxBracket>) -> Result<Self> {
        let first = brackets
            .first()
            .ok_or(EngineError::EmptyInput("tax brackets"))?;
        if first.min_income != 0.0 {
            return Err(EngineError::invalid(
                "tax_brackets",
                format!("first bracket must start at 0, starts at {}", first.min_income),
            ));
        }

        for (i, bracket) in brackets.iter().enumerate() {
            ensure_non_negative("min_income", bracket.min_income)?;
            ensure_in_range("rate", bracket.rate, 0.0, 1.0)?;

            let is_last = i + 1 == brackets.len();
            match (bracket.max_income, is_last) {
                (None, true) => {}
                (None, false) => {
                    return Err(EngineError::invalid(
                        "tax_brackets",
                        format!("bracket {} is unbounded but not last", i),
                    ))
                }
                (Some(max), _) if max <= bracket.min_income => {
                    return Err(EngineError::invalid(
                        "tax_brackets",
                        format!("bracket {} has max {} <= min {}", i, max, bracket.min_income),
                    ))
                }
                (Some(max), true) => {
                    return Err(EngineError::invalid(
                        "tax_brackets",
                        format!("top bracket must be unbounded, ends at {}", max),
                    ))
                }
                (Some(max), false) => {
                    let next_min = brackets[i + 1].min_income;
                    if (next_min - max).abs() > 1e-9 {
                        return Err(EngineError::invalid(
                            "tax_brackets",
                            format!("gap or overlap between {} and {}", max, next_min),
                        ));
                    }
                }
            }
        }

        Ok(Self { brackets })
    }

    pub fn brackets(&self) -> &[TaxBracket] {
        &self.brackets
    }

    /// Lowest bracket (always present after validation)
    pub fn lowest(&self) -> &TaxBracket {
        &self.brackets[0]
    }

    /// Bracket containing `income` (negative income maps to the lowest bracket)
    pub fn bracket_for(&self, income: f64) -> &TaxBracket {
        self.brackets
            .iter()
            .find(|b| b.contains(income))
            .unwrap_or_else(|| self.lowest())
    }

    /// Progressive tax on `income`
    pub fn tax_on(&self, income: f64) -> f64 {
        if income <= 0.0 {
            return 0.0;
        }
        self.brackets
            .iter()
            .take_while(|b| b.min_income < income)
            .map(|b| {
                let top = b.max_income.map_or(income, |max| max.min(income));
                (top - b.min_income) * b.rate
            })
            .sum()
    }
}

impl Default for TaxBracketTable {
    /// 2024 Korean comprehensive income tax schedule (lower five brackets)
    fn default() -> Self {
        Self {
            brackets: vec![
                TaxBracket { min_income: 0.0, max_income: Some(14_000_000.0), rate: 0.06 },
                TaxBracket { min_income: 14_000_000.0, max_income: Some(50_000_000.0), rate: 0.15 },
                TaxBracket { min_income: 50_000_000.0, max_income: Some(88_000_000.0), rate: 0.24 },
                TaxBracket { min_income: 88_000_000.0, max_income: Some(150_000_000.0), rate: 0.35 },
                TaxBracket { min_income: 150_000_000.0, max_income: None, rate: 0.38 },
            ],
        }
    }
}

impl TryFrom<Vec<TaxBracket>> for TaxBracketTable {
    type Error = EngineError;

    fn try_from(brackets: Vec<TaxBracket>) -> Result<Self> {
        Self::new(brackets)
    }
}

impl From<TaxBracketTable> for Vec<TaxBracket> {
    fn from(table: TaxBracketTable) -> Self {
        table.brackets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_deserialize_validates_schedule() {
        let json = r#"[{"min_income":0.0,"max_income":10.0,"rate":0.1},{"min_income":10.0,"max_income":null,"rate":0.2}]"#;
        let table: TaxBracketTable = serde_json::from_str(json).unwrap();
        assert_eq!(table.brackets().len(), 2);

        let gap = r#"[{"min_income":0.0,"max_income":10.0,"rate":0.1},{"min_income":12.0,"max_income":null,"rate":0.2}]"#;
        assert!(serde_json::from_str::<TaxBracketTable>(gap).is_err());
    }

    #[test]
    fn test_default_table_validates() {
        let table = TaxBracketTable::default();
        assert!(TaxBracketTable::new(table.brackets().to_vec()).is_ok());
        assert_eq!(table.lowest().max_income, Some(14_000_000.0));
        assert_eq!(table.lowest().rate, 0.06);
    }

    #[test]
    fn test_progressive_tax() {
        let table = TaxBracketTable::default();
        assert_eq!(table.tax_on(0.0), 0.0);
        assert_relative_eq!(table.tax_on(10_000_000.0), 600_000.0);
        // 14M * 6% + 6M * 15%
        assert_relative_eq!(table.tax_on(20_000_000.0), 840_000.0 + 900_000.0);
        assert_eq!(table.bracket_for(20_000_000.0).rate, 0.15);
        assert_eq!(table.bracket_for(500_000_000.0).rate, 0.38);
    }

    #[test]
    fn test_rejects_gaps_and_bounded_top() {
        let gap = vec![
            TaxBracket { min_income: 0.0, max_income: Some(100.0), rate: 0.1 },
            TaxBracket { min_income: 200.0, max_income: None, rate: 0.2 },
        ];
        assert!(TaxBracketTable::new(gap).is_err());

        let bounded = vec![TaxBracket { min_income: 0.0, max_income: Some(100.0), rate: 0.1 }];
        assert!(TaxBracketTable::new(bounded).is_err());

        assert!(TaxBracketTable::new(Vec::new()).is_err());
    }
}
