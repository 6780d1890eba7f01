use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The two disjoint kinds of reporting interval a statement can cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PeriodType {
    Quarter,
    FiscalYear,
}

/// Position of a quarter inside the fiscal calendar, e.g. Q3 of fiscal 2023.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuarterIndex {
    pub fiscal_year: i32,
    pub quarter: u8,
}

impl QuarterIndex {
    pub fn new(fiscal_year: i32, quarter: u8) -> Result<Self, CoreError> {
        if !(1..=4).contains(&quarter) {
            return Err(CoreError::InvalidInput(
                "quarter".to_string(),
                format!("expected 1..=4, got {quarter}"),
            ));
        }
        Ok(Self { fiscal_year, quarter })
    }

    /// Returns the quarter immediately preceding this one (Q1 rolls back to Q4 of the prior year).
    /// `None` if the prior year is not representable.
    pub fn previous(&self) -> Option<Self> {
        if self.quarter == 1 {
            Some(Self { fiscal_year: self.fiscal_year.checked_sub(1)?, quarter: 4 })
        } else {
            Some(Self { fiscal_year: self.fiscal_year, quarter: self.quarter - 1 })
        }
    }
}

impl fmt::Display for QuarterIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{} {}", self.quarter, self.fiscal_year)
    }
}

/// The fiscal classification of a single statement.
///
/// The upstream feed mixes quarterly and annual filings in one untyped list and labels
/// them with a free-form `period` string. A statement is tagged exactly once when it
/// is fetched; anything that is not clearly a quarter or a full fiscal year is kept as
/// `Unclassifiable` so that downstream selection can exclude it instead of guessing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FiscalPeriod {
    Quarter(QuarterIndex),
    FiscalYear(i32),
    Unclassifiable(String),
}

impl FiscalPeriod {
    /// Classifies a raw period label (`"Q1"`..`"Q4"`, `"FY"`) for the given fiscal year.
    pub fn classify(label: Option<&str>, fiscal_year: i32) -> Self {
        let Some(raw) = label else {
            return FiscalPeriod::Unclassifiable(String::new());
        };
        let normalized = raw.trim().to_ascii_uppercase();
        match normalized.as_str() {
            "FY" => FiscalPeriod::FiscalYear(fiscal_year),
            "Q1" | "Q2" | "Q3" | "Q4" => {
                let quarter = normalized.as_bytes()[1] - b'0';
                QuarterIndex::new(fiscal_year, quarter)
                    .map(FiscalPeriod::Quarter)
                    .unwrap_or_else(|_| FiscalPeriod::Unclassifiable(raw.to_string()))
            }
            _ => FiscalPeriod::Unclassifiable(raw.to_string()),
        }
    }

    pub fn period_type(&self) -> Option<PeriodType> {
        match self {
            FiscalPeriod::Quarter(_) => Some(PeriodType::Quarter),
            FiscalPeriod::FiscalYear(_) => Some(PeriodType::FiscalYear),
            FiscalPeriod::Unclassifiable(_) => None,
        }
    }
}
