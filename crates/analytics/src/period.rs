use chrono::NaiveDate;
use core_types::{FinancialStatement, FiscalPeriod, PeriodType, QuarterIndex};
use std::collections::HashMap;
use std::fmt;
use tracing::warn;

/// Number of consecutive quarters that make up a trailing twelve month window.
pub const TTM_QUARTERS: usize = 4;

/// Why a statement was left out of period selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The period label was neither a quarter nor a fiscal year.
    Unclassifiable { label: String },
    /// Another statement of the same ticker reports the same period type and end date.
    DuplicatePeriod {
        period_type: PeriodType,
        period_end: NaiveDate,
    },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Unclassifiable { label } => write!(f, "unclassifiable period label '{label}'"),
            SkipReason::DuplicatePeriod { period_type, period_end } => {
                write!(f, "duplicate {period_type:?} statement ending {period_end}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedStatement<'a> {
    pub statement: &'a FinancialStatement,
    pub reason: SkipReason,
}

/// The periods each metric needs, picked out of one ticker's mixed statement list.
///
/// Every slot is independent: a ticker can have a usable fiscal year and no quarters,
/// or two quarters but no complete trailing window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectedPeriods<'a> {
    pub latest_quarter: Option<&'a FinancialStatement>,
    pub previous_quarter: Option<&'a FinancialStatement>,
    /// The four most recent quarters, newest first, present only when they are
    /// consecutive in the fiscal calendar.
    pub trailing_quarters: Option<[&'a FinancialStatement; TTM_QUARTERS]>,
    pub latest_fiscal_year: Option<&'a FinancialStatement>,
    pub skipped: Vec<SkippedStatement<'a>>,
}

/// Isolates the periods the metrics need from an unordered list of statements.
///
/// Statements that cannot be classified, and every statement whose identity (period
/// type and end date) is shared with another, are excluded and recorded in
/// `skipped`. The input is never modified.
pub fn select_periods(statements: &[FinancialStatement]) -> SelectedPeriods<'_> {
    let mut selected = SelectedPeriods::default();

    let mut identity_counts: HashMap<(PeriodType, NaiveDate), usize> = HashMap::new();
    for statement in statements {
        if let Some(identity) = statement.identity() {
            *identity_counts.entry(identity).or_insert(0) += 1;
        }
    }

    let mut quarters: Vec<(QuarterIndex, &FinancialStatement)> = Vec::new();
    let mut fiscal_years: Vec<&FinancialStatement> = Vec::new();

    for statement in statements {
        let period_type = match &statement.period {
            FiscalPeriod::Unclassifiable(label) => {
                warn!(
                    ticker = %statement.ticker,
                    period_end = %statement.period_end,
                    label = %label,
                    "skipping statement with unclassifiable period"
                );
                selected.skipped.push(SkippedStatement {
                    statement,
                    reason: SkipReason::Unclassifiable { label: label.clone() },
                });
                continue;
            }
            FiscalPeriod::Quarter(_) => PeriodType::Quarter,
            FiscalPeriod::FiscalYear(_) => PeriodType::FiscalYear,
        };

        let identity = (period_type, statement.period_end);
        if identity_counts.get(&identity).copied().unwrap_or(0) > 1 {
            warn!(
                ticker = %statement.ticker,
                period_end = %statement.period_end,
                ?period_type,
                "skipping statement with duplicate period"
            );
            selected.skipped.push(SkippedStatement {
                statement,
                reason: SkipReason::DuplicatePeriod {
                    period_type,
                    period_end: statement.period_end,
                },
            });
            continue;
        }

        match &statement.period {
            FiscalPeriod::Quarter(index) => quarters.push((*index, statement)),
            FiscalPeriod::FiscalYear(_) => fiscal_years.push(statement),
            FiscalPeriod::Unclassifiable(_) => {}
        }
    }

    // Newest first. End dates are unique per type once duplicates are gone.
    quarters.sort_by(|a, b| b.1.period_end.cmp(&a.1.period_end));
    fiscal_years.sort_by(|a, b| b.period_end.cmp(&a.period_end));

    selected.latest_quarter = quarters.first().map(|(_, s)| *s);
    selected.previous_quarter = quarters.get(1).map(|(_, s)| *s);
    selected.trailing_quarters = trailing_window(&quarters);
    selected.latest_fiscal_year = fiscal_years.first().copied();

    selected
}

/// The newest four quarters, if each one is the fiscal predecessor of the one before.
fn trailing_window<'a>(
    quarters: &[(QuarterIndex, &'a FinancialStatement)],
) -> Option<[&'a FinancialStatement; TTM_QUARTERS]> {
    let window = quarters.get(..TTM_QUARTERS)?;
    let consecutive = window
        .windows(2)
        .all(|pair| pair[0].0.previous() == Some(pair[1].0));
    if !consecutive {
        return None;
    }
    Some([window[0].1, window[1].1, window[2].1, window[3].1])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quarter(year: i32, q: u8, end: (i32, u32, u32)) -> FinancialStatement {
        FinancialStatement::new(
            "ABC.L",
            FiscalPeriod::Quarter(QuarterIndex::new(year, q).unwrap()),
            NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap(),
        )
    }

    #[test]
    fn window_crosses_fiscal_year_boundary() {
        let statements = vec![
            quarter(2023, 3, (2023, 9, 30)),
            quarter(2024, 1, (2024, 3, 31)),
            quarter(2023, 4, (2023, 12, 31)),
            quarter(2023, 2, (2023, 6, 30)),
        ];
        let selected = select_periods(&statements);
        let window = selected.trailing_quarters.unwrap();
        assert_eq!(window[0].period_end, NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());
        assert_eq!(window[3].period_end, NaiveDate::from_ymd_opt(2023, 6, 30).unwrap());
    }

    #[test]
    fn quarters_at_the_edge_of_the_year_range_have_no_window() {
        let statement = |year: i32, q: u8, day: u32| {
            FinancialStatement::new(
                "ABC.L",
                FiscalPeriod::Quarter(QuarterIndex::new(year, q).unwrap()),
                NaiveDate::from_ymd_opt(2023, 1, day).unwrap(),
            )
        };
        // Newest first by end date: Q3, Q2, Q1 of i32::MIN, then Q4 of i32::MAX.
        let statements = vec![
            statement(i32::MIN, 1, 4),
            statement(i32::MIN, 2, 5),
            statement(i32::MIN, 3, 6),
            statement(i32::MAX, 4, 3),
        ];
        let selected = select_periods(&statements);
        assert!(selected.trailing_quarters.is_none());
        assert_eq!(selected.latest_quarter, Some(&statements[2]));
    }

    #[test]
    fn skip_reasons_render_for_logs() {
        let reason = SkipReason::Unclassifiable { label: "H1".into() };
        assert_eq!(reason.to_string(), "unclassifiable period label 'H1'");
    }
}
