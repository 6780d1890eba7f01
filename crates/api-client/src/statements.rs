use crate::error::ApiError;
use crate::responses::StatementRow;
use crate::{ApiClient, StatementKind};
use chrono::{Datelike, NaiveDate};
use core_types::{FinancialStatement, FiscalPeriod};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Rows from the two statement feeds are matched on their period label and end date.
type RowKey = (String, NaiveDate);

/// Fetches both statement feeds and the latest price for `symbol` and assembles them
/// into one list of `FinancialStatement`s.
///
/// A failed price lookup is not fatal: the statement list is still useful for the
/// metrics that do not need a price, so `fallback_price` (usually the profile price)
/// is used instead.
pub async fn fetch_financial_statements(
    client: &dyn ApiClient,
    symbol: &str,
    fallback_price: Option<Decimal>,
) -> Result<Vec<FinancialStatement>, ApiError> {
    let income = client.fetch_statement_rows(symbol, StatementKind::Income).await?;
    let balance = client
        .fetch_statement_rows(symbol, StatementKind::BalanceSheet)
        .await?;

    let price = match client.fetch_eod_price(symbol).await {
        Ok(Some(close)) => Some(close),
        Ok(None) => fallback_price,
        Err(e) => {
            warn!(ticker = %symbol, error = %e, "EOD price unavailable, using profile price");
            fallback_price
        }
    };

    Ok(assemble_statements(symbol, &income, &balance, price))
}

/// Joins income statement rows with balance sheet rows and tags each result with its
/// fiscal classification.
///
/// Balance rows without a matching income row still become statements (they carry the
/// fiscal-year debt and equity). Rows with an unreadable date have no identity and are
/// dropped.
pub fn assemble_statements(
    symbol: &str,
    income: &[StatementRow],
    balance: &[StatementRow],
    price: Option<Decimal>,
) -> Vec<FinancialStatement> {
    let keyed_balance: Vec<(RowKey, &StatementRow)> = balance
        .iter()
        .filter_map(|row| row_key(symbol, StatementKind::BalanceSheet, row).map(|key| (key, row)))
        .collect();

    let mut balance_by_key: HashMap<&RowKey, &StatementRow> = HashMap::new();
    for (key, row) in &keyed_balance {
        balance_by_key.entry(key).or_insert(*row);
    }

    let mut statements = Vec::with_capacity(income.len() + keyed_balance.len());
    let mut joined: HashSet<RowKey> = HashSet::new();

    for row in income {
        let Some(key) = row_key(symbol, StatementKind::Income, row) else {
            continue;
        };
        let mut statement = new_statement(symbol, row, key.1, price);
        statement.revenue = row.revenue;
        statement.net_income = row.net_income;
        statement.shares_outstanding = row
            .weighted_average_shs_out
            .or(row.weighted_average_shs_out_dil);

        if let Some(balance_row) = balance_by_key.get(&key) {
            apply_balance(&mut statement, balance_row);
        }
        statements.push(statement);
        joined.insert(key);
    }

    for (key, row) in &keyed_balance {
        if joined.contains(key) {
            continue;
        }
        let mut statement = new_statement(symbol, row, key.1, price);
        apply_balance(&mut statement, row);
        statements.push(statement);
    }

    statements
}

fn new_statement(
    symbol: &str,
    row: &StatementRow,
    period_end: NaiveDate,
    price: Option<Decimal>,
) -> FinancialStatement {
    let fiscal_year = row.reported_fiscal_year().unwrap_or_else(|| period_end.year());
    let period = FiscalPeriod::classify(row.period.as_deref(), fiscal_year);
    let mut statement = FinancialStatement::new(symbol, period, period_end);
    statement.price = price;
    statement
}

fn apply_balance(statement: &mut FinancialStatement, row: &StatementRow) {
    statement.total_debt = row.total_debt;
    statement.total_equity = row.total_equity.or(row.total_stockholders_equity);
}

fn row_key(symbol: &str, kind: StatementKind, row: &StatementRow) -> Option<RowKey> {
    let label = row
        .period
        .as_deref()
        .map(|p| p.trim().to_ascii_uppercase())
        .unwrap_or_default();
    match row.date.as_deref().and_then(parse_statement_date) {
        Some(date) => Some((label, date)),
        None => {
            warn!(ticker = %symbol, statement = %kind, date = ?row.date, "dropping row with unreadable date");
            None
        }
    }
}

/// Accepts `2023-12-31` as well as timestamps such as `2023-12-31T00:00:00`.
fn parse_statement_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.trim().get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{PeriodType, QuarterIndex};
    use rust_decimal_macros::dec;

    fn income_row(period: &str, date: &str, revenue: Decimal, net_income: Decimal) -> StatementRow {
        StatementRow {
            date: Some(date.to_string()),
            period: Some(period.to_string()),
            revenue: Some(revenue),
            net_income: Some(net_income),
            weighted_average_shs_out: Some(dec!(100)),
            ..Default::default()
        }
    }

    fn balance_row(period: &str, date: &str, debt: Decimal, equity: Decimal) -> StatementRow {
        StatementRow {
            date: Some(date.to_string()),
            period: Some(period.to_string()),
            total_debt: Some(debt),
            total_stockholders_equity: Some(equity),
            ..Default::default()
        }
    }

    #[test]
    fn joins_balance_rows_onto_matching_income_rows() {
        let income = vec![income_row("Q4", "2023-12-31", dec!(500), dec!(50))];
        let balance = vec![balance_row("q4", "2023-12-31", dec!(200), dec!(400))];

        let statements = assemble_statements("ABC.L", &income, &balance, Some(dec!(12.5)));

        assert_eq!(statements.len(), 1);
        let s = &statements[0];
        assert_eq!(s.period, FiscalPeriod::Quarter(QuarterIndex::new(2023, 4).unwrap()));
        assert_eq!(s.revenue, Some(dec!(500)));
        assert_eq!(s.total_debt, Some(dec!(200)));
        assert_eq!(s.total_equity, Some(dec!(400)));
        assert_eq!(s.price, Some(dec!(12.5)));
    }

    #[test]
    fn balance_only_rows_become_statements() {
        let income = vec![income_row("Q4", "2023-12-31", dec!(500), dec!(50))];
        let balance = vec![balance_row("FY", "2023-12-31", dec!(200), dec!(400))];

        let statements = assemble_statements("ABC.L", &income, &balance, None);

        assert_eq!(statements.len(), 2);
        let fy = statements
            .iter()
            .find(|s| s.period.period_type() == Some(PeriodType::FiscalYear))
            .unwrap();
        assert_eq!(fy.revenue, None);
        assert_eq!(fy.total_debt, Some(dec!(200)));
    }

    #[test]
    fn reported_fiscal_year_wins_over_calendar_date() {
        let mut row = income_row("Q1", "2023-12-30", dec!(1), dec!(1));
        row.fiscal_year = Some(serde_json::json!("2024"));

        let statements = assemble_statements("ABC.L", &[row], &[], None);
        assert_eq!(
            statements[0].period,
            FiscalPeriod::Quarter(QuarterIndex::new(2024, 1).unwrap())
        );
    }

    #[test]
    fn unreadable_dates_are_dropped() {
        let income = vec![
            income_row("Q4", "not-a-date", dec!(1), dec!(1)),
            income_row("Q3", "2023-09-30T00:00:00", dec!(2), dec!(2)),
        ];
        let statements = assemble_statements("ABC.L", &income, &[], None);
        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].period_end, NaiveDate::from_ymd_opt(2023, 9, 30).unwrap());
    }

    #[test]
    fn total_equity_preferred_over_stockholders_equity() {
        let mut row = balance_row("FY", "2023-12-31", dec!(10), dec!(99));
        row.total_equity = Some(dec!(20));
        let statements = assemble_statements("ABC.L", &[], &[row], None);
        assert_eq!(statements[0].total_equity, Some(dec!(20)));
    }
}
