use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::collections::HashMap;

// Using `#[serde(rename_all = "camelCase")]` to automatically map from JSON camelCase to Rust snake_case.
// Every payload nests its rows several levels deep; each level is optional so that a
// missing branch reads as "no rows" rather than a parse failure.

/// A `{ "data": [...] }` wrapper used by every endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct DataList<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

/// `GET /api/v1/symbols`
#[derive(Debug, Clone, Deserialize)]
pub struct SymbolsResponse {
    #[serde(default)]
    pub symbols: Vec<String>,
}

/// `GET /api/v1/general/{symbol}`
#[derive(Debug, Clone, Deserialize)]
pub struct GeneralResponse {
    pub fundamentals: Option<GeneralFundamentals>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneralFundamentals {
    pub profile: Option<DataList<CompanyProfile>>,
}

/// The company profile, used to decide which industry a symbol belongs to.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfile {
    pub symbol: Option<String>,
    pub company_name: Option<String>,
    pub industry: Option<String>,
    pub sector: Option<String>,
    pub price: Option<Decimal>,
}

/// `GET /api/v1/eod/{symbol}`
#[derive(Debug, Clone, Deserialize)]
pub struct EodResponse {
    pub stockprice: Option<DataList<EodRow>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EodRow {
    pub date: Option<String>,
    pub close: Option<Decimal>,
}

/// `GET /api/v1/financials/{symbol}/{statement}`
#[derive(Debug, Clone, Deserialize)]
pub struct FinancialsResponse {
    pub fundamentals: Option<FinancialsNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FinancialsNode {
    /// Keyed by statement name, e.g. `income_statement`.
    pub financials: Option<HashMap<String, DataList<StatementRow>>>,
}

/// One row of an income statement or balance sheet. Only the fields the pipeline
/// reads are declared; the feed carries many more.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementRow {
    pub date: Option<String>,
    /// `Q1`..`Q4` or `FY`.
    pub period: Option<String>,
    /// Reported either as a number or as a string, depending on the filing.
    pub calendar_year: Option<JsonValue>,
    pub fiscal_year: Option<JsonValue>,

    // Income statement
    pub revenue: Option<Decimal>,
    pub net_income: Option<Decimal>,
    pub weighted_average_shs_out: Option<Decimal>,
    pub weighted_average_shs_out_dil: Option<Decimal>,

    // Balance sheet
    pub total_debt: Option<Decimal>,
    pub total_equity: Option<Decimal>,
    pub total_stockholders_equity: Option<Decimal>,
}

impl StatementRow {
    /// The fiscal year the row reports, if the feed states it explicitly.
    pub fn reported_fiscal_year(&self) -> Option<i32> {
        [&self.fiscal_year, &self.calendar_year]
            .into_iter()
            .flatten()
            .find_map(|value| match value {
                JsonValue::Number(n) => n.as_i64().and_then(|y| i32::try_from(y).ok()),
                JsonValue::String(s) => s.trim().parse().ok(),
                _ => None,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fiscal_year_accepts_numbers_and_strings() {
        let row: StatementRow =
            serde_json::from_str(r#"{"date":"2023-12-31","period":"Q4","calendarYear":"2023"}"#).unwrap();
        assert_eq!(row.reported_fiscal_year(), Some(2023));

        let row: StatementRow = serde_json::from_str(r#"{"fiscalYear":2024,"calendarYear":"2023"}"#).unwrap();
        assert_eq!(row.reported_fiscal_year(), Some(2024));

        let row: StatementRow = serde_json::from_str(r#"{"calendarYear":null}"#).unwrap();
        assert_eq!(row.reported_fiscal_year(), None);
    }
}
