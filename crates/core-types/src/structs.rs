use crate::enums::{FiscalPeriod, PeriodType};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One reported period for one ticker, as assembled from the upstream feed.
///
/// Every figure is optional: a field the feed did not report stays `None` and is
/// never replaced by zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialStatement {
    pub ticker: String,
    pub period: FiscalPeriod,
    pub period_end: NaiveDate,
    pub revenue: Option<Decimal>,
    pub net_income: Option<Decimal>,
    pub price: Option<Decimal>,
    pub shares_outstanding: Option<Decimal>,
    pub total_debt: Option<Decimal>,
    pub total_equity: Option<Decimal>,
}

impl FinancialStatement {
    /// Creates a statement with no reported figures.
    pub fn new(ticker: impl Into<String>, period: FiscalPeriod, period_end: NaiveDate) -> Self {
        Self {
            ticker: ticker.into(),
            period,
            period_end,
            revenue: None,
            net_income: None,
            price: None,
            shares_outstanding: None,
            total_debt: None,
            total_equity: None,
        }
    }

    /// The (period type, period end) pair that identifies a statement within one ticker.
    /// `None` for statements whose classification is undecidable.
    pub fn identity(&self) -> Option<(PeriodType, NaiveDate)> {
        self.period.period_type().map(|t| (t, self.period_end))
    }
}

/// The metrics derived for a single ticker in one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerMetrics {
    pub ticker: String,
    pub industry: String,
    pub pe_ratio: Option<Decimal>,
    pub revenue_growth: Option<Decimal>,
    pub net_income_ttm: Option<Decimal>,
    pub debt_ratio: Option<Decimal>,
    /// Revenue of the latest quarter, the input to the industry revenue sum.
    pub latest_quarter_revenue: Option<Decimal>,
    pub computed_at: DateTime<Utc>,
}

/// Industry-level statistics rolled up from that industry's ticker metrics.
///
/// Each average carries the number of tickers that actually contributed to it, since
/// tickers with a missing value are excluded per metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndustryAggregate {
    pub industry: String,
    pub avg_pe_ratio: Option<Decimal>,
    pub pe_ratio_count: usize,
    pub avg_revenue_growth: Option<Decimal>,
    pub revenue_growth_count: usize,
    pub sum_revenue: Option<Decimal>,
    pub revenue_count: usize,
    /// Every ticker handed to the aggregator for this industry.
    pub ticker_count: usize,
}
