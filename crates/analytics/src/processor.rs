use crate::metrics;
use crate::period::select_periods;
use chrono::{DateTime, Utc};
use core_types::{FinancialStatement, TickerMetrics};
use std::sync::Arc;
use tracing::debug;

/// Source of the `computed_at` timestamp stamped on every record.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Turns one ticker's statements into its `TickerMetrics` record.
///
/// Processing never fails: a metric whose inputs are missing is simply `None` on the
/// returned record.
#[derive(Clone)]
pub struct TickerProcessor {
    clock: Arc<dyn Clock>,
}

impl Default for TickerProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl TickerProcessor {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    pub fn process(
        &self,
        ticker: &str,
        industry: &str,
        statements: &[FinancialStatement],
    ) -> TickerMetrics {
        let selected = select_periods(statements);
        let calculated = metrics::calculate(&selected);

        debug!(
            ticker,
            statements = statements.len(),
            skipped = selected.skipped.len(),
            pe_ratio = ?calculated.pe_ratio,
            revenue_growth = ?calculated.revenue_growth,
            net_income_ttm = ?calculated.net_income_ttm,
            debt_ratio = ?calculated.debt_ratio,
            "computed ticker metrics"
        );

        TickerMetrics {
            ticker: ticker.to_string(),
            industry: industry.to_string(),
            pe_ratio: calculated.pe_ratio,
            revenue_growth: calculated.revenue_growth,
            net_income_ttm: calculated.net_income_ttm,
            debt_ratio: calculated.debt_ratio,
            latest_quarter_revenue: selected.latest_quarter.and_then(|q| q.revenue),
            computed_at: self.clock.now(),
        }
    }
}
