use chrono::{DateTime, Utc};
use core_types::{IndustryAggregate, TickerMetrics};
use uuid::Uuid;

/// A ticker that could not be processed, with a human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickerFailure {
    pub ticker: String,
    pub reason: String,
}

/// The outcome of one industry within a run.
#[derive(Debug, Clone)]
pub struct IndustryReport {
    pub industry: String,
    /// Sorted by ticker.
    pub succeeded: Vec<TickerMetrics>,
    /// Sorted by ticker. These tickers are excluded from the aggregate.
    pub failed: Vec<TickerFailure>,
    pub aggregate: IndustryAggregate,
}

/// The consolidated result of a pipeline run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// In configuration order.
    pub industries: Vec<IndustryReport>,
    /// Symbols whose profile lookup failed, so their industry is unknown.
    pub unresolved: Vec<TickerFailure>,
}

impl RunReport {
    pub fn succeeded_count(&self) -> usize {
        self.industries.iter().map(|i| i.succeeded.len()).sum()
    }

    pub fn failed_count(&self) -> usize {
        self.industries.iter().map(|i| i.failed.len()).sum()
    }

    pub fn industry(&self, name: &str) -> Option<&IndustryReport> {
        self.industries.iter().find(|i| i.industry == name)
    }
}
