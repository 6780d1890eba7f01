//! # Fundamentals Analytics
//!
//! This crate is the transform stage of the ETL: it turns a ticker's raw financial
//! statements into `TickerMetrics`, and an industry's `TickerMetrics` into an
//! `IndustryAggregate`.
//!
//! ## Architectural Principles
//!
//! - **Pure Logic:** This crate has no knowledge of external systems. It depends only on
//!   `core-types`, performs no I/O and never returns an error. A metric that cannot be
//!   computed is `None`.
//! - **Stateless Calculation:** `select_periods`, the metric formulas and the
//!   `IndustryAggregator` are deterministic functions of their input. The only clock
//!   read goes through the `Clock` seam of `TickerProcessor`.
//!
//! ## Public API
//!
//! - `select_periods` / `SelectedPeriods`: picks the quarters and fiscal year each metric needs.
//! - `metrics`: PE ratio, revenue growth, trailing twelve month net income and debt ratio.
//! - `TickerProcessor`: selection plus calculation for one ticker.
//! - `IndustryAggregator`: per-industry means and sums with contributor counts.

// Declare the modules that constitute this crate.
pub mod aggregator;
pub mod metrics;
pub mod period;
pub mod processor;

// Re-export the key components to create a clean, public-facing API.
pub use aggregator::IndustryAggregator;
pub use metrics::CalculatedMetrics;
pub use period::{select_periods, SelectedPeriods, SkipReason, SkippedStatement};
pub use processor::{Clock, FixedClock, SystemClock, TickerProcessor};
