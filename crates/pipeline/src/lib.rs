//! # Fundamentals Pipeline
//!
//! Orchestrates one ETL run: it asks the `ApiClient` which symbols belong to the target
//! industries, turns each one into `TickerMetrics` with the analytics crate, rolls them
//! up per industry and hands both record shapes to a `MetricsSink`.
//!
//! Failures of individual tickers are collected into the `RunReport` and never stop the
//! run; only an unhealthy API, an unreadable symbol list, a target industry no company
//! profile names, or a failing sink does.

pub mod error;
pub mod report;
pub mod runner;
pub mod sink;

pub use error::PipelineError;
pub use report::{IndustryReport, RunReport, TickerFailure};
pub use runner::PipelineRunner;
pub use sink::MetricsSink;
