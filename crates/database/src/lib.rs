//! # Fundamentals Database Crate
//!
//! This crate is the PostgreSQL sink of the ETL. It stores the latest metrics of every
//! processed ticker and the latest aggregate of every processed industry.
//!
//! ## Architectural Principles
//!
//! - **Adapter:** All SQL lives here. The rest of the workspace sees `DbRepository`
//!   methods that take and return `core-types` records.
//! - **Idempotent Writes:** Both tables are keyed by their natural key (symbol,
//!   industry) and written with upserts, so re-running the pipeline replaces values
//!   instead of duplicating rows.
//! - **Asynchronous & Pooled:** All operations are asynchronous and share one `PgPool`.
//!
//! ## Public API
//!
//! - `connect`: Builds the connection pool from `DatabaseConfig`.
//! - `run_migrations`: Applies the embedded migrations in `./migrations`.
//! - `DbRepository`: Upserts and read-side queries for both tables.
//! - `DbError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod repository;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, run_migrations};
pub use error::DbError;
pub use repository::{DbIndustryAggregation, DbRepository, DbTickerStatistic};
