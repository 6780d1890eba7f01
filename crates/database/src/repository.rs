use crate::DbError;
use chrono::{DateTime, Utc};
use core_types::{IndustryAggregate, TickerMetrics};
use rust_decimal::Decimal;
use sqlx::postgres::PgPool;
use sqlx::FromRow;

/// The `DbRepository` provides a high-level, application-specific interface
/// to the database. It encapsulates all SQL queries and data access logic.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: PgPool,
}

/// A row of the `ticker_statistics` table.
#[derive(Debug, Clone, FromRow)]
pub struct DbTickerStatistic {
    pub symbol: String,
    pub industry: String,
    pub pe_ratio: Option<Decimal>,
    pub revenue_growth: Option<Decimal>,
    pub net_income_ttm: Option<Decimal>,
    pub debt_ratio: Option<Decimal>,
    pub latest_quarter_revenue: Option<Decimal>,
    pub computed_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A row of the `industry_aggregations` table.
#[derive(Debug, Clone, FromRow)]
pub struct DbIndustryAggregation {
    pub industry: String,
    pub avg_pe_ratio: Option<Decimal>,
    pub pe_ratio_count: i32,
    pub avg_revenue_growth: Option<Decimal>,
    pub revenue_growth_count: i32,
    pub sum_revenue: Option<Decimal>,
    pub revenue_count: i32,
    pub ticker_count: i32,
    pub updated_at: DateTime<Utc>,
}

impl From<DbTickerStatistic> for TickerMetrics {
    fn from(row: DbTickerStatistic) -> Self {
        TickerMetrics {
            ticker: row.symbol,
            industry: row.industry,
            pe_ratio: row.pe_ratio,
            revenue_growth: row.revenue_growth,
            net_income_ttm: row.net_income_ttm,
            debt_ratio: row.debt_ratio,
            latest_quarter_revenue: row.latest_quarter_revenue,
            computed_at: row.computed_at,
        }
    }
}

impl From<DbIndustryAggregation> for IndustryAggregate {
    fn from(row: DbIndustryAggregation) -> Self {
        IndustryAggregate {
            industry: row.industry,
            avg_pe_ratio: row.avg_pe_ratio,
            pe_ratio_count: count_from_db(row.pe_ratio_count),
            avg_revenue_growth: row.avg_revenue_growth,
            revenue_growth_count: count_from_db(row.revenue_growth_count),
            sum_revenue: row.sum_revenue,
            revenue_count: count_from_db(row.revenue_count),
            ticker_count: count_from_db(row.ticker_count),
        }
    }
}

fn count_from_db(value: i32) -> usize {
    usize::try_from(value).unwrap_or(0)
}

fn count_to_db(column: &'static str, value: usize) -> Result<i32, DbError> {
    i32::try_from(value).map_err(|e| DbError::OutOfRange(column, e.to_string()))
}

impl DbRepository {
    /// Creates a new `DbRepository` with a shared database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts or replaces the metrics of one ticker.
    /// Uses `ON CONFLICT (symbol) DO UPDATE` so a re-run overwrites the previous values,
    /// including resetting a metric to NULL when it can no longer be computed.
    pub async fn upsert_ticker_metrics(&self, metrics: &TickerMetrics) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT INTO ticker_statistics (
                symbol, industry, pe_ratio, revenue_growth, net_income_ttm, debt_ratio,
                latest_quarter_revenue, computed_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (symbol) DO UPDATE SET
                industry = EXCLUDED.industry,
                pe_ratio = EXCLUDED.pe_ratio,
                revenue_growth = EXCLUDED.revenue_growth,
                net_income_ttm = EXCLUDED.net_income_ttm,
                debt_ratio = EXCLUDED.debt_ratio,
                latest_quarter_revenue = EXCLUDED.latest_quarter_revenue,
                computed_at = EXCLUDED.computed_at,
                updated_at = NOW()
            "#,
        )
        .bind(&metrics.ticker)
        .bind(&metrics.industry)
        .bind(metrics.pe_ratio)
        .bind(metrics.revenue_growth)
        .bind(metrics.net_income_ttm)
        .bind(metrics.debt_ratio)
        .bind(metrics.latest_quarter_revenue)
        .bind(metrics.computed_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Inserts or replaces the aggregate of one industry.
    pub async fn upsert_industry_aggregate(
        &self,
        aggregate: &IndustryAggregate,
    ) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT INTO industry_aggregations (
                industry, avg_pe_ratio, pe_ratio_count, avg_revenue_growth, revenue_growth_count,
                sum_revenue, revenue_count, ticker_count
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (industry) DO UPDATE SET
                avg_pe_ratio = EXCLUDED.avg_pe_ratio,
                pe_ratio_count = EXCLUDED.pe_ratio_count,
                avg_revenue_growth = EXCLUDED.avg_revenue_growth,
                revenue_growth_count = EXCLUDED.revenue_growth_count,
                sum_revenue = EXCLUDED.sum_revenue,
                revenue_count = EXCLUDED.revenue_count,
                ticker_count = EXCLUDED.ticker_count,
                updated_at = NOW()
            "#,
        )
        .bind(&aggregate.industry)
        .bind(aggregate.avg_pe_ratio)
        .bind(count_to_db("pe_ratio_count", aggregate.pe_ratio_count)?)
        .bind(aggregate.avg_revenue_growth)
        .bind(count_to_db("revenue_growth_count", aggregate.revenue_growth_count)?)
        .bind(aggregate.sum_revenue)
        .bind(count_to_db("revenue_count", aggregate.revenue_count)?)
        .bind(count_to_db("ticker_count", aggregate.ticker_count)?)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Fetches every stored industry aggregate, ordered by industry name.
    pub async fn get_industry_aggregates(&self) -> Result<Vec<DbIndustryAggregation>, DbError> {
        let rows = sqlx::query_as::<_, DbIndustryAggregation>(
            r#"
            SELECT industry, avg_pe_ratio, pe_ratio_count, avg_revenue_growth, revenue_growth_count,
                   sum_revenue, revenue_count, ticker_count, updated_at
            FROM industry_aggregations
            ORDER BY industry ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Fetches the stored ticker metrics of one industry, ordered by symbol.
    pub async fn get_ticker_metrics_for_industry(
        &self,
        industry: &str,
    ) -> Result<Vec<DbTickerStatistic>, DbError> {
        let rows = sqlx::query_as::<_, DbTickerStatistic>(
            r#"
            SELECT symbol, industry, pe_ratio, revenue_growth, net_income_ttm, debt_ratio,
                   latest_quarter_revenue, computed_at, updated_at
            FROM ticker_statistics
            WHERE industry = $1
            ORDER BY symbol ASC
            "#,
        )
        .bind(industry)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
