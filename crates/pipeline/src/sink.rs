use crate::error::PipelineError;
use async_trait::async_trait;
use core_types::{IndustryAggregate, TickerMetrics};
use database::DbRepository;

/// Where the results of a run are written.
#[async_trait]
pub trait MetricsSink: Send + Sync {
    async fn save_ticker_metrics(&self, metrics: &TickerMetrics) -> Result<(), PipelineError>;

    async fn save_industry_aggregate(
        &self,
        aggregate: &IndustryAggregate,
    ) -> Result<(), PipelineError>;
}

#[async_trait]
impl MetricsSink for DbRepository {
    async fn save_ticker_metrics(&self, metrics: &TickerMetrics) -> Result<(), PipelineError> {
        self.upsert_ticker_metrics(metrics).await?;
        Ok(())
    }

    async fn save_industry_aggregate(
        &self,
        aggregate: &IndustryAggregate,
    ) -> Result<(), PipelineError> {
        self.upsert_industry_aggregate(aggregate).await?;
        Ok(())
    }
}
