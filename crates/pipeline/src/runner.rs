use crate::error::PipelineError;
use crate::report::{IndustryReport, RunReport, TickerFailure};
use crate::sink::MetricsSink;
use analytics::{IndustryAggregator, TickerProcessor};
use api_client::{fetch_financial_statements, ApiClient};
use chrono::Utc;
use configuration::Config;
use core_types::TickerMetrics;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// A symbol whose profile places it in one of the target industries.
#[derive(Debug, Clone)]
struct ResolvedTicker {
    symbol: String,
    /// The profile price, used when no end-of-day close is available.
    profile_price: Option<Decimal>,
}

/// Drives a complete ETL run: health check, ticker resolution, per-ticker processing,
/// industry aggregation and persistence.
///
/// The runner holds no derivation logic of its own. It only sequences the API client,
/// the `TickerProcessor`, the `IndustryAggregator` and the sink.
pub struct PipelineRunner {
    config: Config,
    client: Arc<dyn ApiClient>,
    sink: Arc<dyn MetricsSink>,
    processor: TickerProcessor,
    aggregator: IndustryAggregator,
}

impl PipelineRunner {
    pub fn new(config: Config, client: Arc<dyn ApiClient>, sink: Arc<dyn MetricsSink>) -> Self {
        Self {
            config,
            client,
            sink,
            processor: TickerProcessor::new(),
            aggregator: IndustryAggregator::new(),
        }
    }

    /// Replaces the default processor, e.g. with one on a fixed clock.
    pub fn with_processor(mut self, processor: TickerProcessor) -> Self {
        self.processor = processor;
        self
    }

    /// Runs the pipeline over every configured industry.
    ///
    /// Per-ticker failures are collected in the report and never abort the run. An
    /// unhealthy API, an unreadable symbol list, a target industry that no company
    /// profile names, or a sink error is fatal.
    pub async fn run(&self) -> Result<RunReport, PipelineError> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!(%run_id, industries = ?self.config.pipeline.target_industries, "Starting pipeline run");

        let health = self
            .client
            .health_check()
            .await
            .map_err(PipelineError::Unhealthy)?;
        info!(%health, "API is healthy");

        let (mut by_industry, unresolved) = self.resolve_tickers().await?;

        let unknown: Vec<String> = self
            .config
            .pipeline
            .target_industries
            .iter()
            .filter(|industry| !by_industry.contains_key(*industry))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            error!(industries = ?unknown, "No company profile matches these industries");
            return Err(PipelineError::UnknownIndustry(unknown));
        }

        let mut industries = Vec::with_capacity(self.config.pipeline.target_industries.len());
        for industry in &self.config.pipeline.target_industries {
            let tickers = by_industry.remove(industry).unwrap_or_default();
            let report = self.run_industry(industry, &tickers).await?;
            industries.push(report);
        }

        let report = RunReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            industries,
            unresolved,
        };
        info!(
            %run_id,
            succeeded = report.succeeded_count(),
            failed = report.failed_count(),
            unresolved = report.unresolved.len(),
            "Pipeline run complete"
        );
        Ok(report)
    }

    /// Maps every known symbol to its industry and keeps the ones in a target industry.
    async fn resolve_tickers(
        &self,
    ) -> Result<(HashMap<String, Vec<ResolvedTicker>>, Vec<TickerFailure>), PipelineError> {
        let mut symbols = self
            .client
            .fetch_symbols()
            .await
            .map_err(PipelineError::Symbols)?;
        symbols.sort();
        symbols.dedup();
        info!(symbols = symbols.len(), "Resolving industries from company profiles");

        let progress_bar = self.progress_bar(symbols.len(), "profiles")?;
        let client = self.client.as_ref();
        let lookups: Vec<_> = stream::iter(symbols)
            .map(|symbol| {
                let progress_bar = progress_bar.clone();
                async move {
                    let profile = client.fetch_profile(&symbol).await;
                    progress_bar.inc(1);
                    (symbol, profile)
                }
            })
            .buffer_unordered(self.config.pipeline.max_concurrent_requests)
            .collect()
            .await;
        progress_bar.finish_and_clear();

        let mut by_industry: HashMap<String, Vec<ResolvedTicker>> = HashMap::new();
        let mut unresolved = Vec::new();
        for (symbol, lookup) in lookups {
            match lookup {
                Ok(Some(profile)) => {
                    let Some(industry) = profile.industry.as_deref().map(str::trim) else {
                        continue;
                    };
                    if self.config.pipeline.target_industries.iter().any(|t| t == industry) {
                        by_industry
                            .entry(industry.to_string())
                            .or_default()
                            .push(ResolvedTicker {
                                symbol,
                                profile_price: profile.price,
                            });
                    }
                }
                Ok(None) => debug!(ticker = %symbol, "no profile, skipping"),
                Err(e) => {
                    warn!(ticker = %symbol, error = %e, "profile lookup failed");
                    unresolved.push(TickerFailure {
                        ticker: symbol,
                        reason: e.to_string(),
                    });
                }
            }
        }

        for tickers in by_industry.values_mut() {
            tickers.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        }
        unresolved.sort_by(|a, b| a.ticker.cmp(&b.ticker));
        Ok((by_industry, unresolved))
    }

    async fn run_industry(
        &self,
        industry: &str,
        tickers: &[ResolvedTicker],
    ) -> Result<IndustryReport, PipelineError> {
        info!(industry, tickers = tickers.len(), "Processing industry");

        let progress_bar = self.progress_bar(tickers.len(), industry)?;
        let results: Vec<Result<TickerMetrics, TickerFailure>> = stream::iter(tickers)
            .map(|ticker| {
                let progress_bar = progress_bar.clone();
                async move {
                    let result = self.process_ticker(industry, ticker).await;
                    progress_bar.inc(1);
                    result
                }
            })
            .buffer_unordered(self.config.pipeline.max_concurrent_requests)
            .collect()
            .await;
        progress_bar.finish_and_clear();

        let (mut succeeded, mut failed): (Vec<_>, Vec<_>) = (Vec::new(), Vec::new());
        for result in results {
            match result {
                Ok(metrics) => succeeded.push(metrics),
                Err(failure) => failed.push(failure),
            }
        }
        succeeded.sort_by(|a, b| a.ticker.cmp(&b.ticker));
        failed.sort_by(|a, b| a.ticker.cmp(&b.ticker));

        let aggregate = self.aggregator.aggregate(industry, &succeeded);

        for metrics in &succeeded {
            self.sink.save_ticker_metrics(metrics).await?;
        }
        self.sink.save_industry_aggregate(&aggregate).await?;

        info!(
            industry,
            succeeded = succeeded.len(),
            failed = failed.len(),
            avg_pe_ratio = ?aggregate.avg_pe_ratio,
            avg_revenue_growth = ?aggregate.avg_revenue_growth,
            sum_revenue = ?aggregate.sum_revenue,
            "Industry complete"
        );

        Ok(IndustryReport {
            industry: industry.to_string(),
            succeeded,
            failed,
            aggregate,
        })
    }

    async fn process_ticker(
        &self,
        industry: &str,
        ticker: &ResolvedTicker,
    ) -> Result<TickerMetrics, TickerFailure> {
        let failure = |reason: String| {
            warn!(ticker = %ticker.symbol, %reason, "ticker failed");
            TickerFailure {
                ticker: ticker.symbol.clone(),
                reason,
            }
        };

        let statements =
            fetch_financial_statements(self.client.as_ref(), &ticker.symbol, ticker.profile_price)
                .await
                .map_err(|e| failure(e.to_string()))?;
        if statements.is_empty() {
            return Err(failure("no financial statements".to_string()));
        }

        Ok(self.processor.process(&ticker.symbol, industry, &statements))
    }

    fn progress_bar(&self, len: usize, label: &str) -> Result<ProgressBar, PipelineError> {
        if !self.config.pipeline.show_progress {
            return Ok(ProgressBar::hidden());
        }
        let progress_bar = ProgressBar::new(len as u64);
        progress_bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} {prefix} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}")?
                .progress_chars("=>-"),
        );
        progress_bar.set_prefix(label.to_string());
        Ok(progress_bar)
    }
}
