use anyhow::Context;
use api_client::{ApiClient, FiindoClient};
use clap::{Parser, Subcommand};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use configuration::{init_tracing, load_config_from, CliOverrides, Config};
use core_types::{IndustryAggregate, TickerMetrics};
use database::connection::{connect, run_migrations};
use database::repository::DbRepository;
use pipeline::{PipelineRunner, RunReport};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;

/// The main entry point for the fundamentals ETL.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; the variables may come from the real environment.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let config = load_config_from(&cli.overrides.config)
        .with_context(|| format!("Failed to load {}", cli.overrides.config.display()))?;
    let config = cli.overrides.apply(config)?;
    // Held until exit so buffered file logs are flushed.
    let _log_guard = init_tracing(&config.logging)?;

    // Execute the appropriate command
    match cli.command {
        Commands::Run => handle_run(config).await,
        Commands::Health => handle_health(&config).await,
        Commands::Show { tickers } => handle_show(&config, tickers).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Extracts company fundamentals, derives per-ticker metrics and stores industry aggregates.
#[derive(Parser)]
#[command(name = "fundamentals-etl", author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    overrides: CliOverrides,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline and persist the results.
    Run,
    /// Only check that the financial data API is reachable.
    Health,
    /// Print the industry aggregates stored by previous runs. Needs only the database.
    Show {
        /// Also list the stored metrics of every ticker.
        #[arg(long)]
        tickers: bool,
    },
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn handle_run(config: Config) -> anyhow::Result<()> {
    config.api.require_identity()?;
    let client = Arc::new(FiindoClient::new(&config.api)?);

    let pool = connect(&config.database)
        .await
        .context("Failed to connect to the database")?;
    run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    let repository = Arc::new(DbRepository::new(pool));

    let runner = PipelineRunner::new(config, client, repository);
    let report = runner.run().await?;

    print_run_report(&report);
    Ok(())
}

async fn handle_health(config: &Config) -> anyhow::Result<()> {
    config.api.require_identity()?;
    let client = FiindoClient::new(&config.api)?;
    let message = client.health_check().await?;
    info!(%message, "API health check passed");
    println!("{message}");
    Ok(())
}

async fn handle_show(config: &Config, with_tickers: bool) -> anyhow::Result<()> {
    let pool = connect(&config.database)
        .await
        .context("Failed to connect to the database")?;
    run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    let repository = DbRepository::new(pool);

    let aggregates: Vec<IndustryAggregate> = repository
        .get_industry_aggregates()
        .await?
        .into_iter()
        .map(IndustryAggregate::from)
        .collect();
    if aggregates.is_empty() {
        println!("No industry aggregates stored yet. Run `fundamentals-etl run` first.");
        return Ok(());
    }
    println!("{}", aggregate_table(&aggregates));

    if with_tickers {
        for aggregate in &aggregates {
            let metrics: Vec<TickerMetrics> = repository
                .get_ticker_metrics_for_industry(&aggregate.industry)
                .await?
                .into_iter()
                .map(TickerMetrics::from)
                .collect();
            println!("\n{}", aggregate.industry);
            println!("{}", ticker_table(&metrics));
        }
    }
    Ok(())
}

// ==============================================================================
// Output
// ==============================================================================

fn print_run_report(report: &RunReport) {
    println!(
        "Run {} finished in {}s: {} tickers processed, {} failed, {} unresolved.",
        report.run_id,
        (report.finished_at - report.started_at).num_seconds(),
        report.succeeded_count(),
        report.failed_count(),
        report.unresolved.len()
    );

    let aggregates: Vec<IndustryAggregate> =
        report.industries.iter().map(|i| i.aggregate.clone()).collect();
    println!("{}", aggregate_table(&aggregates));

    let failures: Vec<_> = report
        .industries
        .iter()
        .flat_map(|i| i.failed.iter())
        .chain(report.unresolved.iter())
        .collect();
    if !failures.is_empty() {
        let mut table = new_table();
        table.set_header(vec!["Ticker", "Reason"]);
        for failure in failures {
            table.add_row(vec![failure.ticker.clone(), failure.reason.clone()]);
        }
        println!("{table}");
    }
}

fn aggregate_table(aggregates: &[IndustryAggregate]) -> Table {
    let mut table = new_table();
    table.set_header(vec![
        "Industry",
        "Tickers",
        "Avg PE",
        "Avg Revenue Growth",
        "Sum Revenue",
    ]);
    for a in aggregates {
        table.add_row(vec![
            a.industry.clone(),
            a.ticker_count.to_string(),
            with_count(a.avg_pe_ratio, a.pe_ratio_count),
            with_count(a.avg_revenue_growth, a.revenue_growth_count),
            with_count(a.sum_revenue, a.revenue_count),
        ]);
    }
    table
}

fn ticker_table(metrics: &[TickerMetrics]) -> Table {
    let mut table = new_table();
    table.set_header(vec![
        "Ticker",
        "PE",
        "Revenue Growth",
        "Net Income TTM",
        "Debt Ratio",
        "Computed At",
    ]);
    for m in metrics {
        table.add_row(vec![
            m.ticker.clone(),
            fmt_decimal(m.pe_ratio),
            fmt_decimal(m.revenue_growth),
            fmt_decimal(m.net_income_ttm),
            fmt_decimal(m.debt_ratio),
            m.computed_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ]);
    }
    table
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn fmt_decimal(value: Option<Decimal>) -> String {
    value
        .map(|v| v.round_dp(4).normalize().to_string())
        .unwrap_or_else(|| "n/a".to_string())
}

fn with_count(value: Option<Decimal>, count: usize) -> String {
    format!("{} (n={count})", fmt_decimal(value))
}
