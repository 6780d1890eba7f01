use crate::error::ConfigError;
use crate::settings::Config;
use clap::Args;
use std::path::PathBuf;

/// Command-line switches that sit on top of the file and environment settings.
#[derive(Debug, Clone, Args)]
pub struct CliOverrides {
    /// Path to the TOML configuration file (optional on disk).
    #[arg(long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Restrict the run to this industry. Repeat to pass several.
    #[arg(long = "industry", value_name = "NAME")]
    pub industries: Vec<String>,

    /// Maximum number of API requests in flight at once.
    #[arg(long)]
    pub concurrency: Option<usize>,
}

impl CliOverrides {
    /// Applies the switches to a loaded configuration and re-validates the result.
    pub fn apply(&self, mut config: Config) -> Result<Config, ConfigError> {
        if !self.industries.is_empty() {
            config.pipeline.target_industries = self
                .industries
                .iter()
                .map(|s| s.trim().to_string())
                .collect();
        }
        if let Some(concurrency) = self.concurrency {
            config.pipeline.max_concurrent_requests = concurrency;
        }
        config.validate()?;
        Ok(config)
    }
}
