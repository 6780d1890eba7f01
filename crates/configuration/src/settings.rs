use crate::error::ConfigError;
use serde::{Deserialize, Deserializer};
use std::collections::HashSet;

pub const DEFAULT_BASE_URL: &str = "https://api.test.fiindo.com";

pub const DEFAULT_TARGET_INDUSTRIES: [&str; 3] = [
    "Banks - Diversified",
    "Software - Application",
    "Consumer Electronics",
];

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Connection and identity settings for the financial data API.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// First half of the bearer identity (`Bearer {first_name}.{last_name}`).
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    /// Per-request timeout enforced by the HTTP client.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Parameters that steer a pipeline run.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Industries to process. Accepts a TOML list or a comma-separated string.
    #[serde(
        default = "default_target_industries",
        deserialize_with = "deserialize_industries"
    )]
    pub target_industries: Vec<String>,
    /// Upper bound on in-flight API requests during a run.
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,
    #[serde(default = "default_show_progress")]
    pub show_progress: bool,
}

/// Settings for the PostgreSQL sink.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// An `EnvFilter` directive, e.g. `info` or `pipeline=debug,info`.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<String>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_target_industries() -> Vec<String> {
    DEFAULT_TARGET_INDUSTRIES.iter().map(|s| s.to_string()).collect()
}
fn default_max_concurrent_requests() -> usize {
    8
}
fn default_show_progress() -> bool {
    true
}
fn default_max_connections() -> u32 {
    5
}
fn default_acquire_timeout_secs() -> u64 {
    5
}
fn default_log_level() -> String {
    "info".to_string()
}

// --- Default Implementations ---
// These mirror the serde defaults so an empty file still produces a usable config.

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            first_name: String::new(),
            last_name: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            target_industries: default_target_industries(),
            max_concurrent_requests: default_max_concurrent_requests(),
            show_progress: default_show_progress(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout_secs(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IndustryList {
    List(Vec<String>),
    Csv(String),
}

/// Accepts both `["A", "B"]` and `"A,B"`, trimming entries and dropping blanks.
fn deserialize_industries<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = match IndustryList::deserialize(deserializer)? {
        IndustryList::List(items) => items,
        IndustryList::Csv(line) => line.split(',').map(str::to_string).collect(),
    };
    Ok(raw
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect())
}

impl Config {
    /// Checks the invariants the pipeline relies on. Called once at startup, before
    /// any request is made. The API identity is checked separately by the commands
    /// that call the API, see [`ApiConfig::require_identity`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pipeline.target_industries.is_empty() {
            return Err(ConfigError::ValidationError(
                "at least one target industry must be configured".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for industry in &self.pipeline.target_industries {
            if industry.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "target industry names must not be blank".to_string(),
                ));
            }
            if !seen.insert(industry.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "target industry '{industry}' is listed more than once"
                )));
            }
        }
        if self.pipeline.max_concurrent_requests == 0 {
            return Err(ConfigError::ValidationError(
                "max_concurrent_requests must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl ApiConfig {
    /// Both halves of the bearer identity, required only by commands that call the API.
    pub fn require_identity(&self) -> Result<(), ConfigError> {
        if self.first_name.trim().is_empty() || self.last_name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "API identity is incomplete: FIRST_NAME and LAST_NAME must both be set".to_string(),
            ));
        }
        Ok(())
    }
}

impl DatabaseConfig {
    /// The connection string, required only by commands that touch the database.
    pub fn url(&self) -> Result<&str, ConfigError> {
        self.url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| ConfigError::ValidationError("DATABASE_URL must be set".to_string()))
    }
}
