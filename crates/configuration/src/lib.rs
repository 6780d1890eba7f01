use crate::error::ConfigError;
use std::env;
use std::path::Path;

// Declare the modules that make up this crate.
#[cfg(feature = "clap")]
pub mod cli;
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
#[cfg(feature = "clap")]
pub use cli::CliOverrides;
pub use logging::init_tracing;
pub use settings::{
    ApiConfig, Config, DatabaseConfig, LoggingConfig, PipelineConfig, DEFAULT_TARGET_INDUSTRIES,
};

/// Flat variable names understood for compatibility with existing deployments.
const LEGACY_OVERRIDES: [(&str, &str); 4] = [
    ("FIRST_NAME", "api.first_name"),
    ("LAST_NAME", "api.last_name"),
    ("TARGET_INDUSTRIES", "pipeline.target_industries"),
    ("DATABASE_URL", "database.url"),
];

/// Loads the application configuration from the `config.toml` file and the environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(Path::new("config.toml"))
}

/// Loads and validates the configuration using `path` as the (optional) TOML file.
///
/// Sources, lowest precedence first: serde defaults, the file, `ETL__SECTION__KEY`
/// variables, then the flat `FIRST_NAME` / `LAST_NAME` / `TARGET_INDUSTRIES` /
/// `DATABASE_URL` variables.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    load_config_with(path, |key| env::var(key).ok())
}

/// Same as [`load_config_from`], with the flat variables read through `lookup`.
pub fn load_config_with<F>(path: &Path, lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut builder = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix("ETL")
                .prefix_separator("__")
                .separator("__"),
        );

    for (variable, key) in LEGACY_OVERRIDES {
        builder = builder.set_override_option(key, lookup(variable))?;
    }

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.build()?.try_deserialize::<Config>()?;
    config.validate()?;

    Ok(config)
}
