use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;
pub mod telemetry;

// Re-export the core types to provide a clean public API.
pub use settings::{ApiConfig, Config, DashboardConfig, LoggingConfig, StorageConfig};
pub use telemetry::init_tracing;

/// Prefix for environment overrides, e.g. `CRYPTOPULSE_API__PAGE_SIZE=20`.
const ENV_PREFIX: &str = "CRYPTOPULSE";

/// Loads the application configuration.
///
/// Sources, lowest precedence first: built-in defaults, an optional `config.toml`
/// in the working directory, then `CRYPTOPULSE_*` environment variables.
pub fn load_config() -> Result<Config, ConfigError> {
    build(config::File::with_name("config").required(false))
}

/// Loads the configuration from a specific file, which must exist.
pub fn load_config_from(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    build(config::File::from(path.as_ref()).required(true))
}

fn build<S>(file: S) -> Result<Config, ConfigError>
where
    S: config::Source + Send + Sync + 'static,
{
    let builder = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    // Missing sections fall back to `Default` through `#[serde(default)]`.
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    Ok(config)
}
