use crate::error::ConfigError;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// CoinGecko caps `per_page` on the markets listing at this value.
const MAX_PAGE_SIZE: u32 = 250;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub dashboard: DashboardConfig,
    pub logging: LoggingConfig,
}

/// Settings for the upstream market-data API.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the API, without a trailing slash.
    pub base_url: String,
    /// The quote currency prices are expressed in (e.g., "usd").
    pub vs_currency: String,
    /// How many coins to request; this is also the size of every snapshot.
    pub page_size: u32,
    /// Upper bound on the whole request. Expiry counts as a network error.
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

/// Where snapshots and analysis results live on disk.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub raw_dir: PathBuf,
    pub processed_dir: PathBuf,
    /// Number of snapshot files kept after each fetch.
    pub retention: usize,
}

/// Settings for the terminal dashboard and its update trigger.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// JSON file holding the current page, chart metric and favorites.
    pub state_file: PathBuf,
    /// Present while an update is running.
    pub lock_file: PathBuf,
    /// A lock file older than this is considered abandoned.
    #[serde(with = "humantime_serde")]
    pub stale_lock_after: Duration,
    /// Overrides for the pipeline executables. By default they are looked up
    /// next to the running binary.
    pub fetcher_bin: Option<PathBuf>,
    pub analyzer_bin: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence when set.
    pub level: String,
    /// When set, logs are also written to daily-rotated files in this directory.
    pub directory: Option<PathBuf>,
}

// --- Default Implementations ---
// These allow any section (or the whole config.toml) to be omitted.

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.coingecko.com/api/v3".to_string(),
            vs_currency: "usd".to_string(),
            page_size: 10,
            timeout: Duration::from_secs(15),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            raw_dir: PathBuf::from("data/raw"),
            processed_dir: PathBuf::from("data/processed"),
            retention: 5,
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            state_file: PathBuf::from("data/dashboard_state.json"),
            lock_file: PathBuf::from("data/.update.lock"),
            stale_lock_after: Duration::from_secs(10 * 60),
            fetcher_bin: None,
            analyzer_bin: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

impl Config {
    /// Rejects values the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.page_size == 0 || self.api.page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::ValidationError(format!(
                "api.page_size must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, self.api.page_size
            )));
        }
        if self.api.vs_currency.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "api.vs_currency must not be empty".to_string(),
            ));
        }
        if self.api.timeout.is_zero() {
            return Err(ConfigError::ValidationError(
                "api.timeout must be greater than zero".to_string(),
            ));
        }
        if self.storage.retention == 0 {
            return Err(ConfigError::ValidationError(
                "storage.retention must keep at least one snapshot".to_string(),
            ));
        }
        Ok(())
    }
}
