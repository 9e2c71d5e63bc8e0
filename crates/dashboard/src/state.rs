use crate::error::DashboardError;
use core_types::CoinRecord;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// The dashboard pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum Page {
    /// Summary cards from the analysis result.
    #[default]
    Overview,
    /// One bar per coin for the selected metric.
    Charts,
    /// Every column of the latest snapshot.
    Table,
}

/// The value plotted on the charts page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum ChartMetric {
    #[default]
    Change24h,
    MarketCap,
    Volume,
}

impl ChartMetric {
    pub fn label(&self) -> &'static str {
        match self {
            ChartMetric::Change24h => "24h Change (%)",
            ChartMetric::MarketCap => "Market Cap",
            ChartMetric::Volume => "Total Volume",
        }
    }

    pub fn value(&self, record: &CoinRecord) -> Option<Decimal> {
        match self {
            ChartMetric::Change24h => record.price_change_percentage_24h,
            ChartMetric::MarketCap => record.market_cap,
            ChartMetric::Volume => record.total_volume,
        }
    }
}

/// Everything the dashboard remembers between invocations.
///
/// Owned by the presentation layer only; the pipeline never reads it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardState {
    pub page: Page,
    pub chart_metric: ChartMetric,
    /// Coin ids marked as favorites.
    pub favorites: BTreeSet<String>,
    /// When set, every view shows favorites only.
    pub favorites_only: bool,
}

impl DashboardState {
    /// Loads the state file, or the default state if there is none yet.
    pub fn load(path: &Path) -> Result<Self, DashboardError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path).map_err(DashboardError::io(path))?;
        serde_json::from_str(&contents).map_err(|source| DashboardError::State {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), DashboardError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(DashboardError::io(parent))?;
        }
        let contents = serde_json::to_string_pretty(self).map_err(|source| {
            DashboardError::State {
                path: path.to_path_buf(),
                source,
            }
        })?;
        fs::write(path, contents).map_err(DashboardError::io(path))
    }

    /// Returns `false` if the coin was already a favorite.
    pub fn add_favorite(&mut self, id: impl Into<String>) -> bool {
        self.favorites.insert(id.into())
    }

    /// Returns `false` if the coin was not a favorite.
    pub fn remove_favorite(&mut self, id: &str) -> bool {
        self.favorites.remove(id)
    }

    pub fn is_favorite(&self, record: &CoinRecord) -> bool {
        record
            .id
            .as_deref()
            .is_some_and(|id| self.favorites.contains(id))
    }

    /// The records the current filter lets through, in snapshot order.
    pub fn visible<'a>(&self, records: &'a [CoinRecord]) -> Vec<&'a CoinRecord> {
        records
            .iter()
            .filter(|r| !self.favorites_only || self.is_favorite(r))
            .collect()
    }
}
