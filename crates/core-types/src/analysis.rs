use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How many of the highest-change coins an `AnalysisResult` reports.
pub const TOP_MOVERS: usize = 3;

/// A coin referenced by name together with its 24h change percentage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mover {
    pub name: String,
    pub change: Decimal,
}

impl Mover {
    pub fn new(name: impl Into<String>, change: Decimal) -> Self {
        Self {
            name: name.into(),
            change,
        }
    }
}

/// Summary statistics derived from exactly one snapshot.
///
/// Only one of these exists at any time; every analysis run replaces the previous one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// The coin with the highest 24h change.
    pub best: Mover,
    /// The coin with the lowest 24h change.
    pub worst: Mover,
    /// Unweighted mean of every 24h change in the snapshot.
    pub average_change: Decimal,
    /// The `TOP_MOVERS` highest-change coins, in descending order.
    pub top_movers: Vec<Mover>,
    /// Coins with a strictly positive change.
    pub coins_up: usize,
    /// Coins with a strictly negative change.
    pub coins_down: usize,
    /// Wall-clock time at which the analysis ran, not the capture time of the snapshot.
    pub generated_at: DateTime<Utc>,
}
