use crate::error::StorageError;
use chrono::{DateTime, NaiveDateTime, Utc};
use core_types::{AnalysisResult, Mover};
use csv::StringRecord;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Every snapshot file name starts with this prefix.
pub const SNAPSHOT_PREFIX: &str = "crypto_data_";
/// Snapshot and result files are CSV tables.
pub const CSV_EXTENSION: &str = "csv";
/// The one analysis result file, always overwritten.
pub const RESULT_FILE_NAME: &str = "crypto_analysis.csv";

/// Second precision keeps names lexicographically ordered by capture time.
const SNAPSHOT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Builds the file name of a snapshot captured at `captured_at`,
/// e.g. `crypto_data_2025-04-27_14-03-09.csv`.
pub fn snapshot_file_name(captured_at: DateTime<Utc>) -> String {
    format!(
        "{}{}.{}",
        SNAPSHOT_PREFIX,
        captured_at.format(SNAPSHOT_TIMESTAMP_FORMAT),
        CSV_EXTENSION
    )
}

/// The capture time encoded in a snapshot file name, if it carries one.
pub fn parse_snapshot_file_name(name: &str) -> Option<DateTime<Utc>> {
    let stamp = name
        .strip_prefix(SNAPSHOT_PREFIX)?
        .strip_suffix(CSV_EXTENSION)?
        .strip_suffix('.')?;
    NaiveDateTime::parse_from_str(stamp, SNAPSHOT_TIMESTAMP_FORMAT)
        .ok()
        .map(|t| t.and_utc())
}

/// True for names produced by `snapshot_file_name`. Temporary files are excluded.
pub fn is_snapshot_file_name(name: &str) -> bool {
    name.starts_with(SNAPSHOT_PREFIX)
        && Path::new(name)
            .extension()
            .is_some_and(|ext| ext == CSV_EXTENSION)
}

/// The columns of the result file, in the order they are written.
pub const ANALYSIS_COLUMNS: [&str; 14] = [
    "best_coin",
    "best_change",
    "worst_coin",
    "worst_change",
    "average_change",
    "top1_coin",
    "top1_change",
    "top2_coin",
    "top2_change",
    "top3_coin",
    "top3_change",
    "coins_up",
    "coins_down",
    "generated_at",
];

/// The flat, one-row shape of an `AnalysisResult` on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRow {
    pub best_coin: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub best_change: Decimal,
    pub worst_coin: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub worst_change: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub average_change: Decimal,
    pub top1_coin: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub top1_change: Decimal,
    pub top2_coin: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub top2_change: Decimal,
    pub top3_coin: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub top3_change: Decimal,
    pub coins_up: usize,
    pub coins_down: usize,
    pub generated_at: DateTime<Utc>,
}

impl AnalysisRow {
    pub fn from_result(result: &AnalysisResult) -> Result<Self, StorageError> {
        let [first, second, third] = result.top_movers.as_slice() else {
            return Err(StorageError::IncompleteAnalysis(result.top_movers.len()));
        };

        Ok(Self {
            best_coin: result.best.name.clone(),
            best_change: result.best.change,
            worst_coin: result.worst.name.clone(),
            worst_change: result.worst.change,
            average_change: result.average_change,
            top1_coin: first.name.clone(),
            top1_change: first.change,
            top2_coin: second.name.clone(),
            top2_change: second.change,
            top3_coin: third.name.clone(),
            top3_change: third.change,
            coins_up: result.coins_up,
            coins_down: result.coins_down,
            generated_at: result.generated_at,
        })
    }
}

impl From<AnalysisRow> for AnalysisResult {
    fn from(row: AnalysisRow) -> Self {
        Self {
            best: Mover::new(row.best_coin, row.best_change),
            worst: Mover::new(row.worst_coin, row.worst_change),
            average_change: row.average_change,
            top_movers: vec![
                Mover::new(row.top1_coin, row.top1_change),
                Mover::new(row.top2_coin, row.top2_change),
                Mover::new(row.top3_coin, row.top3_change),
            ],
            coins_up: row.coins_up,
            coins_down: row.coins_down,
            generated_at: row.generated_at,
        }
    }
}

/// Checks that `headers` holds exactly the `expected` column set.
///
/// Column order is not significant because rows are decoded by header name.
pub fn validate_headers(
    path: &Path,
    headers: &StringRecord,
    expected: &[&str],
) -> Result<(), StorageError> {
    let missing: Vec<String> = expected
        .iter()
        .filter(|column| !headers.iter().any(|h| h == **column))
        .map(|column| column.to_string())
        .collect();
    let unexpected: Vec<String> = headers
        .iter()
        .filter(|h| !expected.contains(h))
        .map(str::to_string)
        .collect();

    if missing.is_empty() && unexpected.is_empty() {
        Ok(())
    } else {
        Err(StorageError::Schema {
            path: path.to_path_buf(),
            missing,
            unexpected,
        })
    }
}
