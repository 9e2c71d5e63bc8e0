use crate::error::CoreError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One row of market data for a single coin, as captured from the upstream listing.
///
/// Every field is optional: whatever the source omits is carried through as `None`
/// (an empty cell on disk) instead of being replaced with a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinRecord {
    /// The technical identifier, e.g. "bitcoin".
    pub id: Option<String>,
    /// The ticker symbol, e.g. "btc".
    pub symbol: Option<String>,
    /// The display name, e.g. "Bitcoin".
    pub name: Option<String>,
    #[serde(with = "rust_decimal::serde::str_option", default)]
    pub current_price: Option<Decimal>,
    /// Signed percentage change over the trailing 24 hours.
    #[serde(with = "rust_decimal::serde::str_option", default)]
    pub price_change_percentage_24h: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::str_option", default)]
    pub market_cap: Option<Decimal>,
    pub market_cap_rank: Option<u32>,
    #[serde(with = "rust_decimal::serde::str_option", default)]
    pub total_volume: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::str_option", default)]
    pub circulating_supply: Option<Decimal>,
    /// All-time-high price.
    #[serde(with = "rust_decimal::serde::str_option", default)]
    pub ath: Option<Decimal>,
    /// All-time-low price.
    #[serde(with = "rust_decimal::serde::str_option", default)]
    pub atl: Option<Decimal>,
    /// ISO-8601 timestamp exactly as reported by the source.
    pub last_updated: Option<String>,
}

impl CoinRecord {
    /// The column names of a snapshot file, in the order they are written.
    pub const COLUMNS: [&'static str; 12] = [
        "id",
        "symbol",
        "name",
        "current_price",
        "price_change_percentage_24h",
        "market_cap",
        "market_cap_rank",
        "total_volume",
        "circulating_supply",
        "ath",
        "atl",
        "last_updated",
    ];

    /// The name used when this coin is referenced in summaries.
    ///
    /// Falls back to the identifier, then the symbol, when the display name is missing.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.id.as_deref())
            .or(self.symbol.as_deref())
            .unwrap_or("unknown")
    }
}

/// An ordered set of coin records captured at a single point in time.
///
/// Snapshots are immutable once built. The constructor enforces that every
/// present market cap rank is strictly positive and unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    captured_at: DateTime<Utc>,
    records: Vec<CoinRecord>,
}

impl Snapshot {
    pub fn new(captured_at: DateTime<Utc>, records: Vec<CoinRecord>) -> Result<Self, CoreError> {
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            let Some(rank) = record.market_cap_rank else {
                continue;
            };
            if rank == 0 {
                return Err(CoreError::InvalidRank {
                    coin: record.display_name().to_string(),
                    rank,
                });
            }
            if !seen.insert(rank) {
                return Err(CoreError::DuplicateRank(rank));
            }
        }

        Ok(Self {
            captured_at,
            records,
        })
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn records(&self) -> &[CoinRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<CoinRecord> {
        self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn coin(id: &str, rank: Option<u32>) -> CoinRecord {
        CoinRecord {
            id: Some(id.to_string()),
            symbol: None,
            name: None,
            current_price: Some(dec!(1.5)),
            price_change_percentage_24h: None,
            market_cap: None,
            market_cap_rank: rank,
            total_volume: None,
            circulating_supply: None,
            ath: None,
            atl: None,
            last_updated: None,
        }
    }

    #[test]
    fn accepts_unique_positive_ranks_and_missing_ones() {
        let records = vec![coin("a", Some(1)), coin("b", None), coin("c", Some(2))];
        let snapshot = Snapshot::new(Utc::now(), records).unwrap();
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot.records()[1].id.as_deref(), Some("b"));
    }

    #[test]
    fn rejects_zero_rank() {
        let err = Snapshot::new(Utc::now(), vec![coin("a", Some(0))]).unwrap_err();
        assert_eq!(
            err,
            CoreError::InvalidRank {
                coin: "a".to_string(),
                rank: 0
            }
        );
    }

    #[test]
    fn rejects_duplicate_rank() {
        let records = vec![coin("a", Some(3)), coin("b", Some(3))];
        let err = Snapshot::new(Utc::now(), records).unwrap_err();
        assert_eq!(err, CoreError::DuplicateRank(3));
    }

    #[test]
    fn display_name_falls_back_to_id_then_symbol() {
        let mut record = coin("ethereum", None);
        assert_eq!(record.display_name(), "ethereum");

        record.name = Some("Ethereum".to_string());
        assert_eq!(record.display_name(), "Ethereum");

        record.name = None;
        record.id = None;
        record.symbol = Some("eth".to_string());
        assert_eq!(record.display_name(), "eth");

        record.symbol = None;
        assert_eq!(record.display_name(), "unknown");
    }
}
