//! # CryptoPulse Fetcher
//!
//! The first pipeline step: one request to the market-data API, one new
//! snapshot file, then a retention pass over the raw directory.
//!
//! Nothing is written unless the whole response was fetched and validated.

use crate::error::FetchError;
use api_client::MarketDataClient;
use chrono::{DateTime, Utc};
use configuration::{ApiConfig, StorageConfig};
use core_types::Snapshot;
use storage::{DataRepository, RetentionOutcome, RetentionPolicy, SnapshotFile, SnapshotStore};

pub mod error;

type Clock = Box<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// What a successful fetch produced.
#[derive(Debug)]
pub struct FetchReport {
    pub snapshot: SnapshotFile,
    pub records: usize,
    /// `None` when the retention pass failed; the failure has already been logged.
    pub retention: Option<RetentionOutcome>,
}

pub struct Fetcher<C, S = DataRepository> {
    client: C,
    store: S,
    retention: RetentionPolicy,
    page_size: u32,
    vs_currency: String,
    clock: Clock,
}

impl<C: MarketDataClient, S: SnapshotStore> Fetcher<C, S> {
    pub fn new(client: C, store: S, api: &ApiConfig, storage: &StorageConfig) -> Self {
        Self {
            client,
            store,
            retention: RetentionPolicy::new(storage.retention),
            page_size: api.page_size,
            vs_currency: api.vs_currency.clone(),
            clock: Box::new(Utc::now),
        }
    }

    /// Replaces the wall clock used to stamp snapshots.
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Fetches the top `page_size` coins and validates them into a `Snapshot`.
    ///
    /// A response longer than `page_size`, or one that breaks the rank
    /// invariant, is a data shape error. A shorter one is accepted.
    pub async fn fetch_top_coins(
        &self,
        page_size: u32,
        vs_currency: &str,
    ) -> Result<Snapshot, FetchError> {
        let records = self.client.fetch_top_coins(page_size, vs_currency).await?;

        if records.len() > page_size as usize {
            return Err(FetchError::DataShape(format!(
                "requested {} coins but the API returned {}",
                page_size,
                records.len()
            )));
        }
        if records.len() < page_size as usize {
            tracing::warn!(
                requested = page_size,
                received = records.len(),
                "The API returned fewer coins than requested."
            );
        }

        Snapshot::new((self.clock)(), records).map_err(|e| FetchError::DataShape(e.to_string()))
    }

    /// Runs the whole step: fetch, write the snapshot, prune old snapshots.
    ///
    /// A failed retention pass is logged and does not fail the run, because the
    /// snapshot that was just written is still valid.
    pub async fn run(&self) -> Result<FetchReport, FetchError> {
        let snapshot = self
            .fetch_top_coins(self.page_size, &self.vs_currency)
            .await?;
        let file = self.store.save_snapshot(&snapshot)?;
        tracing::info!(
            path = %file.path.display(),
            records = snapshot.len(),
            "Snapshot saved."
        );

        let retention = match self.store.apply_retention(&self.retention) {
            Ok(outcome) => {
                tracing::info!(
                    kept = outcome.kept,
                    removed = outcome.removed.len(),
                    "Retention applied."
                );
                Some(outcome)
            }
            Err(e) => {
                tracing::error!(
                    error = &e as &dyn std::error::Error,
                    "Retention failed; the new snapshot is kept."
                );
                None
            }
        };

        Ok(FetchReport {
            snapshot: file,
            records: snapshot.len(),
            retention,
        })
    }
}
