use api_client::error::ApiError;
use api_client::{CoinGeckoClient, MarketDataClient};
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use configuration::{ApiConfig, StorageConfig};
use core_types::CoinRecord;
use fetcher::Fetcher;
use fetcher::error::FetchError;
use rust_decimal::Decimal;
use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration as StdDuration;
use storage::{
    DataRepository, RetentionOutcome, RetentionPolicy, SnapshotFile, SnapshotStore, StorageError,
};

enum Reply {
    Coins(Vec<CoinRecord>),
    Status(u16),
    Garbage,
}

struct StubClient {
    reply: Reply,
}

#[async_trait]
impl MarketDataClient for StubClient {
    async fn fetch_top_coins(
        &self,
        _page_size: u32,
        _vs_currency: &str,
    ) -> Result<Vec<CoinRecord>, ApiError> {
        match &self.reply {
            Reply::Coins(coins) => Ok(coins.clone()),
            Reply::Status(status) => Err(ApiError::Status {
                status: *status,
                body: "upstream unavailable".to_string(),
            }),
            Reply::Garbage => Err(ApiError::DataShape("expected a sequence".to_string())),
        }
    }
}

fn coin(rank: u32) -> CoinRecord {
    CoinRecord {
        id: Some(format!("coin-{rank}")),
        symbol: Some(format!("c{rank}")),
        name: Some(format!("Coin {rank}")),
        current_price: Some(Decimal::new(rank as i64 * 1000 + 25, 2)),
        price_change_percentage_24h: Some(Decimal::new(rank as i64 - 5, 1)),
        market_cap: Some(Decimal::from(1_000_000_000u64 / rank as u64)),
        market_cap_rank: Some(rank),
        total_volume: None,
        circulating_supply: Some(Decimal::from(21_000_000)),
        ath: None,
        atl: None,
        last_updated: Some("2025-04-27T14:03:09.123Z".to_string()),
    }
}

fn top_coins(n: u32) -> Vec<CoinRecord> {
    (1..=n).map(coin).collect()
}

fn storage_config(dir: &tempfile::TempDir, retention: usize) -> StorageConfig {
    StorageConfig {
        raw_dir: dir.path().join("raw"),
        processed_dir: dir.path().join("processed"),
        retention,
    }
}

/// A clock that advances one second per call.
fn ticking_clock() -> impl Fn() -> DateTime<Utc> + Send + Sync + 'static {
    let start = Utc.with_ymd_and_hms(2025, 4, 27, 14, 0, 0).unwrap();
    let ticks = Arc::new(AtomicI64::new(0));
    move || start + Duration::seconds(ticks.fetch_add(1, Ordering::SeqCst))
}

fn fetcher(dir: &tempfile::TempDir, reply: Reply, retention: usize) -> Fetcher<StubClient> {
    let storage = storage_config(dir, retention);
    Fetcher::new(
        StubClient { reply },
        DataRepository::from_config(&storage),
        &ApiConfig::default(),
        &storage,
    )
    .with_clock(ticking_clock())
}

fn raw_files(dir: &tempfile::TempDir) -> Vec<String> {
    let raw = dir.path().join("raw");
    if !raw.exists() {
        return Vec::new();
    }
    let mut names: Vec<String> = fs::read_dir(raw)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn writes_one_snapshot_with_every_record() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = fetcher(&dir, Reply::Coins(top_coins(10)), 5);

    let report = fetcher.run().await.unwrap();

    assert_eq!(report.records, 10);
    assert_eq!(raw_files(&dir), vec!["crypto_data_2025-04-27_14-00-00.csv"]);

    let repo = DataRepository::from_config(&storage_config(&dir, 5));
    let snapshot = repo.load_snapshot(&report.snapshot).unwrap();
    assert_eq!(snapshot.records(), top_coins(10).as_slice());
    assert!(snapshot.records().iter().all(|r| r.total_volume.is_none()));
}

#[tokio::test]
async fn keeps_only_the_most_recent_snapshots() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = fetcher(&dir, Reply::Coins(top_coins(10)), 5);

    for _ in 0..7 {
        fetcher.run().await.unwrap();
    }

    assert_eq!(
        raw_files(&dir),
        vec![
            "crypto_data_2025-04-27_14-00-02.csv",
            "crypto_data_2025-04-27_14-00-03.csv",
            "crypto_data_2025-04-27_14-00-04.csv",
            "crypto_data_2025-04-27_14-00-05.csv",
            "crypto_data_2025-04-27_14-00-06.csv",
        ]
    );
}

#[tokio::test]
async fn upstream_error_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = fetcher(&dir, Reply::Status(503), 5);

    let err = fetcher.run().await.unwrap_err();

    assert!(matches!(err, FetchError::Network(_)), "{err:?}");
    assert!(raw_files(&dir).is_empty());
}

#[tokio::test]
async fn malformed_response_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = fetcher(&dir, Reply::Garbage, 5);

    let err = fetcher.run().await.unwrap_err();

    assert!(matches!(err, FetchError::DataShape(_)), "{err:?}");
    assert!(raw_files(&dir).is_empty());
}

#[tokio::test]
async fn oversized_response_is_a_data_shape_error() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = fetcher(&dir, Reply::Coins(top_coins(11)), 5);

    let err = fetcher.run().await.unwrap_err();

    assert!(matches!(err, FetchError::DataShape(_)), "{err:?}");
    assert!(raw_files(&dir).is_empty());
}

#[tokio::test]
async fn duplicate_ranks_are_a_data_shape_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut coins = top_coins(3);
    coins[2].market_cap_rank = Some(1);
    let fetcher = fetcher(&dir, Reply::Coins(coins), 5);

    let err = fetcher.run().await.unwrap_err();

    assert!(matches!(err, FetchError::DataShape(_)), "{err:?}");
    assert!(raw_files(&dir).is_empty());
}

#[tokio::test]
async fn short_response_is_accepted() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = fetcher(&dir, Reply::Coins(top_coins(4)), 5);

    let report = fetcher.run().await.unwrap();
    assert_eq!(report.records, 4);
}

/// Removes the files retention is about to prune just before the repository
/// gets to them, as a concurrent cleanup would.
struct RacingStore {
    repo: DataRepository,
}

impl SnapshotStore for RacingStore {
    fn save_snapshot(&self, snapshot: &core_types::Snapshot) -> Result<SnapshotFile, StorageError> {
        self.repo.save_snapshot(snapshot)
    }

    fn apply_retention(
        &self,
        policy: &RetentionPolicy,
    ) -> Result<RetentionOutcome, StorageError> {
        let plan = policy.plan(self.repo.list_snapshots()?);
        for file in &plan.prune {
            fs::remove_file(&file.path).unwrap();
        }
        self.repo.apply_retention_plan(plan)
    }
}

#[tokio::test]
async fn failed_retention_keeps_the_new_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let storage = storage_config(&dir, 2);
    let fetcher = Fetcher::new(
        StubClient {
            reply: Reply::Coins(top_coins(10)),
        },
        RacingStore {
            repo: DataRepository::from_config(&storage),
        },
        &ApiConfig::default(),
        &storage,
    )
    .with_clock(ticking_clock());

    assert!(fetcher.run().await.unwrap().retention.is_some());
    assert!(fetcher.run().await.unwrap().retention.is_some());
    let report = fetcher.run().await.unwrap();

    assert!(report.retention.is_none());
    assert!(report.snapshot.path.exists());
    assert!(
        report
            .snapshot
            .path
            .ends_with("crypto_data_2025-04-27_14-00-02.csv")
    );
    assert_eq!(
        raw_files(&dir),
        vec![
            "crypto_data_2025-04-27_14-00-01.csv",
            "crypto_data_2025-04-27_14-00-02.csv",
        ]
    );
}

#[tokio::test]
async fn network_failure_names_each_layer_once() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let dir = tempfile::tempdir().unwrap();
    let storage = storage_config(&dir, 5);
    let api = ApiConfig {
        base_url: format!("http://{addr}"),
        timeout: StdDuration::from_secs(2),
        ..ApiConfig::default()
    };
    let fetcher = Fetcher::new(
        CoinGeckoClient::new(&api).unwrap(),
        DataRepository::from_config(&storage),
        &api,
        &storage,
    );

    let err = fetcher.run().await.unwrap_err();
    assert!(matches!(err, FetchError::Network(_)), "{err:?}");

    let rendered = format!("{:#}", anyhow::Error::from(err));
    assert_eq!(
        rendered
            .matches("Network error while calling the market-data API")
            .count(),
        1,
        "{rendered}"
    );
}
