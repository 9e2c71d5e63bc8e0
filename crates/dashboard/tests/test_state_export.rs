use chrono::{TimeZone, Utc};
use core_types::{CoinRecord, Snapshot};
use dashboard::{ChartMetric, DashboardError, DashboardState, Page, export_view};
use rust_decimal_macros::dec;
use std::fs;
use storage::DataRepository;

fn coin(id: &str, rank: u32) -> CoinRecord {
    CoinRecord {
        id: Some(id.to_string()),
        symbol: Some(id[..3].to_string()),
        name: Some(id.to_uppercase()),
        current_price: Some(dec!(1.5)),
        price_change_percentage_24h: Some(dec!(-0.25)),
        market_cap: Some(dec!(1000)),
        market_cap_rank: Some(rank),
        total_volume: None,
        circulating_supply: Some(dec!(21000000)),
        ath: None,
        atl: None,
        last_updated: None,
    }
}

#[test]
fn missing_state_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let state = DashboardState::load(&dir.path().join("state.json")).unwrap();
    assert_eq!(state, DashboardState::default());
    assert_eq!(state.page, Page::Overview);
    assert!(!state.favorites_only);
}

#[test]
fn state_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("state.json");

    let mut state = DashboardState {
        page: Page::Charts,
        chart_metric: ChartMetric::Volume,
        favorites_only: true,
        ..Default::default()
    };
    state.add_favorite("solana");
    state.add_favorite("bitcoin");
    state.save(&path).unwrap();

    let restored = DashboardState::load(&path).unwrap();
    assert_eq!(restored, state);
    assert_eq!(
        restored.favorites.iter().collect::<Vec<_>>(),
        vec!["bitcoin", "solana"]
    );
}

#[test]
fn partial_state_file_fills_in_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    fs::write(&path, r#"{ "page": "table" }"#).unwrap();

    let state = DashboardState::load(&path).unwrap();
    assert_eq!(state.page, Page::Table);
    assert_eq!(state.chart_metric, ChartMetric::Change24h);
    assert!(state.favorites.is_empty());
}

#[test]
fn corrupt_state_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    fs::write(&path, "not json").unwrap();

    let err = DashboardState::load(&path).unwrap_err();
    assert!(matches!(err, DashboardError::State { .. }), "{err:?}");
}

#[test]
fn export_writes_only_the_filtered_view() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = Snapshot::new(
        Utc.with_ymd_and_hms(2025, 4, 27, 14, 0, 0).unwrap(),
        vec![coin("bitcoin", 1), coin("ethereum", 2), coin("solana", 3)],
    )
    .unwrap();
    let mut state = DashboardState {
        favorites_only: true,
        ..Default::default()
    };
    state.add_favorite("solana");
    state.add_favorite("bitcoin");

    let out = dir.path().join("exports").join("favorites.csv");
    let written = export_view(&state.visible(snapshot.records()), &out).unwrap();

    assert_eq!(written, 2);
    let contents = fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], CoinRecord::COLUMNS.join(","));
    assert!(lines[1].starts_with("bitcoin,bit,BITCOIN,1.5,-0.25,1000,1,,21000000"));
    assert!(lines[2].starts_with("solana,"));
}

#[test]
fn exported_file_reads_back_as_a_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let records = vec![coin("bitcoin", 1), coin("ethereum", 2)];
    let raw = dir.path().join("raw");
    let out = raw.join("crypto_data_2025-04-27_14-00-00.csv");

    export_view(&records.iter().collect::<Vec<_>>(), &out).unwrap();

    let repo = DataRepository::new(&raw, dir.path().join("processed"));
    let file = repo.latest_snapshot().unwrap().unwrap();
    let snapshot = repo.load_snapshot(&file).unwrap();
    assert_eq!(snapshot.records(), records.as_slice());
}
