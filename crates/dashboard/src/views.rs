use crate::format::{self, MISSING};
use crate::state::{ChartMetric, DashboardState, Page};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, Color, Table};
use core_types::{AnalysisResult, CoinRecord, Snapshot};
use rust_decimal::Decimal;

const BAR_WIDTH: usize = 40;

const NO_ANALYSIS: &str =
    "No analysis available yet. Run `cryptopulse update` to fetch and analyze market data.";
const NO_SNAPSHOT: &str =
    "No market snapshot available yet. Run `cryptopulse update` to fetch market data.";
const NO_FAVORITES: &str =
    "No favorites in the latest snapshot. Add some with `cryptopulse favorites add <id>`.";

/// Renders the page selected in `state`.
///
/// Missing inputs produce a warning instead of an error so the dashboard
/// still starts before the first update.
pub fn render(
    state: &DashboardState,
    snapshot: Option<&Snapshot>,
    analysis: Option<&AnalysisResult>,
) -> String {
    match state.page {
        Page::Overview => match analysis {
            Some(result) => render_overview(result),
            None => warning(NO_ANALYSIS),
        },
        Page::Charts | Page::Table => {
            let Some(snapshot) = snapshot else {
                return warning(NO_SNAPSHOT);
            };
            let records = state.visible(snapshot.records());
            if records.is_empty() && state.favorites_only {
                return warning(NO_FAVORITES);
            }
            if state.page == Page::Charts {
                render_chart(&records, state.chart_metric)
            } else {
                render_table(&records, state)
            }
        }
    }
}

fn warning(message: &str) -> String {
    format!("Warning: {message}")
}

fn base_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table
}

fn change_cell(change: Option<Decimal>) -> Cell {
    let cell = Cell::new(format::percent(change)).set_alignment(CellAlignment::Right);
    match change {
        Some(c) if c > Decimal::ZERO => cell.fg(Color::Green),
        Some(c) if c < Decimal::ZERO => cell.fg(Color::Red),
        _ => cell,
    }
}

fn right(text: String) -> Cell {
    Cell::new(text).set_alignment(CellAlignment::Right)
}

/// Summary cards plus the top movers.
pub fn render_overview(result: &AnalysisResult) -> String {
    let mut summary = base_table();
    summary.set_header(vec!["Metric", "Coin", "Value"]);
    summary.add_row(vec![
        Cell::new("Best Performer (24h)"),
        Cell::new(&result.best.name),
        change_cell(Some(result.best.change)),
    ]);
    summary.add_row(vec![
        Cell::new("Worst Performer (24h)"),
        Cell::new(&result.worst.name),
        change_cell(Some(result.worst.change)),
    ]);
    summary.add_row(vec![
        Cell::new("Average Change (24h)"),
        Cell::new(MISSING),
        change_cell(Some(result.average_change)),
    ]);
    summary.add_row(vec![
        Cell::new("Coins Up / Down"),
        Cell::new(MISSING),
        right(format!("{} / {}", result.coins_up, result.coins_down)),
    ]);

    let mut movers = base_table();
    movers.set_header(vec!["#", "Top Mover", "24h Change"]);
    for (i, mover) in result.top_movers.iter().enumerate() {
        movers.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&mover.name),
            change_cell(Some(mover.change)),
        ]);
    }

    format!(
        "Market Overview (generated {})\n{summary}\n{movers}",
        result.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    )
}

/// One text bar per coin, scaled to the largest magnitude of `metric`.
/// Coins without a value are listed without a bar.
pub fn render_chart(records: &[&CoinRecord], metric: ChartMetric) -> String {
    let max_abs = records
        .iter()
        .filter_map(|r| metric.value(r))
        .map(|v| v.abs())
        .max()
        .unwrap_or(Decimal::ZERO);

    let mut table = base_table();
    table.set_header(vec!["Coin", metric.label(), ""]);
    for record in records {
        let value = metric.value(record);
        let text = match metric {
            ChartMetric::Change24h => format::percent(value),
            ChartMetric::MarketCap | ChartMetric::Volume => format::grouped(value),
        };
        let bar = value.map_or_else(String::new, |v| format::bar(v, max_abs, BAR_WIDTH));
        table.add_row(vec![
            Cell::new(record.display_name()),
            right(text),
            Cell::new(bar),
        ]);
    }
    format!("{}\n{table}", metric.label())
}

/// Every snapshot column with human labels. Favorites are starred.
pub fn render_table(records: &[&CoinRecord], state: &DashboardState) -> String {
    let mut table = base_table();
    table.set_header(vec![
        "",
        "Rank",
        "Name",
        "Symbol",
        "Price",
        "24h Change",
        "Market Cap",
        "Volume (24h)",
        "Circulating Supply",
        "All-Time High",
        "All-Time Low",
        "Last Updated",
    ]);
    for record in records {
        let marker = if state.is_favorite(record) { "★" } else { "" };
        table.add_row(vec![
            Cell::new(marker),
            right(
                record
                    .market_cap_rank
                    .map_or_else(|| MISSING.to_string(), |r| r.to_string()),
            ),
            Cell::new(record.name.as_deref().unwrap_or(MISSING)),
            Cell::new(
                record
                    .symbol
                    .as_deref()
                    .map_or_else(|| MISSING.to_string(), str::to_uppercase),
            ),
            right(format::fixed(record.current_price, 2)),
            change_cell(record.price_change_percentage_24h),
            right(format::fixed(record.market_cap, 0)),
            right(format::fixed(record.total_volume, 0)),
            right(format::grouped(record.circulating_supply)),
            right(format::fixed(record.ath, 2)),
            right(format::fixed(record.atl, 2)),
            Cell::new(format::timestamp(record.last_updated.as_deref())),
        ]);
    }
    table.to_string()
}
