use clap::{Parser, Subcommand};
use configuration::{Config, DashboardConfig};
use dashboard::{
    ChartMetric, DashboardState, Page, ProcessStep, UpdateRunner, export_view,
    load_latest_snapshot, render,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use storage::DataRepository;

/// The main entry point for the CryptoPulse dashboard.
#[tokio::main]
async fn main() -> ExitCode {
    // Load CRYPTOPULSE_* overrides from a .env file, if there is one.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// A terminal dashboard for the top cryptocurrencies by market cap.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch fresh market data, then recompute the analysis.
    Update,
    /// Show a dashboard page. Options given here are remembered.
    View(ViewArgs),
    /// Manage favorite coins.
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },
    /// Write the currently visible coins of the latest snapshot to a CSV file.
    Export(ExportArgs),
}

#[derive(Parser)]
struct ViewArgs {
    /// The page to show (defaults to the last one viewed).
    #[arg(long, value_enum)]
    page: Option<Page>,

    /// The metric plotted on the charts page.
    #[arg(long, value_enum)]
    metric: Option<ChartMetric>,

    /// Show favorites only.
    #[arg(long, conflicts_with = "all")]
    favorites_only: bool,

    /// Show every coin again after --favorites-only.
    #[arg(long)]
    all: bool,
}

#[derive(Subcommand)]
enum FavoritesAction {
    /// Mark coins as favorites by id (e.g., "bitcoin").
    Add {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Unmark coins.
    Remove {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// List the current favorites.
    List,
    /// Remove every favorite.
    Clear,
}

#[derive(Parser)]
struct ExportArgs {
    /// Destination CSV file; replaced if it exists.
    #[arg(long, short)]
    output: PathBuf,
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = configuration::load_config()?;
    let _guard = configuration::init_tracing(&config.logging, "cryptopulse")?;

    match cli.command {
        Commands::Update => handle_update(&config.dashboard).await,
        Commands::View(args) => handle_view(args, &config),
        Commands::Favorites { action } => handle_favorites(action, &config),
        Commands::Export(args) => handle_export(args, &config),
    }
}

// ==============================================================================
// Command Logic
// ==============================================================================

/// Runs the fetcher and then the analyzer as child processes.
async fn handle_update(config: &DashboardConfig) -> anyhow::Result<()> {
    let fetch = ProcessStep::locate("fetcher", config.fetcher_bin.as_deref())?;
    let analyze = ProcessStep::locate("analyzer", config.analyzer_bin.as_deref())?;
    let runner = UpdateRunner::from_config(config);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed}] {msg}")?);
    spinner.set_message("Fetching and analyzing market data...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    match runner.run(&fetch, &analyze).await {
        Ok(()) => {
            spinner.finish_with_message("Data updated successfully.");
            Ok(())
        }
        Err(e) => {
            spinner.finish_and_clear();
            Err(e.into())
        }
    }
}

fn handle_view(args: ViewArgs, config: &Config) -> anyhow::Result<()> {
    let state_file = &config.dashboard.state_file;
    let mut state = DashboardState::load(state_file)?;

    if let Some(page) = args.page {
        state.page = page;
    }
    if let Some(metric) = args.metric {
        state.chart_metric = metric;
    }
    if args.favorites_only {
        state.favorites_only = true;
    } else if args.all {
        state.favorites_only = false;
    }
    state.save(state_file)?;

    let repo = DataRepository::from_config(&config.storage);
    let snapshot = load_latest_snapshot(&repo)?;
    let analysis = repo.load_analysis()?;

    println!("{}", render(&state, snapshot.as_ref(), analysis.as_ref()));
    Ok(())
}

fn handle_favorites(action: FavoritesAction, config: &Config) -> anyhow::Result<()> {
    let state_file = &config.dashboard.state_file;
    let mut state = DashboardState::load(state_file)?;

    match action {
        FavoritesAction::Add { ids } => {
            let repo = DataRepository::from_config(&config.storage);
            let snapshot = load_latest_snapshot(&repo)?;
            for id in ids {
                let known = snapshot.as_ref().is_none_or(|s| {
                    s.records().iter().any(|r| r.id.as_deref() == Some(id.as_str()))
                });
                if !known {
                    println!("Warning: '{id}' is not in the latest snapshot.");
                }
                if state.add_favorite(id.clone()) {
                    println!("Added {id}.");
                } else {
                    println!("{id} is already a favorite.");
                }
            }
        }
        FavoritesAction::Remove { ids } => {
            for id in ids {
                if state.remove_favorite(&id) {
                    println!("Removed {id}.");
                } else {
                    println!("{id} was not a favorite.");
                }
            }
        }
        FavoritesAction::List => {
            if state.favorites.is_empty() {
                println!("No favorites yet.");
            }
            for id in &state.favorites {
                println!("{id}");
            }
            return Ok(());
        }
        FavoritesAction::Clear => {
            state.favorites.clear();
            println!("Cleared all favorites.");
        }
    }

    state.save(state_file)?;
    Ok(())
}

fn handle_export(args: ExportArgs, config: &Config) -> anyhow::Result<()> {
    let state = DashboardState::load(&config.dashboard.state_file)?;
    let repo = DataRepository::from_config(&config.storage);
    let Some(snapshot) = load_latest_snapshot(&repo)? else {
        anyhow::bail!("No market snapshot to export. Run `cryptopulse update` first.");
    };

    let records = state.visible(snapshot.records());
    let written = export_view(&records, &args.output)?;
    println!("Exported {written} coins to {}.", args.output.display());
    Ok(())
}
