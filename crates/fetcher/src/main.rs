use api_client::CoinGeckoClient;
use fetcher::Fetcher;
use std::process::ExitCode;
use storage::DataRepository;

// The entry point when running the `fetcher` binary. It takes no arguments:
// everything comes from config.toml and CRYPTOPULSE_* variables.
#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let config = configuration::load_config()?;
    let _guard = configuration::init_tracing(&config.logging, "fetcher")?;

    let client = CoinGeckoClient::new(&config.api)?;
    let repo = DataRepository::from_config(&config.storage);
    let fetcher = Fetcher::new(client, repo, &config.api, &config.storage);

    let report = fetcher.run().await?;
    tracing::info!(
        path = %report.snapshot.path.display(),
        records = report.records,
        "Fetch complete."
    );

    Ok(())
}
