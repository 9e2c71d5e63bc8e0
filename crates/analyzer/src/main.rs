use analyzer::Analyzer;
use std::process::ExitCode;
use storage::DataRepository;

// The entry point when running the `analyzer` binary. Like the fetcher, it
// takes no arguments.
fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<()> {
    let config = configuration::load_config()?;
    let _guard = configuration::init_tracing(&config.logging, "analyzer")?;

    let analyzer = Analyzer::new(DataRepository::from_config(&config.storage));
    let report = analyzer.run()?;
    tracing::info!(
        source = %report.source.display(),
        result = %report.result_path.display(),
        "Analysis complete."
    );

    Ok(())
}
