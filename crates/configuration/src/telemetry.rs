use crate::error::ConfigError;
use crate::settings::LoggingConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Installs the global tracing subscriber for one binary.
///
/// Human-readable output always goes to stderr, which keeps stdout free for
/// rendered views. If `logging.directory` is set, a second, ANSI-free copy is
/// written to `<directory>/<app_name>.log.<date>`.
///
/// The returned guard flushes the file writer on drop, so `main` must hold it
/// until the process exits.
pub fn init_tracing(
    config: &LoggingConfig,
    app_name: &str,
) -> Result<Option<WorkerGuard>, ConfigError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| ConfigError::Logging(e.to_string()))?;

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    let (file_layer, guard) = match &config.directory {
        Some(directory) => {
            let appender =
                tracing_appender::rolling::daily(directory, format!("{}.log", app_name));
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| ConfigError::Logging(e.to_string()))?;

    Ok(guard)
}
