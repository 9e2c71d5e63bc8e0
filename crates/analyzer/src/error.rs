use analytics::AnalyticsError;
use std::path::PathBuf;
use storage::StorageError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("No snapshot found in {}. Run the fetcher first.", .0.display())]
    MissingSnapshot(PathBuf),

    #[error(transparent)]
    Analytics(#[from] AnalyticsError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
