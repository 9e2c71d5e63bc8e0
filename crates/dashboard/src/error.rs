use std::io;
use std::path::PathBuf;
use storage::StorageError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("An update is already running (lock file {})", .0.display())]
    UpdateInProgress(PathBuf),

    #[error(
        "The {step} step failed (exit code {}):\n{stderr}",
        .code.map_or_else(|| "none".to_string(), |c| c.to_string())
    )]
    StepFailed {
        step: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Failed to read or write dashboard state {}", .path.display())]
    State {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error on {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to export to {}", .path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl DashboardError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| DashboardError::Io { path, source }
    }
}
