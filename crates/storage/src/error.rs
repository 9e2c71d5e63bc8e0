use core_types::CoreError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error on {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("CSV error in {}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error(
        "{} does not match the expected columns (missing: [{}], unexpected: [{}])",
        .path.display(),
        .missing.join(", "),
        .unexpected.join(", ")
    )]
    Schema {
        path: PathBuf,
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    #[error("Malformed row at line {line} of {}: {message}", .path.display())]
    Parse {
        path: PathBuf,
        line: u64,
        message: String,
    },

    #[error("Refusing to overwrite existing snapshot {}", .0.display())]
    SnapshotExists(PathBuf),

    #[error(
        "Failed to delete expired snapshot {} ({} removed before the failure)",
        .path.display(),
        .removed.len()
    )]
    Retention {
        path: PathBuf,
        /// Files deleted earlier in the same pass; they stay deleted.
        removed: Vec<PathBuf>,
        #[source]
        source: io::Error,
    },

    #[error("Snapshot {} violates a record invariant", .path.display())]
    Invalid {
        path: PathBuf,
        #[source]
        source: CoreError,
    },

    #[error("An analysis result must carry exactly 3 top movers, found {0}")]
    IncompleteAnalysis(usize),
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| StorageError::Io { path, source }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>) -> impl FnOnce(csv::Error) -> Self {
        let path = path.into();
        move |source| StorageError::Csv { path, source }
    }
}
