//! The presentation side of CryptoPulse.
//!
//! Reads the files the pipeline writes and never writes them itself. The
//! only mutations it performs are its own state file, user exports and,
//! through [`UpdateRunner`], launching the pipeline binaries.

use core_types::Snapshot;
use storage::DataRepository;

pub mod error;
pub mod export;
pub mod format;
pub mod state;
pub mod update;
pub mod views;

pub use error::DashboardError;
pub use export::export_view;
pub use state::{ChartMetric, DashboardState, Page};
pub use update::{PipelineStep, ProcessStep, RunGuard, StepFailure, UpdateRunner};
pub use views::render;

/// Loads the most recently created snapshot, if there is one.
pub fn load_latest_snapshot(repo: &DataRepository) -> Result<Option<Snapshot>, DashboardError> {
    match repo.latest_snapshot()? {
        Some(file) => Ok(Some(repo.load_snapshot(&file)?)),
        None => Ok(None),
    }
}
