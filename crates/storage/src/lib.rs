//! # CryptoPulse Storage Crate
//!
//! The file-based handoff between the pipeline steps. Snapshots are written
//! by the fetcher into the raw directory; the single analysis result is
//! written by the analyzer into the processed directory.
//!
//! ## Architectural Principles
//!
//! - **Adapter:** All knowledge of file names, CSV layout and directory structure
//!   lives here. The rest of the application only sees `Snapshot` and
//!   `AnalysisResult`.
//! - **Validated on load:** Every file is checked against its expected column set
//!   and parsed row by row, so a malformed table fails with a structured error
//!   instead of flowing downstream.
//! - **Atomic writes:** Files are written to a temporary sibling and renamed into
//!   place, so readers never observe a partially written table.
//!
//! ## Public API
//!
//! - `DataRepository`: reads and writes snapshots and the analysis result.
//! - `RetentionPolicy`: the pure "keep the K newest" planner.
//! - `SnapshotStore`: the write-side seam the fetcher depends on.
//! - `StorageError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod error;
pub mod repository;
pub mod retention;
pub mod schema;
pub mod store;

// Re-export the key components to create a clean, public-facing API.
pub use error::StorageError;
pub use repository::{DataRepository, RetentionOutcome};
pub use retention::{RetentionPlan, RetentionPolicy, SnapshotFile};
pub use store::SnapshotStore;
