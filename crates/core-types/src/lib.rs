//! # CryptoPulse Core Types
//!
//! The shared vocabulary of the pipeline. Every other crate speaks in terms of
//! these structs, so they carry no I/O and no knowledge of files or HTTP.
//!
//! - `CoinRecord`: one row of market data for a single coin.
//! - `Snapshot`: an ordered, validated set of `CoinRecord`s tied to a capture time.
//! - `AnalysisResult`: the summary statistics derived from exactly one snapshot.

pub mod analysis;
pub mod coin;
pub mod error;

// Re-export the core types to provide a clean public API.
pub use analysis::{AnalysisResult, Mover, TOP_MOVERS};
pub use coin::{CoinRecord, Snapshot};
pub use error::CoreError;
