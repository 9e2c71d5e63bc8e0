//! # CryptoPulse Analytics Engine
//!
//! Summary statistics over a single market snapshot.
//!
//! ## Architectural Principles
//!
//! - **Pure logic:** This crate has no knowledge of files or HTTP. It depends
//!   only on `core-types`.
//! - **Stateless calculation:** The `AnalyticsEngine` takes coin records as input
//!   and produces an `AnalysisResult` as output, which makes it trivial to test.
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: The struct that contains the calculation logic.
//! - `AnalyticsError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod error;

// Re-export the key components to create a clean, public-facing API.
pub use engine::AnalyticsEngine;
pub use error::AnalyticsError;
