use crate::error::AnalyzerError;
use analytics::AnalyticsEngine;
use chrono::Utc;
use core_types::{AnalysisResult, Snapshot};
use std::path::PathBuf;
use storage::{DataRepository, SnapshotFile};

pub mod error;

/// What a successful analysis run produced.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    /// The snapshot the result was derived from.
    pub source: PathBuf,
    pub result_path: PathBuf,
    pub result: AnalysisResult,
}

/// The second pipeline step: latest snapshot in, single result file out.
pub struct Analyzer {
    repo: DataRepository,
    engine: AnalyticsEngine,
}

impl Analyzer {
    pub fn new(repo: DataRepository) -> Self {
        Self {
            repo,
            engine: AnalyticsEngine::new(),
        }
    }

    /// Finds the most recently created snapshot file.
    pub fn locate_latest(&self) -> Result<SnapshotFile, AnalyzerError> {
        self.repo
            .latest_snapshot()?
            .ok_or_else(|| AnalyzerError::MissingSnapshot(self.repo.raw_dir().to_path_buf()))
    }

    /// Computes the summary statistics of one snapshot, stamped with the current time.
    pub fn analyze(&self, snapshot: &Snapshot) -> Result<AnalysisResult, AnalyzerError> {
        Ok(self.engine.calculate(snapshot.records(), Utc::now())?)
    }

    /// Locates, loads and analyzes the latest snapshot, then replaces the result file.
    ///
    /// Nothing is written if any step fails, so the previous result survives.
    pub fn run(&self) -> Result<AnalysisReport, AnalyzerError> {
        let file = self.locate_latest()?;
        tracing::info!(path = %file.path.display(), "Analyzing latest snapshot.");

        let snapshot = self.repo.load_snapshot(&file)?;
        let result = self.analyze(&snapshot)?;
        let result_path = self.repo.save_analysis(&result)?;

        tracing::info!(
            best = %result.best.name,
            worst = %result.worst.name,
            average_change = %result.average_change,
            coins_up = result.coins_up,
            coins_down = result.coins_down,
            "Analysis saved."
        );

        Ok(AnalysisReport {
            source: file.path,
            result_path,
            result,
        })
    }
}
