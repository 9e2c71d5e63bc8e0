use crate::error::StorageError;
use crate::retention::{self, RetentionPlan, RetentionPolicy, SnapshotFile};
use crate::schema::{self, ANALYSIS_COLUMNS, AnalysisRow, RESULT_FILE_NAME};
use chrono::{DateTime, Utc};
use configuration::StorageConfig;
use core_types::{AnalysisResult, CoinRecord, Snapshot};
use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// The `DataRepository` is the only component that knows where pipeline files
/// live and how they are laid out. It owns no state beyond the two directories.
#[derive(Debug, Clone)]
pub struct DataRepository {
    raw_dir: PathBuf,
    processed_dir: PathBuf,
}

/// What a retention pass did.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RetentionOutcome {
    pub kept: usize,
    pub removed: Vec<PathBuf>,
}

impl DataRepository {
    pub fn new(raw_dir: impl Into<PathBuf>, processed_dir: impl Into<PathBuf>) -> Self {
        Self {
            raw_dir: raw_dir.into(),
            processed_dir: processed_dir.into(),
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(&config.raw_dir, &config.processed_dir)
    }

    pub fn raw_dir(&self) -> &Path {
        &self.raw_dir
    }

    /// Path of the single analysis result file.
    pub fn result_path(&self) -> PathBuf {
        self.processed_dir.join(RESULT_FILE_NAME)
    }

    // --- Snapshots ---

    /// Writes a new snapshot file named after the snapshot's capture time.
    ///
    /// Fails with `SnapshotExists` rather than replacing an existing file:
    /// snapshots are immutable once written.
    pub fn save_snapshot(&self, snapshot: &Snapshot) -> Result<SnapshotFile, StorageError> {
        fs::create_dir_all(&self.raw_dir).map_err(StorageError::io(&self.raw_dir))?;

        let path = self
            .raw_dir
            .join(schema::snapshot_file_name(snapshot.captured_at()));
        if path.exists() {
            return Err(StorageError::SnapshotExists(path));
        }

        write_atomically(&path, |writer| {
            writer.write_record(CoinRecord::COLUMNS)?;
            for record in snapshot.records() {
                writer.serialize(record)?;
            }
            Ok(())
        })?;

        let created = creation_time(&path)?;
        tracing::debug!(path = %path.display(), records = snapshot.len(), "Snapshot written.");
        Ok(SnapshotFile::new(path, created))
    }

    /// Lists every snapshot file in the raw directory, in no particular order.
    /// A missing directory simply means there are no snapshots yet.
    pub fn list_snapshots(&self) -> Result<Vec<SnapshotFile>, StorageError> {
        let entries = match fs::read_dir(&self.raw_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::io(&self.raw_dir)(e)),
        };

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(StorageError::io(&self.raw_dir))?;
            let name = entry.file_name();
            let is_snapshot = name.to_str().is_some_and(schema::is_snapshot_file_name);
            if !is_snapshot || !entry.path().is_file() {
                continue;
            }
            let path = entry.path();
            let created = creation_time(&path)?;
            files.push(SnapshotFile::new(path, created));
        }

        Ok(files)
    }

    /// The most recently created snapshot, by filesystem creation time.
    pub fn latest_snapshot(&self) -> Result<Option<SnapshotFile>, StorageError> {
        let files = self.list_snapshots()?;
        Ok(retention::newest(&files).cloned())
    }

    /// Reads and validates a snapshot file.
    ///
    /// The capture time of the returned snapshot is the one encoded in the file
    /// name. Files whose name carries no timestamp fall back to their creation time.
    pub fn load_snapshot(&self, file: &SnapshotFile) -> Result<Snapshot, StorageError> {
        let path = file.path();
        let mut reader = csv::Reader::from_path(path).map_err(StorageError::csv(path))?;

        let headers = reader.headers().map_err(StorageError::csv(path))?.clone();
        schema::validate_headers(path, &headers, &CoinRecord::COLUMNS)?;

        let mut records = Vec::new();
        for row in reader.deserialize::<CoinRecord>() {
            records.push(row.map_err(|e| parse_error(path, e))?);
        }

        let captured_at = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(schema::parse_snapshot_file_name)
            .unwrap_or_else(|| DateTime::<Utc>::from(file.created));
        Snapshot::new(captured_at, records).map_err(|source| StorageError::Invalid {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Deletes every snapshot beyond the policy's bound.
    pub fn apply_retention(
        &self,
        policy: &RetentionPolicy,
    ) -> Result<RetentionOutcome, StorageError> {
        self.apply_retention_plan(policy.plan(self.list_snapshots()?))
    }

    /// Deletes the files a plan marks for pruning, in plan order.
    ///
    /// Stops at the first deletion that fails; files removed before that stay
    /// removed and are listed in the error.
    pub fn apply_retention_plan(
        &self,
        plan: RetentionPlan,
    ) -> Result<RetentionOutcome, StorageError> {
        let mut outcome = RetentionOutcome {
            kept: plan.keep.len(),
            removed: Vec::with_capacity(plan.prune.len()),
        };
        for file in plan.prune {
            if let Err(source) = fs::remove_file(&file.path) {
                return Err(StorageError::Retention {
                    path: file.path,
                    removed: outcome.removed,
                    source,
                });
            }
            tracing::debug!(path = %file.path.display(), "Expired snapshot deleted.");
            outcome.removed.push(file.path);
        }

        Ok(outcome)
    }

    // --- Analysis result ---

    /// Replaces the analysis result file with `result`.
    pub fn save_analysis(&self, result: &AnalysisResult) -> Result<PathBuf, StorageError> {
        let row = AnalysisRow::from_result(result)?;

        fs::create_dir_all(&self.processed_dir).map_err(StorageError::io(&self.processed_dir))?;
        let path = self.result_path();
        write_atomically(&path, |writer| {
            writer.write_record(ANALYSIS_COLUMNS)?;
            writer.serialize(&row)?;
            Ok(())
        })?;

        Ok(path)
    }

    /// Reads the current analysis result, or `None` if none has been written yet.
    pub fn load_analysis(&self) -> Result<Option<AnalysisResult>, StorageError> {
        let path = self.result_path();
        if !path.exists() {
            return Ok(None);
        }

        let mut reader = csv::Reader::from_path(&path).map_err(StorageError::csv(&path))?;
        let headers = reader.headers().map_err(StorageError::csv(&path))?.clone();
        schema::validate_headers(&path, &headers, &ANALYSIS_COLUMNS)?;

        let row = match reader.deserialize::<AnalysisRow>().next() {
            Some(row) => row.map_err(|e| parse_error(&path, e))?,
            None => return Ok(None),
        };

        Ok(Some(row.into()))
    }
}

/// Writes a header-less CSV table to a temporary sibling of `dest`, then renames
/// it into place. Callers write their own header row so that empty tables still
/// carry one.
fn write_atomically<F>(dest: &Path, write: F) -> Result<(), StorageError>
where
    F: FnOnce(&mut csv::Writer<File>) -> Result<(), csv::Error>,
{
    let tmp = temp_path(dest);
    let result = (|| {
        let file = File::create(&tmp).map_err(StorageError::io(&tmp))?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        write(&mut writer).map_err(StorageError::csv(dest))?;
        writer.flush().map_err(StorageError::io(&tmp))?;
        drop(writer);
        fs::rename(&tmp, dest).map_err(StorageError::io(dest))
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

fn temp_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    dest.with_file_name(name)
}

fn creation_time(path: &Path) -> Result<SystemTime, StorageError> {
    let metadata = fs::metadata(path).map_err(StorageError::io(path))?;
    metadata
        .created()
        .or_else(|_| metadata.modified())
        .map_err(StorageError::io(path))
}

fn parse_error(path: &Path, error: csv::Error) -> StorageError {
    let line = error.position().map(|p| p.line()).unwrap_or_default();
    StorageError::Parse {
        path: path.to_path_buf(),
        line,
        message: error.to_string(),
    }
}
