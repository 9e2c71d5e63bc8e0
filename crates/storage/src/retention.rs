use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// A snapshot file on disk together with its creation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotFile {
    pub path: PathBuf,
    /// Filesystem birth time, or modification time where the platform has none.
    pub created: SystemTime,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>, created: SystemTime) -> Self {
        Self {
            path: path.into(),
            created,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Newest first. Equal creation times fall back to the file name, which
    /// embeds the capture timestamp.
    fn newest_first(a: &SnapshotFile, b: &SnapshotFile) -> Ordering {
        b.created
            .cmp(&a.created)
            .then_with(|| b.path.file_name().cmp(&a.path.file_name()))
    }
}

/// Sorts snapshot files from newest to oldest.
pub fn sort_newest_first(files: &mut [SnapshotFile]) {
    files.sort_by(SnapshotFile::newest_first);
}

/// Returns the newest snapshot file, if any.
pub fn newest(files: &[SnapshotFile]) -> Option<&SnapshotFile> {
    files.iter().min_by(|a, b| SnapshotFile::newest_first(a, b))
}

/// "Keep the K most recent snapshots."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    keep: usize,
}

/// The outcome of applying a `RetentionPolicy` to a list of files.
/// Both lists are ordered newest first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RetentionPlan {
    pub keep: Vec<SnapshotFile>,
    pub prune: Vec<SnapshotFile>,
}

impl RetentionPolicy {
    pub fn new(keep: usize) -> Self {
        Self { keep }
    }

    pub fn keep(&self) -> usize {
        self.keep
    }

    /// Sorts `files` newest first and splits them at the retention bound.
    pub fn plan(&self, mut files: Vec<SnapshotFile>) -> RetentionPlan {
        sort_newest_first(&mut files);
        let prune = if files.len() > self.keep {
            files.split_off(self.keep)
        } else {
            Vec::new()
        };

        RetentionPlan { keep: files, prune }
    }
}
