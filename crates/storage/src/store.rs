use crate::error::StorageError;
use crate::repository::{DataRepository, RetentionOutcome};
use crate::retention::{RetentionPolicy, SnapshotFile};
use core_types::Snapshot;

/// The write side of the raw directory, as the fetcher sees it.
pub trait SnapshotStore: Send + Sync {
    fn save_snapshot(&self, snapshot: &Snapshot) -> Result<SnapshotFile, StorageError>;
    fn apply_retention(&self, policy: &RetentionPolicy)
    -> Result<RetentionOutcome, StorageError>;
}

impl SnapshotStore for DataRepository {
    fn save_snapshot(&self, snapshot: &Snapshot) -> Result<SnapshotFile, StorageError> {
        DataRepository::save_snapshot(self, snapshot)
    }

    fn apply_retention(
        &self,
        policy: &RetentionPolicy,
    ) -> Result<RetentionOutcome, StorageError> {
        DataRepository::apply_retention(self, policy)
    }
}
