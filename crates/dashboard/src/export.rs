use crate::error::DashboardError;
use core_types::CoinRecord;
use std::fs;
use std::path::Path;

/// Writes `records` to `path` with the snapshot column layout and returns
/// how many rows were written. An existing file is replaced.
pub fn export_view(records: &[&CoinRecord], path: &Path) -> Result<usize, DashboardError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(DashboardError::io(parent))?;
    }

    let to_export = |source| DashboardError::Export {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(to_export)?;

    writer.write_record(CoinRecord::COLUMNS).map_err(to_export)?;
    for record in records {
        writer.serialize(record).map_err(to_export)?;
    }
    writer
        .flush()
        .map_err(DashboardError::io(path))?;

    tracing::info!(path = %path.display(), rows = records.len(), "Exported view.");
    Ok(records.len())
}
