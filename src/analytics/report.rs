//! PDF report download
//!
//! The backend renders the report; the client only fetches the bytes and
//! saves them under a deterministic name.

use std::path::{Path, PathBuf};

use crate::api::{DatasetApi, DatasetId};
use crate::error::{EquipvizError, Result};

/// File name used for the report of dataset `id`.
///
/// # Examples
///
/// ```
/// use equipviz::analytics::report_file_name;
///
/// assert_eq!(report_file_name(7), "report_7.pdf");
/// ```
pub fn report_file_name(id: DatasetId) -> String {
    format!("report_{}.pdf", id)
}

/// Download the report for dataset `id` into `output_dir`.
///
/// # Returns
///
/// The path of the written file.
///
/// # Errors
///
/// Returns the classified [`crate::api::ApiError`] if the download fails,
/// or [`EquipvizError::Storage`] if the file cannot be written. Nothing
/// else is affected by a failure.
pub async fn save_report(api: &dyn DatasetApi, id: DatasetId, output_dir: &Path) -> Result<PathBuf> {
    let bytes = api.dataset_report(id).await.map_err(EquipvizError::Api)?;

    tokio::fs::create_dir_all(output_dir).await.map_err(|e| {
        EquipvizError::Storage(format!(
            "Failed to create report directory {}: {}",
            output_dir.display(),
            e
        ))
    })?;

    let path = output_dir.join(report_file_name(id));
    tokio::fs::write(&path, &bytes).await.map_err(|e| {
        EquipvizError::Storage(format!("Failed to write {}: {}", path.display(), e))
    })?;

    tracing::info!("Saved report for dataset {} to {}", id, path.display());
    Ok(path)
}
