//! One-shot dataset commands
//!
//! Each handler restores the stored session, loads the dataset list and
//! performs one operation through the dashboard. A 401 anywhere clears the
//! stored credential.

use std::path::{Path, PathBuf};

use colored::Colorize;

use crate::api::DatasetId;
use crate::commands::{build_dashboard, connect, render, resume};
use crate::config::Config;
use crate::dashboard::{Dashboard, SubmitOutcome};
use crate::error::{EquipvizError, Result};
use crate::upload::FileSource;

/// List the most recent datasets.
pub async fn list(config: &Config, json: bool) -> Result<()> {
    let dashboard = connect(config).await?;
    let registry = dashboard.registry();
    if json {
        render::print_datasets_json(registry.datasets())
    } else {
        render::print_datasets(registry.datasets(), registry.selected());
        Ok(())
    }
}

/// Upload `file` and print the refreshed list.
///
/// # Errors
///
/// Returns a validation error, before the session is even restored, if
/// `file` is not a CSV.
pub async fn upload(config: &Config, file: &Path) -> Result<()> {
    let dashboard = build_dashboard(config)?.without_auto_analytics();
    dashboard.choose_file(file, FileSource::Picker)?;
    resume(&dashboard).await?;

    match dashboard.submit_upload().await? {
        SubmitOutcome::Uploaded(descriptor) => {
            println!(
                "{}",
                format!(
                    "Uploaded {} as dataset {}",
                    file.display(),
                    descriptor.id
                )
                .green()
            );
            let registry = dashboard.registry();
            render::print_datasets(registry.datasets(), registry.selected());
            Ok(())
        }
        SubmitOutcome::Skipped => {
            Err(EquipvizError::Validation("Nothing to upload".to_string()).into())
        }
    }
}

/// Show statistics for `dataset`, or for the most recent dataset.
pub async fn stats(config: &Config, dataset: Option<DatasetId>, json: bool) -> Result<()> {
    let dashboard = connect(config).await?;
    let id = resolve_dataset(&dashboard, dataset)?;

    if !dashboard.select(id).await? {
        dashboard.load_stats(id).await?;
    }

    let analytics = dashboard.analytics();
    let stats = analytics.stats().ok_or_else(|| {
        EquipvizError::Validation(format!("No statistics available for dataset {}", id))
    })?;

    if json {
        render::print_stats_json(stats)
    } else {
        render::print_stats(id, stats);
        Ok(())
    }
}

/// Download the PDF report for `dataset`, or for the most recent dataset.
pub async fn report(
    config: &Config,
    dataset: Option<DatasetId>,
    output: Option<PathBuf>,
) -> Result<()> {
    let dashboard = connect(config).await?;
    let id = resolve_dataset(&dashboard, dataset)?;
    let output_dir = output.unwrap_or_else(|| config.report.output_path());

    let path = dashboard.download_report_for(id, &output_dir).await?;
    println!("{}", format!("Saved {}", path.display()).green());
    Ok(())
}

/// Pick the requested dataset, defaulting to the current selection.
fn resolve_dataset(dashboard: &Dashboard, requested: Option<DatasetId>) -> Result<DatasetId> {
    let registry = dashboard.registry();
    match requested {
        Some(id) if registry.contains(id) => Ok(id),
        Some(id) => Err(EquipvizError::Validation(format!(
            "Dataset {} is not among your recent datasets",
            id
        ))
        .into()),
        None => registry.selected().ok_or_else(|| {
            EquipvizError::Validation("No datasets uploaded yet".to_string()).into()
        }),
    }
}
