//! Terminal rendering for datasets and statistics
//!
//! Table output uses `prettytable`, status lines use `colored`. The
//! `*_table` builders are separate from printing so they can be tested.

use colored::Colorize;
use prettytable::{cell, row, Table};

use crate::analytics::{
    flow_pressure_series, summary_line, table_rows, type_distribution_series, TABLE_HEADERS,
};
use crate::api::{DatasetId, DatasetStatistics, DatasetSummary};
use crate::error::{EquipvizError, Result};
use crate::upload::{UploadStatus, UploadWorkflow};

/// Width of the longest bar in the distribution chart.
const BAR_WIDTH: usize = 30;

/// Dataset list table; the selected row is marked with `*`.
pub fn datasets_table(datasets: &[DatasetSummary], selected: Option<DatasetId>) -> Table {
    let mut table = Table::new();
    table.add_row(row!["", "ID", "Uploaded", "File"]);
    for dataset in datasets {
        let marker = if Some(dataset.id) == selected { "*" } else { "" };
        table.add_row(row![
            marker,
            dataset.id,
            dataset.uploaded_at.format("%Y-%m-%d %H:%M:%S UTC"),
            dataset.file.as_deref().unwrap_or("")
        ]);
    }
    table
}

/// Print the dataset list.
pub fn print_datasets(datasets: &[DatasetSummary], selected: Option<DatasetId>) {
    if datasets.is_empty() {
        println!("{}", "No datasets uploaded yet.".yellow());
        return;
    }
    println!("\n{}\n", "Recent datasets".bold());
    datasets_table(datasets, selected).printstd();
    println!();
}

/// Print the dataset list as JSON.
pub fn print_datasets_json(datasets: &[DatasetSummary]) -> Result<()> {
    let json = serde_json::to_string_pretty(datasets).map_err(EquipvizError::Serialization)?;
    println!("{}", json);
    Ok(())
}

/// Equipment table in the column order of [`TABLE_HEADERS`].
pub fn equipment_table(stats: &DatasetStatistics) -> Table {
    let mut table = Table::new();
    let [name, kind, flow, press, temp] = TABLE_HEADERS;
    table.add_row(row![name, kind, flow, press, temp]);
    for [name, kind, flow, press, temp] in table_rows(stats) {
        table.add_row(row![name, kind, flow, press, temp]);
    }
    table
}

/// Flowrate and pressure per equipment row.
pub fn flow_pressure_table(stats: &DatasetStatistics) -> Table {
    let series = flow_pressure_series(stats);
    let mut table = Table::new();
    table.add_row(row!["Equipment", "Flowrate", "Pressure"]);
    for i in 0..series.len() {
        table.add_row(row![
            series.labels[i],
            format!("{:.2}", series.flowrate[i]),
            format!("{:.2}", series.pressure[i])
        ]);
    }
    table
}

/// Horizontal bar chart lines for the type distribution.
pub fn distribution_lines(stats: &DatasetStatistics) -> Vec<String> {
    let slices = type_distribution_series(stats);
    let max = slices.iter().map(|s| s.count).max().unwrap_or(0);
    let width = slices.iter().map(|s| s.label.len()).max().unwrap_or(0);
    slices
        .iter()
        .map(|slice| {
            let bar = if max == 0 {
                0
            } else {
                ((slice.count as f64 / max as f64) * BAR_WIDTH as f64).round() as usize
            };
            format!(
                "{:<width$}  {:<bar_width$}  {} ({:.1}%)",
                slice.label,
                "#".repeat(bar.max(1)),
                slice.count,
                slice.percent,
                width = width,
                bar_width = BAR_WIDTH
            )
        })
        .collect()
}

/// Print the full statistics view of one dataset.
pub fn print_stats(dataset_id: DatasetId, stats: &DatasetStatistics) {
    println!("\n{}", format!("Dataset {}", dataset_id).bold());
    println!("{}\n", summary_line(stats).cyan());

    let lines = distribution_lines(stats);
    if !lines.is_empty() {
        println!("{}", "Type distribution".bold());
        for line in lines {
            println!("  {}", line);
        }
        println!();
    }

    if stats.data.is_empty() {
        println!("{}", "No equipment rows.".yellow());
        return;
    }

    println!("{}", "Flowrate & pressure".bold());
    flow_pressure_table(stats).printstd();
    println!("\n{}", "Equipment".bold());
    equipment_table(stats).printstd();
    println!();
}

/// Print statistics as JSON.
pub fn print_stats_json(stats: &DatasetStatistics) -> Result<()> {
    let json = serde_json::to_string_pretty(stats).map_err(EquipvizError::Serialization)?;
    println!("{}", json);
    Ok(())
}

/// One-line description of the upload control.
pub fn upload_status_line(upload: &UploadWorkflow) -> String {
    let file = upload
        .candidate()
        .map(|c| c.file_name.as_str())
        .unwrap_or("(none)");
    match upload.status() {
        _ if upload.is_busy() => format!("Uploading {}...", file),
        UploadStatus::Idle => format!("Selected file: {}", file),
        UploadStatus::Success => format!("Uploaded {}", file),
        UploadStatus::Error => format!(
            "Upload error: {}",
            upload.last_error().unwrap_or("unknown error")
        ),
    }
}
