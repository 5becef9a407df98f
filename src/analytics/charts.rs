//! Chart and table shaping
//!
//! Pure functions from [`DatasetStatistics`] to the series the views draw.
//! Series built from `stats.data` always have exactly one point per record;
//! a record missing a value contributes `0.0` (charts) or an empty cell
//! (table).

use crate::api::{DatasetStatistics, EquipmentRecord};

/// Column headers of the equipment table.
pub const TABLE_HEADERS: [&str; 5] = ["Name", "Type", "Flow", "Press", "Temp"];

/// One slice of the type distribution chart.
#[derive(Debug, Clone, PartialEq)]
pub struct DistributionSlice {
    pub label: String,
    pub count: u64,
    /// Share of all counted rows, in percent
    pub percent: f64,
}

/// Flowrate and pressure per equipment row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlowPressureSeries {
    /// Equipment names, empty when missing
    pub labels: Vec<String>,
    /// Flowrate per row, `0.0` when missing
    pub flowrate: Vec<f64>,
    /// Pressure per row, `0.0` when missing
    pub pressure: Vec<f64>,
}

impl FlowPressureSeries {
    /// Number of points.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the series has no points.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Slices of the type distribution chart, largest first, ties by label.
pub fn type_distribution_series(stats: &DatasetStatistics) -> Vec<DistributionSlice> {
    let total: u64 = stats.type_distribution.values().sum();
    let mut slices: Vec<DistributionSlice> = stats
        .type_distribution
        .iter()
        .map(|(label, count)| DistributionSlice {
            label: label.clone(),
            count: *count,
            percent: if total == 0 {
                0.0
            } else {
                *count as f64 * 100.0 / total as f64
            },
        })
        .collect();
    slices.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    slices
}

/// Flowrate/pressure series over `stats.data`.
pub fn flow_pressure_series(stats: &DatasetStatistics) -> FlowPressureSeries {
    let mut series = FlowPressureSeries {
        labels: Vec::with_capacity(stats.data.len()),
        flowrate: Vec::with_capacity(stats.data.len()),
        pressure: Vec::with_capacity(stats.data.len()),
    };
    for record in &stats.data {
        series.labels.push(record.name.clone().unwrap_or_default());
        series.flowrate.push(record.flowrate.unwrap_or(0.0));
        series.pressure.push(record.pressure.unwrap_or(0.0));
    }
    series
}

/// Table rows over `stats.data`, in [`TABLE_HEADERS`] order.
pub fn table_rows(stats: &DatasetStatistics) -> Vec<[String; 5]> {
    stats.data.iter().map(table_row).collect()
}

fn table_row(record: &EquipmentRecord) -> [String; 5] {
    [
        record.name.clone().unwrap_or_default(),
        record.equipment_type.clone().unwrap_or_default(),
        format_cell(record.flowrate),
        format_cell(record.pressure),
        format_cell(record.temperature),
    ]
}

fn format_cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// One-line summary: total count and averages.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use equipviz::analytics::summary_line;
/// use equipviz::api::DatasetStatistics;
///
/// let stats = DatasetStatistics {
///     total_count: 12,
///     average_temperature: 81.456,
///     average_flowrate: None,
///     average_pressure: None,
///     type_distribution: BTreeMap::new(),
///     data: Vec::new(),
/// };
/// assert_eq!(summary_line(&stats), "Total: 12 | Avg Temp: 81.46");
/// ```
pub fn summary_line(stats: &DatasetStatistics) -> String {
    let mut line = format!(
        "Total: {} | Avg Temp: {:.2}",
        stats.total_count, stats.average_temperature
    );
    if let Some(flow) = stats.average_flowrate {
        line.push_str(&format!(" | Avg Flowrate: {:.2}", flow));
    }
    if let Some(pressure) = stats.average_pressure {
        line.push_str(&format!(" | Avg Pressure: {:.2}", pressure));
    }
    line
}
