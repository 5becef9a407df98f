//! Wire types for the dataset backend
//!
//! Decoding is deliberately lenient for equipment records: the rows are the
//! raw CSV contents relayed by the backend, so any field may be missing, null
//! or carry a numeric string. Such values decode to `None` and are rendered
//! as empty or zero cells instead of failing the whole payload.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Backend identifier of an uploaded dataset.
pub type DatasetId = i64;

/// One row of the dataset list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    /// Dataset identifier
    pub id: DatasetId,
    /// Upload timestamp
    #[serde(deserialize_with = "de_timestamp")]
    pub uploaded_at: DateTime<Utc>,
    /// Stored file location reported by the backend
    #[serde(default)]
    pub file: Option<String>,
}

/// Descriptor returned when a dataset is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetDescriptor {
    /// Identifier of the new dataset
    pub id: DatasetId,
    /// Stored file location
    #[serde(default)]
    pub file: Option<String>,
    /// Creation timestamp, when the backend reports it
    #[serde(default, deserialize_with = "de_optional_timestamp")]
    pub uploaded_at: Option<DateTime<Utc>>,
}

/// Precomputed statistics for a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetStatistics {
    /// Number of equipment rows
    pub total_count: u64,
    /// Mean temperature across all rows
    pub average_temperature: f64,
    /// Mean flowrate, when the backend reports it
    #[serde(default, deserialize_with = "lenient_f64")]
    pub average_flowrate: Option<f64>,
    /// Mean pressure, when the backend reports it
    #[serde(default, deserialize_with = "lenient_f64")]
    pub average_pressure: Option<f64>,
    /// Row count per equipment type
    #[serde(default)]
    pub type_distribution: BTreeMap<String, u64>,
    /// Raw equipment rows, in file order
    #[serde(default)]
    pub data: Vec<EquipmentRecord>,
}

/// One equipment row as uploaded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EquipmentRecord {
    #[serde(
        rename = "Equipment Name",
        default,
        deserialize_with = "lenient_string"
    )]
    pub name: Option<String>,
    #[serde(rename = "Type", default, deserialize_with = "lenient_string")]
    pub equipment_type: Option<String>,
    #[serde(rename = "Flowrate", default, deserialize_with = "lenient_f64")]
    pub flowrate: Option<f64>,
    #[serde(rename = "Pressure", default, deserialize_with = "lenient_f64")]
    pub pressure: Option<f64>,
    #[serde(rename = "Temperature", default, deserialize_with = "lenient_f64")]
    pub temperature: Option<f64>,
}

fn lenient_f64<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }))
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }))
}

/// Parses RFC 3339 timestamps, and offset-less ones as UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

fn de_timestamp<'de, D>(deserializer: D) -> std::result::Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw)))
}

fn de_optional_timestamp<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}
