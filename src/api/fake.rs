//! In-process fake backend for unit tests
//!
//! [`FakeDatasetApi`] answers every [`DatasetApi`] call from scripted results
//! and records what was asked. List, statistics and upload responses can be
//! *gated*: the call parks until the test releases the returned
//! [`oneshot::Sender`], which lets tests decide the order in which
//! concurrent requests complete.
//!
//! ```text
//! let release = fake.gate_stats(1);   // stats(1) now waits
//! ... start stats(1), start stats(2), stats(2) completes ...
//! release.send(()).unwrap();          // stats(1) completes last
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, PoisonError};

use chrono::{TimeZone, Utc};
use tokio::sync::oneshot;

use crate::api::{
    ApiError, ApiResult, DatasetApi, DatasetDescriptor, DatasetId, DatasetStatistics,
    DatasetSummary, EquipmentRecord,
};

/// Calls observed by the fake.
#[derive(Debug, Clone, Default)]
pub struct FakeCalls {
    /// Number of `list_datasets` calls
    pub list: usize,
    /// File names passed to `upload_dataset`
    pub uploads: Vec<String>,
    /// Ids passed to `dataset_stats`, in call order
    pub stats: Vec<DatasetId>,
    /// Ids passed to `dataset_report`, in call order
    pub reports: Vec<DatasetId>,
}

#[derive(Debug)]
struct FakeState {
    datasets: ApiResult<Vec<DatasetSummary>>,
    list_gate: Option<oneshot::Receiver<()>>,
    upload: ApiResult<DatasetDescriptor>,
    upload_gate: Option<oneshot::Receiver<()>>,
    stats: HashMap<DatasetId, ApiResult<DatasetStatistics>>,
    stats_gates: HashMap<DatasetId, oneshot::Receiver<()>>,
    report: ApiResult<Vec<u8>>,
    calls: FakeCalls,
}

/// Scripted [`DatasetApi`] implementation.
#[derive(Debug)]
pub struct FakeDatasetApi {
    state: Mutex<FakeState>,
}

impl Default for FakeDatasetApi {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeDatasetApi {
    /// A fake with an empty dataset list; uploads succeed with id 1, unknown
    /// stats ids answer 404 and reports are a tiny PDF stub.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FakeState {
                datasets: Ok(Vec::new()),
                list_gate: None,
                upload: Ok(DatasetDescriptor {
                    id: 1,
                    file: Some("datasets/upload.csv".to_string()),
                    uploaded_at: None,
                }),
                upload_gate: None,
                stats: HashMap::new(),
                stats_gates: HashMap::new(),
                report: Ok(b"%PDF-1.4 fake".to_vec()),
                calls: FakeCalls::default(),
            }),
        }
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut FakeState) -> R) -> R {
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// Answer `list_datasets` with summaries for `ids`, in that order.
    pub fn set_dataset_ids(&self, ids: &[DatasetId]) {
        let list = ids.iter().map(|id| summary(*id)).collect();
        self.with_state(|s| s.datasets = Ok(list));
    }

    /// Answer `list_datasets` with `result`.
    pub fn set_datasets_result(&self, result: ApiResult<Vec<DatasetSummary>>) {
        self.with_state(|s| s.datasets = result);
    }

    /// Answer `upload_dataset` with `result`.
    pub fn set_upload_result(&self, result: ApiResult<DatasetDescriptor>) {
        self.with_state(|s| s.upload = result);
    }

    /// Answer `dataset_stats(id)` with `result`.
    pub fn set_stats_result(&self, id: DatasetId, result: ApiResult<DatasetStatistics>) {
        self.with_state(|s| {
            s.stats.insert(id, result);
        });
    }

    /// Answer `dataset_report` with `result`.
    pub fn set_report_result(&self, result: ApiResult<Vec<u8>>) {
        self.with_state(|s| s.report = result);
    }

    /// Park the next `dataset_stats(id)` call until the returned sender fires.
    pub fn gate_stats(&self, id: DatasetId) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.with_state(|s| {
            s.stats_gates.insert(id, rx);
        });
        tx
    }

    /// Park the next `list_datasets` call until the returned sender fires.
    pub fn gate_list(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.with_state(|s| s.list_gate = Some(rx));
        tx
    }

    /// Park the next `upload_dataset` call until the returned sender fires.
    pub fn gate_upload(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.with_state(|s| s.upload_gate = Some(rx));
        tx
    }

    /// Snapshot of the calls made so far.
    pub fn calls(&self) -> FakeCalls {
        self.with_state(|s| s.calls.clone())
    }
}

#[async_trait::async_trait]
impl DatasetApi for FakeDatasetApi {
    async fn list_datasets(&self) -> ApiResult<Vec<DatasetSummary>> {
        let gate = self.with_state(|s| {
            s.calls.list += 1;
            s.list_gate.take()
        });
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        self.with_state(|s| s.datasets.clone())
    }

    async fn upload_dataset(
        &self,
        file_name: &str,
        _contents: Vec<u8>,
    ) -> ApiResult<DatasetDescriptor> {
        let gate = self.with_state(|s| {
            s.calls.uploads.push(file_name.to_string());
            s.upload_gate.take()
        });
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        self.with_state(|s| s.upload.clone())
    }

    async fn dataset_stats(&self, id: DatasetId) -> ApiResult<DatasetStatistics> {
        let gate = self.with_state(|s| {
            s.calls.stats.push(id);
            s.stats_gates.remove(&id)
        });
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        self.with_state(|s| {
            s.stats.get(&id).cloned().unwrap_or(Err(ApiError::Client {
                status: 404,
                message: "Not found.".to_string(),
            }))
        })
    }

    async fn dataset_report(&self, id: DatasetId) -> ApiResult<Vec<u8>> {
        self.with_state(|s| {
            s.calls.reports.push(id);
            s.report.clone()
        })
    }
}

/// Summary fixture uploaded `id` minutes after a fixed epoch.
pub fn summary(id: DatasetId) -> DatasetSummary {
    let base = Utc
        .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .expect("valid fixture date");
    DatasetSummary {
        id,
        uploaded_at: base + chrono::Duration::minutes(id),
        file: Some(format!("datasets/dataset_{}.csv", id)),
    }
}

/// Statistics fixture with `rows` equipment rows whose total identifies
/// `tag`.
pub fn sample_stats(tag: u64, rows: usize) -> DatasetStatistics {
    let data: Vec<EquipmentRecord> = (0..rows)
        .map(|i| EquipmentRecord {
            name: Some(format!("Unit-{}", i)),
            equipment_type: Some(if i % 2 == 0 { "Pump" } else { "Valve" }.to_string()),
            flowrate: Some(100.0 + i as f64),
            pressure: Some(5.0 + i as f64 / 10.0),
            temperature: Some(80.0),
        })
        .collect();
    let mut type_distribution = BTreeMap::new();
    for record in &data {
        if let Some(kind) = &record.equipment_type {
            *type_distribution.entry(kind.clone()).or_insert(0) += 1;
        }
    }
    DatasetStatistics {
        total_count: tag,
        average_temperature: 80.0,
        average_flowrate: Some(100.0),
        average_pressure: Some(5.0),
        type_distribution,
        data,
    }
}
