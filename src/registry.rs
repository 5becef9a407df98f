//! Dataset registry view-model
//!
//! Tracks the user's uploaded datasets and which one is selected. The list is
//! replaced wholesale by every successful reload and never edited locally.
//!
//! ```text
//!            reload ok              reload ok
//!   Empty ─────────────► Loaded ◄──────────────┐
//!     │                   │  ▲                 │
//!     │ reload err        │  └─ select(id)     │
//!     └──────────► Error ◄┘ reload err         │
//!                    └─────────────────────────┘
//! ```
//!
//! The network call itself is made by the dashboard coordinator; this type
//! only applies its outcome, so it can sit behind a lock that is never held
//! across an `.await`.

use crate::api::{ApiError, DatasetId, DatasetSummary};

/// Load status of the registry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RegistryStatus {
    /// Nothing has been loaded yet
    #[default]
    Empty,
    /// The last reload succeeded
    Loaded,
    /// The last reload failed; previously loaded data is kept
    Error(String),
}

/// Client-side list of datasets plus the current selection.
#[derive(Debug, Clone, Default)]
pub struct DatasetRegistry {
    datasets: Vec<DatasetSummary>,
    selected: Option<DatasetId>,
    status: RegistryStatus,
}

impl DatasetRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Datasets in server order.
    pub fn datasets(&self) -> &[DatasetSummary] {
        &self.datasets
    }

    /// Currently selected dataset id.
    pub fn selected(&self) -> Option<DatasetId> {
        self.selected
    }

    /// Current load status.
    pub fn status(&self) -> &RegistryStatus {
        &self.status
    }

    /// Whether `id` is in the current list.
    pub fn contains(&self, id: DatasetId) -> bool {
        self.datasets.iter().any(|d| d.id == id)
    }

    /// Apply a successful list fetch.
    ///
    /// Replaces the list and, when nothing is selected yet, selects the first
    /// entry.
    ///
    /// # Returns
    ///
    /// The id that became selected as a result of this reload, if any.
    pub fn apply_reload(&mut self, datasets: Vec<DatasetSummary>) -> Option<DatasetId> {
        self.datasets = datasets;
        self.status = RegistryStatus::Loaded;
        tracing::debug!("Registry loaded {} datasets", self.datasets.len());

        if self.selected.is_none() {
            self.selected = self.datasets.first().map(|d| d.id);
            return self.selected;
        }
        None
    }

    /// Record a failed list fetch. List and selection are left untouched.
    pub fn apply_reload_error(&mut self, error: &ApiError) {
        tracing::warn!("Failed to reload datasets: {}", error);
        self.status = RegistryStatus::Error(error.to_string());
    }

    /// Select a dataset from the current list.
    ///
    /// # Returns
    ///
    /// `true` if the selection changed. Ids not in the list, and the id that
    /// is already selected, are ignored.
    pub fn select(&mut self, id: DatasetId) -> bool {
        if !self.contains(id) {
            tracing::warn!("Ignoring selection of unknown dataset {}", id);
            return false;
        }
        if self.selected == Some(id) {
            return false;
        }
        self.selected = Some(id);
        true
    }

    /// Forget everything; used on logout.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
