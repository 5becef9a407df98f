//! Analytics view
//!
//! Shows the statistics of the selected dataset. Every fetch is stamped with
//! a generation number taken when it starts; a completion is applied only if
//! no newer fetch has started since. Starting a fetch drops whatever was
//! displayed, so a slow response for a previously selected dataset can never
//! flash on screen after the selection moved on.

pub mod charts;
pub mod report;

use std::sync::Arc;

use crate::api::{ApiError, DatasetId, DatasetStatistics};

pub use charts::{
    flow_pressure_series, summary_line, table_rows, type_distribution_series,
    DistributionSlice, FlowPressureSeries, TABLE_HEADERS,
};
pub use report::{report_file_name, save_report};

/// What the analytics view is showing.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AnalyticsState {
    /// No dataset selected
    #[default]
    Idle,
    /// Statistics for `dataset_id` are being fetched
    Loading {
        /// Dataset being fetched
        dataset_id: DatasetId,
    },
    /// Statistics for `dataset_id` are displayed
    Ready {
        /// Dataset shown
        dataset_id: DatasetId,
        /// Its statistics
        stats: Arc<DatasetStatistics>,
    },
    /// The fetch for `dataset_id` failed; nothing is displayed
    Empty {
        /// Dataset whose fetch failed
        dataset_id: DatasetId,
        /// Failure description
        error: String,
    },
}

/// Handle for one statistics fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    /// Dataset being fetched
    pub dataset_id: DatasetId,
}

impl LoadTicket {
    /// Generation stamped on this fetch.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What happened to a completed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Statistics are now displayed
    Applied,
    /// The fetch failed and the view is empty
    Failed,
    /// A newer fetch started meanwhile; the result was discarded
    Stale,
}

/// Generation-guarded statistics holder.
#[derive(Debug, Clone, Default)]
pub struct AnalyticsView {
    generation: u64,
    state: AnalyticsState,
}

impl AnalyticsView {
    /// Create an idle view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> &AnalyticsState {
        &self.state
    }

    /// Current generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a fetch is in flight.
    pub fn is_loading(&self) -> bool {
        matches!(self.state, AnalyticsState::Loading { .. })
    }

    /// Displayed statistics, only when fully loaded.
    pub fn stats(&self) -> Option<&DatasetStatistics> {
        match &self.state {
            AnalyticsState::Ready { stats, .. } => Some(stats),
            _ => None,
        }
    }

    /// Dataset whose statistics are displayed.
    pub fn displayed_dataset(&self) -> Option<DatasetId> {
        match &self.state {
            AnalyticsState::Ready { dataset_id, .. } => Some(*dataset_id),
            _ => None,
        }
    }

    /// Start a fetch for `dataset_id`: bump the generation and drop the
    /// displayed statistics.
    pub fn begin_load(&mut self, dataset_id: DatasetId) -> LoadTicket {
        self.generation += 1;
        self.state = AnalyticsState::Loading { dataset_id };
        tracing::debug!(
            "Loading statistics for dataset {} (generation {})",
            dataset_id,
            self.generation
        );
        LoadTicket {
            generation: self.generation,
            dataset_id,
        }
    }

    /// Apply the outcome of the fetch identified by `ticket`.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<DatasetStatistics, ApiError>,
    ) -> LoadOutcome {
        if ticket.generation != self.generation {
            tracing::debug!(
                "Discarding stale statistics for dataset {} (generation {} < {})",
                ticket.dataset_id,
                ticket.generation,
                self.generation
            );
            return LoadOutcome::Stale;
        }

        match result {
            Ok(stats) => {
                self.state = AnalyticsState::Ready {
                    dataset_id: ticket.dataset_id,
                    stats: Arc::new(stats),
                };
                LoadOutcome::Applied
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to load statistics for dataset {}: {}",
                    ticket.dataset_id,
                    e
                );
                self.state = AnalyticsState::Empty {
                    dataset_id: ticket.dataset_id,
                    error: e.to_string(),
                };
                LoadOutcome::Failed
            }
        }
    }

    /// Forget everything and invalidate in-flight fetches; used on logout.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.state = AnalyticsState::Idle;
    }
}
