//! Dashboard coordinator
//!
//! [`Dashboard`] owns the session handle, the backend client and the three
//! view-models, and is the only place where their interactions live:
//!
//! - a successful reload that selects a dataset starts a statistics fetch;
//! - a selection change starts a statistics fetch;
//! - a successful upload reloads the registry once and schedules the upload
//!   control reset;
//! - every backend failure passes through one handler, and a 401 from any
//!   endpoint logs out and clears all dataset state.
//!
//! State changes are also published as [`DashboardEvent`]s on a broadcast
//! channel for front ends that render reactively.
//!
//! View-model locks are plain `std::sync::Mutex`es taken for short,
//! synchronous sections and never held across an `.await`.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::broadcast;

use crate::analytics::{self, AnalyticsView, LoadOutcome};
use crate::api::{ApiError, DatasetApi, DatasetDescriptor, DatasetId};
use crate::error::{is_unauthorized, EquipvizError, Result};
use crate::registry::DatasetRegistry;
use crate::session::SessionHandle;
use crate::upload::{FileSource, UploadWorkflow};

/// Capacity of the event channel; slow subscribers lose the oldest events.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutReason {
    /// The user logged out
    User,
    /// The backend answered 401
    Unauthorized,
}

/// Notifications published by the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardEvent {
    SessionStarted,
    SessionEnded {
        reason: LogoutReason,
    },
    DatasetsReloaded {
        count: usize,
        selected: Option<DatasetId>,
    },
    ReloadFailed {
        error: String,
    },
    SelectionChanged {
        dataset_id: DatasetId,
    },
    StatsLoaded {
        dataset_id: DatasetId,
    },
    StatsFailed {
        dataset_id: DatasetId,
        error: String,
    },
    UploadSucceeded {
        dataset_id: DatasetId,
        file_name: String,
    },
    UploadFailed {
        file_name: String,
        error: String,
    },
    /// The success display delay elapsed and the upload control is empty
    UploadReset,
    ReportSaved {
        dataset_id: DatasetId,
        path: PathBuf,
    },
    ReportFailed {
        dataset_id: DatasetId,
        error: String,
    },
}

/// Result of [`Dashboard::submit_upload`].
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Nothing was sent: no candidate, or an upload is already in flight
    Skipped,
    /// The backend created a dataset
    Uploaded(DatasetDescriptor),
}

struct Inner {
    session: SessionHandle,
    api: Arc<dyn DatasetApi>,
    registry: Mutex<DatasetRegistry>,
    analytics: Mutex<AnalyticsView>,
    upload: Mutex<UploadWorkflow>,
    events: broadcast::Sender<DashboardEvent>,
    /// Bumped on every login and logout. Responses to requests started under
    /// a previous session neither touch state nor end the current session.
    session_epoch: AtomicU64,
    success_display: Duration,
    follow_selection: bool,
}

/// Top-level coordinator; cheap to clone.
#[derive(Clone)]
pub struct Dashboard {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("session", &self.inner.session)
            .field("success_display", &self.inner.success_display)
            .finish()
    }
}

impl Dashboard {
    /// Create a dashboard over `session` and `api`.
    ///
    /// # Arguments
    ///
    /// * `session` - Shared session context, also used by `api`
    /// * `api` - Backend implementation
    /// * `success_display` - How long a successful upload stays displayed
    pub fn new(session: SessionHandle, api: Arc<dyn DatasetApi>, success_display: Duration) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                session,
                api,
                registry: Mutex::new(DatasetRegistry::new()),
                analytics: Mutex::new(AnalyticsView::new()),
                upload: Mutex::new(UploadWorkflow::new()),
                events,
                session_epoch: AtomicU64::new(0),
                success_display,
                follow_selection: true,
            }),
        }
    }

    /// Disable fetching statistics when a reload auto-selects a dataset.
    ///
    /// Explicit [`Dashboard::select`] calls still fetch. Used by one-shot
    /// commands that only need the list.
    pub fn without_auto_analytics(self) -> Self {
        match Arc::try_unwrap(self.inner) {
            Ok(mut inner) => {
                inner.follow_selection = false;
                Self {
                    inner: Arc::new(inner),
                }
            }
            Err(inner) => Self { inner },
        }
    }

    /// Subscribe to dashboard events.
    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.inner.events.subscribe()
    }

    /// Shared session context.
    pub fn session(&self) -> &SessionHandle {
        &self.inner.session
    }

    /// Copy of the registry state.
    pub fn registry(&self) -> DatasetRegistry {
        self.lock_registry().clone()
    }

    /// Copy of the analytics state.
    pub fn analytics(&self) -> AnalyticsView {
        self.lock_analytics().clone()
    }

    /// Copy of the upload state.
    pub fn upload(&self) -> UploadWorkflow {
        self.lock_upload().clone()
    }

    fn lock_registry(&self) -> MutexGuard<'_, DatasetRegistry> {
        self.inner
            .registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_analytics(&self) -> MutexGuard<'_, AnalyticsView> {
        self.inner
            .analytics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_upload(&self) -> MutexGuard<'_, UploadWorkflow> {
        self.inner
            .upload
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, event: DashboardEvent) {
        // No subscribers is fine.
        let _ = self.inner.events.send(event);
    }

    fn epoch(&self) -> u64 {
        self.inner.session_epoch.load(Ordering::SeqCst)
    }

    fn clear_state(&self) {
        self.inner.session_epoch.fetch_add(1, Ordering::SeqCst);
        self.lock_registry().clear();
        self.lock_analytics().clear();
        self.lock_upload().clear();
    }

    fn require_session(&self) -> Result<()> {
        if self.inner.session.is_authenticated() {
            Ok(())
        } else {
            Err(EquipvizError::NotAuthenticated.into())
        }
    }

    /// Shared failure handler: a 401 ends the session, anything else is
    /// left to the caller.
    fn handle_api_error(&self, error: &ApiError) {
        if error.is_unauthorized() {
            self.end_session(LogoutReason::Unauthorized);
        }
    }

    fn end_session(&self, reason: LogoutReason) {
        if reason == LogoutReason::Unauthorized {
            tracing::warn!("Credentials rejected by the server; logging out");
        }
        self.clear_state();
        if let Err(e) = self.inner.session.logout() {
            tracing::error!("Failed to clear stored credentials: {}", e);
        }
        self.publish(DashboardEvent::SessionEnded { reason });
    }

    // -----------------------------------------------------------------------
    // Session
    // -----------------------------------------------------------------------

    /// Restore a persisted session and, if one exists, load the registry.
    ///
    /// # Returns
    ///
    /// Whether the dashboard is authenticated afterwards.
    pub async fn start(&self) -> Result<bool> {
        if !self.inner.session.restore()? {
            return Ok(false);
        }
        self.publish(DashboardEvent::SessionStarted);
        if let Err(e) = self.reload().await {
            tracing::warn!("Initial dataset load failed: {}", e);
        }
        Ok(self.inner.session.is_authenticated())
    }

    /// Log in and load the registry.
    ///
    /// The credential is not checked here; if the backend rejects it, the
    /// registry load gets a 401 and the session ends again. Inspect
    /// [`Dashboard::session`] afterwards to find out.
    ///
    /// # Errors
    ///
    /// Returns a validation error for blank input (no network call, nothing
    /// stored) or a storage error if the credential cannot be persisted.
    pub async fn login(&self, username: &str, password: &str) -> Result<()> {
        self.clear_state();
        self.inner.session.login(username, password)?;
        self.publish(DashboardEvent::SessionStarted);
        if let Err(e) = self.reload().await {
            tracing::warn!("Dataset load after login failed: {}", e);
        }
        Ok(())
    }

    /// Log out and clear all dataset state.
    pub fn logout(&self) {
        self.end_session(LogoutReason::User);
    }

    // -----------------------------------------------------------------------
    // Registry
    // -----------------------------------------------------------------------

    /// Fetch the dataset list and apply it.
    ///
    /// When the reload selects a dataset for the first time its statistics
    /// are fetched too.
    ///
    /// # Errors
    ///
    /// Returns [`EquipvizError::NotAuthenticated`] when logged out, or the
    /// classified backend error. On a non-401 error the previous list and
    /// selection are kept.
    pub async fn reload(&self) -> Result<()> {
        self.require_session()?;
        let epoch = self.epoch();

        let result = self.inner.api.list_datasets().await;

        if epoch != self.epoch() {
            tracing::debug!("Discarding dataset list fetched under a previous session");
            return Ok(());
        }

        match result {
            Ok(datasets) => {
                let count = datasets.len();
                let newly_selected = self.lock_registry().apply_reload(datasets);
                let selected = self.lock_registry().selected();
                self.publish(DashboardEvent::DatasetsReloaded { count, selected });

                if let (Some(id), true) = (newly_selected, self.inner.follow_selection) {
                    self.publish(DashboardEvent::SelectionChanged { dataset_id: id });
                    if let Err(e) = self.load_stats(id).await {
                        tracing::warn!("Statistics for dataset {} unavailable: {}", id, e);
                    }
                }
                Ok(())
            }
            Err(e) => {
                self.handle_api_error(&e);
                if !e.is_unauthorized() {
                    self.lock_registry().apply_reload_error(&e);
                    self.publish(DashboardEvent::ReloadFailed {
                        error: e.to_string(),
                    });
                }
                Err(EquipvizError::Api(e).into())
            }
        }
    }

    /// Select a dataset from the current list and fetch its statistics.
    ///
    /// # Returns
    ///
    /// `false` (and no fetch) if `id` is not in the list or already selected.
    ///
    /// # Errors
    ///
    /// Returns the statistics fetch error, if any.
    pub async fn select(&self, id: DatasetId) -> Result<bool> {
        let changed = self.lock_registry().select(id);
        if !changed {
            return Ok(false);
        }
        self.publish(DashboardEvent::SelectionChanged { dataset_id: id });
        self.load_stats(id).await?;
        Ok(true)
    }

    // -----------------------------------------------------------------------
    // Analytics
    // -----------------------------------------------------------------------

    /// Fetch statistics for `id` into the analytics view.
    ///
    /// The view drops its current statistics before the request is sent; the
    /// response is applied only if no newer fetch started meanwhile.
    ///
    /// # Returns
    ///
    /// [`LoadOutcome::Applied`] or [`LoadOutcome::Stale`].
    ///
    /// # Errors
    ///
    /// Returns the backend error when the fetch was current and failed; the
    /// view is then empty.
    pub async fn load_stats(&self, id: DatasetId) -> Result<LoadOutcome> {
        self.require_session()?;
        let epoch = self.epoch();
        let ticket = self.lock_analytics().begin_load(id);

        let result = self.inner.api.dataset_stats(id).await;

        if let (Err(e), true) = (&result, epoch == self.epoch()) {
            self.handle_api_error(e);
        }
        let error = result.as_ref().err().cloned();
        let outcome = self.lock_analytics().complete_load(ticket, result);

        match (outcome, error) {
            (LoadOutcome::Applied, _) => {
                self.publish(DashboardEvent::StatsLoaded { dataset_id: id });
                Ok(LoadOutcome::Applied)
            }
            (LoadOutcome::Failed, Some(e)) => {
                self.publish(DashboardEvent::StatsFailed {
                    dataset_id: id,
                    error: e.to_string(),
                });
                Err(EquipvizError::Api(e).into())
            }
            (LoadOutcome::Stale, Some(e)) if e.is_unauthorized() => {
                Err(EquipvizError::Api(e).into())
            }
            (outcome, _) => Ok(outcome),
        }
    }

    /// Re-fetch statistics for the current selection, if any.
    pub async fn refresh_stats(&self) -> Result<Option<LoadOutcome>> {
        let selected = self.lock_registry().selected();
        match selected {
            Some(id) => Ok(Some(self.load_stats(id).await?)),
            None => Ok(None),
        }
    }

    /// Save the PDF report of the selected dataset into `output_dir`.
    pub async fn download_report(&self, output_dir: &Path) -> Result<PathBuf> {
        let selected = self.lock_registry().selected();
        let id = selected.ok_or_else(|| {
            EquipvizError::Validation("No dataset selected".to_string())
        })?;
        self.download_report_for(id, output_dir).await
    }

    /// Save the PDF report of dataset `id` into `output_dir`.
    ///
    /// A failure is reported and leaves every other piece of state as it was
    /// (except for a 401, which ends the session).
    pub async fn download_report_for(&self, id: DatasetId, output_dir: &Path) -> Result<PathBuf> {
        self.require_session()?;
        match analytics::save_report(self.inner.api.as_ref(), id, output_dir).await {
            Ok(path) => {
                self.publish(DashboardEvent::ReportSaved {
                    dataset_id: id,
                    path: path.clone(),
                });
                Ok(path)
            }
            Err(e) => {
                if is_unauthorized(&e) {
                    self.end_session(LogoutReason::Unauthorized);
                } else {
                    tracing::warn!("Report download for dataset {} failed: {}", id, e);
                    self.publish(DashboardEvent::ReportFailed {
                        dataset_id: id,
                        error: e.to_string(),
                    });
                }
                Err(e)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Upload
    // -----------------------------------------------------------------------

    /// Choose the upload candidate. See [`UploadWorkflow::choose_file`].
    pub fn choose_file(&self, path: impl Into<PathBuf>, source: FileSource) -> Result<()> {
        self.lock_upload().choose_file(path, source)
    }

    /// Drop the upload candidate.
    pub fn remove_file(&self) -> bool {
        self.lock_upload().remove()
    }

    /// Upload the current candidate.
    ///
    /// A no-op returning [`SubmitOutcome::Skipped`] when there is no
    /// candidate or an upload is already in flight. On success the registry
    /// is reloaded once and the upload control resets after the display
    /// delay. On failure the candidate is kept for a retry.
    ///
    /// # Errors
    ///
    /// Returns the file read error or the classified backend error.
    pub async fn submit_upload(&self) -> Result<SubmitOutcome> {
        self.require_session()?;
        let ticket = self.lock_upload().begin_submit();
        let Some(ticket) = ticket else {
            return Ok(SubmitOutcome::Skipped);
        };
        let epoch = self.epoch();
        let file_name = ticket.candidate.file_name.clone();

        let contents = match tokio::fs::read(&ticket.candidate.path).await {
            Ok(contents) => contents,
            Err(e) => {
                let message = format!("Failed to read {}: {}", ticket.candidate.path.display(), e);
                self.lock_upload().complete_failure(&ticket, message.clone());
                if epoch == self.epoch() {
                    self.publish(DashboardEvent::UploadFailed {
                        file_name,
                        error: message,
                    });
                }
                return Err(EquipvizError::Io(e).into());
            }
        };

        match self.inner.api.upload_dataset(&file_name, contents).await {
            Ok(descriptor) => {
                self.lock_upload().complete_success(&ticket);
                if epoch != self.epoch() {
                    return Ok(SubmitOutcome::Uploaded(descriptor));
                }
                self.publish(DashboardEvent::UploadSucceeded {
                    dataset_id: descriptor.id,
                    file_name,
                });
                self.schedule_upload_reset(ticket.generation());
                if let Err(e) = self.reload().await {
                    tracing::warn!("Dataset reload after upload failed: {}", e);
                }
                Ok(SubmitOutcome::Uploaded(descriptor))
            }
            Err(e) => {
                self.lock_upload().complete_failure(&ticket, e.to_string());
                if epoch == self.epoch() {
                    self.handle_api_error(&e);
                    self.publish(DashboardEvent::UploadFailed {
                        file_name,
                        error: e.to_string(),
                    });
                }
                Err(EquipvizError::Api(e).into())
            }
        }
    }

    fn schedule_upload_reset(&self, generation: u64) {
        let this = self.clone();
        let delay = self.inner.success_display;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let cleared = this.lock_upload().reset_after_success(generation);
            if cleared {
                tracing::debug!("Upload control reset");
                this.publish(DashboardEvent::UploadReset);
            }
        });
    }
}
