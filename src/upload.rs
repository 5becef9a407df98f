//! Upload workflow
//!
//! Holds at most one pending CSV file and its status tag. The only client-side
//! check is that the candidate looks like a CSV (by name, or by a `text/csv`
//! type reported by the file source); headers, encoding and row shape are the
//! backend's business.
//!
//! The command-line front ends only ever pick files by path
//! ([`FileSource::Picker`], name-based check). [`FileSource::Drop`] and
//! [`UploadWorkflow::choose_file_with_type`] are library surface for
//! drag-and-drop front ends, which usually know the reported content type
//! but not a meaningful file name.
//!
//! Submission is split into [`UploadWorkflow::begin_submit`] and one of the
//! `complete_*` calls so the dashboard can perform the network call without
//! holding the workflow lock. A busy flag turns overlapping submissions into
//! no-ops, and a generation counter keeps the delayed post-success reset from
//! clearing a candidate chosen after the upload finished.

use std::path::{Path, PathBuf};

use crate::error::{EquipvizError, Result};

/// Where a candidate file came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileSource {
    /// File picker dialog or command argument
    Picker,
    /// Drag and drop; the drop target may also report a content type
    Drop,
}

/// Status tag of the upload control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadStatus {
    /// Ready; a candidate may or may not be present
    #[default]
    Idle,
    /// The last submission was accepted by the backend
    Success,
    /// The last choice was rejected or the last submission failed
    Error,
}

/// A chosen file waiting to be uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCandidate {
    /// Location of the file
    pub path: PathBuf,
    /// Name sent to the backend
    pub file_name: String,
    /// How the file was chosen
    pub source: FileSource,
}

/// Permission to perform one submission, handed out by
/// [`UploadWorkflow::begin_submit`].
#[derive(Debug, Clone)]
pub struct SubmitTicket {
    generation: u64,
    /// The candidate being uploaded
    pub candidate: UploadCandidate,
}

impl SubmitTicket {
    /// Candidate generation this ticket was issued for.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// State of the upload control.
#[derive(Debug, Clone, Default)]
pub struct UploadWorkflow {
    candidate: Option<UploadCandidate>,
    status: UploadStatus,
    last_error: Option<String>,
    busy: bool,
    generation: u64,
}

/// Whether `name` (or the reported `mime` type) indicates a CSV file.
pub fn is_csv(name: &str, mime: Option<&str>) -> bool {
    if mime.is_some_and(|m| m.eq_ignore_ascii_case("text/csv")) {
        return true;
    }
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

impl UploadWorkflow {
    /// Create an idle workflow with no candidate.
    pub fn new() -> Self {
        Self::default()
    }

    /// The pending candidate.
    pub fn candidate(&self) -> Option<&UploadCandidate> {
        self.candidate.as_ref()
    }

    /// Current status tag.
    pub fn status(&self) -> UploadStatus {
        self.status
    }

    /// Message describing the last rejection or failure.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Whether a submission is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Whether [`UploadWorkflow::begin_submit`] would hand out a ticket.
    pub fn can_submit(&self) -> bool {
        !self.busy && self.candidate.is_some()
    }

    /// Choose a file by name only.
    ///
    /// See [`UploadWorkflow::choose_file_with_type`].
    pub fn choose_file(&mut self, path: impl Into<PathBuf>, source: FileSource) -> Result<()> {
        self.choose_file_with_type(path, source, None)
    }

    /// Choose a candidate file.
    ///
    /// A non-CSV candidate sets the status to [`UploadStatus::Error`] and
    /// drops any previous candidate; a CSV candidate replaces the previous
    /// one and resets the status to [`UploadStatus::Idle`].
    ///
    /// # Errors
    ///
    /// Returns [`EquipvizError::Validation`] for a non-CSV file or when a
    /// submission is in flight.
    pub fn choose_file_with_type(
        &mut self,
        path: impl Into<PathBuf>,
        source: FileSource,
        mime: Option<&str>,
    ) -> Result<()> {
        if self.busy {
            return Err(EquipvizError::Validation(
                "An upload is already in progress".to_string(),
            )
            .into());
        }

        let path = path.into();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        self.generation += 1;

        if !is_csv(&file_name, mime) {
            let message = format!("{} is not a CSV file", path.display());
            tracing::warn!("Rejected upload candidate: {}", message);
            self.candidate = None;
            self.status = UploadStatus::Error;
            self.last_error = Some(message.clone());
            return Err(EquipvizError::Validation(message).into());
        }

        tracing::debug!("Upload candidate chosen: {}", path.display());
        self.candidate = Some(UploadCandidate {
            path,
            file_name,
            source,
        });
        self.status = UploadStatus::Idle;
        self.last_error = None;
        Ok(())
    }

    /// Drop the candidate and return to idle. Ignored while busy.
    ///
    /// # Returns
    ///
    /// `true` if the workflow changed.
    pub fn remove(&mut self) -> bool {
        if self.busy {
            return false;
        }
        let changed = self.candidate.is_some() || self.status != UploadStatus::Idle;
        self.generation += 1;
        self.candidate = None;
        self.status = UploadStatus::Idle;
        self.last_error = None;
        changed
    }

    /// Start a submission.
    ///
    /// # Returns
    ///
    /// `None` when busy or when no candidate is present; the caller must
    /// then do nothing.
    pub fn begin_submit(&mut self) -> Option<SubmitTicket> {
        if self.busy {
            tracing::debug!("Upload already in flight; ignoring submit");
            return None;
        }
        let candidate = self.candidate.clone()?;
        self.busy = true;
        Some(SubmitTicket {
            generation: self.generation,
            candidate,
        })
    }

    /// Finish a submission the backend accepted.
    ///
    /// A ticket issued before the last [`UploadWorkflow::clear`] changes
    /// nothing; in particular it does not release a newer submission.
    pub fn complete_success(&mut self, ticket: &SubmitTicket) {
        tracing::info!("Uploaded {}", ticket.candidate.file_name);
        if ticket.generation == self.generation {
            self.busy = false;
            self.status = UploadStatus::Success;
            self.last_error = None;
        }
    }

    /// Finish a failed submission. The candidate stays for a retry.
    pub fn complete_failure(&mut self, ticket: &SubmitTicket, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("Upload of {} failed: {}", ticket.candidate.file_name, message);
        if ticket.generation == self.generation {
            self.busy = false;
            self.status = UploadStatus::Error;
            self.last_error = Some(message);
        }
    }

    /// Clear a successful upload once its display delay has elapsed.
    ///
    /// # Returns
    ///
    /// `true` if the candidate was cleared; `false` if a newer candidate or
    /// status replaced it in the meantime.
    pub fn reset_after_success(&mut self, generation: u64) -> bool {
        if self.generation != generation || self.status != UploadStatus::Success || self.busy {
            return false;
        }
        self.candidate = None;
        self.status = UploadStatus::Idle;
        true
    }

    /// Forget everything; used on logout.
    pub fn clear(&mut self) {
        let generation = self.generation + 1;
        *self = Self {
            generation,
            ..Self::default()
        };
    }
}
