//! Backend API access
//!
//! This module defines the [`DatasetApi`] trait, the single seam through which
//! every component talks to the dataset backend, and the [`ApiError`]
//! classification every caller inspects. Implementations:
//!
//! - [`client::ApiClient`] -- reqwest-based HTTP client that attaches the
//!   session credential to every request.
//! - [`fake::FakeDatasetApi`] -- in-process fake with scripted and gated
//!   responses (cfg(test) only).
//!
//! There are no retries, no queueing and no caching at this layer; each
//! caller owns its failure path. A 401 is reported as
//! [`ApiError::Unauthorized`] and turned into a logout by the dashboard
//! coordinator, never here.

use thiserror::Error;

pub mod client;
pub mod types;

#[cfg(test)]
pub mod fake;

pub use client::{ApiClient, RequestBody};
pub use types::{DatasetDescriptor, DatasetId, DatasetStatistics, DatasetSummary, EquipmentRecord};

/// Classified failure of a backend call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Connection, timeout or body transfer failure
    #[error("Network error: {0}")]
    Network(String),

    /// The backend rejected the credential (HTTP 401)
    #[error("Unauthorized: the server rejected the stored credentials")]
    Unauthorized,

    /// Any other 4xx response
    #[error("Request rejected (HTTP {status}): {message}")]
    Client {
        /// HTTP status code
        status: u16,
        /// Error message extracted from the response body
        message: String,
    },

    /// Any 5xx response
    #[error("Server error (HTTP {status}): {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Error message extracted from the response body
        message: String,
    },

    /// A successful response whose body could not be decoded
    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Returns `true` for a 401.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }

    /// HTTP status associated with the failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized => Some(401),
            ApiError::Client { status, .. } | ApiError::Server { status, .. } => Some(*status),
            ApiError::Network(_) | ApiError::Decode(_) => None,
        }
    }
}

/// Result of a backend call.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Operations offered by the dataset backend.
///
/// Used polymorphically through `Arc<dyn DatasetApi>` so that the dashboard
/// can run against the HTTP client or an in-process fake.
#[async_trait::async_trait]
pub trait DatasetApi: Send + Sync {
    /// `GET datasets/`: the user's datasets, most recent first.
    async fn list_datasets(&self) -> ApiResult<Vec<DatasetSummary>>;

    /// `POST datasets/`: upload one CSV file as multipart field `file`.
    async fn upload_dataset(
        &self,
        file_name: &str,
        contents: Vec<u8>,
    ) -> ApiResult<DatasetDescriptor>;

    /// `GET datasets/{id}/stats/`: precomputed statistics.
    async fn dataset_stats(&self, id: DatasetId) -> ApiResult<DatasetStatistics>;

    /// `GET datasets/{id}/report/`: PDF report bytes.
    async fn dataset_report(&self, id: DatasetId) -> ApiResult<Vec<u8>>;
}
