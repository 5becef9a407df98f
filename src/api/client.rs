//! HTTP implementation of [`DatasetApi`]
//!
//! All requests funnel through [`ApiClient::request`], which resolves the path
//! against the configured base URL, attaches `Authorization: Basic ...` from
//! the session when a credential is present, and classifies the response.

use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::api::{
    ApiError, ApiResult, DatasetApi, DatasetDescriptor, DatasetId, DatasetStatistics,
    DatasetSummary,
};
use crate::config::ApiConfig;
use crate::error::{EquipvizError, Result};
use crate::session::SessionHandle;

/// Longest error body excerpt carried in an [`ApiError`] message.
const MAX_ERROR_MESSAGE_CHARS: usize = 200;

/// Body of an outgoing request.
#[derive(Debug)]
pub enum RequestBody {
    /// No body
    Empty,
    /// `multipart/form-data` body
    Multipart(reqwest::multipart::Form),
}

/// reqwest-based backend client.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use equipviz::api::{ApiClient, DatasetApi};
/// use equipviz::config::ApiConfig;
/// use equipviz::session::{MemoryCredentialStore, SessionHandle};
///
/// # async fn example() -> equipviz::error::Result<()> {
/// let session = SessionHandle::new(Arc::new(MemoryCredentialStore::default()));
/// session.login("admin", "secret")?;
/// let client = ApiClient::new(&ApiConfig::default(), session)?;
/// let datasets = client.list_datasets().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    session: SessionHandle,
}

impl ApiClient {
    /// Build a client for the configured backend.
    ///
    /// No network I/O happens here.
    ///
    /// # Errors
    ///
    /// Returns [`EquipvizError::Config`] if the base URL does not parse or
    /// the HTTP client cannot be built.
    pub fn new(config: &ApiConfig, session: SessionHandle) -> Result<Self> {
        let base_url = normalize_base_url(&config.base_url)?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| EquipvizError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    /// Base URL every path is resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Send one request and classify the outcome.
    ///
    /// `path` is relative to the base URL (e.g. `datasets/3/stats/`).
    ///
    /// # Errors
    ///
    /// - [`ApiError::Network`] when the request cannot be sent
    /// - [`ApiError::Unauthorized`] on 401
    /// - [`ApiError::Client`] / [`ApiError::Server`] on other 4xx / 5xx
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
    ) -> ApiResult<reqwest::Response> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| ApiError::Network(format!("Invalid request path {}: {}", path, e)))?;

        tracing::debug!("{} {}", method, url);

        let mut req = self.http.request(method, url);
        if let Some(credential) = self.session.credential() {
            req = req.header(AUTHORIZATION, credential.authorization_header());
        }
        if let RequestBody::Multipart(form) = body {
            req = req.multipart(form);
        }

        let response = req.send().await.map_err(|e| {
            tracing::warn!("Request to {} failed: {}", path, e);
            ApiError::Network(e.to_string())
        })?;

        classify(response).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let response = self.request(Method::GET, path, RequestBody::Empty).await?;
        decode_json(response).await
    }
}

#[async_trait::async_trait]
impl DatasetApi for ApiClient {
    async fn list_datasets(&self) -> ApiResult<Vec<DatasetSummary>> {
        self.get_json("datasets/").await
    }

    async fn upload_dataset(
        &self,
        file_name: &str,
        contents: Vec<u8>,
    ) -> ApiResult<DatasetDescriptor> {
        let part = reqwest::multipart::Part::bytes(contents)
            .file_name(file_name.to_string())
            .mime_str("text/csv")
            .map_err(|e| ApiError::Network(format!("Failed to build upload body: {}", e)))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .request(Method::POST, "datasets/", RequestBody::Multipart(form))
            .await?;
        decode_json(response).await
    }

    async fn dataset_stats(&self, id: DatasetId) -> ApiResult<DatasetStatistics> {
        self.get_json(&format!("datasets/{}/stats/", id)).await
    }

    async fn dataset_report(&self, id: DatasetId) -> ApiResult<Vec<u8>> {
        let response = self
            .request(
                Method::GET,
                &format!("datasets/{}/report/", id),
                RequestBody::Empty,
            )
            .await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::Network(format!("Failed to read report body: {}", e)))?;
        Ok(bytes.to_vec())
    }
}

/// Parse the configured base URL, ensuring a trailing slash so relative
/// paths append instead of replacing the last segment.
pub(crate) fn normalize_base_url(raw: &str) -> Result<Url> {
    let with_slash = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{}/", raw)
    };
    let url = Url::parse(&with_slash)
        .map_err(|e| EquipvizError::Config(format!("Invalid API base URL {}: {}", raw, e)))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(EquipvizError::Config(format!(
            "API base URL must use http or https, got {}",
            url.scheme()
        ))
        .into());
    }
    Ok(url)
}

async fn classify(response: reqwest::Response) -> ApiResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::UNAUTHORIZED {
        tracing::warn!("Backend returned 401 Unauthorized");
        return Err(ApiError::Unauthorized);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body, status);

    if status.is_server_error() {
        tracing::error!("Backend returned {}: {}", status, message);
        Err(ApiError::Server {
            status: status.as_u16(),
            message,
        })
    } else if status.is_client_error() {
        tracing::warn!("Backend returned {}: {}", status, message);
        Err(ApiError::Client {
            status: status.as_u16(),
            message,
        })
    } else {
        Err(ApiError::Decode(format!("unexpected status {}", status)))
    }
}

/// Extract a human-readable message from an error body.
///
/// The backend reports failures as `{"error": "..."}`; framework-level
/// rejections use `{"detail": "..."}`.
fn error_message(body: &str, status: StatusCode) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["error", "detail"] {
            if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
                return text.to_string();
            }
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("no response body")
            .to_string();
    }
    trimmed.chars().take(MAX_ERROR_MESSAGE_CHARS).collect()
}

async fn decode_json<T: DeserializeOwned>(response: reqwest::Response) -> ApiResult<T> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| ApiError::Network(format!("Failed to read response body: {}", e)))?;
    serde_json::from_slice(&bytes).map_err(|e| {
        tracing::error!("Failed to decode backend response: {}", e);
        ApiError::Decode(e.to_string())
    })
}
