//! HTTP client for the study backend.
//!
//! The [`Backend`] trait is the seam between the UI and the network: the
//! application talks to a boxed backend, production uses [`HttpBackend`],
//! and tests substitute a scripted double.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use url::Url;

use super::protocol::ChatRequest;

/// Failures from talking to the backend.
///
/// Non-2xx statuses and transport failures are surfaced uniformly; response
/// bodies of failed requests are not consumed.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never completed (connect, DNS, timeout, ...).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The server answered with a non-success status.
    #[error("server returned {0}")]
    Status(reqwest::StatusCode),
    /// The file selected for upload could not be read.
    #[error("could not read {path}: {source}")]
    Read {
        /// The file that failed to read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

/// Transport seam for the two backend endpoints.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Sends one chat request and returns the raw 2xx response body.
    ///
    /// Decoding is left to the caller so that malformed bodies can degrade
    /// instead of erroring.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Status`] for any non-2xx response and
    /// [`ApiError::Transport`] when the request does not complete.
    async fn chat(&self, request: &ChatRequest) -> Result<String, ApiError>;

    /// Uploads one file as the sole `file` field of a multipart form.
    ///
    /// Any 2xx status is success; the response body is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Read`] if the file cannot be read, otherwise as
    /// for [`Backend::chat`].
    async fn upload(&self, path: &Path) -> Result<(), ApiError>;
}

/// Production backend over reqwest.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: reqwest::Client,
    base: Url,
}

impl HttpBackend {
    /// Creates a backend client for the given base address.
    #[must_use]
    pub fn new(base: Url) -> Self {
        Self {
            http: reqwest::Client::new(),
            base,
        }
    }

    /// Builds an endpoint URL on the configured base address.
    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base.clone();
        url.set_path(path);
        url
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn chat(&self, request: &ChatRequest) -> Result<String, ApiError> {
        let response = self
            .http
            .post(self.endpoint("/chat"))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status));
        }

        Ok(response.text().await?)
    }

    async fn upload(&self, path: &Path) -> Result<(), ApiError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| ApiError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("document")
            .to_string();

        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(self.endpoint("/upload"))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ApiError::Status(status))
        }
    }
}
