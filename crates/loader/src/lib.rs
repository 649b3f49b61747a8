//! Image byte loading.
//!
//! A query image is referenced by a string that is either an `http://` /
//! `https://` URL or a local filesystem path. [`Loader`] resolves that
//! reference into raw bytes:
//!
//! - remote references issue a single GET. A `200 OK` yields the body, any
//!   other status yields `Ok(None)`. There is no retry and no distinct error
//!   for "the server said no".
//! - everything else is read from disk in full. A missing file surfaces as
//!   [`LoaderError::Io`] with the original [`std::io::ErrorKind`].
//!
//! No size limits and no streaming: the whole image is buffered.
//!
//! ```no_run
//! # async fn run() -> Result<(), loader::LoaderError> {
//! let bytes = loader::load_image_bytes("extracted/cat.jpg").await?;
//! assert!(bytes.is_some());
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

use reqwest::StatusCode;
use thiserror::Error;

/// Errors surfaced while loading image bytes.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// The remote fetch failed before a status line was received, or the body could not be read.
    #[error("http fetch failed for {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// Local read failed (missing file, permissions, ...).
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LoaderError {
    /// True when the underlying failure is a missing local file.
    pub fn is_not_found(&self) -> bool {
        matches!(self, LoaderError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

/// Classified image reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Remote(String),
    Local(PathBuf),
}

impl ImageSource {
    /// Classify a raw reference. Only the `http://` and `https://` prefixes count as remote.
    pub fn parse(uri: &str) -> Self {
        if uri.starts_with("http://") || uri.starts_with("https://") {
            ImageSource::Remote(uri.to_string())
        } else {
            ImageSource::Local(PathBuf::from(uri))
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, ImageSource::Remote(_))
    }
}

/// Reusable loader holding the HTTP client used for remote references.
#[derive(Debug, Clone, Default)]
pub struct Loader {
    client: reqwest::Client,
}

impl Loader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a loader around an existing client so connection pools can be shared.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Load the bytes referenced by `uri`. See the crate docs for the absent/error split.
    pub async fn load(&self, uri: &str) -> Result<Option<Vec<u8>>, LoaderError> {
        match ImageSource::parse(uri) {
            ImageSource::Remote(url) => self.fetch_remote(&url).await,
            ImageSource::Local(path) => read_local(&path).await.map(Some),
        }
    }

    async fn fetch_remote(&self, url: &str) -> Result<Option<Vec<u8>>, LoaderError> {
        let http_err = |source| LoaderError::Http {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(http_err)?;
        let status = response.status();
        if status != StatusCode::OK {
            tracing::warn!(url, %status, "remote image fetch returned non-OK status");
            return Ok(None);
        }

        let body = response.bytes().await.map_err(http_err)?;
        tracing::debug!(url, bytes = body.len(), "fetched remote image");
        Ok(Some(body.to_vec()))
    }
}

async fn read_local(path: &Path) -> Result<Vec<u8>, LoaderError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| LoaderError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "read local image");
    Ok(bytes)
}

/// One-shot convenience around [`Loader::load`] with a fresh client.
pub async fn load_image_bytes(uri: &str) -> Result<Option<Vec<u8>>, LoaderError> {
    Loader::new().load(uri).await
}
