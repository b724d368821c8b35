//! Byte fetching abstraction
//!
//! The loader never talks to a transport directly. A `Fetcher` turns a URL
//! into bytes and reports progress while doing so; credentials and the
//! path prefix are handed through untouched in `FetchOptions`.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use smartex_core::Error;

use crate::stream::{ChunkedReader, DEFAULT_CHUNK_SIZE};

/// Result type for fetch operations
pub type FetchResult<T> = Result<T, FetchError>;

/// Fetch operation errors
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Not found: {url}")]
    NotFound { url: String },

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("I/O error reading {url}: {source}")]
    Io {
        url: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// URL the failed request was made for
    pub fn url(&self) -> &str {
        match self {
            FetchError::NotFound { url }
            | FetchError::Status { url, .. }
            | FetchError::Io { url, .. }
            | FetchError::Request { url, .. }
            | FetchError::InvalidUrl(url) => url.as_str(),
        }
    }
}

impl From<FetchError> for Error {
    fn from(err: FetchError) -> Self {
        Error::transport(err.url().to_string(), err.to_string())
    }
}

/// Progress of a single fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchProgress {
    /// Bytes received so far
    pub loaded: u64,
    /// Total size if the transport knows it
    pub total: Option<u64>,
}

impl FetchProgress {
    /// Completion ratio in `[0, 1]`, if the total is known
    pub fn fraction(&self) -> Option<f64> {
        match self.total {
            Some(0) => Some(1.0),
            Some(total) => Some((self.loaded as f64 / total as f64).min(1.0)),
            None => None,
        }
    }
}

/// Per-request settings passed through to the fetcher
///
/// `with_credentials` and `cross_origin` are browser request hints. Fetchers
/// without an origin model, including `FilesystemFetcher` and `HttpFetcher`,
/// ignore them and only apply `path`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Prefix prepended to every URL
    pub path: Option<String>,
    /// Send credentials with cross-origin requests, where the fetcher has such a notion
    pub with_credentials: bool,
    /// Cross-origin mode label, where the fetcher has such a notion
    pub cross_origin: Option<String>,
}

impl FetchOptions {
    /// Apply the path prefix to a URL
    pub fn resolve(&self, url: &str) -> String {
        match &self.path {
            Some(prefix) => format!("{prefix}{url}"),
            None => url.to_string(),
        }
    }
}

/// Source of container bytes
pub trait Fetcher: Send + Sync {
    /// Fetch the whole resource at `url`
    ///
    /// `on_progress` may be called any number of times before returning.
    fn fetch(
        &self,
        url: &str,
        options: &FetchOptions,
        on_progress: &mut dyn FnMut(FetchProgress),
    ) -> FetchResult<Bytes>;
}

/// Fetcher that reads URLs as paths below a root directory
pub struct FilesystemFetcher {
    root: PathBuf,
    chunk_size: usize,
}

impl FilesystemFetcher {
    /// Create a new filesystem fetcher rooted at `root`
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Set the read chunk size (one progress event per chunk)
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Get absolute path from a URL
    fn resolve_path(&self, url: &str) -> FetchResult<PathBuf> {
        let path = url.strip_prefix("file://").unwrap_or(url);
        let path = path.split(['?', '#']).next().unwrap_or_default();

        if path.is_empty() {
            return Err(FetchError::InvalidUrl(url.to_string()));
        }

        Ok(self.root.join(path.trim_start_matches('/')))
    }
}

impl Fetcher for FilesystemFetcher {
    fn fetch(
        &self,
        url: &str,
        options: &FetchOptions,
        on_progress: &mut dyn FnMut(FetchProgress),
    ) -> FetchResult<Bytes> {
        let url = options.resolve(url);
        let path = self.resolve_path(&url)?;

        let file = match std::fs::File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(FetchError::NotFound { url });
            }
            Err(source) => return Err(FetchError::Io { url, source }),
        };

        let total = file.metadata().ok().map(|m| m.len());
        tracing::trace!(path = %path.display(), ?total, "Reading file");

        let data = ChunkedReader::new(file, self.chunk_size)
            .read_to_end_with_progress(total, on_progress)
            .map_err(|source| FetchError::Io { url, source })?;

        Ok(Bytes::from(data))
    }
}

#[cfg(feature = "http")]
pub use http::HttpFetcher;

#[cfg(feature = "http")]
mod http {
    use std::time::Duration;

    use bytes::Bytes;

    use super::{FetchError, FetchOptions, FetchProgress, FetchResult, Fetcher};
    use crate::stream::{ChunkedReader, DEFAULT_CHUNK_SIZE};

    /// Fetcher backed by a blocking reqwest client
    pub struct HttpFetcher {
        client: reqwest::blocking::Client,
    }

    impl HttpFetcher {
        /// Creates a new HttpFetcher with a 30 second timeout.
        pub fn new() -> FetchResult<Self> {
            Self::with_timeout(Duration::from_secs(30))
        }

        /// Creates a new HttpFetcher with custom timeout.
        pub fn with_timeout(timeout: Duration) -> FetchResult<Self> {
            let client = reqwest::blocking::Client::builder()
                .timeout(timeout)
                .build()
                .map_err(|e| FetchError::Request {
                    url: String::new(),
                    message: format!("Failed to create HTTP client: {}", e),
                })?;

            Ok(Self { client })
        }
    }

    impl Fetcher for HttpFetcher {
        fn fetch(
            &self,
            url: &str,
            options: &FetchOptions,
            on_progress: &mut dyn FnMut(FetchProgress),
        ) -> FetchResult<Bytes> {
            let url = options.resolve(url);

            let response = self.client.get(&url).send().map_err(|e| FetchError::Request {
                url: url.clone(),
                message: e.to_string(),
            })?;

            let status = response.status();
            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(FetchError::NotFound { url });
            }
            if !status.is_success() {
                return Err(FetchError::Status {
                    url,
                    status: status.as_u16(),
                });
            }

            let total = response.content_length();
            let data = ChunkedReader::new(response, DEFAULT_CHUNK_SIZE)
                .read_to_end_with_progress(total, on_progress)
                .map_err(|source| FetchError::Io { url, source })?;

            Ok(Bytes::from(data))
        }
    }
}
