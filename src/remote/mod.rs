pub mod http;
pub mod metrics;

pub use http::HttpSource;
pub use metrics::FetchMetrics;

use async_trait::async_trait;
use std::pin::Pin;
use thiserror::Error;
use tokio::io::AsyncRead;

/// A failed attempt against a single mirror
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("failed to copy {url}: {source}")]
    Io {
        url: String,
        #[source]
        source: std::io::Error,
    },
}

/// Open response body of a remote archive
pub struct RemoteBody {
    /// Length announced by the server, if any
    pub content_length: Option<u64>,
    pub reader: Pin<Box<dyn AsyncRead + Send>>,
}

impl std::fmt::Debug for RemoteBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteBody")
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Outbound access to mirror repositories
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Fetch a small text document (repository metadata)
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError>;

    /// Open a streaming download of a binary artifact
    async fn open(&self, url: &str) -> Result<RemoteBody, FetchError>;
}
