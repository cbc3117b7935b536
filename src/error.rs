use thiserror::Error;

use crate::remote::FetchError;

/// Errors surfaced by the fetch/resolve/cache core.
///
/// Every variant ends up as the same not-found response at the HTTP
/// boundary; the variants exist so logs can tell the cases apart.
#[derive(Error, Debug)]
pub enum DocsError {
    /// Coordinate, archive or entry could not be located.
    #[error("not found: {0}")]
    NotFound(String),

    /// The request path did not name a valid coordinate.
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// A single mirror attempt failed. Normally recovered by trying the next mirror.
    #[error(transparent)]
    Transport(#[from] FetchError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DocsError {
    pub fn not_found(what: impl Into<String>) -> Self {
        DocsError::NotFound(what.into())
    }

    pub fn malformed(what: impl Into<String>) -> Self {
        DocsError::MalformedRequest(what.into())
    }
}

pub type Result<T> = std::result::Result<T, DocsError>;
