//! Error types for the feature loader.
//!
//! Every failure a load can produce is a [`LoadError`] variant. Cancellation
//! is an error variant rather than a separate channel so it travels through
//! the same `?` propagation as genuine failures; callers distinguish it with
//! [`LoadError::is_cancelled`] and must treat it as "superseded", not as a
//! hard error.
//!
//! `LoadError` is `Clone` because the metadata and capability-probe results
//! are memoized as shared futures: every concurrent waiter receives the same
//! outcome, including the same error.

use thiserror::Error;

/// Result type for loader operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Errors that can occur while loading a feature collection.
#[derive(Debug, Clone, Error)]
pub enum LoadError {
    /// The collection metadata request returned a non-2xx status.
    #[error("metadata request for collection {collection} failed with HTTP {status}")]
    MetadataFetch { collection: String, status: u16 },

    /// The offset-support probe request returned a non-200 status.
    #[error("capability probe failed with HTTP {status}")]
    CapabilityProbe { status: u16 },

    /// A page request returned a non-200 status.
    #[error("page request {url} failed with HTTP {status}")]
    PageFetch { url: String, status: u16 },

    /// A response body could not be decoded.
    #[error("failed to decode response from {url}: {reason}")]
    Decode { url: String, reason: String },

    /// The transport failed before an HTTP status was available.
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    /// A configuration value is unusable (e.g. concurrency of zero).
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The load session was superseded or explicitly aborted.
    #[error("load cancelled")]
    Cancelled,

    /// The next-link chain exceeded the configured page bound.
    ///
    /// Guards against servers that emit a perpetual `next` link.
    #[error("next-link chain exceeded {max_pages} pages")]
    PageLimitExceeded { max_pages: u32 },
}

impl LoadError {
    /// Check whether this error represents cancellation rather than failure.
    ///
    /// Cancelled loads are reported silently (the extent is un-marked for a
    /// later retry); all other errors are surfaced as load failures.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, LoadError::Cancelled)
    }
}

/// Error produced by an injected [`FeatureDecoder`](crate::decode::FeatureDecoder).
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct DecodeError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_fetch_display_includes_status() {
        let err = LoadError::PageFetch {
            url: "http://example.com/items".to_string(),
            status: 503,
        };
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("http://example.com/items"));
    }

    #[test]
    fn test_is_cancelled() {
        assert!(LoadError::Cancelled.is_cancelled());
        assert!(!LoadError::CapabilityProbe { status: 500 }.is_cancelled());
    }

    #[test]
    fn test_errors_are_cloneable() {
        let err = LoadError::MetadataFetch {
            collection: "lakes".to_string(),
            status: 500,
        };
        let copy = err.clone();
        assert_eq!(err.to_string(), copy.to_string());
    }
}
