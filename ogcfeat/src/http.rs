//! HTTP client abstraction for testability.
//!
//! The loader never talks to the network directly: every request goes through
//! the [`HttpClient`] trait so tests can inject scripted clients and hosts can
//! supply their own transport (connection pools, auth middleware, proxies).
//!
//! # Dyn Compatibility
//!
//! Async methods use the [`BoxFuture`] alias (`Pin<Box<dyn Future>>`) so the
//! trait stays usable as `Arc<dyn HttpClient>`.
//!
//! # Cancellation
//!
//! Session cancellation is cooperative: [`fetch`] races the client's GET
//! against the session's [`CancellationToken`] and resolves to
//! [`LoadError::Cancelled`] the moment the token fires. Dropping the losing
//! future aborts the underlying request.

use std::future::Future;
use std::pin::Pin;

use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::{LoadError, LoadResult};

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A decoded HTTP response: status plus raw body.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    status: u16,
    body: Vec<u8>,
}

impl HttpResponse {
    /// Create a response from a status code and body bytes.
    pub fn new(status: u16, body: Vec<u8>) -> Self {
        Self { status, body }
    }

    /// The HTTP status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Deserialize the body as JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Trait for HTTP GET operations.
///
/// Implementations must be `Send + Sync`: the offset strategy issues several
/// GETs through the same client concurrently.
pub trait HttpClient: Send + Sync {
    /// Perform an HTTP GET request.
    ///
    /// Returns the response (any status) or a transport-level error. Status
    /// handling is the caller's concern; implementations must not treat
    /// non-2xx responses as errors.
    fn get<'a>(&'a self, url: &'a Url) -> BoxFuture<'a, LoadResult<HttpResponse>>;
}

/// Issue a GET that cooperatively observes the session's cancellation token.
///
/// The token is checked before the request is issued, so a superseded session
/// stops scheduling new requests immediately; an in-flight request is dropped
/// the moment the token fires.
pub(crate) async fn fetch<C: HttpClient + ?Sized>(
    client: &C,
    url: &Url,
    cancel: &CancellationToken,
) -> LoadResult<HttpResponse> {
    if cancel.is_cancelled() {
        return Err(LoadError::Cancelled);
    }

    tokio::select! {
        biased;

        _ = cancel.cancelled() => Err(LoadError::Cancelled),
        result = client.get(url) => result,
    }
}

/// Real HTTP client implementation using reqwest.
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Create a client with the default 30-second timeout.
    pub fn new() -> LoadResult<Self> {
        Self::with_timeout(30)
    }

    /// Create a client with a custom request timeout.
    pub fn with_timeout(timeout_secs: u64) -> LoadResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| {
                LoadError::InvalidConfiguration(format!("failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    fn get<'a>(&'a self, url: &'a Url) -> BoxFuture<'a, LoadResult<HttpResponse>> {
        Box::pin(async move {
            let response = self
                .client
                .get(url.clone())
                .header("Accept", "application/geo+json, application/json")
                .send()
                .await
                .map_err(|e| LoadError::Transport {
                    url: url.to_string(),
                    reason: e.to_string(),
                })?;

            let status = response.status().as_u16();
            let body = response
                .bytes()
                .await
                .map_err(|e| LoadError::Transport {
                    url: url.to_string(),
                    reason: format!("failed to read response body: {}", e),
                })?
                .to_vec();

            Ok(HttpResponse::new(status, body))
        })
    }
}
