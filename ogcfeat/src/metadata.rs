//! Collection metadata cache and offset-capability probe.
//!
//! Both the collection description and the offset-support probe are fetched
//! lazily, once per source lifetime. The in-flight future is memoized as a
//! [`Shared`] future so concurrent viewport loads share a single HTTP
//! request — and, on failure, the same error. A failed memo is cleared so a
//! later load retries instead of replaying a transient error forever.
//!
//! The memoized futures are shared across load sessions, so they do not
//! observe any single session's cancellation token: cancelling one viewport
//! load must not tear down the metadata another load is waiting on.

use std::sync::Arc;

use futures::future::{FutureExt, Shared};
use parking_lot::Mutex;
use tracing::debug;
use url::Url;

use crate::error::{LoadError, LoadResult};
use crate::http::{BoxFuture, HttpClient};
use crate::request;
use crate::wire::{CollectionMetadata, FeatureCollectionPage};

type SharedLoad<T> = Shared<BoxFuture<'static, LoadResult<T>>>;

/// Lazily fetched, memoized per-collection metadata and capabilities.
pub struct CollectionMetadataCache<C> {
    client: Arc<C>,
    base_url: Url,
    collection: String,
    metadata: Mutex<Option<SharedLoad<Arc<CollectionMetadata>>>>,
    offset_support: Mutex<Option<SharedLoad<bool>>>,
}

impl<C: HttpClient + 'static> CollectionMetadataCache<C> {
    /// Create a cache for one collection of one service.
    pub fn new(client: Arc<C>, base_url: Url, collection: String) -> Self {
        Self {
            client,
            base_url,
            collection,
            metadata: Mutex::new(None),
            offset_support: Mutex::new(None),
        }
    }

    /// The collection description from `{base}/collections/{id}`.
    ///
    /// Fetched on first call and memoized for the cache's lifetime.
    /// Concurrent callers share one in-flight request; a failure is handed
    /// to every waiter and then forgotten so the next call retries.
    pub async fn metadata(&self) -> LoadResult<Arc<CollectionMetadata>> {
        let shared = {
            let mut slot = self.metadata.lock();
            match &*slot {
                Some(existing) => existing.clone(),
                None => {
                    let url = request::collection_url(&self.base_url, &self.collection)?;
                    let fut: BoxFuture<'static, _> = Box::pin(fetch_metadata(
                        Arc::clone(&self.client),
                        url,
                        self.collection.clone(),
                    ));
                    let shared = fut.shared();
                    *slot = Some(shared.clone());
                    shared
                }
            }
        };

        let result = shared.clone().await;
        if result.is_err() {
            self.clear_if_current(&self.metadata, &shared);
        }
        result
    }

    /// Whether the collection supports offset/limit paging.
    ///
    /// Probes with a 1-feature request and checks that the returned `next`
    /// link carries an `offset` parameter and that the response reports
    /// `numberMatched`. `false` when the probe yields no next link at all:
    /// the non-standard offset strategy is only used when proven supported.
    pub async fn supports_offset(&self) -> LoadResult<bool> {
        let shared = {
            let mut slot = self.offset_support.lock();
            match &*slot {
                Some(existing) => existing.clone(),
                None => {
                    let items_url =
                        request::collection_items_url(&self.base_url, &self.collection)?;
                    let fut: BoxFuture<'static, _> =
                        Box::pin(probe_offset_support(Arc::clone(&self.client), items_url));
                    let shared = fut.shared();
                    *slot = Some(shared.clone());
                    shared
                }
            }
        };

        let result = shared.clone().await;
        if result.is_err() {
            self.clear_if_current(&self.offset_support, &shared);
        }
        result
    }

    /// Clear a memo slot, but only if it still holds the future that just
    /// failed — a retry started by another caller must not be evicted.
    fn clear_if_current<T>(&self, slot: &Mutex<Option<SharedLoad<T>>>, failed: &SharedLoad<T>) {
        let mut slot = slot.lock();
        if slot.as_ref().is_some_and(|current| current.ptr_eq(failed)) {
            *slot = None;
        }
    }
}

async fn fetch_metadata<C: HttpClient>(
    client: Arc<C>,
    url: Url,
    collection: String,
) -> LoadResult<Arc<CollectionMetadata>> {
    debug!(url = %url, "fetching collection metadata");
    let response = client.get(&url).await?;
    if !response.is_success() {
        return Err(LoadError::MetadataFetch {
            collection,
            status: response.status(),
        });
    }

    let metadata: CollectionMetadata = response.json().map_err(|e| LoadError::Decode {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    Ok(Arc::new(metadata))
}

async fn probe_offset_support<C: HttpClient>(client: Arc<C>, items_url: Url) -> LoadResult<bool> {
    let url = request::replace_params(&items_url, &[("limit", "1"), ("f", "json")]);
    debug!(url = %url, "probing offset strategy support");

    let response = client.get(&url).await?;
    if response.status() != 200 {
        return Err(LoadError::CapabilityProbe {
            status: response.status(),
        });
    }

    let page: FeatureCollectionPage = response.json().map_err(|e| LoadError::Decode {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    let Some(next) = request::next_link(&page.links) else {
        // Collection too small to page, or no next links exposed. Assume the
        // standard strategy when in doubt.
        return Ok(false);
    };

    let next_has_offset = Url::parse(next)
        .map(|u| u.query_pairs().any(|(key, _)| key == "offset"))
        .unwrap_or(false);
    let supported = next_has_offset && page.number_matched.is_some();
    debug!(supported, "offset strategy probe complete");
    Ok(supported)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::tests::MockHttpClient;
    use crate::http::HttpResponse;

    fn cache(client: MockHttpClient) -> CollectionMetadataCache<MockHttpClient> {
        CollectionMetadataCache::new(
            Arc::new(client),
            Url::parse("https://demo.org/api").unwrap(),
            "lakes".to_string(),
        )
    }

    #[tokio::test]
    async fn test_metadata_fetched_once() {
        let cache = cache(MockHttpClient::json(r#"{"id": "lakes"}"#));

        let first = cache.metadata().await.unwrap();
        let second = cache.metadata().await.unwrap();
        assert_eq!(first.id, "lakes");
        assert_eq!(second.id, "lakes");
        assert_eq!(cache.client.request_count(), 1);
        assert_eq!(
            cache.client.requests()[0].as_str(),
            "https://demo.org/api/collections/lakes"
        );
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_request() {
        let cache = cache(MockHttpClient::json(r#"{"id": "lakes"}"#));

        let (a, b) = tokio::join!(cache.metadata(), cache.metadata());
        assert!(a.is_ok());
        assert!(b.is_ok());
        assert_eq!(cache.client.request_count(), 1);
    }

    #[tokio::test]
    async fn test_metadata_failure_clears_memo_for_retry() {
        let cache = cache(MockHttpClient::new(vec![
            Ok(HttpResponse::new(500, Vec::new())),
            Ok(HttpResponse::new(
                200,
                br#"{"id": "lakes"}"#.to_vec(),
            )),
        ]));

        let first = cache.metadata().await;
        assert!(matches!(
            first,
            Err(LoadError::MetadataFetch { status: 500, .. })
        ));

        // The failed memo was cleared, so this call re-attempts the fetch.
        let second = cache.metadata().await.unwrap();
        assert_eq!(second.id, "lakes");
        assert_eq!(cache.client.request_count(), 2);
    }

    #[tokio::test]
    async fn test_probe_detects_offset_support() {
        let cache = cache(MockHttpClient::json(
            r#"{
                "features": [{}],
                "numberMatched": 120,
                "links": [{"rel": "next", "href": "https://demo.org/api/collections/lakes/items?offset=1&limit=1"}]
            }"#,
        ));

        assert!(cache.supports_offset().await.unwrap());
        let probe_url = &cache.client.requests()[0];
        assert!(probe_url.query_pairs().any(|(k, v)| k == "limit" && v == "1"));
        assert!(probe_url.query_pairs().any(|(k, v)| k == "f" && v == "json"));
    }

    #[tokio::test]
    async fn test_probe_without_next_link_means_unsupported() {
        let cache = cache(MockHttpClient::json(r#"{"features": [{}]}"#));
        assert!(!cache.supports_offset().await.unwrap());
    }

    #[tokio::test]
    async fn test_probe_next_link_without_offset_means_unsupported() {
        let cache = cache(MockHttpClient::json(
            r#"{
                "numberMatched": 120,
                "links": [{"rel": "next", "href": "https://demo.org/items?cursor=abc"}]
            }"#,
        ));
        assert!(!cache.supports_offset().await.unwrap());
    }

    #[tokio::test]
    async fn test_probe_without_number_matched_means_unsupported() {
        let cache = cache(MockHttpClient::json(
            r#"{
                "links": [{"rel": "next", "href": "https://demo.org/items?offset=1"}]
            }"#,
        ));
        assert!(!cache.supports_offset().await.unwrap());
    }

    #[tokio::test]
    async fn test_probe_non_200_is_an_error_and_retried() {
        let cache = cache(MockHttpClient::new(vec![
            Ok(HttpResponse::new(503, Vec::new())),
            Ok(HttpResponse::new(
                200,
                br#"{"features": [{}]}"#.to_vec(),
            )),
        ]));

        let first = cache.supports_offset().await;
        assert!(matches!(
            first,
            Err(LoadError::CapabilityProbe { status: 503 })
        ));

        let second = cache.supports_offset().await.unwrap();
        assert!(!second);
        assert_eq!(cache.client.request_count(), 2);
    }

    #[tokio::test]
    async fn test_probe_memoized_once_resolved() {
        let cache = cache(MockHttpClient::json(r#"{"features": [{}]}"#));

        assert!(!cache.supports_offset().await.unwrap());
        assert!(!cache.supports_offset().await.unwrap());
        assert_eq!(cache.client.request_count(), 1);
    }
}
