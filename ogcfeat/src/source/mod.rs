//! Feature source loader / orchestrator.
//!
//! [`FeatureSource`] implements the viewport's feature-loader contract:
//! given an extent and map CRS, asynchronously produce the collection's
//! features for that extent or report failure, mediating the metadata
//! cache, CRS negotiator, URL builder and pagination strategies.
//!
//! # Load cycle
//!
//! 1. Resolve collection metadata and the offset-capability probe (lazy,
//!    memoized, shared between concurrent loads).
//! 2. Cancel the previous live session — an extent change always supersedes
//!    an outstanding load, since a stale load would race outdated-viewport
//!    data into the store.
//! 3. Negotiate the request CRS, build the items URL, apply the rewrite
//!    hook, select the strategy, and drive it with the session's token.
//! 4. Report the outcome to the [`FeatureStore`]: the full collection on
//!    success, a silent extent un-mark on cancellation, a logged failure
//!    otherwise — and always fire `changed()` so loading-state UIs that
//!    track loader callbacks cannot get stuck on an aborted load.

mod session;

pub use session::{LoadOutcome, LoadSession};

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, error};

use crate::config::{SourceConfig, StrategyOverride};
use crate::crs::CrsNegotiator;
use crate::decode::FeatureDecoder;
use crate::error::LoadResult;
use crate::extent::Extent;
use crate::http::HttpClient;
use crate::metadata::CollectionMetadataCache;
use crate::request;
use crate::store::FeatureStore;
use crate::strategy::{NextLinkStrategy, OffsetStrategy, Strategy};
use crate::wire::CollectionMetadata;

/// Loader for one collection of one OGC API Features service.
pub struct FeatureSource<C, D> {
    config: SourceConfig,
    client: Arc<C>,
    decoder: D,
    metadata: CollectionMetadataCache<C>,
    negotiator: CrsNegotiator,
    live_session: Mutex<Option<LoadSession>>,
}

impl<C, D> FeatureSource<C, D>
where
    C: HttpClient + 'static,
    D: FeatureDecoder,
{
    /// Create a source, validating the configuration eagerly.
    pub fn new(config: SourceConfig, client: C, decoder: D) -> LoadResult<Self> {
        config.validate()?;

        let client = Arc::new(client);
        let metadata = CollectionMetadataCache::new(
            Arc::clone(&client),
            config.base_url.clone(),
            config.collection.clone(),
        );
        let negotiator = CrsNegotiator::new(config.crs_override.clone());

        Ok(Self {
            config,
            client,
            decoder,
            metadata,
            negotiator,
            live_session: Mutex::new(None),
        })
    }

    /// The collection's metadata (fetched lazily, memoized).
    ///
    /// Exposed so hosts can display attribution alongside the features.
    pub async fn collection_metadata(&self) -> LoadResult<Arc<CollectionMetadata>> {
        self.metadata.metadata().await
    }

    /// The injected HTTP client.
    pub fn client(&self) -> &C {
        self.client.as_ref()
    }

    /// Cancel the currently live load session, if any.
    ///
    /// Hosts call this on teardown; a later `load` starts a fresh session.
    pub fn cancel_active_load(&self) {
        if let Some(session) = &*self.live_session.lock() {
            session.cancel();
        }
    }

    /// Load all features intersecting `extent` into `store`.
    ///
    /// Supersedes any outstanding load for this source. Pages stream into
    /// `store.add_features` as they arrive; the terminal outcome is reported
    /// through the store's callbacks and also returned.
    pub async fn load<S>(&self, extent: Extent, map_crs: &str, store: &S) -> LoadOutcome
    where
        S: FeatureStore<D::Feature>,
    {
        let result = self.run_load(&extent, map_crs, store).await;

        let outcome = match result {
            Ok(features) => {
                debug!(
                    collection = %self.config.collection,
                    extent = %extent,
                    features = features.len(),
                    "load complete"
                );
                store.loaded(&extent, &features);
                LoadOutcome::Succeeded
            }
            Err(e) if e.is_cancelled() => {
                debug!(collection = %self.config.collection, extent = %extent, "load superseded");
                store.unmark_loaded(&extent);
                LoadOutcome::Cancelled
            }
            Err(e) => {
                error!(
                    collection = %self.config.collection,
                    extent = %extent,
                    error = %e,
                    "feature load failed"
                );
                store.failed(&extent);
                LoadOutcome::Failed
            }
        };

        // Unconditional: consumers that derive loading state from loader
        // callbacks would otherwise hang on failed or aborted loads.
        store.changed();
        outcome
    }

    async fn run_load<S>(
        &self,
        extent: &Extent,
        map_crs: &str,
        store: &S,
    ) -> LoadResult<Vec<D::Feature>>
    where
        S: FeatureStore<D::Feature>,
    {
        let metadata = self.metadata.metadata().await?;
        let supports_offset = self.metadata.supports_offset().await?;

        // Supersede the previous session before any page I/O.
        let session = LoadSession::new();
        let token = session.token();
        if let Some(previous) = self.live_session.lock().replace(session) {
            previous.cancel();
        }

        let request_crs = self.negotiator.request_crs(map_crs, metadata.crs.as_deref());
        let items_url =
            request::collection_items_url(&self.config.base_url, &self.config.collection)?;
        let mut url = request::items_request_url(&items_url, extent, &request_crs);
        if let Some(rewrite) = &self.config.url_rewrite {
            url = rewrite(url);
        }

        let strategy = self.select_strategy(supports_offset);
        debug!(
            collection = %self.config.collection,
            strategy = ?strategy,
            crs = %request_crs,
            "starting load"
        );

        let sink = |features: &[D::Feature]| store.add_features(features);
        match strategy {
            Strategy::Next => {
                NextLinkStrategy::new(self.config.page_size, self.config.max_pages)
                    .run(self.client.as_ref(), &self.decoder, &url, &token, &sink)
                    .await
            }
            Strategy::Offset { concurrency } => {
                OffsetStrategy::new(self.config.page_size, concurrency)?
                    .run(self.client.as_ref(), &self.decoder, &url, &token, &sink)
                    .await
            }
        }
    }

    /// Pick the strategy for this load.
    ///
    /// Offset paging is used when the probe proved it supported and the
    /// configuration does not force next-link traversal; an explicit offset
    /// override trusts the operator over the probe.
    fn select_strategy(&self, supports_offset: bool) -> Strategy {
        match self.config.strategy {
            StrategyOverride::Next => Strategy::Next,
            StrategyOverride::Offset => Strategy::Offset {
                concurrency: self.config.concurrency,
            },
            StrategyOverride::Auto => {
                if supports_offset {
                    Strategy::Offset {
                        concurrency: self.config.concurrency,
                    }
                } else {
                    Strategy::Next
                }
            }
        }
    }
}
