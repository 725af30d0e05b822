//! ogcfeat - Async client loader for OGC API Features collections
//!
//! This library pulls a potentially very large, server-paginated feature
//! collection into a caller-supplied feature store, using either the
//! standards-compliant next-link traversal or a non-standard, higher
//! throughput offset/limit parallel paging strategy.
//!
//! # Architecture
//!
//! ```text
//! viewport event ──► FeatureSource (orchestrator)
//!                      │
//!                      ├─► CollectionMetadataCache  (memoized metadata + probe)
//!                      ├─► CrsNegotiator            (request CRS per map CRS)
//!                      ├─► request::*               (URL construction)
//!                      │
//!                      └─► Strategy
//!                            ├─ NextLinkStrategy    (serial next links)
//!                            └─ OffsetStrategy      (concurrent offset pages)
//!                                  │
//!                                  └─► HttpClient (injected transport)
//!                                        │
//!                                        └─► FeatureDecoder ──► FeatureStore
//! ```
//!
//! The applicable strategy is detected once per source by probing the
//! service; each viewport load cancels the previous in-flight load before
//! starting, so at most one session is ever writing to the store.
//!
//! # Example
//!
//! ```no_run
//! use ogcfeat::{
//!     CollectingStore, Extent, FeatureSource, GeoJsonDecoder, ReqwestClient, SourceConfig,
//! };
//! use url::Url;
//!
//! # async fn demo() -> Result<(), ogcfeat::LoadError> {
//! let config = SourceConfig::new(
//!     Url::parse("https://demo.pygeoapi.io/master").unwrap(),
//!     "lakes",
//! );
//! let source = FeatureSource::new(config, ReqwestClient::new()?, GeoJsonDecoder)?;
//!
//! let store = CollectingStore::new();
//! let extent = Extent::new(-180.0, -90.0, 180.0, 90.0);
//! let outcome = source.load(extent, "EPSG:4326", &store).await;
//!
//! println!("{:?}: {} features", outcome, store.feature_count());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod crs;
pub mod decode;
pub mod error;
pub mod extent;
pub mod http;
pub mod metadata;
pub mod request;
pub mod source;
pub mod store;
pub mod strategy;
pub mod wire;

pub use config::{SourceConfig, StrategyOverride};
pub use decode::{FeatureDecoder, GeoJsonDecoder};
pub use error::{DecodeError, LoadError, LoadResult};
pub use extent::Extent;
pub use http::{HttpClient, HttpResponse, ReqwestClient};
pub use source::{FeatureSource, LoadOutcome};
pub use store::{CollectingStore, FeatureStore};
pub use strategy::{NextLinkStrategy, OffsetStrategy, Strategy};
pub use wire::CollectionMetadata;
