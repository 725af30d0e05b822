//! Pagination strategies.
//!
//! Two ways to walk a server-paginated feature collection:
//!
//! - [`NextLinkStrategy`] — standards-compliant sequential traversal of
//!   server-provided `next` links. Serial by construction: each page's URL
//!   comes from the previous page's response.
//! - [`OffsetStrategy`] — non-standard parallel paging via `offset`/`limit`
//!   parameters. Issues rounds of up to `concurrency` page requests at once,
//!   which is its speed advantage over the next-link walk.
//!
//! The applicable strategy is detected per source (capability probe) and
//! chosen once per load as a [`Strategy`] value, then driven to completion.
//! Both strategies stream each decoded page to a sink callback as soon as
//! that page is available and return the aggregate of all completed pages.

mod next;
mod offset;

pub use next::NextLinkStrategy;
pub use offset::OffsetStrategy;

use tokio_util::sync::CancellationToken;
use url::Url;

use crate::decode::FeatureDecoder;
use crate::error::{LoadError, LoadResult};
use crate::http::{self, HttpClient};
use crate::request;

/// The pagination strategy selected for one load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Sequential traversal of server-provided `next` links.
    Next,

    /// Parallel offset/limit paging with the given request concurrency.
    Offset { concurrency: usize },
}

/// Streaming sink for partial results.
///
/// Invoked once per fetched page with that page's features; a multi-page
/// load calls it multiple times. Pages are atomic (one invocation per page)
/// but cross-page invocation order is unspecified under the offset strategy.
pub type FeatureSink<'a, F> = &'a (dyn Fn(&[F]) + Send + Sync);

/// One fetched and decoded page.
#[derive(Debug)]
pub struct FeatureBatch<F> {
    /// Decoded features in server order.
    pub features: Vec<F>,

    /// URL of the following page, absent on the last page.
    pub next_link: Option<String>,

    /// Server's total-count hint, absent if unsupported.
    pub number_matched: Option<u64>,
}

/// Fetch one page and decode it, observing the session's cancellation token.
pub(crate) async fn fetch_page<C, D>(
    client: &C,
    decoder: &D,
    url: &Url,
    cancel: &CancellationToken,
) -> LoadResult<FeatureBatch<D::Feature>>
where
    C: HttpClient + ?Sized,
    D: FeatureDecoder + ?Sized,
{
    let response = http::fetch(client, url, cancel).await?;
    if response.status() != 200 {
        return Err(LoadError::PageFetch {
            url: url.to_string(),
            status: response.status(),
        });
    }

    let page: crate::wire::FeatureCollectionPage =
        response.json().map_err(|e| LoadError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let next_link = request::next_link(&page.links).map(str::to_owned);
    let number_matched = page.number_matched;
    let features = decoder
        .decode(page.features)
        .map_err(|e| LoadError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    Ok(FeatureBatch {
        features,
        next_link,
        number_matched,
    })
}
