//! Sequential next-link pagination.

use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

use crate::decode::FeatureDecoder;
use crate::error::{LoadError, LoadResult};
use crate::http::HttpClient;
use crate::request;

use super::{fetch_page, FeatureSink};

/// Standards-compliant pagination by following server-provided `next` links.
///
/// Serial by construction: each page's request URL comes from the previous
/// page's response, trusting the server's own parameter encoding. Relative
/// hrefs are resolved against the page that carried them. The only state
/// carried across iterations is the current request URL.
pub struct NextLinkStrategy {
    page_size: u64,
    max_pages: u32,
}

impl NextLinkStrategy {
    /// Create a strategy with the given page size and page-count bound.
    ///
    /// `page_size` caps the first request via `limit`; later pages use
    /// whatever limit the server encodes into its `next` links. `max_pages`
    /// bounds the walk so a server emitting a perpetual `next` chain fails
    /// the load with [`LoadError::PageLimitExceeded`] instead of looping
    /// forever.
    pub fn new(page_size: u64, max_pages: u32) -> Self {
        Self {
            page_size,
            max_pages,
        }
    }

    /// Walk the next-link chain from `start_url`, streaming each page.
    ///
    /// Any HTTP or decode failure aborts the walk and propagates; pages
    /// already streamed to `sink` stay with the caller, while the returned
    /// aggregate reflects only a fully completed walk.
    pub async fn run<C, D>(
        &self,
        client: &C,
        decoder: &D,
        start_url: &Url,
        cancel: &CancellationToken,
        sink: FeatureSink<'_, D::Feature>,
    ) -> LoadResult<Vec<D::Feature>>
    where
        C: HttpClient + ?Sized,
        D: FeatureDecoder + ?Sized,
    {
        let mut url = request::with_limit(start_url, self.page_size);
        let mut all = Vec::new();
        let mut pages: u32 = 0;

        loop {
            if pages >= self.max_pages {
                return Err(LoadError::PageLimitExceeded {
                    max_pages: self.max_pages,
                });
            }

            let batch = fetch_page(client, decoder, &url, cancel).await?;
            pages += 1;
            debug!(page = pages, features = batch.features.len(), "fetched page");

            sink(&batch.features);
            all.extend(batch.features);

            match batch.next_link {
                Some(next) => {
                    // Hrefs may be relative to the current page (RFC 8288).
                    url = url.join(&next).map_err(|e| LoadError::Decode {
                        url: next.clone(),
                        reason: format!("invalid next link: {}", e),
                    })?;
                }
                None => break,
            }
        }

        debug!(pages, features = all.len(), "next-link walk complete");
        Ok(all)
    }
}
