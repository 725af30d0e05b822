//! Parallel offset/limit pagination.

use futures::future::try_join_all;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

use crate::decode::FeatureDecoder;
use crate::error::{LoadError, LoadResult};
use crate::http::HttpClient;
use crate::request;

use super::{fetch_page, FeatureSink};

/// Non-standard paging via `offset`/`limit`, issuing pages concurrently.
///
/// Pages are fetched in rounds of up to `concurrency` requests. While the
/// total feature count is unknown the round size is speculative; once the
/// server reports `numberMatched` the exact number of remaining pages is
/// computed per round. Each page streams its features to the sink the moment
/// it completes; the round as a whole joins before the next round starts.
pub struct OffsetStrategy {
    page_size: u64,
    concurrency: usize,
}

impl OffsetStrategy {
    /// Create a strategy with the given page size and request concurrency.
    ///
    /// Fails with [`LoadError::InvalidConfiguration`] when `concurrency` or
    /// `page_size` is zero.
    pub fn new(page_size: u64, concurrency: usize) -> LoadResult<Self> {
        if concurrency < 1 {
            return Err(LoadError::InvalidConfiguration(
                "offset strategy concurrency must be at least 1".to_string(),
            ));
        }
        if page_size < 1 {
            return Err(LoadError::InvalidConfiguration(
                "offset strategy page size must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            page_size,
            concurrency,
        })
    }

    /// Fetch all pages of `base_url`, streaming each page as it completes.
    ///
    /// A failure of any request in a round fails the whole round and
    /// propagates; pages already streamed stay with the caller. The response
    /// of the last URL in the round's *offset order* — not the last to
    /// complete — is authoritative for the total count and for whether
    /// another round is needed, since later offsets are more likely to
    /// reveal the true end-of-results signal.
    pub async fn run<C, D>(
        &self,
        client: &C,
        decoder: &D,
        base_url: &Url,
        cancel: &CancellationToken,
        sink: FeatureSink<'_, D::Feature>,
    ) -> LoadResult<Vec<D::Feature>>
    where
        C: HttpClient + ?Sized,
        D: FeatureDecoder + ?Sized,
    {
        let mut all = Vec::new();
        let mut offset: u64 = 0;
        let mut total: Option<u64> = None;
        let mut round: u32 = 0;

        loop {
            round += 1;
            let pages = self.round_size(offset, total);
            debug!(round, offset, pages, "starting offset round");

            let urls: Vec<Url> = (0..pages)
                .map(|i| request::offset_page_url(base_url, offset + i * self.page_size, self.page_size))
                .collect();

            let requests = urls.iter().map(|url| async move {
                let batch = fetch_page(client, decoder, url, cancel).await?;
                // Stream immediately on this page's completion, not at the
                // round join.
                sink(&batch.features);
                Ok::<_, LoadError>(batch)
            });

            // Round join: one rejection fails the round as a whole.
            let batches = try_join_all(requests).await?;
            offset += pages * self.page_size;

            // Authoritative continuation data comes from the last URL in
            // offset order; try_join_all preserves input order.
            let last = batches.last().expect("round issues at least one request");
            total = last.number_matched.or(total);
            let has_next = last.next_link.is_some();

            for batch in batches {
                all.extend(batch.features);
            }

            if !has_next {
                break;
            }
        }

        debug!(rounds = round, features = all.len(), "offset paging complete");
        Ok(all)
    }

    /// Number of pages to request in the round starting at `offset`.
    ///
    /// Speculative (`concurrency` pages) while the total is unknown; exact
    /// remaining-page count clamped to `[1, concurrency]` once known.
    fn round_size(&self, offset: u64, total: Option<u64>) -> u64 {
        match total {
            None => self.concurrency as u64,
            Some(total) => {
                let remaining = total.saturating_sub(offset);
                let remaining_pages = remaining.div_ceil(self.page_size);
                remaining_pages.clamp(1, self.concurrency as u64)
            }
        }
    }
}
