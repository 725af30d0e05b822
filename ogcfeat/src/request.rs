//! Request URL construction.
//!
//! Pure helpers that build collection-items request URLs and resolve `next`
//! links from response envelopes. All builders operate on a copy of the base
//! URL and preserve every query parameter they do not explicitly own — the
//! configured base URL may carry pass-through parameters (auth tokens and
//! the like) that must never be dropped.

use url::Url;

use crate::error::{LoadError, LoadResult};
use crate::extent::Extent;
use crate::wire::Link;

/// Replace the given query parameters on a copy of `base`.
///
/// Parameters named in `params` are removed first and appended exactly once;
/// every other pre-existing parameter is preserved in its original order.
pub(crate) fn replace_params(base: &Url, params: &[(&str, &str)]) -> Url {
    let mut url = base.clone();
    let retained: Vec<(String, String)> = base
        .query_pairs()
        .filter(|(key, _)| !params.iter().any(|(name, _)| key.as_ref() == *name))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    {
        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        for (key, value) in &retained {
            pairs.append_pair(key, value);
        }
        for (name, value) in params {
            pairs.append_pair(name, value);
        }
    }

    url
}

/// Build the items request URL for one viewport extent.
///
/// Sets `bbox` (comma-joined min-x,min-y,max-x,max-y), `bbox-crs`, `crs` and
/// the `f=json` format parameter on a copy of the base items URL.
pub fn items_request_url(base_items: &Url, extent: &Extent, crs: &str) -> Url {
    let bbox = extent.bbox_value();
    replace_params(
        base_items,
        &[("bbox", &bbox), ("bbox-crs", crs), ("crs", crs), ("f", "json")],
    )
}

/// Build one offset-strategy page URL.
///
/// Replaces any existing `offset` and `limit` parameters; all other query
/// parameters on the base URL are preserved.
pub fn offset_page_url(base: &Url, offset: u64, limit: u64) -> Url {
    let offset = offset.to_string();
    let limit = limit.to_string();
    replace_params(base, &[("offset", &offset), ("limit", &limit)])
}

/// Set the `limit` parameter, preserving everything else.
///
/// Used by the next-link strategy to cap the first page; subsequent page
/// URLs come verbatim from the server.
pub fn with_limit(base: &Url, limit: u64) -> Url {
    let limit = limit.to_string();
    replace_params(base, &[("limit", &limit)])
}

/// Extract the single usable `next` link from a response's `links` array.
///
/// Returns `None` when no `rel == "next"` link exists, and also when more
/// than one exists: server implementations vary, and an ambiguous plural
/// `next` is treated as "no usable next link" rather than an error.
pub fn next_link(links: &[Link]) -> Option<&str> {
    let mut found = None;
    for link in links {
        if link.rel == "next" {
            if found.is_some() {
                return None;
            }
            found = Some(link.href.as_str());
        }
    }
    found
}

/// URL of the collection description document: `{base}/collections/{id}`.
pub fn collection_url(base: &Url, collection: &str) -> LoadResult<Url> {
    join_path(base, &["collections", collection])
}

/// URL of the collection's items endpoint: `{base}/collections/{id}/items`.
pub fn collection_items_url(base: &Url, collection: &str) -> LoadResult<Url> {
    join_path(base, &["collections", collection, "items"])
}

fn join_path(base: &Url, segments: &[&str]) -> LoadResult<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| {
            LoadError::InvalidConfiguration(format!("base URL {} cannot have a path", base))
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn link(rel: &str, href: &str) -> Link {
        Link {
            rel: rel.to_string(),
            href: href.to_string(),
        }
    }

    #[test]
    fn test_items_request_url_sets_all_params() {
        let base = Url::parse("https://demo.org/api/collections/lakes/items").unwrap();
        let extent = Extent::new(-10.0, 40.0, 2.0, 52.0);
        let url = items_request_url(&base, &extent, "http://www.opengis.net/def/crs/EPSG/0/4326");

        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("bbox".into(), "-10,40,2,52".into())));
        assert!(pairs.contains(&(
            "bbox-crs".into(),
            "http://www.opengis.net/def/crs/EPSG/0/4326".into()
        )));
        assert!(pairs.contains(&(
            "crs".into(),
            "http://www.opengis.net/def/crs/EPSG/0/4326".into()
        )));
        assert!(pairs.contains(&("f".into(), "json".into())));
    }

    #[test]
    fn test_items_request_url_is_idempotent() {
        let base = Url::parse("https://demo.org/items").unwrap();
        let extent = Extent::new(0.0, 0.0, 1.0, 1.0);
        let once = items_request_url(&base, &extent, "crs-a");
        let twice = items_request_url(&once, &extent, "crs-a");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_offset_page_url_preserves_passthrough_params() {
        let base = Url::parse("https://demo.org/items?token=secret&f=json&limit=10").unwrap();
        let url = offset_page_url(&base, 300, 100);

        assert_eq!(
            url.query_pairs().find(|(k, _)| k == "token").unwrap().1,
            "secret"
        );
        assert_eq!(url.query_pairs().find(|(k, _)| k == "f").unwrap().1, "json");
        assert_eq!(
            url.query_pairs().find(|(k, _)| k == "offset").unwrap().1,
            "300"
        );
        assert_eq!(
            url.query_pairs().find(|(k, _)| k == "limit").unwrap().1,
            "100"
        );
        // Replaced, not duplicated.
        assert_eq!(url.query_pairs().filter(|(k, _)| k == "limit").count(), 1);
    }

    #[test]
    fn test_with_limit_replaces_existing_limit_only() {
        let base = Url::parse("https://demo.org/items?limit=5&bbox=1,2,3,4").unwrap();
        let url = with_limit(&base, 1000);

        assert_eq!(
            url.query_pairs().find(|(k, _)| k == "limit").unwrap().1,
            "1000"
        );
        assert_eq!(
            url.query_pairs().find(|(k, _)| k == "bbox").unwrap().1,
            "1,2,3,4"
        );
    }

    #[test]
    fn test_next_link_single() {
        let links = [link("self", "http://a"), link("next", "http://b")];
        assert_eq!(next_link(&links), Some("http://b"));
    }

    #[test]
    fn test_next_link_absent() {
        let links = [link("self", "http://a")];
        assert_eq!(next_link(&links), None);
        assert_eq!(next_link(&[]), None);
    }

    #[test]
    fn test_next_link_plural_is_ambiguous() {
        let links = [link("next", "http://a"), link("next", "http://b")];
        assert_eq!(next_link(&links), None);
    }

    #[test]
    fn test_collection_url_joins_path() {
        let base = Url::parse("https://demo.org/api").unwrap();
        let url = collection_url(&base, "lakes").unwrap();
        assert_eq!(url.as_str(), "https://demo.org/api/collections/lakes");
    }

    #[test]
    fn test_collection_items_url_with_trailing_slash() {
        let base = Url::parse("https://demo.org/api/").unwrap();
        let url = collection_items_url(&base, "lakes").unwrap();
        assert_eq!(url.as_str(), "https://demo.org/api/collections/lakes/items");
    }

    proptest! {
        /// Every pre-existing parameter other than offset/limit survives the
        /// offset page builder, and offset/limit appear exactly once.
        #[test]
        fn prop_offset_page_url_preserves_other_params(
            key in "[a-z]{1,8}",
            value in "[a-zA-Z0-9]{0,12}",
            offset in 0u64..1_000_000,
            limit in 1u64..100_000,
        ) {
            prop_assume!(key != "offset" && key != "limit");

            let mut base = Url::parse("https://demo.org/items").unwrap();
            base.query_pairs_mut()
                .append_pair(&key, &value)
                .append_pair("offset", "7")
                .append_pair("limit", "7");

            let url = offset_page_url(&base, offset, limit);

            prop_assert_eq!(
                url.query_pairs().find(|(k, _)| k == &key).map(|(_, v)| v.into_owned()),
                Some(value)
            );
            prop_assert_eq!(url.query_pairs().filter(|(k, _)| k == "offset").count(), 1);
            prop_assert_eq!(url.query_pairs().filter(|(k, _)| k == "limit").count(), 1);
            prop_assert_eq!(
                url.query_pairs().find(|(k, _)| k == "offset").map(|(_, v)| v.into_owned()),
                Some(offset.to_string())
            );
        }
    }
}
