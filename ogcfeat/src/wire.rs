//! Wire-format envelopes for OGC API Features responses.
//!
//! Only the subset of the response shape the loader relies on is modeled;
//! unknown fields are ignored. The `features` array is kept as raw JSON
//! values so the actual feature decoding stays behind the injected
//! [`FeatureDecoder`](crate::decode::FeatureDecoder) seam.

use serde::Deserialize;

/// A hyperlink from a feature-collection response's `links` array.
#[derive(Debug, Clone, Deserialize)]
pub struct Link {
    /// Link relation, e.g. `"self"` or `"next"`.
    #[serde(default)]
    pub rel: String,

    /// Target URL, encoded by the server.
    pub href: String,
}

/// One page of a feature-collection response.
#[derive(Debug, Deserialize)]
pub struct FeatureCollectionPage {
    /// Raw features in server order, decoded later by the injected decoder.
    #[serde(default)]
    pub features: Vec<serde_json::Value>,

    /// Server's total-count hint for the whole query, absent if unsupported.
    ///
    /// When present it is stable across pages of the same logical query.
    #[serde(rename = "numberMatched")]
    pub number_matched: Option<u64>,

    /// Response links; the loader only inspects `rel == "next"` entries.
    #[serde(default)]
    pub links: Vec<Link>,
}

/// Server-provided collection description from `{base}/collections/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct CollectionMetadata {
    /// Collection identifier.
    pub id: String,

    /// Supported CRS identifiers in the server's own order.
    ///
    /// The first entry is conventionally treated as the default.
    pub crs: Option<Vec<String>>,

    /// Attribution text to display alongside the collection's features.
    pub attribution: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_with_all_fields() {
        let page: FeatureCollectionPage = serde_json::from_str(
            r#"{
                "type": "FeatureCollection",
                "features": [{"type": "Feature", "geometry": null, "properties": {}}],
                "numberMatched": 42,
                "links": [{"rel": "next", "href": "http://example.com/items?offset=10"}]
            }"#,
        )
        .unwrap();
        assert_eq!(page.features.len(), 1);
        assert_eq!(page.number_matched, Some(42));
        assert_eq!(page.links[0].rel, "next");
    }

    #[test]
    fn test_page_with_missing_optionals() {
        let page: FeatureCollectionPage =
            serde_json::from_str(r#"{"type": "FeatureCollection"}"#).unwrap();
        assert!(page.features.is_empty());
        assert_eq!(page.number_matched, None);
        assert!(page.links.is_empty());
    }

    #[test]
    fn test_collection_metadata() {
        let metadata: CollectionMetadata = serde_json::from_str(
            r#"{
                "id": "lakes",
                "crs": ["http://www.opengis.net/def/crs/OGC/1.3/CRS84"],
                "attribution": "Natural Earth",
                "itemType": "feature"
            }"#,
        )
        .unwrap();
        assert_eq!(metadata.id, "lakes");
        assert_eq!(metadata.crs.as_ref().unwrap().len(), 1);
        assert_eq!(metadata.attribution.as_deref(), Some("Natural Earth"));
    }

    #[test]
    fn test_collection_metadata_minimal() {
        let metadata: CollectionMetadata = serde_json::from_str(r#"{"id": "lakes"}"#).unwrap();
        assert!(metadata.crs.is_none());
        assert!(metadata.attribution.is_none());
    }
}
