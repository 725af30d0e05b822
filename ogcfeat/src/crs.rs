//! Request CRS negotiation.
//!
//! Picks the CRS used for `crs`/`bbox-crs` request parameters from the map's
//! CRS, an optional per-source override, and the server's supported CRS
//! list. Resolution is deterministic per map CRS, so results are cached in
//! an append-only per-source map (a map widget can change projection over
//! its lifetime, but each projection always resolves the same way).

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::warn;

/// Fallback request CRS when the map CRS is not supported by the server.
pub const DEFAULT_REQUEST_CRS: &str = "http://www.opengis.net/def/crs/OGC/1.3/CRS84";

/// Match a CRS code against the server's supported CRS URIs.
///
/// A short-form `EPSG:<code>` is expanded to the canonical
/// `http://www.opengis.net/def/crs/EPSG/0/<code>` URI before comparison;
/// anything else must match exactly. Only the `/0/` authority-version form
/// is recognized — this is a deliberate heuristic, not a full CRS-URI
/// equivalence engine.
pub fn find_matching_crs(test_crs: &str, available: Option<&[String]>) -> Option<String> {
    let candidate = match test_crs.strip_prefix("EPSG:") {
        Some(code) => format!("http://www.opengis.net/def/crs/EPSG/0/{}", code),
        None => test_crs.to_string(),
    };

    available?
        .iter()
        .find(|uri| uri.as_str() == candidate)
        .cloned()
}

/// Per-source CRS negotiator with an append-only per-map-CRS cache.
pub struct CrsNegotiator {
    /// Configured override; always wins when set.
    override_crs: Option<String>,

    /// Resolved request CRS per map CRS code.
    cache: RwLock<HashMap<String, String>>,
}

impl CrsNegotiator {
    /// Create a negotiator, optionally with a configured override CRS.
    pub fn new(override_crs: Option<String>) -> Self {
        Self {
            override_crs,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Resolve the request CRS for the given map CRS.
    ///
    /// Resolution order: the configured override (unconditionally, even if
    /// the server does not list it), then a match of the map CRS against the
    /// supported list, then [`DEFAULT_REQUEST_CRS`] with a warning naming
    /// the unsupported map CRS.
    pub fn request_crs(&self, map_crs: &str, supported: Option<&[String]>) -> String {
        if let Some(override_crs) = &self.override_crs {
            return override_crs.clone();
        }

        if let Some(cached) = self.cache.read().get(map_crs) {
            return cached.clone();
        }

        let resolved = match find_matching_crs(map_crs, supported) {
            Some(uri) => uri,
            None => {
                warn!(
                    map_crs = %map_crs,
                    fallback = DEFAULT_REQUEST_CRS,
                    "map CRS not supported by collection, falling back"
                );
                DEFAULT_REQUEST_CRS.to_string()
            }
        };

        // Idempotent write-after-check: a racing resolver computes the same
        // value from the same inputs.
        self.cache
            .write()
            .insert(map_crs.to_string(), resolved.clone());
        resolved
    }
}
