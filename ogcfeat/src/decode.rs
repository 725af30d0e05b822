//! Feature decoding seam.
//!
//! The loader parses the response envelope (links, `numberMatched`) itself
//! but leaves the contents of the `features` array to an injected decoder.
//! This keeps the loader independent of any particular feature model: hosts
//! embedding an existing geometry library implement [`FeatureDecoder`] for
//! their own type, while [`GeoJsonDecoder`] makes the crate usable out of
//! the box.

use crate::error::DecodeError;

/// Decodes the raw `features` array of one response page.
///
/// A decoder failure aborts the load: a page either decodes completely or
/// contributes nothing, so a store never sees a partially decoded page.
pub trait FeatureDecoder: Send + Sync {
    /// The decoded feature type handed to the feature store.
    type Feature: Send + 'static;

    /// Decode one page's worth of raw feature values, preserving order.
    fn decode(&self, raw: Vec<serde_json::Value>) -> Result<Vec<Self::Feature>, DecodeError>;
}

/// Default decoder producing [`geojson::Feature`] values.
#[derive(Debug, Default, Clone, Copy)]
pub struct GeoJsonDecoder;

impl FeatureDecoder for GeoJsonDecoder {
    type Feature = geojson::Feature;

    fn decode(&self, raw: Vec<serde_json::Value>) -> Result<Vec<Self::Feature>, DecodeError> {
        raw.into_iter()
            .map(|value| {
                serde_json::from_value::<geojson::Feature>(value)
                    .map_err(|e| DecodeError(format!("invalid GeoJSON feature: {}", e)))
            })
            .collect()
    }
}
