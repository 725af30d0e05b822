//! Viewport extent type.

use std::fmt;

/// A bounding rectangle scoping a features request to the visible viewport.
///
/// Coordinates are in the map CRS; axis order follows the CRS definition
/// (the server is told which CRS the bbox is expressed in via `bbox-crs`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Extent {
    /// Create an extent from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Format as the comma-joined `bbox` query parameter value.
    pub fn bbox_value(&self) -> String {
        format!("{},{},{},{}", self.min_x, self.min_y, self.max_x, self.max_y)
    }
}

impl fmt::Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}, {}, {}]",
            self.min_x, self.min_y, self.max_x, self.max_y
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_value_order() {
        let extent = Extent::new(-10.5, 40.0, 2.25, 52.0);
        assert_eq!(extent.bbox_value(), "-10.5,40,2.25,52");
    }

    #[test]
    fn test_display() {
        let extent = Extent::new(0.0, 1.0, 2.0, 3.0);
        assert_eq!(format!("{}", extent), "[0, 1, 2, 3]");
    }
}
