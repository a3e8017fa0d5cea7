//! Geometries used to clip rasters.

use serde::{Deserialize, Serialize};

use crate::bbox::BoundingBox;

/// A clipping geometry in world coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "type", content = "coordinates")]
pub enum ClipGeometry {
    /// Axis-aligned box.
    Bbox(BoundingBox),
    /// Simple polygon given as an exterior ring of `(x, y)` vertices.
    /// The ring may or may not repeat the first vertex at the end.
    Polygon(Vec<(f64, f64)>),
}

impl ClipGeometry {
    /// Extent of the geometry, `None` for a polygon without vertices.
    pub fn bounds(&self) -> Option<BoundingBox> {
        match self {
            ClipGeometry::Bbox(bbox) => Some(*bbox),
            ClipGeometry::Polygon(ring) => BoundingBox::from_points(ring),
        }
    }

    /// Whether the geometry is a plain box (no per-pixel masking needed).
    pub fn is_bbox(&self) -> bool {
        matches!(self, ClipGeometry::Bbox(_))
    }

    /// Point-in-geometry test. Polygons use even-odd ray casting.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        match self {
            ClipGeometry::Bbox(bbox) => bbox.contains_point(x, y),
            ClipGeometry::Polygon(ring) => {
                let n = ring.len();
                if n < 3 {
                    return false;
                }

                let mut inside = false;
                let mut j = n - 1;

                for i in 0..n {
                    let (xi, yi) = ring[i];
                    let (xj, yj) = ring[j];

                    if ((yi > y) != (yj > y)) && (x < (xj - xi) * (y - yi) / (yj - yi) + xi) {
                        inside = !inside;
                    }
                    j = i;
                }

                inside
            }
        }
    }
}

impl From<BoundingBox> for ClipGeometry {
    fn from(bbox: BoundingBox) -> Self {
        ClipGeometry::Bbox(bbox)
    }
}

impl From<Vec<(f64, f64)>> for ClipGeometry {
    fn from(ring: Vec<(f64, f64)>) -> Self {
        ClipGeometry::Polygon(ring)
    }
}
