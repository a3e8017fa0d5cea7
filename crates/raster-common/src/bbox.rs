//! Axis-aligned extents.

use serde::{Deserialize, Serialize};

/// An axis-aligned extent in the raster's world coordinates.
///
/// Units follow the CRS of the raster the box is used with: degrees for
/// geographic CRSs, projected units otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }

    /// Smallest box enclosing `points`, or `None` when there are none.
    pub fn from_points(points: &[(f64, f64)]) -> Option<Self> {
        let (&(x0, y0), rest) = points.split_first()?;
        Some(rest.iter().fold(Self::new(x0, y0, x0, y0), |acc, &(x, y)| {
            Self::new(acc.min_x.min(x), acc.min_y.min(y), acc.max_x.max(x), acc.max_y.max(y))
        }))
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Overlap with positive area. Boxes that only share an edge do not overlap.
    pub fn overlaps(&self, other: &BoundingBox) -> bool {
        let xs = self.min_x.max(other.min_x) < self.max_x.min(other.max_x);
        let ys = self.min_y.max(other.min_y) < self.max_y.min(other.max_y);
        xs && ys
    }

    /// The shared region, or `None` when the boxes do not overlap.
    pub fn intersection(&self, other: &BoundingBox) -> Option<BoundingBox> {
        self.overlaps(other).then(|| {
            Self::new(
                self.min_x.max(other.min_x),
                self.min_y.max(other.min_y),
                self.max_x.min(other.max_x),
                self.max_y.min(other.max_y),
            )
        })
    }

    /// Edges count as inside.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        (self.min_x..=self.max_x).contains(&x) && (self.min_y..=self.max_y).contains(&y)
    }
}
