//! Common georeferencing types shared across the eeo workspace.

pub mod bbox;
pub mod crs;
pub mod geometry;
pub mod transform;

pub use bbox::BoundingBox;
pub use crs::{Crs, CrsParseError};
pub use geometry::ClipGeometry;
pub use transform::{GeoTransform, TransformError};
