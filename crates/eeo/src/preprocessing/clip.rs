//! Cropping to a bounding box or polygon.

use ndarray::s;
use raster_common::ClipGeometry;

use crate::dataset::Dataset;
use crate::error::{RasterError, Result};

/// Snap values within rounding noise of an integer onto it.
fn snap(v: f64) -> f64 {
    let rounded = v.round();
    if (v - rounded).abs() < 1e-9 {
        rounded
    } else {
        v
    }
}

/// Crop `dataset` to the pixel window covering `geometry`.
///
/// The window is the set of pixels touched by the intersection of the raster
/// extent and the geometry's bounds. For polygons, pixels whose centres fall
/// outside the ring are set to nodata (NaN when no sentinel is recorded).
pub fn clip_raster_with_bbox(dataset: &Dataset, geometry: impl Into<ClipGeometry>) -> Result<Dataset> {
    let geometry = geometry.into();
    let (rows, cols) = dataset.get_shape();
    let transform = dataset.get_transform();

    let geom_bounds = geometry
        .bounds()
        .ok_or_else(|| RasterError::invalid_value("clip geometry has no vertices"))?;
    let overlap = transform
        .bounds(rows, cols)
        .intersection(&geom_bounds)
        .ok_or_else(|| RasterError::invalid_value("clip geometry does not intersect the raster"))?;

    let corners = [
        (overlap.min_x, overlap.min_y),
        (overlap.min_x, overlap.max_y),
        (overlap.max_x, overlap.min_y),
        (overlap.max_x, overlap.max_y),
    ];
    let inverse = transform.inverse()?;
    let (mut col_lo, mut col_hi) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut row_lo, mut row_hi) = (f64::INFINITY, f64::NEG_INFINITY);
    for (x, y) in corners {
        let (col, row) = inverse.apply(x, y);
        let (col, row) = (snap(col), snap(row));
        col_lo = col_lo.min(col);
        col_hi = col_hi.max(col);
        row_lo = row_lo.min(row);
        row_hi = row_hi.max(row);
    }

    let c0 = col_lo.floor().max(0.0) as usize;
    let c1 = (col_hi.ceil().max(0.0) as usize).min(cols);
    let r0 = row_lo.floor().max(0.0) as usize;
    let r1 = (row_hi.ceil().max(0.0) as usize).min(rows);
    if c0 >= c1 || r0 >= r1 {
        return Err(RasterError::invalid_value(
            "clip geometry does not cover any pixel",
        ));
    }

    let mut data = dataset.read()?.slice(s![.., r0..r1, c0..c1]).to_owned();

    if !geometry.is_bbox() {
        let fill = dataset.georef().fill_value();
        for mut band in data.outer_iter_mut() {
            for ((r, c), value) in band.indexed_iter_mut() {
                let (x, y) = transform.pixel_center(r0 + r, c0 + c);
                if !geometry.contains_point(x, y) {
                    *value = fill;
                }
            }
        }
    }

    tracing::debug!(
        row_off = r0,
        col_off = c0,
        rows = r1 - r0,
        cols = c1 - c0,
        polygon = !geometry.is_bbox(),
        "Clipped raster"
    );

    let georef = dataset.georef().with_transform(transform.window(r0, c0));
    Ok(Dataset::from_parts(data, georef, dataset.dtype(), dataset.config().clone()))
}

impl Dataset {
    /// Crop to a bounding box or polygon. See [`clip_raster_with_bbox`].
    pub fn clip(&self, geometry: impl Into<ClipGeometry>) -> Result<Dataset> {
        clip_raster_with_bbox(self, geometry)
    }
}
