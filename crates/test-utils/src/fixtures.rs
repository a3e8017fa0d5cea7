//! Common raster fixtures for eeo tests.
//!
//! These mirror the small hand-checkable rasters the test suites assert on.

use ndarray::{array, Array2, Array3};
use raster_common::{BoundingBox, GeoTransform};

/// Nodata sentinel used by the fixtures.
pub const NODATA: f64 = -9999.0;

/// 3x3 raster holding 1..=9 in row-major order.
///
/// ```text
/// 1 2 3
/// 4 5 6
/// 7 8 9
/// ```
pub fn grid_1_to_9() -> Array2<f64> {
    array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]]
}

/// Left operand for algebra tests.
pub fn algebra_a() -> Array2<f64> {
    array![[1.0, 2.0], [3.0, 4.0]]
}

/// Right operand for algebra tests.
pub fn algebra_b() -> Array2<f64> {
    array![[4.0, 3.0], [2.0, 1.0]]
}

/// 2x2 raster with one nodata pixel at (0, 1).
pub fn with_nodata() -> Array2<f64> {
    array![[1.0, NODATA], [3.0, 4.0]]
}

/// Two bands: band 1 is `algebra_a`, band 2 is `algebra_b`.
pub fn two_band() -> Array3<f64> {
    array![[[1.0, 2.0], [3.0, 4.0]], [[4.0, 3.0], [2.0, 1.0]]]
}

/// Common transforms for testing.
pub mod transforms {
    use super::*;

    /// `translation(0, 0) * scale(1, -1)`: pixel (row, col) covers x in
    /// `[col, col + 1]`, y in `[-row - 1, -row]`.
    pub fn flipped_unit() -> GeoTransform {
        GeoTransform::translation(0.0, 0.0) * GeoTransform::scale(1.0, -1.0)
    }

    /// North-up unit pixels with the top-left corner at `(0, rows)`.
    pub fn north_up(rows: usize) -> GeoTransform {
        GeoTransform::translation(0.0, rows as f64) * GeoTransform::scale(1.0, -1.0)
    }

    /// 0.25 degree global grid origin.
    pub fn global_quarter_degree() -> GeoTransform {
        GeoTransform::from_origin(-180.0, 90.0, 0.25, 0.25)
    }
}

/// Common bounding boxes for testing.
pub mod bbox {
    use super::*;

    /// Global extent.
    pub const GLOBAL: BoundingBox = BoundingBox {
        min_x: -180.0,
        min_y: -90.0,
        max_x: 180.0,
        max_y: 90.0,
    };

    /// Far outside any fixture raster.
    pub const DISJOINT: BoundingBox = BoundingBox {
        min_x: 1000.0,
        min_y: 1000.0,
        max_x: 1001.0,
        max_y: 1001.0,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_1_to_9() {
        let grid = grid_1_to_9();
        assert_eq!(grid.dim(), (3, 3));
        assert_eq!(grid[[1, 1]], 5.0);
        assert_eq!(grid.sum(), 45.0);
    }

    #[test]
    fn test_flipped_unit_transform() {
        let t = transforms::flipped_unit();
        assert_eq!(t.apply(1.0, 1.0), (1.0, -1.0));
    }

    #[test]
    fn test_two_band_matches_algebra_operands() {
        let bands = two_band();
        assert_eq!(bands.index_axis(ndarray::Axis(0), 0), algebra_a());
        assert_eq!(bands.index_axis(ndarray::Axis(0), 1), algebra_b());
    }
}
