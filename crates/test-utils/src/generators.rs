//! Test data generators for creating synthetic rasters.
//!
//! These generators create predictable, verifiable test data patterns
//! that can be used across the test suite.

use ndarray::{Array2, Array3};

/// Creates a test grid with predictable values.
///
/// Each cell value is calculated as: `col * 1000 + row`
///
/// This makes it easy to verify that data is being read/written correctly
/// by checking that `grid[[row, col]] == col * 1000 + row`.
///
/// # Example
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(10, 5);
/// assert_eq!(grid.dim(), (5, 10));
/// assert_eq!(grid[[0, 1]], 1000.0);
/// assert_eq!(grid[[1, 0]], 1.0);
/// ```
pub fn create_test_grid(width: usize, height: usize) -> Array2<f64> {
    Array2::from_shape_fn((height, width), |(row, col)| (col * 1000 + row) as f64)
}

/// Multi-band variant of [`create_test_grid`]; band `b` adds `b * 1_000_000`.
pub fn create_test_bands(bands: usize, width: usize, height: usize) -> Array3<f64> {
    Array3::from_shape_fn((bands, height, width), |(b, row, col)| {
        (b * 1_000_000 + col * 1000 + row) as f64
    })
}

/// Creates a grid with temperature-like values in Kelvin.
///
/// Values ramp from about 250K in the top-left to 310K in the bottom-right.
pub fn create_temperature_grid(width: usize, height: usize) -> Array2<f64> {
    let span = (width + height).saturating_sub(2).max(1) as f64;
    Array2::from_shape_fn((height, width), |(row, col)| {
        250.0 + 60.0 * (row + col) as f64 / span
    })
}

/// Creates a grid filled with a constant value.
pub fn create_constant_grid(width: usize, height: usize, value: f64) -> Array2<f64> {
    Array2::from_elem((height, width), value)
}

/// Creates a grid where every `every`-th cell (row-major) holds `nodata`.
pub fn create_grid_with_nodata(width: usize, height: usize, every: usize, nodata: f64) -> Array2<f64> {
    let mut grid = create_test_grid(width, height);
    for (i, value) in grid.iter_mut().enumerate() {
        if every > 0 && i % every == 0 {
            *value = nodata;
        }
    }
    grid
}
