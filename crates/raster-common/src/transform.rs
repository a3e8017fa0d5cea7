//! Affine geotransforms mapping pixel space to world coordinates.
//!
//! Coefficients follow the `affine` convention used by most raster tooling:
//!
//! ```text
//! x = a * col + b * row + c
//! y = d * col + e * row + f
//! ```
//!
//! Pixel `(col, row) = (0, 0)` is the top-left corner of the top-left pixel;
//! pixel centres sit at half-integer offsets.

use std::ops::Mul;

use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};

use crate::bbox::BoundingBox;

/// Six-coefficient affine transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct GeoTransform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl GeoTransform {
    /// Create a transform from its six coefficients.
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// The identity transform: world coordinates equal pixel coordinates.
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0, 1.0, 0.0)
    }

    /// Pure translation by `(xoff, yoff)`.
    pub fn translation(xoff: f64, yoff: f64) -> Self {
        Self::new(1.0, 0.0, xoff, 0.0, 1.0, yoff)
    }

    /// Pure scaling by `(sx, sy)`.
    pub fn scale(sx: f64, sy: f64) -> Self {
        Self::new(sx, 0.0, 0.0, 0.0, sy, 0.0)
    }

    /// North-up transform from an origin (top-left corner) and pixel size.
    ///
    /// `pixel_height` is given as a positive number; rows grow southwards.
    pub fn from_origin(west: f64, north: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self::new(pixel_width, 0.0, west, 0.0, -pixel_height, north)
    }

    /// Build from a coefficient slice in `a b c d e f` order.
    pub fn from_coefficients(coeffs: &[f64]) -> Result<Self, TransformError> {
        match coeffs {
            [a, b, c, d, e, f] => Ok(Self::new(*a, *b, *c, *d, *e, *f)),
            _ => Err(TransformError::WrongLength(coeffs.len())),
        }
    }

    /// Build from GDAL geotransform order `[c, a, b, f, d, e]`.
    pub fn from_gdal(gt: [f64; 6]) -> Self {
        Self::new(gt[1], gt[2], gt[0], gt[4], gt[5], gt[3])
    }

    /// Coefficients in `a b c d e f` order.
    pub fn coefficients(&self) -> [f64; 6] {
        [self.a, self.b, self.c, self.d, self.e, self.f]
    }

    /// Coefficients in GDAL order `[c, a, b, f, d, e]`.
    pub fn to_gdal(&self) -> [f64; 6] {
        [self.c, self.a, self.b, self.f, self.d, self.e]
    }

    /// Pixel size along x and y (signed).
    pub fn pixel_size(&self) -> (f64, f64) {
        (self.a, self.e)
    }

    /// True when the transform has no rotation/shear terms.
    pub fn is_rectilinear(&self) -> bool {
        self.b == 0.0 && self.d == 0.0
    }

    /// Map fractional pixel coordinates `(col, row)` to world `(x, y)`.
    pub fn apply(&self, col: f64, row: f64) -> (f64, f64) {
        (
            self.a * col + self.b * row + self.c,
            self.d * col + self.e * row + self.f,
        )
    }

    /// World coordinates of the centre of pixel `(row, col)`.
    pub fn pixel_center(&self, row: usize, col: usize) -> (f64, f64) {
        self.apply(col as f64 + 0.5, row as f64 + 0.5)
    }

    /// Inverse transform (world to pixel).
    pub fn inverse(&self) -> Result<Self, TransformError> {
        let inv = self
            .to_matrix()
            .try_inverse()
            .ok_or(TransformError::Singular)?;
        Ok(Self::from_matrix(&inv))
    }

    /// Map world `(x, y)` to fractional pixel `(col, row)`.
    pub fn world_to_pixel(&self, x: f64, y: f64) -> Result<(f64, f64), TransformError> {
        Ok(self.inverse()?.apply(x, y))
    }

    /// World extent covered by a `rows x cols` raster.
    pub fn bounds(&self, rows: usize, cols: usize) -> BoundingBox {
        let corners = [
            self.apply(0.0, 0.0),
            self.apply(cols as f64, 0.0),
            self.apply(0.0, rows as f64),
            self.apply(cols as f64, rows as f64),
        ];
        // Four corners, never empty.
        BoundingBox::from_points(&corners).unwrap_or_else(|| BoundingBox::new(0.0, 0.0, 0.0, 0.0))
    }

    /// Transform for a pixel window starting at `(row_off, col_off)`.
    pub fn window(&self, row_off: usize, col_off: usize) -> Self {
        *self * Self::translation(col_off as f64, row_off as f64)
    }

    /// Compare coefficient-wise within `epsilon`.
    pub fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.coefficients()
            .iter()
            .zip(other.coefficients().iter())
            .all(|(l, r)| (l - r).abs() <= epsilon)
    }

    fn to_matrix(self) -> Matrix3<f64> {
        Matrix3::new(self.a, self.b, self.c, self.d, self.e, self.f, 0.0, 0.0, 1.0)
    }

    fn from_matrix(m: &Matrix3<f64>) -> Self {
        Self::new(m[(0, 0)], m[(0, 1)], m[(0, 2)], m[(1, 0)], m[(1, 1)], m[(1, 2)])
    }
}

impl Default for GeoTransform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Composition: `(self * rhs).apply(p) == self.apply(rhs.apply(p))`.
impl Mul for GeoTransform {
    type Output = GeoTransform;

    fn mul(self, rhs: GeoTransform) -> GeoTransform {
        Self::from_matrix(&(self.to_matrix() * rhs.to_matrix()))
    }
}

impl TryFrom<Vec<f64>> for GeoTransform {
    type Error = TransformError;

    fn try_from(value: Vec<f64>) -> Result<Self, Self::Error> {
        Self::from_coefficients(&value)
    }
}

impl From<GeoTransform> for Vec<f64> {
    fn from(t: GeoTransform) -> Self {
        t.coefficients().to_vec()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("affine transform needs 6 coefficients, got {0}")]
    WrongLength(usize),

    #[error("affine transform is not invertible")]
    Singular,
}
