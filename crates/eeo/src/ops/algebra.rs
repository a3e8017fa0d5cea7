//! Nodata-aware elementwise arithmetic on datasets.
//!
//! Results keep the left operand's transform, CRS and nodata sentinel. A pixel
//! that is invalid in any input is written as the left operand's fill value.

use ndarray::Zip;

use crate::dataset::Dataset;
use crate::error::{RasterError, Result};
use crate::types::is_valid_pixel;

/// Right-hand side of a binary operation.
#[derive(Debug, Clone, Copy)]
pub enum Operand<'a> {
    /// Broadcast to every pixel.
    Scalar(f64),
    /// Combined pixel by pixel. Shape and band count must match.
    Raster(&'a Dataset),
}

impl From<f64> for Operand<'_> {
    fn from(value: f64) -> Self {
        Operand::Scalar(value)
    }
}

impl From<f32> for Operand<'_> {
    fn from(value: f32) -> Self {
        Operand::Scalar(value as f64)
    }
}

impl From<i32> for Operand<'_> {
    fn from(value: i32) -> Self {
        Operand::Scalar(value as f64)
    }
}

impl<'a> From<&'a Dataset> for Operand<'a> {
    fn from(value: &'a Dataset) -> Self {
        Operand::Raster(value)
    }
}

/// Fail unless both datasets have the same band count and shape.
pub(crate) fn check_compatible(left: &Dataset, right: &Dataset) -> Result<()> {
    if left.get_count() != right.get_count() || left.get_shape() != right.get_shape() {
        return Err(RasterError::invalid_value(format!(
            "raster shapes differ: {} band(s) of {:?} vs {} band(s) of {:?}",
            left.get_count(),
            left.get_shape(),
            right.get_count(),
            right.get_shape()
        )));
    }
    Ok(())
}

/// `v`, or 0 when it is NaN or infinite.
#[inline]
pub(crate) fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

fn zip_with<F>(left: &Dataset, right: Operand<'_>, op: F) -> Result<Dataset>
where
    F: Fn(f64, f64) -> f64,
{
    let georef = left.georef().clone();
    let fill = georef.fill_value();
    let mut data = left.read()?;

    match right {
        Operand::Scalar(scalar) => {
            data.mapv_inplace(|v| if georef.is_valid(v) { op(v, scalar) } else { fill });
        }
        Operand::Raster(other) => {
            check_compatible(left, other)?;
            let rhs = other.read()?;
            let rhs_nodata = other.get_nodata();
            Zip::from(&mut data).and(&rhs).for_each(|l, &r| {
                *l = if georef.is_valid(*l) && is_valid_pixel(r, rhs_nodata) {
                    op(*l, r)
                } else {
                    fill
                };
            });
        }
    }

    Ok(left.derive(data, georef))
}

impl Dataset {
    pub fn add<'a>(&self, other: impl Into<Operand<'a>>) -> Result<Dataset> {
        zip_with(self, other.into(), |a, b| a + b)
    }

    pub fn subtract<'a>(&self, other: impl Into<Operand<'a>>) -> Result<Dataset> {
        zip_with(self, other.into(), |a, b| a - b)
    }

    pub fn multiply<'a>(&self, other: impl Into<Operand<'a>>) -> Result<Dataset> {
        zip_with(self, other.into(), |a, b| a * b)
    }

    /// Division yielding 0 wherever the divisor is 0 or the quotient overflows.
    pub fn divide<'a>(&self, other: impl Into<Operand<'a>>) -> Result<Dataset> {
        zip_with(self, other.into(), |a, b| if b == 0.0 { 0.0 } else { finite_or_zero(a / b) })
    }

    /// Raise to a power. Non-finite results become 0.
    pub fn power<'a>(&self, exponent: impl Into<Operand<'a>>) -> Result<Dataset> {
        zip_with(self, exponent.into(), |a, b| finite_or_zero(a.powf(b)))
    }

    /// Square root. Negative inputs become 0.
    pub fn sqrt(&self) -> Result<Dataset> {
        self.map_valid(|v| if v < 0.0 { 0.0 } else { v.sqrt() })
    }

    /// Natural logarithm with inputs floored at the smallest positive normal f64.
    pub fn log(&self) -> Result<Dataset> {
        self.map_valid(|v| v.max(f64::MIN_POSITIVE).ln())
    }

    /// Logarithm in `base`, with the same floor as [`Dataset::log`].
    pub fn log_base(&self, base: f64) -> Result<Dataset> {
        if !base.is_finite() || base <= 0.0 || base == 1.0 {
            return Err(RasterError::invalid_value(format!(
                "logarithm base must be positive and not 1, got {}",
                base
            )));
        }
        let ln_base = base.ln();
        self.map_valid(|v| v.max(f64::MIN_POSITIVE).ln() / ln_base)
    }

    pub fn absolute(&self) -> Result<Dataset> {
        self.map_valid(f64::abs)
    }
}
