//! Elementwise raster algebra.

pub(crate) mod algebra;

pub use algebra::Operand;
