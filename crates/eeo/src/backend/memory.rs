//! In-memory raster backend.

use ndarray::{Array2, Array3, Axis};

use crate::error::{RasterError, Result};
use crate::types::{BackendKind, GeoReference};

use super::RasterBackend;

/// Pixels held in an owned `[band, row, col]` array.
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    data: Array3<f64>,
    georef: GeoReference,
    /// Element type of the source the pixels were loaded from.
    dtype: String,
}

impl MemoryBackend {
    /// Wrap an array. Callers guarantee non-empty axes.
    pub fn new(data: Array3<f64>, georef: GeoReference, dtype: impl Into<String>) -> Self {
        Self {
            data,
            georef,
            dtype: dtype.into(),
        }
    }

    /// Borrow the pixel array without copying.
    pub fn data(&self) -> &Array3<f64> {
        &self.data
    }
}

impl RasterBackend for MemoryBackend {
    fn read(&self) -> Result<Array3<f64>> {
        Ok(self.data.clone())
    }

    fn read_band(&self, band: usize) -> Result<Array2<f64>> {
        if band >= self.count() {
            return Err(RasterError::invalid_value(format!(
                "band index {} out of range for {} band(s)",
                band + 1,
                self.count()
            )));
        }
        Ok(self.data.index_axis(Axis(0), band).to_owned())
    }

    fn shape(&self) -> (usize, usize) {
        let (_, rows, cols) = self.data.dim();
        (rows, cols)
    }

    fn count(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    fn georef(&self) -> &GeoReference {
        &self.georef
    }

    fn dtype(&self) -> &str {
        &self.dtype
    }

    fn kind(&self) -> BackendKind {
        BackendKind::InMemory
    }
}
