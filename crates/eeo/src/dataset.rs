//! The user-facing raster dataset.

use std::path::Path;

use ndarray::{Array2, Array3};
use raster_common::{Crs, GeoTransform};

use crate::backend::RasterAdapter;
use crate::config::EeoConfig;
use crate::error::{RasterError, Result};
use crate::types::{BackendKind, GeoReference, RasterMetadata, STORAGE_DTYPE};
use crate::writer::{ZarrRasterWriter, ZarrWriteResult};

/// A georeferenced raster backed by an in-memory array or a Zarr store.
///
/// Every operation returns a new dataset; the receiver is never modified,
/// except by [`Dataset::promote_to_file_backed`] which only changes where
/// the pixels live.
#[derive(Debug)]
pub struct Dataset {
    adapter: RasterAdapter,
    config: EeoConfig,
}

impl Dataset {
    pub(crate) fn from_adapter(adapter: RasterAdapter, config: EeoConfig) -> Self {
        Self { adapter, config }
    }

    /// In-memory dataset from validated `[band, row, col]` pixels.
    pub(crate) fn from_parts(
        data: Array3<f64>,
        georef: GeoReference,
        dtype: &str,
        config: EeoConfig,
    ) -> Self {
        Self::from_adapter(RasterAdapter::from_array(data, georef, dtype), config)
    }

    /// New in-memory float64 dataset sharing this dataset's configuration.
    pub(crate) fn derive(&self, data: Array3<f64>, georef: GeoReference) -> Self {
        Self::from_parts(data, georef, STORAGE_DTYPE, self.config.clone())
    }

    /// Replace the configuration used for promotion and saving.
    pub fn with_config(mut self, config: EeoConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &EeoConfig {
        &self.config
    }

    /// The adapter holding the active backend.
    pub fn adapter(&self) -> &RasterAdapter {
        &self.adapter
    }

    /// (rows, cols).
    pub fn get_shape(&self) -> (usize, usize) {
        self.adapter.shape()
    }

    /// Number of bands.
    pub fn get_count(&self) -> usize {
        self.adapter.count()
    }

    pub fn get_crs(&self) -> Option<&Crs> {
        self.adapter.crs()
    }

    pub fn get_transform(&self) -> GeoTransform {
        self.adapter.transform()
    }

    pub fn get_nodata(&self) -> Option<f64> {
        self.adapter.nodata()
    }

    pub fn georef(&self) -> &GeoReference {
        self.adapter.georef()
    }

    /// Element type of the source data; pixels are always read as `f64`.
    pub fn dtype(&self) -> &str {
        self.adapter.dtype()
    }

    /// Which backend currently holds the pixels.
    pub fn backend_kind(&self) -> BackendKind {
        self.adapter.kind()
    }

    /// All bands as `[band, row, col]`.
    pub fn read(&self) -> Result<Array3<f64>> {
        self.adapter.read()
    }

    /// One band by 1-based index.
    pub fn get_band(&self, band: usize) -> Result<Array2<f64>> {
        if band == 0 {
            return Err(RasterError::invalid_value(
                "band indices start at 1".to_string(),
            ));
        }
        self.adapter.read_band(band - 1)
    }

    /// Snapshot of shape, band count, georeferencing, dtype and backend.
    pub fn get_metadata(&self) -> RasterMetadata {
        RasterMetadata {
            shape: self.get_shape(),
            count: self.get_count(),
            crs: self.get_crs().cloned(),
            transform: self.get_transform(),
            nodata: self.get_nodata(),
            dtype: self.dtype().to_string(),
            backend: self.backend_kind(),
        }
    }

    /// Move the pixels into temporary Zarr storage. No-op when already file-backed.
    pub fn promote_to_file_backed(&mut self) -> Result<()> {
        self.adapter.promote_to_file_backed(&self.config)
    }

    /// Persist the dataset as a Zarr raster readable by [`crate::load_raster`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<ZarrWriteResult> {
        let path = path.as_ref();
        let data = self.read()?;
        let writer = ZarrRasterWriter::new(self.config.clone());
        let result = writer.write(path, data.view(), self.georef(), self.dtype())?;

        tracing::info!(
            path = %path.display(),
            bands = result.shape.0,
            rows = result.shape.1,
            cols = result.shape.2,
            "Saved raster"
        );

        Ok(result)
    }

    /// Apply `f` to every valid pixel; invalid pixels become the fill value.
    pub(crate) fn map_valid<F>(&self, f: F) -> Result<Dataset>
    where
        F: Fn(f64) -> f64,
    {
        let georef = self.georef().clone();
        let fill = georef.fill_value();
        let mut data = self.read()?;
        data.mapv_inplace(|v| if georef.is_valid(v) { f(v) } else { fill });
        Ok(self.derive(data, georef))
    }

    /// Valid pixel values of every band, in band-major row-major order.
    pub(crate) fn valid_values(&self) -> Result<Vec<f64>> {
        let georef = self.georef();
        Ok(self
            .read()?
            .iter()
            .filter(|v| georef.is_valid(**v))
            .copied()
            .collect())
    }
}
