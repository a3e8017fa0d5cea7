//! Zarr V3 writer for raster datasets.
//!
//! Rasters are stored as a single `[band, row, col]` float64 array at the
//! root of a filesystem store. Georeferencing lives in the array attributes
//! so the store can be reopened with [`crate::load_raster`].

use std::path::Path;
use std::sync::Arc;

use ndarray::ArrayView3;
use zarrs::array::codec::bytes_to_bytes::blosc::{
    BloscCodec, BloscCompressionLevel, BloscCompressor, BloscShuffleMode,
};
use zarrs::array::codec::BytesToBytesCodecTraits;
use zarrs::array::{Array, ArrayBuilder, DataType, FillValue};
use zarrs::array_subset::ArraySubset;
use zarrs_filesystem::FilesystemStore;

use crate::config::{EeoConfig, ZarrCompression};
use crate::error::{RasterError, Result};
use crate::types::GeoReference;

/// Attribute keys written next to the pixel data.
pub mod attrs {
    pub const TRANSFORM: &str = "transform";
    pub const CRS: &str = "crs";
    pub const NODATA: &str = "nodata";
    pub const BAND_COUNT: &str = "band_count";
    pub const DTYPE: &str = "dtype";
}

/// Summary of a completed write.
#[derive(Debug, Clone)]
pub struct ZarrWriteResult {
    /// `(bands, rows, cols)`.
    pub shape: (usize, usize, usize),
    /// `(rows, cols)` per chunk; every chunk holds one band.
    pub chunk_shape: (usize, usize),
    pub compression: String,
    /// Uncompressed payload size.
    pub bytes_written: u64,
}

/// Writes rasters as Zarr V3 stores using an [`EeoConfig`]'s chunking and codec.
pub struct ZarrRasterWriter {
    config: EeoConfig,
}

impl ZarrRasterWriter {
    pub fn new(config: EeoConfig) -> Self {
        Self { config }
    }

    /// Write a `[band, row, col]` array and its georeferencing to `path`.
    ///
    /// `dtype` names the source element type and is stored as an attribute so
    /// reopened rasters report it. The directory is created if it does not exist.
    pub fn write(
        &self,
        path: &Path,
        data: ArrayView3<'_, f64>,
        georef: &GeoReference,
        dtype: &str,
    ) -> Result<ZarrWriteResult> {
        let (bands, rows, cols) = data.dim();
        if bands == 0 || rows == 0 || cols == 0 {
            return Err(RasterError::invalid_value(format!(
                "cannot write empty raster of shape ({}, {}, {})",
                bands, rows, cols
            )));
        }

        std::fs::create_dir_all(path)?;
        let store = Arc::new(
            FilesystemStore::new(path).map_err(|e| RasterError::StorageError(e.to_string()))?,
        );

        let chunk_rows = self.config.zarr_chunk_size.min(rows);
        let chunk_cols = self.config.zarr_chunk_size.min(cols);

        let array = self.build_array(store, (bands, rows, cols), (chunk_rows, chunk_cols), georef, dtype)?;

        array
            .store_metadata()
            .map_err(|e| RasterError::write_failed(e.to_string()))?;

        let subset = ArraySubset::new_with_start_shape(
            vec![0, 0, 0],
            vec![bands as u64, rows as u64, cols as u64],
        )
        .map_err(|e| RasterError::write_failed(e.to_string()))?;

        let contiguous = data.as_standard_layout();
        let elements = contiguous
            .as_slice()
            .ok_or_else(|| RasterError::write_failed("raster data is not contiguous"))?;

        array
            .store_array_subset_elements(&subset, elements)
            .map_err(|e| RasterError::write_failed(e.to_string()))?;

        let bytes_written = std::mem::size_of_val(elements) as u64;

        tracing::debug!(
            path = %path.display(),
            bands,
            rows,
            cols,
            compression = %self.config.zarr_compression,
            bytes_written,
            "Wrote Zarr raster"
        );

        Ok(ZarrWriteResult {
            shape: (bands, rows, cols),
            chunk_shape: (chunk_rows, chunk_cols),
            compression: self.config.zarr_compression.as_str().to_string(),
            bytes_written,
        })
    }

    /// Array handle with chunk grid, codec and georeferencing attributes set.
    fn build_array(
        &self,
        storage: Arc<FilesystemStore>,
        (bands, rows, cols): (usize, usize, usize),
        (chunk_rows, chunk_cols): (usize, usize),
        georef: &GeoReference,
        dtype: &str,
    ) -> Result<Array<FilesystemStore>> {
        let mut attributes = serde_json::Map::new();
        attributes.insert(
            attrs::TRANSFORM.to_string(),
            serde_json::json!(georef.transform.coefficients()),
        );
        attributes.insert(
            attrs::CRS.to_string(),
            serde_json::json!(georef.crs.as_ref().map(|crs| crs.to_string())),
        );
        attributes.insert(attrs::NODATA.to_string(), serde_json::json!(georef.nodata));
        attributes.insert(attrs::BAND_COUNT.to_string(), serde_json::json!(bands));
        attributes.insert(attrs::DTYPE.to_string(), serde_json::json!(dtype));

        let chunk_grid: zarrs::array::ChunkGrid = vec![1, chunk_rows as u64, chunk_cols as u64]
            .try_into()
            .map_err(|e| RasterError::ConfigError(format!("{:?}", e)))?;

        let mut binding = ArrayBuilder::new(
            vec![bands as u64, rows as u64, cols as u64], // shape [band, row, col]
            DataType::Float64,
            chunk_grid,
            FillValue::from(georef.fill_value()),
        );
        let mut builder = binding.attributes(attributes);

        if let Some(codec) = self.blosc_codec()? {
            builder = builder.bytes_to_bytes_codecs(vec![codec]);
        }

        builder
            .build(storage, "/")
            .map_err(|e| RasterError::write_failed(e.to_string()))
    }

    /// Blosc codec for the configured compressor; `None` writes raw chunks.
    fn blosc_codec(&self) -> Result<Option<Arc<dyn BytesToBytesCodecTraits>>> {
        let compressor = match self.config.zarr_compression {
            ZarrCompression::None => return Ok(None),
            ZarrCompression::BloscLz4 => BloscCompressor::LZ4,
            ZarrCompression::BloscZstd => BloscCompressor::Zstd,
        };
        let level = BloscCompressionLevel::try_from(self.config.zarr_compression_level)
            .map_err(|e| RasterError::ConfigError(format!("blosc level: {}", e)))?;

        // Blosc needs the element size to shuffle.
        let (shuffle, typesize) = if self.config.zarr_shuffle {
            (BloscShuffleMode::Shuffle, Some(std::mem::size_of::<f64>()))
        } else {
            (BloscShuffleMode::NoShuffle, None)
        };

        let codec = BloscCodec::new(compressor, level, None, shuffle, typesize)
            .map_err(|e| RasterError::ConfigError(e.to_string()))?;
        Ok(Some(Arc::new(codec)))
    }
}
