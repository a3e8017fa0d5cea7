//! Raster backends and the adapter that switches between them.
//!
//! ```text
//! RasterAdapter
//!      │
//!      ├─► InMemory(MemoryBackend)  ── owned Array3<f64>
//!      │         │
//!      │         └─► promote_to_file_backed()
//!      │                   │
//!      │                   ├─► write Zarr into a fresh temp dir
//!      │                   ├─► reopen it as ZarrBackend
//!      │                   └─► drop the in-memory array
//!      │
//!      └─► FileBacked(ZarrBackend) ── reads go to disk
//! ```

mod memory;
mod zarr;

pub use memory::MemoryBackend;
pub use zarr::ZarrBackend;

use ndarray::{Array2, Array3};
use raster_common::{Crs, GeoTransform};

use crate::config::EeoConfig;
use crate::error::{RasterError, Result};
use crate::types::{BackendKind, GeoReference};
use crate::writer::ZarrRasterWriter;

/// Uniform read access to raster pixels and georeferencing.
pub trait RasterBackend {
    /// Read every band as `[band, row, col]`.
    fn read(&self) -> Result<Array3<f64>>;

    /// Read one band by 0-based index.
    fn read_band(&self, band: usize) -> Result<Array2<f64>>;

    /// (rows, cols).
    fn shape(&self) -> (usize, usize);

    /// Number of bands.
    fn count(&self) -> usize;

    /// Georeferencing of the raster.
    fn georef(&self) -> &GeoReference;

    /// Element type of the source data. Reads always return `f64`.
    fn dtype(&self) -> &str;

    /// Which backend this is.
    fn kind(&self) -> BackendKind;
}

/// The active backend. Exactly one is live at a time.
#[derive(Debug)]
enum Backend {
    InMemory(MemoryBackend),
    FileBacked(ZarrBackend),
}

/// Owns a raster backend and promotes in-memory data to file-backed storage.
///
/// Promotion is one-way. An adapter is never shared between datasets.
#[derive(Debug)]
pub struct RasterAdapter {
    backend: Backend,
}

impl RasterAdapter {
    /// Adapter over an in-memory array loaded from elements of type `dtype`.
    pub fn from_array(data: Array3<f64>, georef: GeoReference, dtype: impl Into<String>) -> Self {
        Self {
            backend: Backend::InMemory(MemoryBackend::new(data, georef, dtype)),
        }
    }

    /// Adapter over an opened Zarr raster.
    pub fn from_zarr(zarr: ZarrBackend) -> Self {
        Self {
            backend: Backend::FileBacked(zarr),
        }
    }

    /// The active backend as a trait object.
    pub fn backend(&self) -> &dyn RasterBackend {
        match &self.backend {
            Backend::InMemory(memory) => memory as &dyn RasterBackend,
            Backend::FileBacked(zarr) => zarr as &dyn RasterBackend,
        }
    }

    /// The Zarr backend, when file-backed.
    pub fn zarr(&self) -> Option<&ZarrBackend> {
        match &self.backend {
            Backend::FileBacked(zarr) => Some(zarr),
            Backend::InMemory(_) => None,
        }
    }

    pub fn read(&self) -> Result<Array3<f64>> {
        self.backend().read()
    }

    /// Read one band by 0-based index.
    pub fn read_band(&self, band: usize) -> Result<Array2<f64>> {
        self.backend().read_band(band)
    }

    pub fn shape(&self) -> (usize, usize) {
        self.backend().shape()
    }

    pub fn count(&self) -> usize {
        self.backend().count()
    }

    pub fn crs(&self) -> Option<&Crs> {
        self.backend().georef().crs.as_ref()
    }

    pub fn transform(&self) -> GeoTransform {
        self.backend().georef().transform
    }

    pub fn nodata(&self) -> Option<f64> {
        self.backend().georef().nodata
    }

    pub fn georef(&self) -> &GeoReference {
        self.backend().georef()
    }

    pub fn dtype(&self) -> &str {
        self.backend().dtype()
    }

    pub fn kind(&self) -> BackendKind {
        self.backend().kind()
    }

    /// Move in-memory pixels into a temporary Zarr raster and switch to it.
    ///
    /// No-op when already file-backed. On failure the adapter keeps its
    /// in-memory backend untouched.
    pub fn promote_to_file_backed(&mut self, config: &EeoConfig) -> Result<()> {
        let promoted = match &self.backend {
            Backend::FileBacked(_) => return Ok(()),
            Backend::InMemory(memory) => {
                let temp = config.create_temp_dir().map_err(|e| {
                    RasterError::PromotionFailed(format!(
                        "could not create temporary storage: {}",
                        e
                    ))
                })?;

                let writer = ZarrRasterWriter::new(config.clone());
                writer.write(temp.path(), memory.data().view(), memory.georef(), memory.dtype())?;

                let zarr = ZarrBackend::open_owned(temp)?;
                tracing::info!(
                    path = %zarr.path().display(),
                    bands = zarr.count(),
                    shape = ?zarr.shape(),
                    "Promoted in-memory raster to file-backed storage"
                );
                zarr
            }
        };

        self.backend = Backend::FileBacked(promoted);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    fn adapter() -> RasterAdapter {
        let data = Array3::from_shape_fn((2, 3, 4), |(b, r, c)| (b * 100 + r * 10 + c) as f64);
        RasterAdapter::from_array(
            data,
            GeoReference::new(GeoTransform::identity(), Some(Crs::WGS84), Some(-1.0)),
            "int16",
        )
    }

    #[test]
    fn test_memory_adapter_reads() {
        let adapter = adapter();
        assert_eq!(adapter.kind(), BackendKind::InMemory);
        assert_eq!(adapter.shape(), (3, 4));
        assert_eq!(adapter.count(), 2);
        assert_eq!(adapter.read().unwrap().dim(), (2, 3, 4));
        assert_eq!(adapter.read_band(1).unwrap()[[2, 3]], 123.0);
        assert!(adapter.read_band(2).is_err());
        assert!(adapter.zarr().is_none());
    }

    #[test]
    fn test_promotion_switches_backend() {
        let temp = tempfile::tempdir().expect("Failed to create temp dir");
        let config = EeoConfig {
            temp_dir: Some(temp.path().to_path_buf()),
            ..Default::default()
        };

        let mut adapter = adapter();
        let before = adapter.read().unwrap();
        adapter.promote_to_file_backed(&config).unwrap();

        assert_eq!(adapter.kind(), BackendKind::FileBacked);
        assert_eq!(adapter.read().unwrap(), before);
        assert_eq!(adapter.dtype(), "int16");
        assert_eq!(adapter.crs(), Some(&Crs::WGS84));
        assert_eq!(adapter.nodata(), Some(-1.0));
        let zarr = adapter.zarr().expect("file-backed");
        assert!(zarr.is_temporary());
        assert!(zarr.path().starts_with(temp.path()));

        // Second promotion is a no-op.
        adapter.promote_to_file_backed(&config).unwrap();
        assert_eq!(adapter.kind(), BackendKind::FileBacked);
    }

    #[test]
    fn test_promotion_failure_keeps_memory_backend() {
        let config = EeoConfig {
            temp_dir: Some("/nonexistent/eeo/parent".into()),
            ..Default::default()
        };

        let mut adapter = adapter();
        let err = adapter.promote_to_file_backed(&config).unwrap_err();
        assert!(matches!(err, RasterError::PromotionFailed(_)));
        assert_eq!(adapter.kind(), BackendKind::InMemory);
    }

    #[test]
    fn test_temp_storage_released_on_drop() {
        let mut adapter = adapter();
        adapter
            .promote_to_file_backed(&EeoConfig::default())
            .unwrap();
        let path = adapter.zarr().unwrap().path().to_path_buf();
        assert!(path.exists());
        drop(adapter);
        assert!(!path.exists());
    }
}
