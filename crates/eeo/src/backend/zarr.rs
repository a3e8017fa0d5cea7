//! File-backed raster backend using Zarr V3 on the local filesystem.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ndarray::{Array2, Array3};
use raster_common::{Crs, GeoTransform};
use tempfile::TempDir;
use zarrs::array::{Array, DataType};
use zarrs::array_subset::ArraySubset;
use zarrs_filesystem::FilesystemStore;

use crate::error::{RasterError, Result};
use crate::types::{BackendKind, GeoReference};
use crate::writer::attrs;

use super::RasterBackend;

/// Raster stored as a 2-D `[row, col]` or 3-D `[band, row, col]` Zarr array.
///
/// The store is opened once; every read goes back to disk. When the backend
/// owns a temporary directory (promoted rasters) the directory is deleted on
/// drop, after the array handle is released.
pub struct ZarrBackend {
    /// The Zarr array.
    array: Array<FilesystemStore>,
    /// Root of the store.
    path: PathBuf,
    /// (bands, rows, cols).
    dims: (usize, usize, usize),
    /// True for `[row, col]` arrays.
    single_band_2d: bool,
    /// Source element type: the `dtype` attribute when present, else the stored type.
    dtype: String,
    /// Georeferencing extracted from attributes.
    georef: GeoReference,
    /// Owned temporary storage. Declared last so it is dropped last.
    _temp: Option<TempDir>,
}

impl ZarrBackend {
    /// Open a Zarr raster rooted at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_inner(path, None)
    }

    /// Open a Zarr raster written into `temp`, taking ownership of the directory.
    pub fn open_owned(temp: TempDir) -> Result<Self> {
        let path = temp.path().to_path_buf();
        Self::open_inner(&path, Some(temp))
    }

    fn open_inner(path: &Path, temp: Option<TempDir>) -> Result<Self> {
        let path_str = path.display().to_string();

        let store = FilesystemStore::new(path)
            .map_err(|e| RasterError::open_failed(&path_str, e.to_string()))?;
        let array = Array::open(Arc::new(store), "/")
            .map_err(|e| RasterError::open_failed(&path_str, e.to_string()))?;

        let shape = array.shape().to_vec();
        let (dims, single_band_2d) = match shape.as_slice() {
            [rows, cols] => ((1, *rows as usize, *cols as usize), true),
            [bands, rows, cols] => ((*bands as usize, *rows as usize, *cols as usize), false),
            other => {
                return Err(RasterError::open_failed(
                    &path_str,
                    format!("expected a 2-D or 3-D array, found {} dimension(s)", other.len()),
                ))
            }
        };
        if dims.0 == 0 || dims.1 == 0 || dims.2 == 0 {
            return Err(RasterError::open_failed(&path_str, "raster has an empty axis"));
        }

        let stored = dtype_name(array.data_type()).ok_or_else(|| {
            RasterError::open_failed(
                &path_str,
                format!("unsupported data type {:?}", array.data_type()),
            )
        })?;
        let dtype = array
            .attributes()
            .get(attrs::DTYPE)
            .and_then(serde_json::Value::as_str)
            .unwrap_or(stored)
            .to_string();

        let georef = Self::extract_georef(array.attributes())
            .map_err(|e| RasterError::open_failed(&path_str, e.to_string()))?;

        tracing::debug!(
            path = %path_str,
            bands = dims.0,
            rows = dims.1,
            cols = dims.2,
            dtype = %dtype,
            owned = temp.is_some(),
            "Opened Zarr raster"
        );

        Ok(Self {
            array,
            path: path.to_path_buf(),
            dims,
            single_band_2d,
            dtype,
            georef,
            _temp: temp,
        })
    }

    /// Extract georeferencing from array attributes.
    ///
    /// Missing keys fall back to identity transform, no CRS and no nodata.
    fn extract_georef(attrs: &serde_json::Map<String, serde_json::Value>) -> Result<GeoReference> {
        let transform = match attrs.get(attrs::TRANSFORM) {
            None | Some(serde_json::Value::Null) => GeoTransform::identity(),
            Some(value) => serde_json::from_value(value.clone())?,
        };

        let crs = match attrs.get(attrs::CRS) {
            None | Some(serde_json::Value::Null) => None,
            Some(serde_json::Value::Number(n)) => n
                .as_u64()
                .and_then(|code| u32::try_from(code).ok())
                .map(Crs::Epsg),
            Some(serde_json::Value::String(s)) => Some(
                Crs::parse(s).map_err(|e| RasterError::invalid_metadata(e.to_string()))?,
            ),
            Some(other) => {
                return Err(RasterError::invalid_metadata(format!(
                    "crs attribute must be a string or EPSG code, got {}",
                    other
                )))
            }
        };

        let nodata = match attrs.get(attrs::NODATA) {
            None | Some(serde_json::Value::Null) => None,
            Some(value) => Some(value.as_f64().ok_or_else(|| {
                RasterError::invalid_metadata(format!("nodata attribute must be numeric, got {}", value))
            })?),
        };

        Ok(GeoReference::new(transform, crs, nodata))
    }

    /// Root directory of the store.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the store lives in a temporary directory owned by this backend.
    pub fn is_temporary(&self) -> bool {
        self._temp.is_some()
    }

    fn subset(&self, band: Option<usize>) -> Result<ArraySubset> {
        let (bands, rows, cols) = self.dims;
        let subset = if self.single_band_2d {
            ArraySubset::new_with_start_shape(vec![0, 0], vec![rows as u64, cols as u64])
        } else {
            match band {
                Some(b) => ArraySubset::new_with_start_shape(
                    vec![b as u64, 0, 0],
                    vec![1, rows as u64, cols as u64],
                ),
                None => ArraySubset::new_with_start_shape(
                    vec![0, 0, 0],
                    vec![bands as u64, rows as u64, cols as u64],
                ),
            }
        };
        subset.map_err(|e| RasterError::read_failed(e.to_string()))
    }

    /// Retrieve a subset converted to f64 regardless of the stored type.
    fn retrieve_f64(&self, subset: &ArraySubset) -> Result<Vec<f64>> {
        fn cast<T: num_traits::ToPrimitive>(values: Vec<T>) -> Vec<f64> {
            values
                .into_iter()
                .map(|v| v.to_f64().unwrap_or(f64::NAN))
                .collect()
        }

        let read_err = |e: zarrs::array::ArrayError| RasterError::read_failed(e.to_string());
        let array = &self.array;

        let values = match array.data_type() {
            DataType::Float64 => array
                .retrieve_array_subset_elements::<f64>(subset)
                .map_err(read_err)?,
            DataType::Float32 => cast(
                array
                    .retrieve_array_subset_elements::<f32>(subset)
                    .map_err(read_err)?,
            ),
            DataType::Int8 => cast(
                array
                    .retrieve_array_subset_elements::<i8>(subset)
                    .map_err(read_err)?,
            ),
            DataType::Int16 => cast(
                array
                    .retrieve_array_subset_elements::<i16>(subset)
                    .map_err(read_err)?,
            ),
            DataType::Int32 => cast(
                array
                    .retrieve_array_subset_elements::<i32>(subset)
                    .map_err(read_err)?,
            ),
            DataType::UInt8 => cast(
                array
                    .retrieve_array_subset_elements::<u8>(subset)
                    .map_err(read_err)?,
            ),
            DataType::UInt16 => cast(
                array
                    .retrieve_array_subset_elements::<u16>(subset)
                    .map_err(read_err)?,
            ),
            DataType::UInt32 => cast(
                array
                    .retrieve_array_subset_elements::<u32>(subset)
                    .map_err(read_err)?,
            ),
            DataType::Int64 => cast(
                array
                    .retrieve_array_subset_elements::<i64>(subset)
                    .map_err(read_err)?,
            ),
            DataType::UInt64 => cast(
                array
                    .retrieve_array_subset_elements::<u64>(subset)
                    .map_err(read_err)?,
            ),
            other => {
                return Err(RasterError::read_failed(format!(
                    "unsupported data type {:?}",
                    other
                )))
            }
        };

        Ok(values)
    }
}

impl RasterBackend for ZarrBackend {
    fn read(&self) -> Result<Array3<f64>> {
        let subset = self.subset(None)?;
        let values = self.retrieve_f64(&subset)?;
        Array3::from_shape_vec(self.dims, values)
            .map_err(|e| RasterError::read_failed(e.to_string()))
    }

    fn read_band(&self, band: usize) -> Result<Array2<f64>> {
        if band >= self.dims.0 {
            return Err(RasterError::invalid_value(format!(
                "band index {} out of range for {} band(s)",
                band + 1,
                self.dims.0
            )));
        }
        let subset = self.subset(Some(band))?;
        let values = self.retrieve_f64(&subset)?;
        Array2::from_shape_vec((self.dims.1, self.dims.2), values)
            .map_err(|e| RasterError::read_failed(e.to_string()))
    }

    fn shape(&self) -> (usize, usize) {
        (self.dims.1, self.dims.2)
    }

    fn count(&self) -> usize {
        self.dims.0
    }

    fn georef(&self) -> &GeoReference {
        &self.georef
    }

    fn dtype(&self) -> &str {
        &self.dtype
    }

    fn kind(&self) -> BackendKind {
        BackendKind::FileBacked
    }
}

impl std::fmt::Debug for ZarrBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZarrBackend")
            .field("path", &self.path)
            .field("dims", &self.dims)
            .field("dtype", &self.dtype)
            .field("georef", &self.georef)
            .field("temporary", &self._temp.is_some())
            .finish()
    }
}

/// Name of a supported stored element type.
fn dtype_name(data_type: &DataType) -> Option<&'static str> {
    match data_type {
        DataType::Float32 => Some("float32"),
        DataType::Float64 => Some("float64"),
        DataType::Int8 => Some("int8"),
        DataType::Int16 => Some("int16"),
        DataType::Int32 => Some("int32"),
        DataType::UInt8 => Some("uint8"),
        DataType::UInt16 => Some("uint16"),
        DataType::UInt32 => Some("uint32"),
        DataType::Int64 => Some("int64"),
        DataType::UInt64 => Some("uint64"),
        _ => None,
    }
}
