//! Georeferenced raster datasets over in-memory arrays or Zarr V3 stores.
//!
//! A [`Dataset`] wraps one backend at a time: an `ndarray` held in memory or
//! a Zarr array on disk. Array-built datasets are promoted to temporary Zarr
//! storage when an operation needs file-backed access (resampling).
//!
//! # Example
//!
//! ```no_run
//! use eeo::{load_array, Crs, LoadOptions, PositionMode, ResampleSpec};
//! use ndarray::array;
//!
//! # fn main() -> eeo::Result<()> {
//! let ds = load_array(&array![[1.0, 2.0], [3.0, 4.0]], LoadOptions::new().crs(Crs::WGS84))?;
//! let max = ds.get_maximum_pixel(PositionMode::Pixel)?;
//! assert_eq!(max.value, 4.0);
//! let bigger = ds.multiply(2)?.resample(ResampleSpec::scale(2.0))?;
//! assert_eq!(bigger.get_shape(), (4, 4));
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod backend;
pub mod common;
pub mod config;
pub mod dataset;
pub mod error;
pub mod loaders;
pub mod ops;
pub mod preprocessing;
pub mod types;
pub mod writer;

pub use backend::{MemoryBackend, RasterAdapter, RasterBackend, ZarrBackend};
pub use common::{
    align_raster_to_target, align_raster_to_target_with_method, mask_nodata,
    normalize_resampling_method, Aligned, MethodValue,
};
pub use config::{EeoConfig, ZarrCompression};
pub use dataset::Dataset;
pub use error::{ErrorCategory, RasterError, Result};
pub use loaders::{load_array, load_array_json, load_raster, load_raster_with_config, LoadOptions};
pub use ops::Operand;
pub use preprocessing::{clip_raster_with_bbox, ResampleSpec};
pub use types::{
    BackendKind, GeoReference, PixelStat, Position, PositionMode, RasterMetadata,
    ResamplingMethod,
};
pub use writer::{ZarrRasterWriter, ZarrWriteResult};

pub use raster_common::{BoundingBox, ClipGeometry, Crs, GeoTransform};
