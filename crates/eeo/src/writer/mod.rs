//! Writers for persisting rasters to file-backed storage.

mod zarr_writer;

pub use zarr_writer::{attrs, ZarrRasterWriter, ZarrWriteResult};
