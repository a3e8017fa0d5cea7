//! Rescaling, resampling and clipping.
//!
//! Every operation reads the source dataset, works on valid pixels only and
//! returns a new dataset. Resampling always returns a file-backed dataset;
//! the other operations return in-memory datasets.

mod clip;
mod kernels;
mod normalize;
mod resample;

pub use clip::clip_raster_with_bbox;
pub use kernels::{bilinear_interpolate, cubic_interpolate, nearest_interpolate, resample_band};
pub use resample::ResampleSpec;
