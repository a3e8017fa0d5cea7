//! Resampling to a new grid size.

use ndarray::{Array3, Axis};
use raster_common::GeoTransform;

use crate::backend::RasterAdapter;
use crate::dataset::Dataset;
use crate::error::{RasterError, Result};
use crate::types::{GeoReference, ResamplingMethod};

use super::kernels::resample_band;

/// Target of a resample: a scale factor or an explicit `(rows, cols)`.
///
/// Exactly one of `scale_factor` and `size` must be set.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ResampleSpec {
    pub scale_factor: Option<f64>,
    pub size: Option<(usize, usize)>,
    /// Kernel; the dataset's configured default when unset.
    pub method: Option<ResamplingMethod>,
}

impl ResampleSpec {
    pub fn scale(factor: f64) -> Self {
        Self {
            scale_factor: Some(factor),
            ..Default::default()
        }
    }

    pub fn size(rows: usize, cols: usize) -> Self {
        Self {
            size: Some((rows, cols)),
            ..Default::default()
        }
    }

    pub fn with_method(mut self, method: ResamplingMethod) -> Self {
        self.method = Some(method);
        self
    }

    /// Output `(rows, cols)` for a `rows x cols` source.
    pub fn target_shape(&self, rows: usize, cols: usize) -> Result<(usize, usize)> {
        let shape = match (self.scale_factor, self.size) {
            (Some(_), Some(_)) => {
                return Err(RasterError::invalid_value(
                    "specify either size or scale_factor, not both",
                ))
            }
            (None, None) => {
                return Err(RasterError::invalid_value(
                    "either size or scale_factor is required",
                ))
            }
            (Some(factor), None) => {
                if !factor.is_finite() || factor <= 0.0 {
                    return Err(RasterError::invalid_value(format!(
                        "scale_factor must be positive, got {}",
                        factor
                    )));
                }
                (
                    (rows as f64 * factor).round() as usize,
                    (cols as f64 * factor).round() as usize,
                )
            }
            (None, Some(size)) => size,
        };

        if shape.0 == 0 || shape.1 == 0 {
            return Err(RasterError::invalid_value(format!(
                "resampled shape {:?} has an empty axis",
                shape
            )));
        }
        Ok(shape)
    }
}

impl Dataset {
    /// Resample every band to a new grid.
    ///
    /// Pixels are streamed band by band from file-backed storage; in-memory
    /// sources are promoted to a temporary working copy first. The result is
    /// file-backed, keeps the CRS and nodata, and its transform covers the
    /// same extent with the new pixel size.
    pub fn resample(&self, spec: ResampleSpec) -> Result<Dataset> {
        self.resample_onto(spec, None)
    }

    /// Resample, optionally replacing the derived transform with `transform`.
    pub(crate) fn resample_onto(
        &self,
        spec: ResampleSpec,
        transform: Option<GeoTransform>,
    ) -> Result<Dataset> {
        let (rows, cols) = self.get_shape();
        let (dst_rows, dst_cols) = spec.target_shape(rows, cols)?;
        let method = spec.method.unwrap_or(self.config().default_resampling);

        let working;
        let source: &RasterAdapter = match self.adapter().zarr() {
            Some(_) => self.adapter(),
            None => {
                let mut copy = RasterAdapter::from_array(self.read()?, self.georef().clone(), self.dtype());
                copy.promote_to_file_backed(self.config())?;
                working = copy;
                &working
            }
        };

        let georef = self.georef();
        let fill = georef.fill_value();
        let mut output = Array3::from_elem((self.get_count(), dst_rows, dst_cols), fill);

        for (band, mut out_band) in output.axis_iter_mut(Axis(0)).enumerate() {
            let mut src = source.read_band(band)?;
            src.mapv_inplace(|v| if georef.is_valid(v) { v } else { f64::NAN });

            let resampled = resample_band(src.view(), dst_rows, dst_cols, method);
            out_band.zip_mut_with(&resampled, |o, &v| {
                *o = if v.is_nan() { fill } else { v };
            });
        }

        let transform = transform.unwrap_or_else(|| {
            self.get_transform()
                * GeoTransform::scale(cols as f64 / dst_cols as f64, rows as f64 / dst_rows as f64)
        });

        tracing::info!(
            src_shape = ?(rows, cols),
            dst_shape = ?(dst_rows, dst_cols),
            bands = self.get_count(),
            method = %method,
            "Resampled raster"
        );

        let mut resampled = self.derive(output, GeoReference::new(transform, georef.crs.clone(), georef.nodata));
        resampled.promote_to_file_backed()?;
        Ok(resampled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_shape() {
        assert_eq!(ResampleSpec::scale(2.0).target_shape(3, 5).unwrap(), (6, 10));
        assert_eq!(ResampleSpec::scale(0.5).target_shape(3, 5).unwrap(), (2, 3));
        assert_eq!(ResampleSpec::size(7, 9).target_shape(3, 5).unwrap(), (7, 9));
    }

    #[test]
    fn test_target_shape_errors() {
        let both = ResampleSpec {
            scale_factor: Some(2.0),
            size: Some((4, 4)),
            method: None,
        };
        assert!(matches!(both.target_shape(2, 2), Err(RasterError::InvalidValue(_))));
        assert!(ResampleSpec::default().target_shape(2, 2).is_err());
        assert!(ResampleSpec::scale(0.0).target_shape(2, 2).is_err());
        assert!(ResampleSpec::scale(-1.0).target_shape(2, 2).is_err());
        assert!(ResampleSpec::scale(0.1).target_shape(2, 2).is_err());
        assert!(ResampleSpec::size(0, 4).target_shape(2, 2).is_err());
    }
}
