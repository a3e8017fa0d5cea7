//! Value rescaling of valid pixels.

use crate::analysis::{percentile_of_sorted, validate_percentile};
use crate::dataset::Dataset;
use crate::error::{RasterError, Result};

/// Population mean and standard deviation.
fn mean_std(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
}

impl Dataset {
    /// Rescale valid pixels to zero mean and unit (population) standard deviation.
    ///
    /// A constant raster becomes all zeros. Nodata pixels are left as nodata.
    pub fn standardize(&self) -> Result<Dataset> {
        let values = self.valid_values()?;
        if values.is_empty() {
            return self.map_valid(|v| v);
        }

        let (mean, std) = mean_std(&values);
        tracing::debug!(mean, std, "Standardizing raster");

        if std == 0.0 {
            return self.map_valid(|_| 0.0);
        }
        self.map_valid(|v| (v - mean) / std)
    }

    /// Linearly rescale valid pixels to `[new_min, new_max]`.
    ///
    /// A constant raster becomes all `new_min`.
    pub fn normalize_min_max(&self, new_min: f64, new_max: f64) -> Result<Dataset> {
        if !(new_min < new_max) {
            return Err(RasterError::invalid_value(format!(
                "new_min ({}) must be less than new_max ({})",
                new_min, new_max
            )));
        }

        let values = self.valid_values()?;
        if values.is_empty() {
            return self.map_valid(|v| v);
        }

        let (lo, hi) = min_max(&values);
        let range = hi - lo;
        if range == 0.0 {
            return self.map_valid(|_| new_min);
        }

        let span = new_max - new_min;
        self.map_valid(|v| new_min + (v - lo) / range * span)
    }

    /// Clip valid pixels to the `lower`/`upper` percentiles, then rescale to `[0, 1]`.
    pub fn normalize_percentile(&self, lower: f64, upper: f64) -> Result<Dataset> {
        validate_percentile(lower)?;
        validate_percentile(upper)?;
        if lower >= upper {
            return Err(RasterError::invalid_value(format!(
                "lower percentile ({}) must be less than upper ({})",
                lower, upper
            )));
        }

        let mut values = self.valid_values()?;
        if values.is_empty() {
            return self.map_valid(|v| v);
        }
        values.sort_by(f64::total_cmp);

        let lo = percentile_of_sorted(&values, lower);
        let hi = percentile_of_sorted(&values, upper);
        let range = hi - lo;
        tracing::debug!(lower, upper, lo, hi, "Percentile normalization bounds");

        if range == 0.0 {
            return self.map_valid(|_| 0.0);
        }
        self.map_valid(|v| (v.clamp(lo, hi) - lo) / range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loaders::{load_array, LoadOptions};
    use ndarray::array;

    #[test]
    fn test_constant_raster() {
        let ds = load_array(&array![[3.0, 3.0], [3.0, 3.0]], LoadOptions::new()).unwrap();
        assert!(ds.standardize().unwrap().read().unwrap().iter().all(|v| *v == 0.0));
        assert!(ds
            .normalize_min_max(-1.0, 1.0)
            .unwrap()
            .read()
            .unwrap()
            .iter()
            .all(|v| *v == -1.0));
    }

    #[test]
    fn test_min_max_rejects_inverted_range() {
        let ds = load_array(&array![[1.0, 2.0]], LoadOptions::new()).unwrap();
        assert!(matches!(
            ds.normalize_min_max(1.0, 1.0),
            Err(RasterError::InvalidValue(_))
        ));
        assert!(ds.normalize_percentile(60.0, 40.0).is_err());
        assert!(ds.normalize_percentile(-5.0, 40.0).is_err());
    }

    #[test]
    fn test_nodata_excluded_from_rescaling() {
        let ds = load_array(
            &array![[0.0, 10.0], [-9999.0, 5.0]],
            LoadOptions::new().nodata(-9999.0),
        )
        .unwrap();
        let out = ds.normalize_min_max(0.0, 1.0).unwrap().get_band(1).unwrap();
        assert_eq!(out, array![[0.0, 1.0], [-9999.0, 0.5]]);
    }

    #[test]
    fn test_percentile_clips_outliers() {
        let ds = load_array(
            &array![[0.0, 1.0, 2.0, 3.0, 100.0]],
            LoadOptions::new(),
        )
        .unwrap();
        let out = ds.normalize_percentile(0.0, 75.0).unwrap().get_band(1).unwrap();
        assert_eq!(out[[0, 0]], 0.0);
        assert_eq!(out[[0, 3]], 1.0);
        assert_eq!(out[[0, 4]], 1.0);
    }
}
