//! Pixel statistics, point sampling and band indices.

use ndarray::{Array3, Zip};

use crate::dataset::Dataset;
use crate::error::{RasterError, Result};
use crate::ops::algebra::{check_compatible, finite_or_zero};
use crate::types::{is_valid_pixel, PixelStat, Position, PositionMode};

/// Linear interpolation between order statistics of sorted values.
///
/// `p` is in percent. `sorted` must be non-empty.
pub(crate) fn percentile_of_sorted(sorted: &[f64], p: f64) -> f64 {
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
}

pub(crate) fn validate_percentile(p: f64) -> Result<()> {
    if !(0.0..=100.0).contains(&p) {
        return Err(RasterError::invalid_value(format!(
            "percentile must be within [0, 100], got {}",
            p
        )));
    }
    Ok(())
}

/// A valid pixel: `(band, row, col)` and its value.
type Located = ((usize, usize, usize), f64);

impl Dataset {
    fn located_pixels(&self) -> Result<Vec<Located>> {
        let georef = self.georef();
        let pixels: Vec<Located> = self
            .read()?
            .indexed_iter()
            .filter(|(_, v)| georef.is_valid(**v))
            .map(|(idx, v)| (idx, *v))
            .collect();

        if pixels.is_empty() {
            return Err(RasterError::invalid_value("raster has no valid pixels"));
        }
        Ok(pixels)
    }

    fn stat_at(&self, value: f64, (band, row, col): (usize, usize, usize), mode: PositionMode) -> PixelStat {
        let position = match mode {
            PositionMode::World => {
                let (x, y) = self.get_transform().pixel_center(row, col);
                Position::World { x, y }
            }
            PositionMode::Pixel => Position::Pixel { row, col },
        };
        PixelStat {
            value,
            band: band + 1,
            position,
        }
    }

    /// Report `value` at the first pixel whose value is closest to it.
    fn closest_stat(&self, pixels: &[Located], value: f64, mode: PositionMode) -> PixelStat {
        let mut best = pixels[0];
        let mut best_dist = f64::INFINITY;
        for &(idx, v) in pixels {
            let dist = (v - value).abs();
            if dist < best_dist {
                best = (idx, v);
                best_dist = dist;
            }
        }
        self.stat_at(value, best.0, mode)
    }

    /// Largest valid pixel, at its first occurrence.
    pub fn get_maximum_pixel(&self, mode: PositionMode) -> Result<PixelStat> {
        let pixels = self.located_pixels()?;
        let mut best = pixels[0];
        for &pixel in &pixels[1..] {
            if pixel.1 > best.1 {
                best = pixel;
            }
        }
        Ok(self.stat_at(best.1, best.0, mode))
    }

    /// Smallest valid pixel, at its first occurrence.
    pub fn get_minimum_pixel(&self, mode: PositionMode) -> Result<PixelStat> {
        let pixels = self.located_pixels()?;
        let mut best = pixels[0];
        for &pixel in &pixels[1..] {
            if pixel.1 < best.1 {
                best = pixel;
            }
        }
        Ok(self.stat_at(best.1, best.0, mode))
    }

    /// Mean of valid pixels, located at the pixel closest to the mean.
    pub fn get_mean_pixel(&self, mode: PositionMode) -> Result<PixelStat> {
        let pixels = self.located_pixels()?;
        let mean = pixels.iter().map(|(_, v)| *v).sum::<f64>() / pixels.len() as f64;
        Ok(self.closest_stat(&pixels, mean, mode))
    }

    /// `p`-th percentile of valid pixels, located at the closest pixel.
    pub fn get_percentile_pixel(&self, p: f64, mode: PositionMode) -> Result<PixelStat> {
        validate_percentile(p)?;
        let pixels = self.located_pixels()?;
        let mut sorted: Vec<f64> = pixels.iter().map(|(_, v)| *v).collect();
        sorted.sort_by(f64::total_cmp);
        let value = percentile_of_sorted(&sorted, p);
        Ok(self.closest_stat(&pixels, value, mode))
    }

    /// Band 1 value of the pixel containing world point `[x, y]`.
    pub fn extract_value_at_coordinate(&self, coordinate: &[f64]) -> Result<f64> {
        self.extract_value_at_coordinate_band(coordinate, 1)
    }

    /// Value of the pixel containing world point `[x, y]` in a 1-based band.
    pub fn extract_value_at_coordinate_band(&self, coordinate: &[f64], band: usize) -> Result<f64> {
        let &[x, y] = coordinate else {
            return Err(RasterError::invalid_value(format!(
                "coordinate must be (x, y), got {} value(s)",
                coordinate.len()
            )));
        };

        let (col, row) = self.get_transform().world_to_pixel(x, y)?;
        let (col, row) = (col.floor(), row.floor());
        let (rows, cols) = self.get_shape();
        // NaN lies outside every range.
        if !((0.0..cols as f64).contains(&col) && (0.0..rows as f64).contains(&row)) {
            return Err(RasterError::invalid_value(format!(
                "coordinate ({}, {}) is outside the raster",
                x, y
            )));
        }

        let data = self.get_band(band)?;
        Ok(data[[row as usize, col as usize]])
    }

    /// `(self - other) / (self + other)` per pixel, 0 where the sum is 0 or
    /// the quotient is not finite.
    pub fn normalized_difference_array(&self, other: &Dataset) -> Result<Array3<f64>> {
        check_compatible(self, other)?;
        let georef = self.georef();
        let fill = georef.fill_value();
        let other_nodata = other.get_nodata();

        let a = self.read()?;
        let b = other.read()?;
        Ok(Zip::from(&a).and(&b).map_collect(|&a, &b| {
            if !georef.is_valid(a) || !is_valid_pixel(b, other_nodata) {
                fill
            } else if a + b == 0.0 {
                0.0
            } else {
                finite_or_zero((a - b) / (a + b))
            }
        }))
    }

    /// Normalized difference as a dataset with this dataset's georeferencing.
    pub fn normalized_difference(&self, other: &Dataset) -> Result<Dataset> {
        let data = self.normalized_difference_array(other)?;
        Ok(self.derive(data, self.georef().clone()))
    }
}
