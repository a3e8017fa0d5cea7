//! Resampling kernels for a single band.
//!
//! Source pixels are `NaN` where invalid. Point kernels sample at the source
//! position of each output pixel centre; block kernels reduce every source
//! pixel under the output footprint.

use ndarray::{Array2, ArrayView2};

use crate::types::ResamplingMethod;

/// Nearest neighbor. Returns the source pixel the sample position falls in.
pub fn nearest_interpolate(data: &ArrayView2<'_, f64>, x: f64, y: f64) -> f64 {
    let (height, width) = data.dim();
    let col = (x.round().max(0.0) as usize).min(width - 1);
    let row = (y.round().max(0.0) as usize).min(height - 1);
    data[[row, col]]
}

/// Bilinear interpolation between the four surrounding pixels.
///
/// Falls back to nearest neighbor when any of them is invalid.
pub fn bilinear_interpolate(data: &ArrayView2<'_, f64>, x: f64, y: f64) -> f64 {
    let (height, width) = data.dim();
    let x0 = (x.floor().max(0.0) as usize).min(width - 1);
    let y0 = (y.floor().max(0.0) as usize).min(height - 1);
    let x1 = (x0 + 1).min(width - 1);
    let y1 = (y0 + 1).min(height - 1);

    let xf = (x - x0 as f64).clamp(0.0, 1.0);
    let yf = (y - y0 as f64).clamp(0.0, 1.0);

    let v00 = data[[y0, x0]];
    let v10 = data[[y0, x1]];
    let v01 = data[[y1, x0]];
    let v11 = data[[y1, x1]];

    if v00.is_nan() || v10.is_nan() || v01.is_nan() || v11.is_nan() {
        return nearest_interpolate(data, x, y);
    }

    let top = v00 * (1.0 - xf) + v10 * xf;
    let bottom = v01 * (1.0 - xf) + v11 * xf;
    top * (1.0 - yf) + bottom * yf
}

/// Bicubic (Catmull-Rom) interpolation over the 4x4 neighbourhood.
///
/// Falls back to bilinear when any neighbour is invalid.
pub fn cubic_interpolate(data: &ArrayView2<'_, f64>, x: f64, y: f64) -> f64 {
    let (height, width) = data.dim();
    let xi = x.floor() as i64;
    let yi = y.floor() as i64;

    let xf = x - xi as f64;
    let yf = y - yi as f64;

    let mut values = [[0.0f64; 4]; 4];
    for (j, row_values) in values.iter_mut().enumerate() {
        for (i, value) in row_values.iter_mut().enumerate() {
            let px = (xi + i as i64 - 1).clamp(0, width as i64 - 1) as usize;
            let py = (yi + j as i64 - 1).clamp(0, height as i64 - 1) as usize;
            *value = data[[py, px]];

            if value.is_nan() {
                return bilinear_interpolate(data, x, y);
            }
        }
    }

    let mut columns = [0.0f64; 4];
    for (j, row) in values.iter().enumerate() {
        columns[j] = cubic_1d(row[0], row[1], row[2], row[3], xf);
    }

    cubic_1d(columns[0], columns[1], columns[2], columns[3], yf)
}

/// 1D cubic interpolation using Catmull-Rom spline.
fn cubic_1d(p0: f64, p1: f64, p2: f64, p3: f64, t: f64) -> f64 {
    let t2 = t * t;
    let t3 = t2 * t;

    let a = -0.5 * p0 + 1.5 * p1 - 1.5 * p2 + 0.5 * p3;
    let b = p0 - 2.5 * p1 + 2.0 * p2 - 0.5 * p3;
    let c = -0.5 * p0 + 0.5 * p2;
    let d = p1;

    a * t3 + b * t2 + c * t + d
}

/// Reduce the valid pixels of a block. `NaN` when none are valid.
fn reduce_block(block: ArrayView2<'_, f64>, method: ResamplingMethod) -> f64 {
    let mut valid = block.iter().copied().filter(|v| !v.is_nan()).peekable();
    if valid.peek().is_none() {
        return f64::NAN;
    }

    match method {
        ResamplingMethod::Min => valid.fold(f64::INFINITY, f64::min),
        ResamplingMethod::Max => valid.fold(f64::NEG_INFINITY, f64::max),
        _ => {
            let (sum, count) = valid.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
            sum / count as f64
        }
    }
}

/// Source index range `[start, end)` covered by output pixel `i`.
fn footprint(i: usize, src: usize, dst: usize) -> (usize, usize) {
    let ratio = src as f64 / dst as f64;
    let start = ((i as f64 * ratio).floor() as usize).min(src - 1);
    let end = (((i + 1) as f64 * ratio).ceil() as usize).clamp(start + 1, src);
    (start, end)
}

/// Source coordinate of output pixel centre `i` along one axis.
fn source_position(i: usize, src: usize, dst: usize) -> f64 {
    let pos = (i as f64 + 0.5) * src as f64 / dst as f64 - 0.5;
    pos.clamp(0.0, (src - 1) as f64)
}

/// Resample a band to `(dst_rows, dst_cols)`.
///
/// Both the source and the requested shape must be non-empty.
pub fn resample_band(
    data: ArrayView2<'_, f64>,
    dst_rows: usize,
    dst_cols: usize,
    method: ResamplingMethod,
) -> Array2<f64> {
    let (src_rows, src_cols) = data.dim();

    Array2::from_shape_fn((dst_rows, dst_cols), |(dy, dx)| match method {
        ResamplingMethod::Nearest | ResamplingMethod::Bilinear | ResamplingMethod::Cubic => {
            let sx = source_position(dx, src_cols, dst_cols);
            let sy = source_position(dy, src_rows, dst_rows);
            match method {
                ResamplingMethod::Nearest => nearest_interpolate(&data, sx, sy),
                ResamplingMethod::Bilinear => bilinear_interpolate(&data, sx, sy),
                _ => cubic_interpolate(&data, sx, sy),
            }
        }
        ResamplingMethod::Average | ResamplingMethod::Min | ResamplingMethod::Max => {
            let (r0, r1) = footprint(dy, src_rows, dst_rows);
            let (c0, c1) = footprint(dx, src_cols, dst_cols);
            reduce_block(data.slice(ndarray::s![r0..r1, c0..c1]), method)
        }
    })
}
