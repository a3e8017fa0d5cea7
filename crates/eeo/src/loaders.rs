//! Constructors for datasets from Zarr stores, arrays and JSON.

use std::path::Path;

use ndarray::{Array3, ArrayBase, ArrayD, Data, Dimension, IxDyn};
use num_traits::ToPrimitive;
use raster_common::{Crs, GeoTransform};
use serde_json::Value;

use crate::backend::{RasterAdapter, RasterBackend, ZarrBackend};
use crate::config::EeoConfig;
use crate::dataset::Dataset;
use crate::error::{RasterError, Result};
use crate::types::{dtype_name_of, GeoReference, STORAGE_DTYPE};

/// Georeferencing and configuration applied to array-built datasets.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub transform: GeoTransform,
    pub crs: Option<Crs>,
    pub nodata: Option<f64>,
    pub config: EeoConfig,
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transform(mut self, transform: GeoTransform) -> Self {
        self.transform = transform;
        self
    }

    pub fn crs(mut self, crs: impl Into<Crs>) -> Self {
        self.crs = Some(crs.into());
        self
    }

    pub fn nodata(mut self, nodata: f64) -> Self {
        self.nodata = Some(nodata);
        self
    }

    pub fn config(mut self, config: EeoConfig) -> Self {
        self.config = config;
        self
    }

    fn georef(&self) -> GeoReference {
        GeoReference::new(self.transform, self.crs.clone(), self.nodata)
    }
}

/// Open a Zarr raster with the default configuration.
pub fn load_raster(path: impl AsRef<Path>) -> Result<Dataset> {
    load_raster_with_config(path, EeoConfig::default())
}

/// Open a Zarr raster.
///
/// Fails with [`RasterError::NotFound`] when the path does not exist and
/// with [`RasterError::OpenFailed`] when it is not a readable raster.
pub fn load_raster_with_config(path: impl AsRef<Path>, config: EeoConfig) -> Result<Dataset> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(RasterError::NotFound(path.display().to_string()));
    }

    let zarr = ZarrBackend::open(path)?;
    tracing::debug!(
        path = %path.display(),
        bands = zarr.count(),
        "Loaded raster"
    );

    Ok(Dataset::from_adapter(RasterAdapter::from_zarr(zarr), config))
}

/// Build an in-memory dataset from a 2-D `[row, col]` or 3-D `[band, row, col]` array.
///
/// Elements are held as `f64`, and the metadata `dtype` records the source
/// element type. Elements with no numeric value fail with
/// [`RasterError::TypeMismatch`].
pub fn load_array<A, S, D>(array: &ArrayBase<S, D>, options: LoadOptions) -> Result<Dataset>
where
    A: ToPrimitive,
    S: Data<Elem = A>,
    D: Dimension,
{
    let dims = match array.shape() {
        &[rows, cols] => (1, rows, cols),
        &[bands, rows, cols] => (bands, rows, cols),
        other => {
            return Err(RasterError::invalid_value(format!(
                "expected a 2-D or 3-D array, got {} dimension(s)",
                other.len()
            )))
        }
    };
    if dims.0 == 0 || dims.1 == 0 || dims.2 == 0 {
        return Err(RasterError::invalid_value(format!(
            "array has an empty axis: {:?}",
            array.shape()
        )));
    }

    let values = array
        .iter()
        .map(|v| {
            v.to_f64()
                .ok_or_else(|| RasterError::type_mismatch("array element has no numeric value"))
        })
        .collect::<Result<Vec<f64>>>()?;
    let dtype = dtype_name_of::<A>().unwrap_or(STORAGE_DTYPE);

    let data = Array3::from_shape_vec(dims, values)
        .map_err(|e| RasterError::invalid_value(e.to_string()))?;

    tracing::debug!(
        bands = dims.0,
        rows = dims.1,
        cols = dims.2,
        dtype,
        nodata = ?options.nodata,
        "Loaded array"
    );

    Ok(Dataset::from_parts(data, options.georef(), dtype, options.config))
}

/// Build an in-memory dataset from a nested JSON array of numbers.
pub fn load_array_json(value: &Value, options: LoadOptions) -> Result<Dataset> {
    if !value.is_array() {
        return Err(RasterError::type_mismatch(format!(
            "expected a nested array of numbers, got {}",
            json_kind(value)
        )));
    }

    let shape = json_shape(value)?;
    let mut values = Vec::with_capacity(shape.iter().product());
    flatten_json(value, &shape, &mut values)?;

    let array = ArrayD::from_shape_vec(IxDyn(&shape), values)
        .map_err(|e| RasterError::invalid_value(e.to_string()))?;
    load_array(&array, options)
}

impl Dataset {
    /// Build an in-memory dataset from an array. See [`load_array`].
    pub fn from_array<A, S, D>(array: &ArrayBase<S, D>, options: LoadOptions) -> Result<Dataset>
    where
        A: ToPrimitive,
        S: Data<Elem = A>,
        D: Dimension,
    {
        load_array(array, options)
    }
}

/// Shape implied by following the first element at every nesting level.
fn json_shape(value: &Value) -> Result<Vec<usize>> {
    match value {
        Value::Array(items) => {
            let first = items
                .first()
                .ok_or_else(|| RasterError::invalid_value("array has an empty axis"))?;
            let mut shape = vec![items.len()];
            shape.extend(json_shape(first)?);
            Ok(shape)
        }
        Value::Number(_) => Ok(Vec::new()),
        other => Err(RasterError::type_mismatch(format!(
            "array element is {}, not a number",
            json_kind(other)
        ))),
    }
}

fn flatten_json(value: &Value, shape: &[usize], out: &mut Vec<f64>) -> Result<()> {
    match (shape.split_first(), value) {
        (None, Value::Number(n)) => {
            let v = n
                .as_f64()
                .ok_or_else(|| RasterError::type_mismatch(format!("{} is not a float", n)))?;
            out.push(v);
            Ok(())
        }
        (Some((&len, rest)), Value::Array(items)) if items.len() == len => {
            items.iter().try_for_each(|item| flatten_json(item, rest, out))
        }
        (_, Value::Array(_)) | (Some(_), Value::Number(_)) => {
            Err(RasterError::invalid_value("nested array is ragged"))
        }
        (_, other) => Err(RasterError::type_mismatch(format!(
            "array element is {}, not a number",
            json_kind(other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array1, Array4};
    use serde_json::json;

    #[test]
    fn test_load_2d_array_is_single_band() {
        let ds = load_array(&array![[1i32, 2], [3, 4]], LoadOptions::new()).unwrap();
        assert_eq!(ds.get_count(), 1);
        assert_eq!(ds.get_shape(), (2, 2));
        assert_eq!(ds.get_band(1).unwrap(), array![[1.0, 2.0], [3.0, 4.0]]);
        assert_eq!(ds.dtype(), "int32");
    }

    #[test]
    fn test_load_array_keeps_full_precision() {
        let ints = load_array(&array![[16_777_217i32, 2]], LoadOptions::new()).unwrap();
        assert_eq!(ints.get_band(1).unwrap(), array![[16_777_217.0, 2.0]]);

        let floats = load_array(&array![[0.1f64, 1.0 / 3.0]], LoadOptions::new()).unwrap();
        assert_eq!(floats.get_band(1).unwrap(), array![[0.1, 1.0 / 3.0]]);
        assert_eq!(floats.dtype(), "float64");
    }

    #[test]
    fn test_load_array_rejects_bad_dimensions() {
        let one_d = Array1::<f32>::zeros(10);
        let four_d = Array4::<f32>::zeros((2, 2, 2, 2));
        assert!(matches!(
            load_array(&one_d, LoadOptions::new()),
            Err(RasterError::InvalidValue(_))
        ));
        assert!(matches!(
            load_array(&four_d, LoadOptions::new()),
            Err(RasterError::InvalidValue(_))
        ));
        assert!(matches!(
            load_array(&Array3::<f32>::zeros((1, 0, 3)), LoadOptions::new()),
            Err(RasterError::InvalidValue(_))
        ));
    }

    /// Element type with no numeric representation.
    #[derive(Clone)]
    struct Opaque;

    impl ToPrimitive for Opaque {
        fn to_i64(&self) -> Option<i64> {
            None
        }

        fn to_u64(&self) -> Option<u64> {
            None
        }
    }

    #[test]
    fn test_load_array_rejects_non_numeric_elements() {
        let opaque = ndarray::Array2::from_elem((2, 2), Opaque);
        assert!(matches!(
            load_array(&opaque, LoadOptions::new()),
            Err(RasterError::TypeMismatch(_))
        ));
    }

    #[test]
    fn test_load_array_json() {
        let ds = load_array_json(&json!([[1, 2.5], [3, 4]]), LoadOptions::new().nodata(4.0)).unwrap();
        assert_eq!(ds.get_band(1).unwrap(), array![[1.0, 2.5], [3.0, 4.0]]);
        assert_eq!(ds.get_nodata(), Some(4.0));
    }

    #[test]
    fn test_load_array_json_errors() {
        let type_err = |v: Value| matches!(load_array_json(&v, LoadOptions::new()), Err(RasterError::TypeMismatch(_)));
        let value_err = |v: Value| matches!(load_array_json(&v, LoadOptions::new()), Err(RasterError::InvalidValue(_)));

        assert!(type_err(json!("raster")));
        assert!(type_err(json!([["a", "b"]])));
        assert!(type_err(json!([[1, null]])));
        assert!(value_err(json!([[1, 2], [3]])));
        assert!(value_err(json!([1, 2, 3])));
        assert!(value_err(json!([])));
    }
}
