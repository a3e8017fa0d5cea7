//! Helpers shared by the public operations.

use std::ops::Deref;

use ndarray::{Array, Dimension};
use serde_json::Value;

use crate::dataset::Dataset;
use crate::error::{RasterError, Result};
use crate::preprocessing::ResampleSpec;
use crate::types::ResamplingMethod;

/// A resampling method as supplied by a caller.
#[derive(Debug, Clone, PartialEq)]
pub enum MethodValue<'a> {
    Method(ResamplingMethod),
    Name(&'a str),
    /// Untyped input, e.g. from a JSON config file.
    Json(&'a Value),
}

impl From<ResamplingMethod> for MethodValue<'_> {
    fn from(method: ResamplingMethod) -> Self {
        MethodValue::Method(method)
    }
}

impl<'a> From<&'a str> for MethodValue<'a> {
    fn from(name: &'a str) -> Self {
        MethodValue::Name(name)
    }
}

impl<'a> From<&'a String> for MethodValue<'a> {
    fn from(name: &'a String) -> Self {
        MethodValue::Name(name)
    }
}

impl<'a> From<&'a Value> for MethodValue<'a> {
    fn from(value: &'a Value) -> Self {
        MethodValue::Json(value)
    }
}

/// Resolve a caller-supplied resampling method.
///
/// Names are matched case-insensitively after trimming whitespace. JSON
/// values must be strings.
pub fn normalize_resampling_method<'a>(value: impl Into<MethodValue<'a>>) -> Result<ResamplingMethod> {
    let name = match value.into() {
        MethodValue::Method(method) => return Ok(method),
        MethodValue::Name(name) => name,
        MethodValue::Json(Value::String(name)) => name.as_str(),
        MethodValue::Json(other) => {
            return Err(RasterError::type_mismatch(format!(
                "resampling method must be a string, got {}",
                other
            )))
        }
    };

    ResamplingMethod::from_name(name).ok_or_else(|| {
        let valid: Vec<&str> = ResamplingMethod::ALL.iter().map(|m| m.as_str()).collect();
        RasterError::invalid_value(format!(
            "Invalid resampling method '{}'. Valid options: {}",
            name,
            valid.join(", ")
        ))
    })
}

/// Result of [`align_raster_to_target`].
#[derive(Debug)]
pub enum Aligned<'a> {
    /// The source already matched the target grid.
    Unchanged(&'a Dataset),
    /// The source resampled onto the target grid.
    Resampled(Dataset),
}

impl Aligned<'_> {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Aligned::Unchanged(_))
    }
}

impl Deref for Aligned<'_> {
    type Target = Dataset;

    fn deref(&self) -> &Dataset {
        match self {
            Aligned::Unchanged(dataset) => dataset,
            Aligned::Resampled(dataset) => dataset,
        }
    }
}

/// Put `source` on `target`'s grid with the source's configured default
/// resampling method.
///
/// See [`align_raster_to_target_with_method`].
pub fn align_raster_to_target<'a>(source: &'a Dataset, target: &Dataset) -> Result<Aligned<'a>> {
    align_raster_to_target_with_method(source, target, source.config().default_resampling)
}

/// Put `source` on `target`'s grid.
///
/// Returns the source itself when shape and transform already match.
/// Otherwise the source is resampled to the target's shape with `method`
/// and takes the target's transform.
pub fn align_raster_to_target_with_method<'a>(
    source: &'a Dataset,
    target: &Dataset,
    method: ResamplingMethod,
) -> Result<Aligned<'a>> {
    if source.get_shape() == target.get_shape() && source.get_transform() == target.get_transform() {
        return Ok(Aligned::Unchanged(source));
    }

    let (rows, cols) = target.get_shape();
    tracing::debug!(
        src_shape = ?source.get_shape(),
        dst_shape = ?(rows, cols),
        method = %method,
        "Aligning raster to target grid"
    );

    let spec = ResampleSpec::size(rows, cols).with_method(method);
    let aligned = source.resample_onto(spec, Some(target.get_transform()))?;
    Ok(Aligned::Resampled(aligned))
}

/// Replace entries equal to `dataset`'s nodata sentinel with NaN.
///
/// Returns the array unchanged when no sentinel is recorded.
pub fn mask_nodata<D: Dimension>(dataset: &Dataset, mut array: Array<f64, D>) -> Array<f64, D> {
    if let Some(nodata) = dataset.get_nodata() {
        array.mapv_inplace(|v| if v == nodata { f64::NAN } else { v });
    }
    array
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_accepts_names_and_enums() {
        assert_eq!(
            normalize_resampling_method(ResamplingMethod::Cubic).unwrap(),
            ResamplingMethod::Cubic
        );
        assert_eq!(
            normalize_resampling_method("Nearest").unwrap(),
            ResamplingMethod::Nearest
        );
        assert_eq!(
            normalize_resampling_method(&json!(" BILINEAR ")).unwrap(),
            ResamplingMethod::Bilinear
        );
    }

    #[test]
    fn test_normalize_errors() {
        let err = normalize_resampling_method("invalid").unwrap_err();
        assert!(matches!(err, RasterError::InvalidValue(_)));
        assert!(err.to_string().contains("Invalid resampling method"));

        let err = normalize_resampling_method(&json!(123)).unwrap_err();
        assert!(matches!(err, RasterError::TypeMismatch(_)));
    }
}
