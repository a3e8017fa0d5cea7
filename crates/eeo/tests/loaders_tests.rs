//! Integration tests for the dataset loaders.

use eeo::{load_array, load_array_json, load_raster, Crs, ErrorCategory, LoadOptions, RasterError};
use ndarray::{Array1, Array3, Array4, ArrayD, IxDyn};
use serde_json::json;
use test_utils::{algebra_a, create_test_bands, transforms, NODATA};

// =============================================================================
// load_array
// =============================================================================

#[test]
fn test_load_2d_array_reads_back_as_band_one() {
    let array = algebra_a();
    let ds = load_array(&array, LoadOptions::new()).expect("Failed to load array");

    let data = ds.read().expect("Failed to read");
    assert_eq!(data.dim(), (1, 2, 2));
    assert_eq!(data.index_axis(ndarray::Axis(0), 0), array);
}

#[test]
fn test_load_3d_array_bands_are_one_based() {
    let array = create_test_bands(3, 4, 5);
    let ds = load_array(&array, LoadOptions::new()).expect("Failed to load array");

    assert_eq!(ds.get_count(), 3);
    assert_eq!(ds.get_shape(), (5, 4));
    assert_eq!(
        ds.get_band(2).expect("Failed to read band"),
        array.index_axis(ndarray::Axis(0), 1)
    );
}

#[test]
fn test_load_array_metadata() {
    let ds = load_array(
        &algebra_a(),
        LoadOptions::new()
            .transform(transforms::flipped_unit())
            .crs(Crs::from_epsg(4326))
            .nodata(NODATA),
    )
    .expect("Failed to load array");

    let meta = ds.get_metadata();
    assert_eq!(meta.nodata, Some(NODATA));
    assert_eq!(meta.crs, Some(Crs::WGS84));
    assert_eq!(meta.transform, transforms::flipped_unit());
    assert_eq!(meta.dtype, "float64");
}

#[test]
fn test_load_array_accepts_integer_and_dynamic_arrays() {
    let ints = ndarray::array![[1u8, 2], [3, 255]];
    let ds = load_array(&ints, LoadOptions::new()).expect("Failed to load u8 array");
    assert_eq!(ds.get_band(1).unwrap()[[1, 1]], 255.0);
    assert_eq!(ds.dtype(), "uint8");

    let dynamic = ArrayD::<f64>::zeros(IxDyn(&[2, 3, 4]));
    let ds = load_array(&dynamic, LoadOptions::new()).expect("Failed to load dynamic array");
    assert_eq!(ds.get_count(), 2);
    assert_eq!(ds.get_shape(), (3, 4));
}

#[test]
fn test_load_array_round_trips_bands_exactly() {
    let array = Array3::from_shape_fn((3, 4, 5), |(b, r, c)| {
        (b as f64 + 1.0) / 3.0 + r as f64 * 0.1 + c as f64 * 1e-9
    });
    let ds = load_array(&array, LoadOptions::new()).expect("Failed to load array");

    for band in 1..=3 {
        assert_eq!(
            ds.get_band(band).expect("Failed to read band"),
            array.index_axis(ndarray::Axis(0), band - 1)
        );
    }
}

#[test]
fn test_load_array_keeps_large_integers() {
    let ints = ndarray::array![[16_777_217i64, 9_007_199_254_740_992], [-16_777_219, 0]];
    let ds = load_array(&ints, LoadOptions::new()).expect("Failed to load i64 array");

    let band = ds.get_band(1).expect("Failed to read band");
    assert_eq!(band[[0, 0]], 16_777_217.0);
    assert_eq!(band[[0, 1]], 9_007_199_254_740_992.0);
    assert_eq!(band[[1, 0]], -16_777_219.0);
    assert_eq!(ds.dtype(), "int64");
}

#[test]
fn test_load_array_rejects_1d_and_4d() {
    let err = load_array(&Array1::<f32>::zeros(10), LoadOptions::new()).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::ValueError);

    let err = load_array(&Array4::<f32>::zeros((2, 2, 2, 2)), LoadOptions::new()).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::ValueError);
}

#[test]
fn test_load_array_rejects_empty_axis() {
    let err = load_array(&Array3::<f32>::zeros((0, 2, 2)), LoadOptions::new()).unwrap_err();
    assert!(matches!(err, RasterError::InvalidValue(_)));
}

// =============================================================================
// load_array_json
// =============================================================================

#[test]
fn test_load_array_json_three_bands() {
    let value = json!([[[1, 2]], [[3, 4]], [[5, 6]]]);
    let ds = load_array_json(&value, LoadOptions::new()).expect("Failed to load JSON");
    assert_eq!(ds.get_count(), 3);
    assert_eq!(ds.get_shape(), (1, 2));
    assert_eq!(ds.get_band(3).unwrap()[[0, 1]], 6.0);
}

#[test]
fn test_load_array_json_list_of_strings_is_type_error() {
    let err = load_array_json(&json!([["1", "2"], ["3", "4"]]), LoadOptions::new()).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::TypeMismatch);
}

// =============================================================================
// load_raster
// =============================================================================

#[test]
fn test_load_raster_missing_path() {
    let dir = test_utils::temp_test_dir();
    let err = load_raster(dir.path().join("missing.zarr")).unwrap_err();
    assert!(matches!(err, RasterError::NotFound(_)));
    assert_eq!(err.category(), ErrorCategory::NotFound);
}

#[test]
fn test_load_raster_text_file_could_not_be_opened() {
    let dir = test_utils::temp_test_dir();
    let path = dir.path().join("not_a_raster.txt");
    std::fs::write(&path, "this is not a raster").expect("Failed to write file");

    let err = load_raster(&path).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Runtime);
    assert!(err.to_string().contains("could not be opened"), "{}", err);
}

#[test]
fn test_load_raster_empty_directory_could_not_be_opened() {
    let dir = test_utils::temp_test_dir();
    let err = load_raster(dir.path()).unwrap_err();
    assert!(matches!(err, RasterError::OpenFailed { .. }));
}
