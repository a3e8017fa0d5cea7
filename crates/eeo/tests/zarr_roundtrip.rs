//! Save/load round trips through Zarr V3 stores.

use std::sync::Arc;

use eeo::{load_raster, BackendKind, Crs, EeoConfig, LoadOptions, ZarrCompression};
use test_utils::{create_test_bands, temp_zarr_path, transforms, NODATA};
use zarrs::array::{ArrayBuilder, DataType, FillValue};
use zarrs::array_subset::ArraySubset;
use zarrs_filesystem::FilesystemStore;

#[test]
fn test_save_and_load_roundtrip() {
    let (_dir, path) = temp_zarr_path("roundtrip");
    let data = create_test_bands(2, 30, 20);

    let ds = eeo::load_array(
        &data,
        LoadOptions::new()
            .transform(transforms::global_quarter_degree())
            .crs(Crs::WGS84)
            .nodata(NODATA),
    )
    .expect("Failed to load array");
    let result = ds.save(&path).expect("Failed to save");
    assert_eq!(result.shape, (2, 20, 30));

    let loaded = load_raster(&path).expect("Failed to load raster");
    assert_eq!(loaded.backend_kind(), BackendKind::FileBacked);
    assert_eq!(loaded.get_count(), 2);
    assert_eq!(loaded.get_shape(), (20, 30));
    assert_eq!(loaded.get_crs(), Some(&Crs::WGS84));
    assert_eq!(loaded.get_nodata(), Some(NODATA));
    assert_eq!(loaded.get_transform(), transforms::global_quarter_degree());
    assert_eq!(loaded.read().expect("Failed to read"), data);
}

#[test]
fn test_roundtrip_without_compression_and_small_chunks() -> anyhow::Result<()> {
    let (_dir, path) = temp_zarr_path("uncompressed");
    let data = create_test_bands(1, 17, 9);
    let config = EeoConfig {
        zarr_compression: ZarrCompression::None,
        zarr_chunk_size: 4,
        ..Default::default()
    };

    let ds = eeo::load_array(&data, LoadOptions::new().config(config))?;
    ds.save(&path)?;

    let loaded = load_raster(&path)?;
    assert_eq!(loaded.get_band(1)?, data.index_axis(ndarray::Axis(0), 0));
    assert_eq!(loaded.get_crs(), None);
    assert_eq!(loaded.get_nodata(), None);
    Ok(())
}

#[test]
fn test_roundtrip_keeps_precision_and_dtype() -> anyhow::Result<()> {
    let (_dir, path) = temp_zarr_path("precision");
    let fractions = ndarray::array![[0.1, 1.0 / 3.0], [std::f64::consts::PI, -1e-300]];
    eeo::load_array(&fractions, LoadOptions::new())?.save(&path)?;

    let loaded = load_raster(&path)?;
    assert_eq!(loaded.dtype(), "float64");
    assert_eq!(loaded.get_band(1)?, fractions);

    let (_dir, path) = temp_zarr_path("large_ints");
    let ints = ndarray::array![[16_777_217i32, -16_777_217], [i32::MAX, i32::MIN]];
    eeo::load_array(&ints, LoadOptions::new())?.save(&path)?;

    let loaded = load_raster(&path)?;
    assert_eq!(loaded.dtype(), "int32");
    assert_eq!(loaded.get_band(1)?, ints.mapv(f64::from));
    Ok(())
}

#[test]
fn test_load_2d_integer_store() {
    let (_dir, path) = temp_zarr_path("int16");
    std::fs::create_dir_all(&path).unwrap();
    let store = Arc::new(FilesystemStore::new(&path).expect("Failed to create store"));

    let mut attributes = serde_json::Map::new();
    attributes.insert("crs".to_string(), serde_json::json!(3857));
    attributes.insert("nodata".to_string(), serde_json::json!(-1));
    attributes.insert(
        "transform".to_string(),
        serde_json::json!([10.0, 0.0, 100.0, 0.0, -10.0, 200.0]),
    );

    let chunk_grid: zarrs::array::ChunkGrid = vec![2u64, 3].try_into().expect("chunk grid");
    let array = ArrayBuilder::new(vec![2, 3], DataType::Int16, chunk_grid, FillValue::from(0i16))
        .attributes(attributes)
        .build(store, "/")
        .expect("Failed to build array");
    array.store_metadata().expect("Failed to store metadata");
    let subset = ArraySubset::new_with_shape(vec![2, 3]);
    array
        .store_array_subset_elements::<i16>(&subset, &[1, 2, 3, 4, -1, 6])
        .expect("Failed to store elements");

    let ds = load_raster(&path).expect("Failed to load raster");
    assert_eq!(ds.get_count(), 1);
    assert_eq!(ds.get_shape(), (2, 3));
    assert_eq!(ds.dtype(), "int16");
    assert_eq!(ds.get_crs(), Some(&Crs::Epsg(3857)));
    assert_eq!(ds.get_nodata(), Some(-1.0));
    assert_eq!(
        ds.get_band(1).unwrap(),
        ndarray::array![[1.0, 2.0, 3.0], [4.0, -1.0, 6.0]]
    );
    assert_eq!(ds.extract_value_at_coordinate(&[125.0, 195.0]).unwrap(), 3.0);

    // nodata is excluded from statistics of file-backed rasters too.
    let min = ds.get_minimum_pixel(eeo::PositionMode::Pixel).unwrap();
    assert_eq!(min.value, 1.0);
}
