//! Temporary locations for test rasters.

use std::path::PathBuf;

use tempfile::TempDir;

/// Scratch directory removed when the handle drops.
pub fn temp_test_dir() -> TempDir {
    temp_test_dir_with_prefix("eeo_test_")
}

pub fn temp_test_dir_with_prefix(prefix: &str) -> TempDir {
    tempfile::Builder::new()
        .prefix(prefix)
        .tempdir()
        .expect("Failed to create scratch directory")
}

/// A scratch directory plus a `<name>.zarr` path inside it that does not exist yet.
///
/// The store lives only as long as the returned `TempDir`.
pub fn temp_zarr_path(name: &str) -> (TempDir, PathBuf) {
    let dir = temp_test_dir();
    let path = dir.path().join(format!("{}.zarr", name));
    (dir, path)
}
