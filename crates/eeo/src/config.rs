//! Configuration for raster storage and resampling.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tempfile::TempDir;

use crate::error::{RasterError, Result};
use crate::types::ResamplingMethod;

/// Configuration shared by the datasets created from one loader call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EeoConfig {
    /// Chunk edge length (rows and cols) for Zarr rasters. Bands are chunked one at a time.
    pub zarr_chunk_size: usize,

    pub zarr_compression: ZarrCompression,

    /// Blosc level, 1 to 9.
    pub zarr_compression_level: u8,

    /// Byte-shuffle chunks before compressing.
    pub zarr_shuffle: bool,

    /// Kernel used when a caller does not pick one.
    pub default_resampling: ResamplingMethod,

    /// Parent directory for promoted rasters. System temp dir when unset.
    pub temp_dir: Option<PathBuf>,
}

impl Default for EeoConfig {
    fn default() -> Self {
        Self {
            zarr_chunk_size: 256,
            zarr_compression: ZarrCompression::default(),
            zarr_compression_level: 1,
            zarr_shuffle: true,
            default_resampling: ResamplingMethod::Bilinear,
            temp_dir: None,
        }
    }
}

/// Parse variable `name` from `lookup`. Unparseable values are logged and skipped.
fn parsed_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<T> {
    let raw = lookup(name)?;
    let parsed = raw.trim().parse().ok();
    if parsed.is_none() {
        tracing::warn!(var = name, value = %raw, "Ignoring unparseable environment value");
    }
    parsed
}

impl EeoConfig {
    /// Defaults overridden by the `EEO_*` environment variables that are set,
    /// then validated.
    ///
    /// | Variable | Field |
    /// |---|---|
    /// | `EEO_ZARR_CHUNK_SIZE` | `zarr_chunk_size` |
    /// | `EEO_ZARR_COMPRESSION` | `zarr_compression` (`none`, `lz4`, `zstd`) |
    /// | `EEO_ZARR_COMPRESSION_LEVEL` | `zarr_compression_level` |
    /// | `EEO_ZARR_SHUFFLE` | `zarr_shuffle` (`true`/`1` enables) |
    /// | `EEO_RESAMPLING` | `default_resampling` |
    /// | `EEO_TEMP_DIR` | `temp_dir` |
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// [`EeoConfig::from_env`] with variables read through `lookup`.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(size) = parsed_var(&lookup, "EEO_ZARR_CHUNK_SIZE") {
            config.zarr_chunk_size = size;
        }
        if let Some(compression) = parsed_var(&lookup, "EEO_ZARR_COMPRESSION") {
            config.zarr_compression = compression;
        }
        if let Some(level) = parsed_var(&lookup, "EEO_ZARR_COMPRESSION_LEVEL") {
            config.zarr_compression_level = level;
        }
        if let Some(flag) = lookup("EEO_ZARR_SHUFFLE") {
            config.zarr_shuffle = matches!(flag.trim().to_ascii_lowercase().as_str(), "true" | "1");
        }
        if let Some(name) = lookup("EEO_RESAMPLING") {
            match ResamplingMethod::from_name(&name) {
                Some(method) => config.default_resampling = method,
                None => tracing::warn!(value = %name, "Ignoring unknown EEO_RESAMPLING"),
            }
        }
        if let Some(dir) = lookup("EEO_TEMP_DIR") {
            if !dir.trim().is_empty() {
                config.temp_dir = Some(PathBuf::from(dir));
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.zarr_chunk_size == 0 {
            return Err(RasterError::ConfigError(
                "zarr_chunk_size must be positive".to_string(),
            ));
        }
        if !(1..=9).contains(&self.zarr_compression_level) {
            return Err(RasterError::ConfigError(format!(
                "zarr_compression_level must be within 1..=9, got {}",
                self.zarr_compression_level
            )));
        }
        match &self.temp_dir {
            Some(dir) if !dir.is_dir() => Err(RasterError::ConfigError(format!(
                "temp_dir {} is not a directory",
                dir.display()
            ))),
            _ => Ok(()),
        }
    }

    /// Create a fresh temporary directory for file-backed storage.
    ///
    /// The directory is removed when the returned handle is dropped.
    pub fn create_temp_dir(&self) -> std::io::Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("eeo-");
        match &self.temp_dir {
            Some(dir) => builder.tempdir_in(dir),
            None => builder.tempdir(),
        }
    }
}

/// Byte codec applied to Zarr chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZarrCompression {
    None,
    BloscLz4,
    #[default]
    BloscZstd,
}

impl ZarrCompression {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::BloscLz4 => "blosc_lz4",
            Self::BloscZstd => "blosc_zstd",
        }
    }
}

impl FromStr for ZarrCompression {
    type Err = RasterError;

    /// Accepts the codec names with or without the `blosc_` prefix, any case.
    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_ascii_lowercase();
        match name.strip_prefix("blosc_").unwrap_or(&name) {
            "none" => Ok(Self::None),
            "lz4" => Ok(Self::BloscLz4),
            "zstd" => Ok(Self::BloscZstd),
            _ => Err(RasterError::ConfigError(format!(
                "unknown zarr compression '{}'",
                s
            ))),
        }
    }
}

impl fmt::Display for ZarrCompression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = EeoConfig::default();
        assert_eq!(config.zarr_chunk_size, 256);
        assert_eq!(config.zarr_compression, ZarrCompression::BloscZstd);
        assert_eq!(config.zarr_compression_level, 1);
        assert!(config.zarr_shuffle);
        assert_eq!(config.default_resampling, ResamplingMethod::Bilinear);
        assert!(config.temp_dir.is_none());
    }

    #[test]
    fn test_config_validation() {
        let mut config = EeoConfig::default();
        assert!(config.validate().is_ok());

        config.zarr_chunk_size = 0;
        assert!(config.validate().is_err());

        config = EeoConfig::default();
        config.zarr_compression_level = 0;
        assert!(config.validate().is_err());

        config.zarr_compression_level = 10;
        assert!(config.validate().is_err());

        config = EeoConfig {
            temp_dir: Some(PathBuf::from("/definitely/not/here")),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(RasterError::ConfigError(_))));
    }

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_from_vars_overrides_defaults() {
        let config = EeoConfig::from_vars(vars(&[
            ("EEO_ZARR_CHUNK_SIZE", "64"),
            ("EEO_ZARR_COMPRESSION", "lz4"),
            ("EEO_ZARR_SHUFFLE", "false"),
            ("EEO_RESAMPLING", "Nearest"),
        ]))
        .unwrap();
        assert_eq!(config.zarr_chunk_size, 64);
        assert_eq!(config.zarr_compression, ZarrCompression::BloscLz4);
        assert!(!config.zarr_shuffle);
        assert_eq!(config.default_resampling, ResamplingMethod::Nearest);

        assert_eq!(EeoConfig::from_vars(|_| None).unwrap(), EeoConfig::default());
    }

    #[test]
    fn test_from_vars_rejects_invalid_values() {
        let err = EeoConfig::from_vars(vars(&[("EEO_ZARR_CHUNK_SIZE", "0")])).unwrap_err();
        assert!(matches!(err, RasterError::ConfigError(_)));

        let err = EeoConfig::from_vars(vars(&[("EEO_ZARR_COMPRESSION_LEVEL", "12")])).unwrap_err();
        assert!(matches!(err, RasterError::ConfigError(_)));

        // Unparseable values fall back to the default.
        let config = EeoConfig::from_vars(vars(&[("EEO_ZARR_CHUNK_SIZE", "lots")])).unwrap();
        assert_eq!(config.zarr_chunk_size, 256);
    }

    #[test]
    fn test_zarr_compression_names() {
        assert_eq!("none".parse::<ZarrCompression>().unwrap(), ZarrCompression::None);
        assert_eq!("lz4".parse::<ZarrCompression>().unwrap(), ZarrCompression::BloscLz4);
        assert_eq!(
            " BLOSC_ZSTD ".parse::<ZarrCompression>().unwrap(),
            ZarrCompression::BloscZstd
        );
        assert!(matches!(
            "gzip".parse::<ZarrCompression>(),
            Err(RasterError::ConfigError(_))
        ));
        assert_eq!(ZarrCompression::BloscLz4.to_string(), "blosc_lz4");
    }

    #[test]
    fn test_temp_dir_in_configured_parent() {
        let parent = tempfile::tempdir().expect("Failed to create temp dir");
        let config = EeoConfig {
            temp_dir: Some(parent.path().to_path_buf()),
            ..Default::default()
        };

        let dir = config.create_temp_dir().expect("Failed to create child dir");
        assert!(dir.path().starts_with(parent.path()));
        let path = dir.path().to_path_buf();
        drop(dir);
        assert!(!path.exists());
    }
}
