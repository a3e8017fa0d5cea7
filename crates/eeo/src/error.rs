//! Error types for raster datasets.

use thiserror::Error;

/// Errors that can occur while loading, transforming or persisting rasters.
#[derive(Error, Debug)]
pub enum RasterError {
    /// The raster path does not exist.
    #[error("raster not found: {0}")]
    NotFound(String),

    /// Input has the wrong type (non-numeric data, wrong JSON type).
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    /// Malformed shape, argument or enum string.
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// The path exists but is not a readable raster.
    #[error("raster '{path}' could not be opened: {reason}")]
    OpenFailed { path: String, reason: String },

    /// Failed to read pixel data from a backend.
    #[error("failed to read raster data: {0}")]
    ReadFailed(String),

    /// Failed to write pixel data or metadata.
    #[error("failed to write raster data: {0}")]
    WriteFailed(String),

    /// Filesystem failure underneath a store.
    #[error("storage error: {0}")]
    StorageError(String),

    /// Moving an in-memory raster to file-backed storage failed.
    #[error("backend promotion failed: {0}")]
    PromotionFailed(String),

    /// Invalid metadata in a raster store.
    #[error("invalid raster metadata: {0}")]
    InvalidMetadata(String),

    #[error("configuration error: {0}")]
    ConfigError(String),
}

/// Coarse error classes callers can branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    NotFound,
    TypeMismatch,
    ValueError,
    Runtime,
}

impl RasterError {
    pub fn invalid_value(msg: impl Into<String>) -> Self {
        Self::InvalidValue(msg.into())
    }

    pub fn type_mismatch(msg: impl Into<String>) -> Self {
        Self::TypeMismatch(msg.into())
    }

    pub fn open_failed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::OpenFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn read_failed(msg: impl Into<String>) -> Self {
        Self::ReadFailed(msg.into())
    }

    pub fn write_failed(msg: impl Into<String>) -> Self {
        Self::WriteFailed(msg.into())
    }

    pub fn invalid_metadata(msg: impl Into<String>) -> Self {
        Self::InvalidMetadata(msg.into())
    }

    /// Map the error onto the not-found / type / value / runtime taxonomy.
    pub fn category(&self) -> ErrorCategory {
        match self {
            RasterError::NotFound(_) => ErrorCategory::NotFound,
            RasterError::TypeMismatch(_) => ErrorCategory::TypeMismatch,
            RasterError::InvalidValue(_) | RasterError::ConfigError(_) => {
                ErrorCategory::ValueError
            }
            RasterError::OpenFailed { .. }
            | RasterError::ReadFailed(_)
            | RasterError::WriteFailed(_)
            | RasterError::StorageError(_)
            | RasterError::PromotionFailed(_)
            | RasterError::InvalidMetadata(_) => ErrorCategory::Runtime,
        }
    }
}

impl From<std::io::Error> for RasterError {
    fn from(err: std::io::Error) -> Self {
        Self::StorageError(err.to_string())
    }
}

impl From<serde_json::Error> for RasterError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidMetadata(err.to_string())
    }
}

impl From<raster_common::TransformError> for RasterError {
    fn from(err: raster_common::TransformError) -> Self {
        Self::InvalidValue(err.to_string())
    }
}

/// Result type for raster operations.
pub type Result<T> = std::result::Result<T, RasterError>;
