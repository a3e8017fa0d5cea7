//! Core types shared by datasets, backends and operations.

use raster_common::{Crs, GeoTransform};
use serde::{Deserialize, Serialize};

/// Element type pixels are held in, both in memory and in written stores.
pub const STORAGE_DTYPE: &str = "float64";

/// Name of a numeric element type, `None` for types without a raster name.
pub fn dtype_name_of<A>() -> Option<&'static str> {
    let name = match std::any::type_name::<A>() {
        "f32" => "float32",
        "f64" => "float64",
        "i8" => "int8",
        "i16" => "int16",
        "i32" => "int32",
        "i64" => "int64",
        "u8" => "uint8",
        "u16" => "uint16",
        "u32" => "uint32",
        "u64" => "uint64",
        _ => return None,
    };
    Some(name)
}

/// Georeferencing carried alongside pixel data.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoReference {
    /// Pixel to world mapping.
    pub transform: GeoTransform,
    /// Coordinate reference system, if known.
    pub crs: Option<Crs>,
    /// Nodata sentinel, if any.
    pub nodata: Option<f64>,
}

impl GeoReference {
    pub fn new(transform: GeoTransform, crs: Option<Crs>, nodata: Option<f64>) -> Self {
        Self {
            transform,
            crs,
            nodata,
        }
    }

    /// Same CRS and nodata with a different transform.
    pub fn with_transform(&self, transform: GeoTransform) -> Self {
        Self {
            transform,
            ..self.clone()
        }
    }

    /// True when `value` is neither NaN nor the nodata sentinel.
    #[inline]
    pub fn is_valid(&self, value: f64) -> bool {
        is_valid_pixel(value, self.nodata)
    }

    /// Value written to pixels without data: the sentinel, or NaN.
    #[inline]
    pub fn fill_value(&self) -> f64 {
        self.nodata.unwrap_or(f64::NAN)
    }
}

/// Pixel validity test: not NaN and not the sentinel.
#[inline]
pub fn is_valid_pixel(value: f64, nodata: Option<f64>) -> bool {
    !value.is_nan() && nodata.map_or(true, |nd| value != nd)
}

/// Which backend currently holds a raster's pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Pixels live in an `ndarray` owned by the adapter.
    InMemory,
    /// Pixels live in a Zarr V3 array on disk.
    FileBacked,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InMemory => write!(f, "in_memory"),
            Self::FileBacked => write!(f, "file_backed"),
        }
    }
}

/// Resampling kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResamplingMethod {
    /// Nearest neighbor (preserves exact values).
    Nearest,
    /// Bilinear interpolation (smooth, slight value changes).
    #[default]
    Bilinear,
    /// Bicubic interpolation (smoothest, more compute).
    Cubic,
    /// Mean of the source pixels under each output pixel.
    Average,
    /// Minimum of the source pixels under each output pixel.
    Min,
    /// Maximum of the source pixels under each output pixel.
    Max,
}

impl ResamplingMethod {
    /// All supported methods.
    pub const ALL: [ResamplingMethod; 6] = [
        Self::Nearest,
        Self::Bilinear,
        Self::Cubic,
        Self::Average,
        Self::Min,
        Self::Max,
    ];

    /// Look up a method by name (case-insensitive, surrounding whitespace ignored).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "nearest" => Some(Self::Nearest),
            "bilinear" => Some(Self::Bilinear),
            "cubic" | "bicubic" => Some(Self::Cubic),
            "average" | "mean" => Some(Self::Average),
            "min" => Some(Self::Min),
            "max" => Some(Self::Max),
            _ => None,
        }
    }

    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nearest => "nearest",
            Self::Bilinear => "bilinear",
            Self::Cubic => "cubic",
            Self::Average => "average",
            Self::Min => "min",
            Self::Max => "max",
        }
    }
}

impl std::fmt::Display for ResamplingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How statistic positions are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PositionMode {
    /// World coordinates of the pixel centre.
    #[default]
    World,
    /// `(row, col)` pixel indices.
    Pixel,
}

/// Location of a pixel returned by a statistic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Position {
    World { x: f64, y: f64 },
    Pixel { row: usize, col: usize },
}

impl Position {
    /// `(x, y)` for world positions.
    pub fn as_world(&self) -> Option<(f64, f64)> {
        match *self {
            Position::World { x, y } => Some((x, y)),
            Position::Pixel { .. } => None,
        }
    }

    /// `(row, col)` for pixel positions.
    pub fn as_pixel(&self) -> Option<(usize, usize)> {
        match *self {
            Position::Pixel { row, col } => Some((row, col)),
            Position::World { .. } => None,
        }
    }
}

/// A pixel statistic and where it was found.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PixelStat {
    /// The statistic.
    pub value: f64,
    /// 1-based band of the reported pixel.
    pub band: usize,
    /// Position of the reported pixel.
    pub position: Position,
}

/// Snapshot of a dataset's metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterMetadata {
    /// (rows, cols).
    pub shape: (usize, usize),
    /// Number of bands.
    pub count: usize,
    pub crs: Option<Crs>,
    pub transform: GeoTransform,
    pub nodata: Option<f64>,
    pub dtype: String,
    pub backend: BackendKind,
}
