//! Coordinate Reference System identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coordinate reference system attached to a raster.
///
/// Rasters are never reprojected here, so a CRS is only compared, displayed
/// and persisted. EPSG codes are normalised so that `"epsg:4326"`, `"EPSG:4326"`,
/// `"CRS:84"` and `4326` all compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Crs {
    /// An EPSG registry code.
    Epsg(u32),
    /// Any other definition (WKT, PROJ string, authority:code pair).
    Definition(String),
}

impl Crs {
    /// WGS84 geographic.
    pub const WGS84: Crs = Crs::Epsg(4326);

    /// Build a CRS from an EPSG code.
    pub fn from_epsg(code: u32) -> Self {
        Crs::Epsg(code)
    }

    /// Parse a CRS identifier.
    ///
    /// Accepts formats like:
    /// - "EPSG:4326" / "epsg:4326"
    /// - "4326"
    /// - "CRS:84" (treated as EPSG:4326)
    /// - anything else non-empty is kept verbatim as a definition
    pub fn parse(s: &str) -> Result<Self, CrsParseError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(CrsParseError::Empty);
        }

        let normalized = trimmed.to_uppercase();
        if normalized == "CRS:84" || normalized == "OGC:CRS84" {
            return Ok(Crs::Epsg(4326));
        }

        let code = normalized.strip_prefix("EPSG:").unwrap_or(&normalized);
        if code.chars().all(|c| c.is_ascii_digit()) {
            return code
                .parse()
                .map(Crs::Epsg)
                .map_err(|_| CrsParseError::InvalidCode(trimmed.to_string()));
        }
        if normalized.starts_with("EPSG:") {
            return Err(CrsParseError::InvalidCode(trimmed.to_string()));
        }

        Ok(Crs::Definition(trimmed.to_string()))
    }

    /// The EPSG code, when this CRS is one.
    pub fn epsg(&self) -> Option<u32> {
        match self {
            Crs::Epsg(code) => Some(*code),
            Crs::Definition(_) => None,
        }
    }

    /// Check if this is a well-known geographic (lat/lon) CRS.
    pub fn is_geographic(&self) -> bool {
        matches!(self, Crs::Epsg(4326) | Crs::Epsg(4269) | Crs::Epsg(4258))
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Crs::Epsg(code) => write!(f, "EPSG:{}", code),
            Crs::Definition(def) => write!(f, "{}", def),
        }
    }
}

impl std::str::FromStr for Crs {
    type Err = CrsParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Crs::parse(s)
    }
}

impl From<u32> for Crs {
    fn from(code: u32) -> Self {
        Crs::Epsg(code)
    }
}

impl TryFrom<String> for Crs {
    type Error = CrsParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Crs::parse(&value)
    }
}

impl From<Crs> for String {
    fn from(crs: Crs) -> Self {
        crs.to_string()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CrsParseError {
    #[error("Empty CRS identifier")]
    Empty,

    #[error("Invalid EPSG code: {0}")]
    InvalidCode(String),
}
