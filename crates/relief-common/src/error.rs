//! Error types for relief rendering.

use thiserror::Error;

/// Result type alias using ReliefError.
pub type ReliefResult<T> = Result<T, ReliefError>;

/// Primary error type for the relief pipeline.
#[derive(Debug, Error)]
pub enum ReliefError {
    // === Lookup Errors ===
    #[error("Region not found: '{name}'")]
    RegionNotFound { name: String },

    // === Coordinate System Errors ===
    #[error("Unsupported CRS: {0}")]
    UnsupportedCrs(String),

    #[error("CRS mismatch: expected {expected}, found {found}")]
    CrsMismatch { expected: String, found: String },

    #[error("{operation} requires planar coordinates but the input is geographic")]
    GeographicInput { operation: &'static str },

    #[error("Projection error: {0}")]
    ProjectionError(String),

    // === Data Errors ===
    #[error("Invalid elevation grid: {0}")]
    InvalidGrid(String),

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Failed to read data: {0}")]
    DataReadError(String),

    // === Configuration Errors ===
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ReliefError {
    /// Stable identifier for this error kind, suitable for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            ReliefError::RegionNotFound { .. } => "RegionNotFound",
            ReliefError::UnsupportedCrs(_) => "UnsupportedCRS",
            ReliefError::CrsMismatch { .. } => "CrsMismatch",
            ReliefError::GeographicInput { .. } => "GeographicInput",
            ReliefError::ProjectionError(_) => "ProjectionError",
            ReliefError::InvalidGrid(_) => "InvalidGrid",
            ReliefError::InvalidGeometry(_) => "InvalidGeometry",
            ReliefError::DataReadError(_) => "DataReadError",
            ReliefError::InvalidConfig(_) => "InvalidConfig",
        }
    }

    /// Create a RegionNotFound error.
    pub fn region_not_found(name: impl Into<String>) -> Self {
        Self::RegionNotFound { name: name.into() }
    }

    /// Create a CrsMismatch error from anything displayable.
    pub fn crs_mismatch(expected: impl std::fmt::Display, found: impl std::fmt::Display) -> Self {
        Self::CrsMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }
}

// Conversion from common error types
impl From<std::io::Error> for ReliefError {
    fn from(err: std::io::Error) -> Self {
        ReliefError::DataReadError(err.to_string())
    }
}

impl From<serde_json::Error> for ReliefError {
    fn from(err: serde_json::Error) -> Self {
        ReliefError::DataReadError(format!("JSON error: {}", err))
    }
}
