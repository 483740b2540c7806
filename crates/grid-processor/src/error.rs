//! Error types for grid processing.

use relief_common::ReliefError;
use thiserror::Error;

/// Errors that can occur while decoding raster sources.
#[derive(Error, Debug)]
pub enum GridProcessorError {
    /// Failed to open the raster file.
    #[error("failed to open raster: {0}")]
    OpenFailed(#[from] std::io::Error),

    /// TIFF decoding error.
    #[error("TIFF decode error: {0}")]
    TiffDecode(#[from] tiff::TiffError),

    /// The file is a TIFF but lacks usable GeoTIFF metadata.
    #[error("invalid GeoTIFF: {0}")]
    InvalidGeoTiff(String),

    /// Sample layout the loader cannot turn into a single elevation band.
    #[error("unsupported raster layout: {0}")]
    UnsupportedLayout(String),
}

impl GridProcessorError {
    /// Create an InvalidGeoTiff error.
    pub fn invalid_geotiff(msg: impl Into<String>) -> Self {
        Self::InvalidGeoTiff(msg.into())
    }
}

impl From<GridProcessorError> for ReliefError {
    fn from(err: GridProcessorError) -> Self {
        ReliefError::DataReadError(err.to_string())
    }
}

/// Result type for grid processor operations.
pub type Result<T> = std::result::Result<T, GridProcessorError>;
