//! Configuration for elevation loading and clipping.

use relief_common::Crs;
use serde::{Deserialize, Serialize};

/// Configuration for the elevation grid loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Samples below this value are no-data when the source declares no
    /// sentinel of its own.
    pub nodata_threshold: f32,

    /// CRS assumed for sources without CRS metadata.
    pub assumed_crs: Crs,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            nodata_threshold: -1000.0,
            assumed_crs: Crs::Geographic,
        }
    }
}

impl LoaderConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("RELIEF_NODATA_THRESHOLD") {
            if let Ok(threshold) = val.parse() {
                config.nodata_threshold = threshold;
            }
        }

        if let Ok(val) = std::env::var("RELIEF_ASSUMED_CRS") {
            if let Ok(crs) = Crs::from_code_str(&val) {
                config.assumed_crs = crs;
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !self.nodata_threshold.is_finite() {
            return Err("nodata_threshold must be finite".to_string());
        }
        Ok(())
    }
}

// ============================================================================
// Clip Configuration
// ============================================================================

/// Configuration for the raster clipper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipConfig {
    /// Process rows on the rayon thread pool.
    pub parallel: bool,

    /// Parts with more vertices than this are tested through an edge-bucket index.
    pub index_threshold: usize,
}

impl Default for ClipConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            index_threshold: 256,
        }
    }
}

impl ClipConfig {
    /// Load clip configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("RELIEF_PARALLEL_CLIP") {
            config.parallel = val.to_lowercase() == "true" || val == "1";
        }

        if let Ok(val) = std::env::var("RELIEF_CLIP_INDEX_THRESHOLD") {
            if let Ok(threshold) = val.parse() {
                config.index_threshold = threshold;
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.index_threshold < 3 {
            return Err("index_threshold must be >= 3".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(LoaderConfig::default().validate().is_ok());
        assert!(ClipConfig::default().validate().is_ok());
        assert_eq!(LoaderConfig::default().nodata_threshold, -1000.0);
        assert_eq!(ClipConfig::default().index_threshold, 256);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let loader = LoaderConfig {
            nodata_threshold: f32::NAN,
            ..LoaderConfig::default()
        };
        assert!(loader.validate().is_err());

        let clip = ClipConfig {
            index_threshold: 0,
            ..ClipConfig::default()
        };
        assert!(clip.validate().is_err());
    }
}
