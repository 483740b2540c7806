//! Turning raster sources into [`ElevationGrid`]s.

use std::path::Path;

use relief_common::{AffineTransform, Crs, ElevationGrid, ReliefResult, DEFAULT_NODATA};
use tracing::{debug, warn};

use crate::config::LoaderConfig;
use crate::geotiff::read_geotiff;

/// Raster samples as delivered by an external source, before sentinel
/// normalization.
#[derive(Debug, Clone)]
pub struct RawRaster {
    pub data: Vec<f32>,
    pub width: usize,
    pub height: usize,
    pub transform: AffineTransform,
    /// `None` when the source carries no CRS metadata
    pub crs: Option<Crs>,
    /// `None` when the source declares no sentinel
    pub nodata: Option<f32>,
}

#[derive(Debug, Clone, Default)]
pub struct ElevationGridLoader {
    config: LoaderConfig,
}

impl ElevationGridLoader {
    pub fn new(config: LoaderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Normalize a raw raster into a grid.
    ///
    /// A declared finite sentinel is kept as is. A NaN sentinel is replaced by
    /// [`DEFAULT_NODATA`]. Without a declared sentinel, samples below the
    /// configured threshold become [`DEFAULT_NODATA`].
    pub fn load(&self, raw: RawRaster) -> ReliefResult<ElevationGrid> {
        let RawRaster {
            mut data,
            width,
            height,
            transform,
            crs,
            nodata,
        } = raw;

        let crs = crs.unwrap_or_else(|| {
            debug!(assumed = %self.config.assumed_crs, "Raster has no CRS, assuming default");
            self.config.assumed_crs
        });

        let sentinel = match nodata {
            Some(v) if v.is_finite() => v,
            Some(v) => {
                warn!(declared = %v, replacement = DEFAULT_NODATA, "Non-finite no-data sentinel replaced");
                DEFAULT_NODATA
            }
            None => {
                let threshold = self.config.nodata_threshold;
                let mut rewritten = 0usize;
                for v in data.iter_mut() {
                    if *v < threshold {
                        *v = DEFAULT_NODATA;
                        rewritten += 1;
                    }
                }
                if rewritten > 0 {
                    warn!(
                        cells = rewritten,
                        threshold = threshold,
                        "No sentinel declared; samples below threshold treated as no-data"
                    );
                }
                DEFAULT_NODATA
            }
        };

        let grid = ElevationGrid::new(data, width, height, transform, crs, sentinel)?;
        debug!(
            width = grid.width(),
            height = grid.height(),
            crs = %grid.crs(),
            nodata = grid.nodata(),
            valid = grid.valid_count(),
            "Loaded elevation grid"
        );
        Ok(grid)
    }

    /// Load a single-band GeoTIFF.
    pub fn load_geotiff(&self, path: impl AsRef<Path>) -> ReliefResult<ElevationGrid> {
        let raster = read_geotiff(path)?;
        let crs = raster.epsg.map(Crs::from_epsg).transpose()?;
        self.load(RawRaster {
            data: raster.data,
            width: raster.width,
            height: raster.height,
            transform: raster.transform,
            crs,
            nodata: raster.nodata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(data: Vec<f32>, nodata: Option<f32>) -> RawRaster {
        RawRaster {
            width: data.len(),
            height: 1,
            data,
            transform: AffineTransform::north_up(0.0, 1.0, 1.0, 1.0),
            crs: None,
            nodata,
        }
    }

    #[test]
    fn test_declared_sentinel_kept() {
        let loader = ElevationGridLoader::default();
        let grid = loader.load(raw(vec![-9999.0, 12.0, -5000.0], Some(-9999.0))).unwrap();
        assert_eq!(grid.nodata(), -9999.0);
        assert_eq!(grid.get(0, 0), None);
        // Below the threshold but a sentinel is declared: still valid
        assert_eq!(grid.get(0, 2), Some(-5000.0));
    }

    #[test]
    fn test_threshold_without_sentinel() {
        let loader = ElevationGridLoader::default();
        let grid = loader.load(raw(vec![-1500.0, -999.0, 8848.0], None)).unwrap();
        assert_eq!(grid.nodata(), DEFAULT_NODATA);
        assert_eq!(grid.raw(0, 0), DEFAULT_NODATA);
        assert_eq!(grid.get(0, 1), Some(-999.0));
        assert_eq!(grid.get(0, 2), Some(8848.0));
    }

    #[test]
    fn test_nan_sentinel_replaced() {
        let loader = ElevationGridLoader::default();
        let grid = loader.load(raw(vec![f32::NAN, 3.0], Some(f32::NAN))).unwrap();
        assert_eq!(grid.nodata(), DEFAULT_NODATA);
        assert_eq!(grid.raw(0, 0), DEFAULT_NODATA);
        assert_eq!(grid.get(0, 1), Some(3.0));
    }

    #[test]
    fn test_assumed_crs() {
        let loader = ElevationGridLoader::new(LoaderConfig {
            assumed_crs: Crs::Local,
            ..LoaderConfig::default()
        });
        let grid = loader.load(raw(vec![1.0], None)).unwrap();
        assert_eq!(grid.crs(), Crs::Local);

        let mut with_crs = raw(vec![1.0], None);
        with_crs.crs = Some(Crs::WebMercator);
        assert_eq!(loader.load(with_crs).unwrap().crs(), Crs::WebMercator);
    }

    #[test]
    fn test_size_mismatch_is_invalid_grid() {
        let mut bad = raw(vec![1.0, 2.0], None);
        bad.height = 2;
        let err = ElevationGridLoader::default().load(bad).unwrap_err();
        assert_eq!(err.kind(), "InvalidGrid");
    }
}
