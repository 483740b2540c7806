//! Masking an elevation grid against a boundary geometry.
//!
//! A cell is inside when its center, mapped through the grid's affine
//! transform, is inside any part of the geometry under the even-odd rule.
//! No-data cells are never inside.

use rayon::prelude::*;
use relief_common::{BoundingBox, ElevationGrid, Geometry, Mask, Polygon, ReliefError, ReliefResult};
use tracing::{debug, warn};

use crate::config::ClipConfig;
use crate::edge_index::EdgeIndex;

/// Containment strategy for one polygon part.
enum PartTest<'a> {
    Direct { polygon: &'a Polygon, bbox: BoundingBox },
    Indexed(EdgeIndex),
}

impl PartTest<'_> {
    #[inline]
    fn contains(&self, x: f64, y: f64) -> bool {
        match self {
            PartTest::Direct { polygon, bbox } => {
                if !bbox.contains_point(x, y) {
                    return false;
                }
                let crossings: usize = polygon.rings().iter().map(|r| r.crossings(x, y)).sum();
                crossings % 2 == 1
            }
            PartTest::Indexed(index) => index.contains(x, y),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RasterClipper {
    config: ClipConfig,
}

impl RasterClipper {
    pub fn new(config: ClipConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClipConfig {
        &self.config
    }

    /// Compute the mask of cells inside `geometry`.
    ///
    /// Both inputs must share the same planar CRS. A geometry that misses the
    /// grid entirely yields an all-false mask, not an error.
    pub fn clip(&self, grid: &ElevationGrid, geometry: &Geometry) -> ReliefResult<Mask> {
        geometry.ensure_planar("raster clipping")?;
        if grid.crs().is_geographic() {
            return Err(ReliefError::GeographicInput {
                operation: "raster clipping",
            });
        }
        if grid.crs() != geometry.crs() {
            return Err(ReliefError::crs_mismatch(geometry.crs(), grid.crs()));
        }

        let width = grid.width();
        let mut cells = vec![false; grid.len()];

        let extent = geometry.bbox();
        if !extent.intersects(&grid.extent()) {
            warn!(
                geometry_extent = ?extent,
                grid_extent = ?grid.extent(),
                "Boundary does not intersect the elevation grid"
            );
            return Mask::from_cells(width, grid.height(), cells);
        }

        let parts: Vec<PartTest<'_>> = geometry
            .parts()
            .iter()
            .map(|polygon| {
                if polygon.vertex_count() > self.config.index_threshold {
                    PartTest::Indexed(EdgeIndex::new(polygon))
                } else {
                    PartTest::Direct {
                        polygon,
                        bbox: polygon.bbox(),
                    }
                }
            })
            .collect();

        let classify_row = |row: usize, out: &mut [bool]| {
            for (col, cell) in out.iter_mut().enumerate() {
                if grid.is_nodata(grid.raw(row, col)) {
                    continue;
                }
                let (x, y) = grid.cell_center(row, col);
                *cell = extent.contains_point(x, y) && parts.iter().any(|p| p.contains(x, y));
            }
        };

        if self.config.parallel {
            cells
                .par_chunks_mut(width)
                .enumerate()
                .for_each(|(row, out)| classify_row(row, out));
        } else {
            cells
                .chunks_mut(width)
                .enumerate()
                .for_each(|(row, out)| classify_row(row, out));
        }

        let mask = Mask::from_cells(width, grid.height(), cells)?;
        let inside = mask.count_inside();
        debug!(
            width = width,
            height = grid.height(),
            parts = geometry.parts().len(),
            indexed_parts = parts.iter().filter(|p| matches!(p, PartTest::Indexed(_))).count(),
            inside = inside,
            "Clipped elevation grid"
        );
        if inside == 0 {
            warn!("Boundary covers no valid elevation cells");
        }
        Ok(mask)
    }
}
