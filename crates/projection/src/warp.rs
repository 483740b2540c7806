//! Warping elevation grids onto a regular grid in another CRS.
//!
//! The output grid keeps the source cell count: its extent is the transformed
//! source extent and its cells are square. Each output cell center is
//! transformed back into the source CRS and sampled there.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use relief_common::{AffineTransform, Crs, ElevationGrid, ReliefError, ReliefResult};

use crate::interpolation::{interpolate, Resampling};
use crate::Reprojector;

/// Options controlling a grid warp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WarpOptions {
    pub resampling: Resampling,
    /// Points sampled along each source edge when computing the target extent.
    pub edge_samples: usize,
}

impl Default for WarpOptions {
    fn default() -> Self {
        Self {
            resampling: Resampling::Nearest,
            edge_samples: 64,
        }
    }
}

/// Warp `grid` into `target`. Identity when the grid is already there.
pub fn warp_grid(grid: &ElevationGrid, target: Crs, options: &WarpOptions) -> ReliefResult<ElevationGrid> {
    let forward = Reprojector::new(grid.crs(), target)?;
    if forward.is_identity() {
        return Ok(grid.clone());
    }

    let extent = forward.transform_bounds(&grid.extent(), options.edge_samples)?;
    let cells = (grid.width() * grid.height()) as f64;
    let cell_size = (extent.width() * extent.height() / cells).sqrt();
    if !(cell_size > 0.0) || !cell_size.is_finite() {
        return Err(ReliefError::ProjectionError(format!(
            "grid collapses to zero area in {}",
            target
        )));
    }

    let out_width = ((extent.width() / cell_size).round() as usize).max(1);
    let out_height = ((extent.height() / cell_size).round() as usize).max(1);
    let transform = AffineTransform::north_up(extent.min_x, extent.max_y, cell_size, cell_size);

    debug!(
        source = %grid.crs(),
        target = %target,
        src_width = grid.width(),
        src_height = grid.height(),
        out_width = out_width,
        out_height = out_height,
        cell_size = cell_size,
        "Warping elevation grid"
    );

    let backward = forward.inverse();
    let src_transform = *grid.transform();
    let nodata = grid.nodata();
    let mut output = vec![nodata; out_width * out_height];

    output
        .par_chunks_mut(out_width)
        .enumerate()
        .for_each(|(row, out_row)| {
            for (col, out) in out_row.iter_mut().enumerate() {
                let (x, y) = transform.cell_center(row, col);
                let sample = backward
                    .transform(x, y)
                    .ok()
                    .and_then(|(sx, sy)| src_transform.invert(sx, sy))
                    .and_then(|(r, c)| interpolate(grid, r, c, options.resampling));
                if let Some(v) = sample {
                    *out = v;
                }
            }
        });

    ElevationGrid::new(output, out_width, out_height, transform, target, nodata)
}
