//! Decimation of dense grids to a vertex budget.
//!
//! A lattice with stride `s` samples rows and columns `0, s, 2s, ...` and
//! always the last row and column, so decimated surfaces keep the full
//! extent of the source grid.

use relief_common::{ReliefError, ReliefResult};
use serde::{Deserialize, Serialize};

/// Rows and columns kept by a decimation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecimationPlan {
    /// Sampling stride (1 = full resolution)
    pub stride: usize,
    pub rows: Vec<usize>,
    pub cols: Vec<usize>,
}

impl DecimationPlan {
    /// Smallest stride whose lattice over a `width` x `height` grid has at
    /// most `ceiling` vertices.
    pub fn for_ceiling(width: usize, height: usize, ceiling: usize) -> ReliefResult<Self> {
        if width == 0 || height == 0 {
            return Err(ReliefError::InvalidGrid(format!(
                "cannot decimate an empty {}x{} grid",
                width, height
            )));
        }
        let minimum = width.min(2) * height.min(2);
        if ceiling < minimum {
            return Err(ReliefError::InvalidConfig(format!(
                "vertex ceiling {} is below the minimum lattice of {}",
                ceiling, minimum
            )));
        }

        let total = width as f64 * height as f64;
        let mut stride = ((total / ceiling as f64).sqrt().ceil() as usize).max(1);
        while lattice_len(width, stride) * lattice_len(height, stride) > ceiling {
            stride += 1;
        }

        Ok(Self {
            stride,
            rows: lattice(height, stride),
            cols: lattice(width, stride),
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.rows.len() * self.cols.len()
    }

    pub fn is_full_resolution(&self) -> bool {
        self.stride == 1
    }
}

/// Number of lattice positions over `n` cells: `ceil((n - 1) / stride) + 1`.
pub fn lattice_len(n: usize, stride: usize) -> usize {
    if n <= 1 {
        return n;
    }
    (n - 1).div_ceil(stride) + 1
}

/// Lattice positions over `n` cells, always ending at `n - 1`.
pub fn lattice(n: usize, stride: usize) -> Vec<usize> {
    if n == 0 {
        return Vec::new();
    }
    let mut indices: Vec<usize> = (0..n).step_by(stride.max(1)).collect();
    if indices.last() != Some(&(n - 1)) {
        indices.push(n - 1);
    }
    indices
}
