//! Sampling of elevation grids at fractional cell positions.
//!
//! Positions are (row, col) in the grid's index space where integer values
//! address cell corners, as returned by `AffineTransform::invert`.

use relief_common::ElevationGrid;
use serde::{Deserialize, Serialize};

/// Resampling method used when warping a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resampling {
    #[default]
    Nearest,
    Bilinear,
}

/// Value of the cell containing the position.
pub fn nearest_interpolate(grid: &ElevationGrid, row: f64, col: f64) -> Option<f32> {
    if row < 0.0 || col < 0.0 {
        return None;
    }
    grid.get(row.floor() as usize, col.floor() as usize)
}

/// Bilinear blend of the four cell centers around the position.
///
/// Falls back to nearest when any of the four neighbours is missing or
/// no-data, so the sentinel never leaks into a blend.
pub fn bilinear_interpolate(grid: &ElevationGrid, row: f64, col: f64) -> Option<f32> {
    // Cell centers sit at half-integer positions
    let y = row - 0.5;
    let x = col - 0.5;
    if x < 0.0 || y < 0.0 {
        return nearest_interpolate(grid, row, col);
    }
    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;

    let corners = (
        grid.get(y0, x0),
        grid.get(y0, x0 + 1),
        grid.get(y0 + 1, x0),
        grid.get(y0 + 1, x0 + 1),
    );
    let (Some(v00), Some(v10), Some(v01), Some(v11)) = corners else {
        return nearest_interpolate(grid, row, col);
    };

    let xf = (x - x0 as f64) as f32;
    let yf = (y - y0 as f64) as f32;

    let top = v00 * (1.0 - xf) + v10 * xf;
    let bottom = v01 * (1.0 - xf) + v11 * xf;
    Some(top * (1.0 - yf) + bottom * yf)
}

pub fn interpolate(grid: &ElevationGrid, row: f64, col: f64, method: Resampling) -> Option<f32> {
    match method {
        Resampling::Nearest => nearest_interpolate(grid, row, col),
        Resampling::Bilinear => bilinear_interpolate(grid, row, col),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relief_common::{AffineTransform, Crs, DEFAULT_NODATA};

    fn grid(data: Vec<f32>) -> ElevationGrid {
        ElevationGrid::new(
            data,
            2,
            2,
            AffineTransform::north_up(0.0, 2.0, 1.0, 1.0),
            Crs::Local,
            DEFAULT_NODATA,
        )
        .unwrap()
    }

    #[test]
    fn test_nearest() {
        let g = grid(vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(nearest_interpolate(&g, 0.2, 1.9), Some(2.0));
        assert_eq!(nearest_interpolate(&g, 1.5, 0.5), Some(3.0));
        assert_eq!(nearest_interpolate(&g, -0.1, 0.5), None);
        assert_eq!(nearest_interpolate(&g, 2.0, 0.5), None);
    }

    #[test]
    fn test_bilinear_center_blend() {
        let g = grid(vec![0.0, 10.0, 20.0, 30.0]);
        let v = bilinear_interpolate(&g, 1.0, 1.0).unwrap();
        assert!((v - 15.0).abs() < 1e-6);
        // Exactly on a cell center returns that cell
        assert_eq!(bilinear_interpolate(&g, 0.5, 0.5), Some(0.0));
    }

    #[test]
    fn test_bilinear_ignores_sentinel() {
        let g = grid(vec![0.0, DEFAULT_NODATA, 20.0, 30.0]);
        // Falls back to nearest: cell (0, 0)
        assert_eq!(bilinear_interpolate(&g, 0.9, 0.9), Some(0.0));
        // Nearest cell is the sentinel itself
        assert_eq!(bilinear_interpolate(&g, 0.9, 1.1), None);
    }
}
