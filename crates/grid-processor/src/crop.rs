//! Cropping grids to a window around an extent.

use relief_common::{BoundingBox, ElevationGrid, ReliefResult};
use tracing::debug;

/// Sub-grid covering `extent` (in the grid's CRS) plus `margin` cells on
/// every side.
///
/// Returns `None` when the extent does not overlap the grid.
pub fn crop_to_extent(
    grid: &ElevationGrid,
    extent: &BoundingBox,
    margin: usize,
) -> ReliefResult<Option<ElevationGrid>> {
    let transform = grid.transform();
    let corners = [
        (extent.min_x, extent.min_y),
        (extent.min_x, extent.max_y),
        (extent.max_x, extent.min_y),
        (extent.max_x, extent.max_y),
    ];

    let (mut min_row, mut max_row) = (f64::MAX, f64::MIN);
    let (mut min_col, mut max_col) = (f64::MAX, f64::MIN);
    for (x, y) in corners {
        let Some((row, col)) = transform.invert(x, y) else {
            return Ok(None);
        };
        min_row = min_row.min(row);
        max_row = max_row.max(row);
        min_col = min_col.min(col);
        max_col = max_col.max(col);
    }

    let clamp = |v: f64, hi: usize| v.clamp(0.0, hi as f64) as usize;
    let margin = margin as f64;
    let row0 = clamp(min_row.floor() - margin, grid.height());
    let row1 = clamp(max_row.ceil() + margin, grid.height());
    let col0 = clamp(min_col.floor() - margin, grid.width());
    let col1 = clamp(max_col.ceil() + margin, grid.width());
    if row0 >= row1 || col0 >= col1 {
        return Ok(None);
    }
    if row0 == 0 && col0 == 0 && row1 == grid.height() && col1 == grid.width() {
        return Ok(Some(grid.clone()));
    }

    let (width, height) = (col1 - col0, row1 - row0);
    let mut data = Vec::with_capacity(width * height);
    for row in row0..row1 {
        let start = grid.index(row, col0);
        data.extend_from_slice(&grid.data()[start..start + width]);
    }

    debug!(
        row0 = row0,
        col0 = col0,
        width = width,
        height = height,
        "Cropped elevation grid"
    );

    ElevationGrid::new(
        data,
        width,
        height,
        transform.subsampled(row0, col0, 1),
        grid.crs(),
        grid.nodata(),
    )
    .map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use relief_common::{AffineTransform, Crs, DEFAULT_NODATA};

    fn grid() -> ElevationGrid {
        ElevationGrid::new(
            (0..100).map(|v| v as f32).collect(),
            10,
            10,
            AffineTransform::north_up(0.0, 10.0, 1.0, 1.0),
            Crs::Local,
            DEFAULT_NODATA,
        )
        .unwrap()
    }

    #[test]
    fn test_crop_window() {
        let cropped = crop_to_extent(&grid(), &BoundingBox::new(2.5, 2.5, 4.5, 5.5), 0)
            .unwrap()
            .unwrap();
        // Rows 4..8, cols 2..5
        assert_eq!((cropped.width(), cropped.height()), (3, 4));
        assert_eq!(cropped.get(0, 0), Some(42.0));
        assert_eq!(cropped.cell_center(0, 0), grid().cell_center(4, 2));
    }

    #[test]
    fn test_crop_margin_clamped() {
        let cropped = crop_to_extent(&grid(), &BoundingBox::new(0.2, 0.2, 0.8, 0.8), 3)
            .unwrap()
            .unwrap();
        assert_eq!((cropped.width(), cropped.height()), (4, 4));
        assert_eq!(cropped.get(3, 0), Some(90.0));
    }

    #[test]
    fn test_crop_outside_is_none() {
        assert!(crop_to_extent(&grid(), &BoundingBox::new(20.0, 20.0, 30.0, 30.0), 1)
            .unwrap()
            .is_none());
        let whole = crop_to_extent(&grid(), &BoundingBox::new(-5.0, -5.0, 50.0, 50.0), 0)
            .unwrap()
            .unwrap();
        assert_eq!(whole, grid());
    }
}
