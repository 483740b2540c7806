//! Elevation grids, affine cell transforms and clip masks.

use serde::{Deserialize, Serialize};

use crate::{BoundingBox, Crs, ReliefError, ReliefResult};

/// Sentinel used when a source does not declare one (SRTM convention).
pub const DEFAULT_NODATA: f32 = -32768.0;

/// Six-coefficient affine mapping from (row, col) to (x, y).
///
/// Coefficients follow the GDAL geotransform order:
/// `x = c[0] + col * c[1] + row * c[2]`, `y = c[3] + col * c[4] + row * c[5]`.
/// Integer (row, col) address the top-left corner of a cell; cell centers
/// sit at (row + 0.5, col + 0.5).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffineTransform {
    pub coeffs: [f64; 6],
}

impl AffineTransform {
    pub fn new(coeffs: [f64; 6]) -> Self {
        Self { coeffs }
    }

    /// North-up transform with the top-left corner at (origin_x, origin_y).
    pub fn north_up(origin_x: f64, origin_y: f64, cell_width: f64, cell_height: f64) -> Self {
        Self::new([origin_x, cell_width, 0.0, origin_y, 0.0, -cell_height])
    }

    /// Map fractional (row, col) to (x, y).
    #[inline]
    pub fn apply(&self, row: f64, col: f64) -> (f64, f64) {
        let c = &self.coeffs;
        (
            c[0] + col * c[1] + row * c[2],
            c[3] + col * c[4] + row * c[5],
        )
    }

    /// Coordinates of the center of cell (row, col).
    #[inline]
    pub fn cell_center(&self, row: usize, col: usize) -> (f64, f64) {
        self.apply(row as f64 + 0.5, col as f64 + 0.5)
    }

    pub fn determinant(&self) -> f64 {
        let c = &self.coeffs;
        c[1] * c[5] - c[2] * c[4]
    }

    /// Map (x, y) back to fractional (row, col). `None` for a singular transform.
    pub fn invert(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let det = self.determinant();
        if det.abs() < f64::MIN_POSITIVE {
            return None;
        }
        let c = &self.coeffs;
        let dx = x - c[0];
        let dy = y - c[3];
        let col = (dx * c[5] - dy * c[2]) / det;
        let row = (dy * c[1] - dx * c[4]) / det;
        Some((row, col))
    }

    /// True when rows and columns are parallel to the axes.
    pub fn is_axis_aligned(&self) -> bool {
        self.coeffs[2] == 0.0 && self.coeffs[4] == 0.0
    }

    /// Length of one cell along columns and along rows, in coordinate units.
    pub fn cell_size(&self) -> (f64, f64) {
        let c = &self.coeffs;
        (c[1].hypot(c[4]), c[2].hypot(c[5]))
    }

    /// Extent covered by a `width` x `height` grid.
    pub fn extent(&self, width: usize, height: usize) -> BoundingBox {
        let (w, h) = (width as f64, height as f64);
        let corners = [
            self.apply(0.0, 0.0),
            self.apply(0.0, w),
            self.apply(h, 0.0),
            self.apply(h, w),
        ];
        BoundingBox::from_points(corners).unwrap_or_else(|| BoundingBox::new(0.0, 0.0, 0.0, 0.0))
    }

    /// Transform of a grid that samples every `stride`-th cell of this one,
    /// starting at (row0, col0).
    pub fn subsampled(&self, row0: usize, col0: usize, stride: usize) -> Self {
        let c = &self.coeffs;
        let s = stride as f64;
        let (x0, y0) = self.apply(row0 as f64, col0 as f64);
        Self::new([x0, c[1] * s, c[2] * s, y0, c[4] * s, c[5] * s])
    }
}

/// A single-band elevation raster with its georeferencing.
///
/// Every cell holds either a finite elevation or exactly `nodata`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElevationGrid {
    data: Vec<f32>,
    width: usize,
    height: usize,
    transform: AffineTransform,
    crs: Crs,
    nodata: f32,
}

impl ElevationGrid {
    /// Build a grid, rewriting non-finite samples to the sentinel.
    pub fn new(
        mut data: Vec<f32>,
        width: usize,
        height: usize,
        transform: AffineTransform,
        crs: Crs,
        nodata: f32,
    ) -> ReliefResult<Self> {
        if width == 0 || height == 0 {
            return Err(ReliefError::InvalidGrid(format!(
                "grid dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        if data.len() != width * height {
            return Err(ReliefError::InvalidGrid(format!(
                "expected {} samples for {}x{}, got {}",
                width * height,
                width,
                height,
                data.len()
            )));
        }
        if !nodata.is_finite() {
            return Err(ReliefError::InvalidGrid(
                "no-data sentinel must be finite".to_string(),
            ));
        }
        if transform.invert(0.0, 0.0).is_none() {
            return Err(ReliefError::InvalidGrid(
                "affine transform is singular".to_string(),
            ));
        }
        for v in data.iter_mut() {
            if !v.is_finite() {
                *v = nodata;
            }
        }
        Ok(Self {
            data,
            width,
            height,
            transform,
            crs,
            nodata,
        })
    }

    /// Same georeferencing, new samples.
    pub fn with_data(&self, data: Vec<f32>) -> ReliefResult<Self> {
        Self::new(
            data,
            self.width,
            self.height,
            self.transform,
            self.crs,
            self.nodata,
        )
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn transform(&self) -> &AffineTransform {
        &self.transform
    }

    pub fn crs(&self) -> Crs {
        self.crs
    }

    pub fn nodata(&self) -> f32 {
        self.nodata
    }

    /// Row-major index of (row, col).
    #[inline]
    pub fn index(&self, row: usize, col: usize) -> usize {
        row * self.width + col
    }

    #[inline]
    pub fn is_nodata(&self, value: f32) -> bool {
        value == self.nodata
    }

    /// Raw sample, sentinel included. Panics on out-of-range indices.
    #[inline]
    pub fn raw(&self, row: usize, col: usize) -> f32 {
        self.data[self.index(row, col)]
    }

    /// Valid elevation at (row, col); `None` for no-data or out of range.
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row >= self.height || col >= self.width {
            return None;
        }
        let v = self.raw(row, col);
        (!self.is_nodata(v)).then_some(v)
    }

    /// Center of cell (row, col) in the grid's CRS.
    pub fn cell_center(&self, row: usize, col: usize) -> (f64, f64) {
        self.transform.cell_center(row, col)
    }

    /// Cell containing the point (x, y), if any.
    pub fn cell_at(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        let (row, col) = self.transform.invert(x, y)?;
        if row < 0.0 || col < 0.0 {
            return None;
        }
        let (row, col) = (row.floor() as usize, col.floor() as usize);
        (row < self.height && col < self.width).then_some((row, col))
    }

    /// Valid elevation of the cell nearest to (x, y).
    pub fn sample_nearest(&self, x: f64, y: f64) -> Option<f32> {
        let (row, col) = self.cell_at(x, y)?;
        self.get(row, col)
    }

    pub fn extent(&self) -> BoundingBox {
        self.transform.extent(self.width, self.height)
    }

    pub fn valid_count(&self) -> usize {
        self.data.iter().filter(|&&v| !self.is_nodata(v)).count()
    }

    /// (min, max) of valid samples, `None` when every cell is no-data.
    pub fn value_range(&self) -> Option<(f32, f32)> {
        self.data
            .iter()
            .filter(|&&v| !self.is_nodata(v))
            .fold(None, |acc, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

/// Boolean raster congruent with an [`ElevationGrid`]; `true` = render this cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl Mask {
    /// All-false mask.
    pub fn empty(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![false; width * height],
        }
    }

    pub fn from_cells(width: usize, height: usize, cells: Vec<bool>) -> ReliefResult<Self> {
        if cells.len() != width * height {
            return Err(ReliefError::InvalidGrid(format!(
                "mask expects {} cells, got {}",
                width * height,
                cells.len()
            )));
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    /// `false` for out-of-range indices.
    pub fn get(&self, row: usize, col: usize) -> bool {
        row < self.height && col < self.width && self.cells[row * self.width + col]
    }

    pub fn count_inside(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// True when no cell is inside.
    pub fn is_empty(&self) -> bool {
        !self.cells.iter().any(|&c| c)
    }

    pub fn is_congruent(&self, grid: &ElevationGrid) -> bool {
        self.width == grid.width() && self.height == grid.height()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_grid(data: Vec<f32>, width: usize, height: usize) -> ElevationGrid {
        ElevationGrid::new(
            data,
            width,
            height,
            AffineTransform::north_up(0.0, height as f64, 1.0, 1.0),
            Crs::Local,
            DEFAULT_NODATA,
        )
        .unwrap()
    }

    #[test]
    fn test_affine_roundtrip() {
        let t = AffineTransform::new([100.0, 2.0, 0.5, 50.0, 0.25, -3.0]);
        let (x, y) = t.apply(7.25, 3.5);
        let (row, col) = t.invert(x, y).unwrap();
        assert!((row - 7.25).abs() < 1e-12);
        assert!((col - 3.5).abs() < 1e-12);
    }

    #[test]
    fn test_cell_center_north_up() {
        let t = AffineTransform::north_up(0.0, 4.0, 1.0, 1.0);
        assert_eq!(t.cell_center(0, 0), (0.5, 3.5));
        assert_eq!(t.cell_center(3, 3), (3.5, 0.5));
        assert_eq!(t.extent(4, 4), BoundingBox::new(0.0, 0.0, 4.0, 4.0));
    }

    #[test]
    fn test_singular_transform_rejected() {
        let t = AffineTransform::new([0.0, 1.0, 2.0, 0.0, 2.0, 4.0]);
        let err = ElevationGrid::new(vec![0.0; 4], 2, 2, t, Crs::Local, DEFAULT_NODATA);
        assert!(err.is_err());
    }

    #[test]
    fn test_non_finite_samples_become_sentinel() {
        let grid = unit_grid(vec![1.0, f32::NAN, f32::NEG_INFINITY, 4.0], 2, 2);
        assert_eq!(grid.raw(0, 1), DEFAULT_NODATA);
        assert_eq!(grid.raw(1, 0), DEFAULT_NODATA);
        assert_eq!(grid.get(0, 1), None);
        assert_eq!(grid.get(1, 1), Some(4.0));
        assert_eq!(grid.valid_count(), 2);
        assert_eq!(grid.value_range(), Some((1.0, 4.0)));
    }

    #[test]
    fn test_sample_nearest() {
        let grid = unit_grid((0..16).map(|v| v as f32).collect(), 4, 4);
        // Top-left cell covers x in [0,1), y in (3,4]
        assert_eq!(grid.sample_nearest(0.2, 3.9), Some(0.0));
        assert_eq!(grid.sample_nearest(3.5, 0.5), Some(15.0));
        assert_eq!(grid.sample_nearest(-0.5, 2.0), None);
        assert_eq!(grid.sample_nearest(2.0, 4.5), None);
    }

    #[test]
    fn test_subsampled_transform() {
        let t = AffineTransform::north_up(10.0, 20.0, 2.0, 2.0);
        let sub = t.subsampled(1, 2, 3);
        assert_eq!(sub.apply(0.0, 0.0), t.apply(1.0, 2.0));
        assert_eq!(sub.apply(1.0, 1.0), t.apply(4.0, 5.0));
    }

    #[test]
    fn test_mask_queries() {
        let mut cells = vec![false; 6];
        cells[4] = true;
        let mask = Mask::from_cells(3, 2, cells).unwrap();
        assert!(mask.get(1, 1));
        assert!(!mask.get(0, 1));
        assert!(!mask.get(5, 5));
        assert_eq!(mask.count_inside(), 1);
        assert!(!mask.is_empty());
        assert!(Mask::empty(3, 2).is_empty());
        assert!(Mask::from_cells(3, 2, vec![true; 5]).is_err());
    }
}
