//! Test data generators for synthetic terrain and boundaries.
//!
//! These generators create predictable, verifiable elevation patterns and
//! polygon outlines that can be used across the test suite.

use relief_common::{AffineTransform, Crs, ElevationGrid, Geometry, Polygon, Ring, DEFAULT_NODATA};

/// Creates an elevation grid with predictable values.
///
/// Each cell value is calculated as: `col * 1000 + row`
///
/// This makes it easy to verify that samples land in the right cell after
/// decimation or warping.
///
/// # Example
///
/// ```
/// use test_utils::create_indexed_elevation;
///
/// let data = create_indexed_elevation(10, 5);
/// assert_eq!(data.len(), 50);
/// assert_eq!(data[1], 1000.0); // col=1, row=0
/// assert_eq!(data[10], 1.0);   // col=0, row=1
/// ```
pub fn create_indexed_elevation(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f32);
        }
    }
    data
}

/// Creates a west-to-east ramp from `min` (first column) to `max` (last column).
pub fn create_ramp_elevation(width: usize, height: usize, min: f32, max: f32) -> Vec<f32> {
    let span = (width.max(2) - 1) as f32;
    let mut data = Vec::with_capacity(width * height);
    for _row in 0..height {
        for col in 0..width {
            data.push(min + (max - min) * col as f32 / span);
        }
    }
    data
}

/// Creates a single hill rising from `base` at the edges to `peak` at the center.
///
/// With a negative `base` the outer ring of the grid lies below sea level,
/// which exercises both classifier ramps.
pub fn create_dome_elevation(width: usize, height: usize, base: f32, peak: f32) -> Vec<f32> {
    let cx = (width as f32 - 1.0) / 2.0;
    let cy = (height as f32 - 1.0) / 2.0;
    let max_dist = (cx * cx + cy * cy).sqrt().max(1.0);

    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let dx = col as f32 - cx;
            let dy = row as f32 - cy;
            let t = 1.0 - (dx * dx + dy * dy).sqrt() / max_dist;
            data.push(base + (peak - base) * t);
        }
    }
    data
}

/// Creates a grid of zeros with the sentinel at the given (col, row) positions.
pub fn create_elevation_with_holes(width: usize, height: usize, holes: &[(usize, usize)]) -> Vec<f32> {
    let mut data = vec![0.0f32; width * height];
    for &(col, row) in holes {
        if col < width && row < height {
            data[row * width + col] = DEFAULT_NODATA;
        }
    }
    data
}

/// North-up grid whose top-left corner sits at (0, height * cell_size).
///
/// Cell (row, col) then covers x in [col, col+1) and y in
/// (height-row-1, height-row] scaled by `cell_size`.
pub fn planar_grid(data: Vec<f32>, width: usize, height: usize, cell_size: f64) -> ElevationGrid {
    grid_at(data, width, height, 0.0, height as f64 * cell_size, cell_size, Crs::Local)
}

/// North-up grid with an explicit origin and CRS.
pub fn grid_at(
    data: Vec<f32>,
    width: usize,
    height: usize,
    origin_x: f64,
    origin_y: f64,
    cell_size: f64,
    crs: Crs,
) -> ElevationGrid {
    ElevationGrid::new(
        data,
        width,
        height,
        AffineTransform::north_up(origin_x, origin_y, cell_size, cell_size),
        crs,
        DEFAULT_NODATA,
    )
    .expect("generated grid is valid")
}

/// Axis-aligned square ring.
pub fn square_ring(x0: f64, y0: f64, size: f64) -> Ring {
    Ring::rectangle(x0, y0, x0 + size, y0 + size).expect("square ring is valid")
}

/// Single-part square geometry.
pub fn square_geometry(x0: f64, y0: f64, size: f64, crs: Crs) -> Geometry {
    Geometry::from_ring(square_ring(x0, y0, size), crs)
}

/// Geometry with one square part per (x0, y0, size) entry.
pub fn multi_square_geometry(squares: &[(f64, f64, f64)], crs: Crs) -> Geometry {
    let parts = squares
        .iter()
        .map(|&(x0, y0, size)| Polygon::new(square_ring(x0, y0, size), Vec::new()))
        .collect();
    Geometry::new(parts, crs).expect("at least one square")
}

/// Regular polygon approximating a circle with `segments` vertices.
pub fn circle_ring(cx: f64, cy: f64, radius: f64, segments: usize) -> Ring {
    let points = (0..segments.max(3))
        .map(|i| {
            let angle = i as f64 / segments.max(3) as f64 * std::f64::consts::TAU;
            (cx + radius * angle.cos(), cy + radius * angle.sin())
        })
        .collect();
    Ring::new(points).expect("circle ring is valid")
}

/// Star-shaped ring with `points` spikes, concave between spikes.
pub fn star_ring(cx: f64, cy: f64, outer: f64, inner: f64, points: usize) -> Ring {
    let n = points.max(3) * 2;
    let vertices = (0..n)
        .map(|i| {
            let angle = i as f64 / n as f64 * std::f64::consts::TAU;
            let r = if i % 2 == 0 { outer } else { inner };
            (cx + r * angle.cos(), cy + r * angle.sin())
        })
        .collect();
    Ring::new(vertices).expect("star ring is valid")
}
