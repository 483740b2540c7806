//! Flat classified maps.
//!
//! Pixels are square in planar units. For a north-up grid with square cells
//! one pixel is exactly one cell.

use image::RgbaImage;
use imageproc::drawing::draw_line_segment_mut;
use rayon::prelude::*;
use relief_common::{BoundingBox, Crs, Geometry, ReliefError, ReliefResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::gradient::Color;
use crate::scene::Scene;

/// Style of the 2D outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Render2DConfig {
    /// Color of cells outside the boundary.
    pub background: Color,

    /// Outline stroke; `None` disables the outline.
    pub stroke: Option<Color>,

    /// Fill of the boundary-only map.
    pub map_fill: Color,

    /// Background of the boundary-only map.
    pub map_background: Color,

    /// Largest accepted image side, in pixels.
    pub max_dimension: u32,
}

impl Default for Render2DConfig {
    fn default() -> Self {
        Self {
            background: Color::TRANSPARENT,
            stroke: Some(Color::BLACK),
            map_fill: Color::rgb(0xFF, 0xCC, 0x33),
            map_background: Color::WHITE,
            max_dimension: 16_384,
        }
    }
}

impl Render2DConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_dimension == 0 {
            return Err("max_dimension must be > 0".to_string());
        }
        Ok(())
    }
}

/// A rendered map and its georeferencing.
#[derive(Debug, Clone)]
pub struct Raster2D {
    pub image: RgbaImage,
    /// Planar extent covered by the image
    pub extent: BoundingBox,
    /// Planar units per pixel, identical on both axes
    pub units_per_pixel: f64,
    pub crs: Crs,
}

impl Raster2D {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Fractional pixel coordinates of a planar point.
    pub fn to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        (
            (x - self.extent.min_x) / self.units_per_pixel,
            (self.extent.max_y - y) / self.units_per_pixel,
        )
    }

    /// Planar coordinates of the center of pixel (px, py).
    pub fn pixel_center(&self, px: u32, py: u32) -> (f64, f64) {
        pixel_center(&self.extent, self.units_per_pixel, px as usize, py as usize)
    }

    pub fn pixel(&self, px: u32, py: u32) -> Color {
        let p = self.image.get_pixel(px, py).0;
        Color::new(p[0], p[1], p[2], p[3])
    }
}

#[inline]
fn pixel_center(extent: &BoundingBox, upp: f64, px: usize, py: usize) -> (f64, f64) {
    (
        extent.min_x + (px as f64 + 0.5) * upp,
        extent.max_y - (py as f64 + 0.5) * upp,
    )
}

/// Pixels needed to cover `span`, tolerant to rounding in the division.
fn pixel_count(span: f64, upp: f64) -> usize {
    ((span / upp) - 1e-6).ceil().max(1.0) as usize
}

fn check_dimensions(width: usize, height: usize, config: &Render2DConfig) -> ReliefResult<()> {
    let max = config.max_dimension as usize;
    if width > max || height > max {
        return Err(ReliefError::InvalidConfig(format!(
            "{}x{} image exceeds max_dimension {}",
            width, height, config.max_dimension
        )));
    }
    Ok(())
}

/// Paint every pixel from its center coordinates, rows in parallel.
fn paint<F>(width: usize, height: usize, extent: &BoundingBox, upp: f64, color_at: F) -> ReliefResult<RgbaImage>
where
    F: Fn(f64, f64) -> Color + Sync,
{
    let mut pixels = vec![0u8; width * height * 4];
    pixels
        .par_chunks_mut(width * 4)
        .enumerate()
        .for_each(|(py, row)| {
            for (px, pixel) in row.chunks_exact_mut(4).enumerate() {
                let (x, y) = pixel_center(extent, upp, px, py);
                pixel.copy_from_slice(&color_at(x, y).to_array());
            }
        });
    RgbaImage::from_raw(width as u32, height as u32, pixels)
        .ok_or_else(|| ReliefError::InvalidGrid("pixel buffer does not match image size".to_string()))
}

/// Stroke every ring of `geometry` onto `raster`.
///
/// Segments are clipped to the canvas first; parts of the outline off the
/// image are not drawn.
fn draw_outline(raster: &mut Raster2D, geometry: &Geometry, stroke: Color) {
    let max_x = raster.width() as f64;
    let max_y = raster.height() as f64;
    let to_canvas = |x: f64, y: f64, r: &Raster2D| {
        let (fx, fy) = r.to_pixel(x, y);
        (fx - 0.5, fy - 0.5)
    };

    for ring in geometry.rings() {
        for (a, b) in ring.edges() {
            let start = to_canvas(a.0, a.1, raster);
            let end = to_canvas(b.0, b.1, raster);
            if let Some((start, end)) = clip_segment(start, end, max_x, max_y) {
                draw_line_segment_mut(
                    &mut raster.image,
                    (start.0 as f32, start.1 as f32),
                    (end.0 as f32, end.1 as f32),
                    stroke.to_rgba(),
                );
            }
        }
    }
}

/// Liang-Barsky clip of a canvas segment to [-1, max_x] x [-1, max_y].
fn clip_segment(a: (f64, f64), b: (f64, f64), max_x: f64, max_y: f64) -> Option<((f64, f64), (f64, f64))> {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let (mut t0, mut t1) = (0.0f64, 1.0f64);
    for (p, q) in [(-dx, a.0 + 1.0), (dx, max_x - a.0), (-dy, a.1 + 1.0), (dy, max_y - a.1)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }
    Some(((a.0 + t0 * dx, a.1 + t0 * dy), (a.0 + t1 * dx, a.1 + t1 * dy)))
}

/// Render the classified scene at native grid resolution.
///
/// Cells without a color are painted with the background; the boundary
/// outline is stroked on top.
pub fn render_2d(scene: &Scene, config: &Render2DConfig) -> ReliefResult<Raster2D> {
    let grid = scene.grid();
    let (cell_w, cell_h) = grid.transform().cell_size();
    let upp = cell_w.min(cell_h);
    if !(upp.is_finite() && upp > 0.0) {
        return Err(ReliefError::InvalidGrid(format!("degenerate cell size {}x{}", cell_w, cell_h)));
    }

    let extent = grid.extent();
    let width = pixel_count(extent.width(), upp);
    let height = pixel_count(extent.height(), upp);
    check_dimensions(width, height, config)?;

    let background = config.background;
    let image = paint(width, height, &extent, upp, |x, y| {
        grid.cell_at(x, y)
            .and_then(|(row, col)| scene.color(row, col))
            .unwrap_or(background)
    })?;

    let mut raster = Raster2D {
        image,
        extent,
        units_per_pixel: upp,
        crs: scene.crs(),
    };
    if let Some(stroke) = config.stroke {
        draw_outline(&mut raster, scene.outline(), stroke);
    }

    debug!(
        width = width,
        height = height,
        units_per_pixel = upp,
        empty = scene.is_empty(),
        "Rendered 2D map"
    );
    Ok(raster)
}

/// Render a planar boundary alone, `width` pixels wide.
pub fn render_boundary_map(geometry: &Geometry, width: u32, config: &Render2DConfig) -> ReliefResult<Raster2D> {
    geometry.ensure_planar("boundary map rendering")?;
    if width == 0 {
        return Err(ReliefError::InvalidConfig("map width must be > 0".to_string()));
    }
    let extent = geometry.bbox();
    if !(extent.width() > 0.0 && extent.height() > 0.0) {
        return Err(ReliefError::InvalidGeometry("boundary has an empty extent".to_string()));
    }

    let upp = extent.width() / width as f64;
    let width = width as usize;
    let height = pixel_count(extent.height(), upp);
    check_dimensions(width, height, config)?;

    let (fill, background) = (config.map_fill, config.map_background);
    let image = paint(width, height, &extent, upp, |x, y| {
        if geometry.parts().iter().any(|p| p.contains(x, y)) {
            fill
        } else {
            background
        }
    })?;

    let mut raster = Raster2D {
        image,
        extent,
        units_per_pixel: upp,
        crs: geometry.crs(),
    };
    if let Some(stroke) = config.stroke {
        draw_outline(&mut raster, geometry, stroke);
    }
    Ok(raster)
}
