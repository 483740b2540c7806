//! Static orthographic view of a terrain mesh.
//!
//! Vertices are rotated into the frame of an orbit camera looking at the
//! mesh center, and triangles are filled back to front (painter's
//! algorithm) with flat, lightly shaded colors.

use image::RgbaImage;
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point;
use nalgebra::{Isometry3, Point3, Vector3};
use relief_common::{ReliefError, ReliefResult};
use tracing::debug;

use crate::gradient::Color;
use crate::mesh::{Camera, TerrainMesh};

/// Margin around the projected mesh, in pixels.
const MARGIN: f64 = 8.0;

/// Unit vector from the target toward the camera.
fn view_direction(camera: &Camera) -> Vector3<f64> {
    let (az, el) = (camera.azimuth_deg.to_radians(), camera.elevation_deg.to_radians());
    Vector3::new(el.cos() * az.cos(), el.cos() * az.sin(), el.sin())
}

/// Render `mesh` as seen from `camera`.
pub fn render_view(mesh: &TerrainMesh, camera: &Camera) -> ReliefResult<RgbaImage> {
    if !(camera.elevation_deg.abs() < 90.0) {
        return Err(ReliefError::InvalidConfig(format!(
            "camera elevation {} must be strictly between -90 and 90",
            camera.elevation_deg
        )));
    }
    if camera.width == 0 || camera.height == 0 {
        return Err(ReliefError::InvalidConfig("camera image size must be positive".to_string()));
    }

    let mut image = RgbaImage::from_pixel(camera.width, camera.height, camera.background.to_rgba());
    let Some((lo, hi)) = mesh.bounds() else {
        debug!("Empty mesh; rendering background only");
        return Ok(image);
    };

    let target = Point3::new(
        (lo[0] + hi[0]) / 2.0,
        (lo[1] + hi[1]) / 2.0,
        (lo[2] + hi[2]) / 2.0,
    );
    let radius = (0..3).map(|a| hi[a] - lo[a]).fold(1.0, f64::max);
    let direction = view_direction(camera);
    let eye = target + direction * radius * 2.0;
    let view = Isometry3::look_at_rh(&eye, &target, &Vector3::z());

    // Camera frame: x right, y up, looking down -z
    let projected: Vec<Point3<f64>> = mesh
        .positions
        .iter()
        .map(|p| view.transform_point(&Point3::new(p[0], p[1], p[2])))
        .collect();

    let (mut min_x, mut max_x, mut min_y, mut max_y) = (f64::MAX, f64::MIN, f64::MAX, f64::MIN);
    for p in &projected {
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
    }
    let usable_w = (camera.width as f64 - 2.0 * MARGIN).max(1.0);
    let usable_h = (camera.height as f64 - 2.0 * MARGIN).max(1.0);
    let span_x = (max_x - min_x).max(f64::EPSILON);
    let span_y = (max_y - min_y).max(f64::EPSILON);
    let scale = (usable_w / span_x).min(usable_h / span_y);
    let offset_x = (camera.width as f64 - span_x * scale) / 2.0;
    let offset_y = (camera.height as f64 - span_y * scale) / 2.0;
    let to_screen = |p: &Point3<f64>| {
        Point::new(
            (offset_x + (p.x - min_x) * scale).round() as i32,
            (camera.height as f64 - offset_y - (p.y - min_y) * scale).round() as i32,
        )
    };

    // Farthest first: more negative camera z is farther away
    let mut order: Vec<(f64, usize)> = mesh
        .triangles
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let depth = t.iter().map(|&v| projected[v as usize].z).sum::<f64>() / 3.0;
            (depth, i)
        })
        .collect();
    order.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut drawn = 0usize;
    for (_, i) in order {
        let [a, b, c] = mesh.triangles[i];
        let corners = [a as usize, b as usize, c as usize];
        let poly = corners.map(|v| to_screen(&projected[v]));
        // Collapsed triangles cover no pixel, and imageproc rejects closed input
        if poly[0] == poly[1] || poly[1] == poly[2] || poly[0] == poly[2] {
            continue;
        }

        let color = shade(mesh, corners, &direction);
        draw_polygon_mut(&mut image, &poly, color.to_rgba());
        drawn += 1;
    }

    debug!(
        triangles = mesh.triangle_count(),
        drawn = drawn,
        azimuth = camera.azimuth_deg,
        elevation = camera.elevation_deg,
        "Rendered 3D view"
    );
    Ok(image)
}

/// Mean vertex color, darkened by the angle between face normal and view.
fn shade(mesh: &TerrainMesh, corners: [usize; 3], direction: &Vector3<f64>) -> Color {
    let [a, b, c] = corners.map(|v| {
        let p = mesh.positions[v];
        Vector3::new(p[0], p[1], p[2])
    });
    let normal = (b - a).cross(&(c - a));
    let lambert = if normal.norm() > 0.0 {
        normal.normalize().dot(direction).abs()
    } else {
        1.0
    };

    let mut sum = [0u32; 4];
    for v in corners {
        for (s, ch) in sum.iter_mut().zip(mesh.colors[v]) {
            *s += ch as u32;
        }
    }
    let mean = Color::new(
        (sum[0] / 3) as u8,
        (sum[1] / 3) as u8,
        (sum[2] / 3) as u8,
        (sum[3] / 3) as u8,
    );
    mean.shaded(0.55 + 0.45 * lambert)
}
