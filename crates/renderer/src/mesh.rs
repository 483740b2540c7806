//! Decimated height-field meshes.

use grid_processor::DecimationPlan;
use relief_common::{Crs, ReliefResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::gradient::Color;
use crate::scene::Scene;

/// Orbit camera of the static 3D view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Degrees counterclockwise from the +x axis
    pub azimuth_deg: f64,
    /// Degrees above the horizontal plane
    pub elevation_deg: f64,
    pub width: u32,
    pub height: u32,
    pub background: Color,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            azimuth_deg: -60.0,
            elevation_deg: 30.0,
            width: 1024,
            height: 768,
            background: Color::WHITE,
        }
    }
}

/// 3D rendering settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Render3DConfig {
    /// Upper bound on mesh vertices.
    pub vertex_ceiling: usize,

    /// Multiplier applied to elevations.
    pub vertical_exaggeration: f64,

    pub camera: Camera,
}

impl Default for Render3DConfig {
    fn default() -> Self {
        Self {
            vertex_ceiling: 10_000,
            vertical_exaggeration: 1.0,
            camera: Camera::default(),
        }
    }
}

impl Render3DConfig {
    /// Load 3D configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("RELIEF_VERTEX_CEILING") {
            if let Ok(ceiling) = val.parse() {
                config.vertex_ceiling = ceiling;
            }
        }

        if let Ok(val) = std::env::var("RELIEF_VERTICAL_EXAGGERATION") {
            if let Ok(factor) = val.parse() {
                config.vertical_exaggeration = factor;
            }
        }

        config
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.vertex_ceiling < 4 {
            return Err("vertex_ceiling must be >= 4".to_string());
        }
        if !(self.vertical_exaggeration.is_finite() && self.vertical_exaggeration > 0.0) {
            return Err("vertical_exaggeration must be a positive number".to_string());
        }
        if !(self.camera.elevation_deg.abs() < 90.0) {
            return Err("camera elevation must be strictly between -90 and 90 degrees".to_string());
        }
        if self.camera.width == 0 || self.camera.height == 0 {
            return Err("camera image size must be positive".to_string());
        }
        Ok(())
    }
}

/// Triangle mesh over the decimated lattice of a scene.
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainMesh {
    /// (planar x, planar y, elevation x exaggeration)
    pub positions: Vec<[f64; 3]>,
    pub colors: Vec<[u8; 4]>,
    pub triangles: Vec<[u32; 3]>,
    /// Decimation stride; 1 = every cell
    pub stride: usize,
    pub crs: Crs,
}

impl TerrainMesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Axis-aligned (min, max) corners of all vertices.
    pub fn bounds(&self) -> Option<([f64; 3], [f64; 3])> {
        let first = *self.positions.first()?;
        Some(self.positions.iter().fold((first, first), |(mut lo, mut hi), p| {
            for axis in 0..3 {
                lo[axis] = lo[axis].min(p[axis]);
                hi[axis] = hi[axis].max(p[axis]);
            }
            (lo, hi)
        }))
    }
}

/// Build the mesh of a scene under the configured vertex ceiling.
///
/// Lattice cells outside the boundary are left out; a lattice quad yields
/// two triangles when all four corners are kept and one when exactly three
/// are.
pub fn build_mesh(scene: &Scene, config: &Render3DConfig) -> ReliefResult<TerrainMesh> {
    let grid = scene.grid();
    let plan = DecimationPlan::for_ceiling(grid.width(), grid.height(), config.vertex_ceiling)?;
    let (rows, cols) = (plan.rows.len(), plan.cols.len());

    let mut positions = Vec::new();
    let mut colors = Vec::new();
    let mut lattice: Vec<Option<u32>> = vec![None; rows * cols];

    for (i, &row) in plan.rows.iter().enumerate() {
        for (j, &col) in plan.cols.iter().enumerate() {
            let (Some(color), Some(z)) = (scene.color(row, col), grid.get(row, col)) else {
                continue;
            };
            let (x, y) = grid.cell_center(row, col);
            lattice[i * cols + j] = Some(positions.len() as u32);
            positions.push([x, y, z as f64 * config.vertical_exaggeration]);
            colors.push(color.to_array());
        }
    }

    let mut triangles = Vec::new();
    for i in 0..rows.saturating_sub(1) {
        for j in 0..cols.saturating_sub(1) {
            let a = lattice[i * cols + j];
            let b = lattice[i * cols + j + 1];
            let c = lattice[(i + 1) * cols + j];
            let d = lattice[(i + 1) * cols + j + 1];
            match (a, b, c, d) {
                (Some(a), Some(b), Some(c), Some(d)) => {
                    triangles.push([a, c, b]);
                    triangles.push([b, c, d]);
                }
                (None, Some(b), Some(c), Some(d)) => triangles.push([b, c, d]),
                (Some(a), None, Some(c), Some(d)) => triangles.push([a, c, d]),
                (Some(a), Some(b), None, Some(d)) => triangles.push([a, d, b]),
                (Some(a), Some(b), Some(c), None) => triangles.push([a, c, b]),
                _ => {}
            }
        }
    }

    debug!(
        stride = plan.stride,
        lattice = plan.vertex_count(),
        vertices = positions.len(),
        triangles = triangles.len(),
        "Built terrain mesh"
    );

    Ok(TerrainMesh {
        positions,
        colors,
        triangles,
        stride: plan.stride,
        crs: scene.crs(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ElevationClassifier;
    use relief_common::{AffineTransform, ElevationGrid, Geometry, Mask, Ring, DEFAULT_NODATA};

    fn scene(width: usize, height: usize, mask: Vec<bool>) -> Scene {
        let grid = ElevationGrid::new(
            (0..width * height).map(|v| v as f32).collect(),
            width,
            height,
            AffineTransform::north_up(0.0, height as f64, 1.0, 1.0),
            Crs::Local,
            DEFAULT_NODATA,
        )
        .unwrap();
        let mask = Mask::from_cells(width, height, mask).unwrap();
        let colors = ElevationClassifier::default().classify(&grid, &mask).unwrap();
        let outline = Geometry::from_ring(
            Ring::rectangle(0.0, 0.0, width as f64, height as f64).unwrap(),
            Crs::Local,
        );
        Scene::new(grid, mask, colors, outline).unwrap()
    }

    #[test]
    fn test_full_quad_two_triangles() {
        let mesh = build_mesh(&scene(2, 2, vec![true; 4]), &Render3DConfig::default()).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.stride, 1);
        assert_eq!(mesh.positions[3], [1.5, 0.5, 3.0]);
    }

    #[test]
    fn test_three_corner_quad_one_triangle() {
        let mesh = build_mesh(&scene(2, 2, vec![true, true, false, true]), &Render3DConfig::default()).unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangles, vec![[0, 2, 1]]);
    }

    #[test]
    fn test_masked_cells_excluded() {
        let mut mask = vec![true; 9];
        mask[4] = false;
        let mesh = build_mesh(&scene(3, 3, mask), &Render3DConfig::default()).unwrap();
        assert_eq!(mesh.vertex_count(), 8);
        // Each of the four quads loses its shared center corner
        assert_eq!(mesh.triangle_count(), 4);
        assert!(mesh.positions.iter().all(|p| p[..2] != [1.5, 1.5]));
    }

    #[test]
    fn test_exaggeration() {
        let config = Render3DConfig {
            vertical_exaggeration: 10.0,
            ..Render3DConfig::default()
        };
        let mesh = build_mesh(&scene(2, 1, vec![true, true]), &config).unwrap();
        assert_eq!(mesh.positions[1][2], 10.0);
    }

    #[test]
    fn test_empty_scene_gives_empty_mesh() {
        let mesh = build_mesh(&scene(3, 3, vec![false; 9]), &Render3DConfig::default()).unwrap();
        assert!(mesh.is_empty());
        assert_eq!(mesh.bounds(), None);
        assert!(mesh.triangles.is_empty());
    }

    #[test]
    fn test_config_validation() {
        assert!(Render3DConfig::default().validate().is_ok());
        let mut config = Render3DConfig::default();
        config.camera.elevation_deg = 90.0;
        assert!(config.validate().is_err());
        config = Render3DConfig {
            vertical_exaggeration: 0.0,
            ..Render3DConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
