//! Image and mesh rendering for clipped elevation data.
//!
//! Implements:
//! - Dual-ramp elevation classification around a pivot
//! - Flat classified maps with the boundary outline
//! - Boundary-only maps
//! - Decimated terrain meshes and a static 3D view

pub mod classify;
pub mod gradient;
pub mod mesh;
pub mod raster2d;
pub mod scene;
pub mod view;

pub use classify::{Classification, ClassifierConfig, ElevationClassifier, RampSide};
pub use gradient::{interpolate_color, Color, ColorRamp};
pub use mesh::{build_mesh, Camera, Render3DConfig, TerrainMesh};
pub use raster2d::{render_2d, render_boundary_map, Raster2D, Render2DConfig};
pub use scene::Scene;
pub use view::render_view;
