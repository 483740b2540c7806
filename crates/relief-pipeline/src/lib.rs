//! End-to-end region relief rendering.
//!
//! ```text
//! name ──► BoundaryResolver ──► geometry (native CRS)
//!                                   │ PlanarTarget
//!                                   ▼
//! grid ──► crop ──► warp ──► planar grid + planar outline
//!                                   │
//!                                   ▼
//!          RasterClipper ──► ElevationClassifier ──► Scene
//!                                                     │
//!                                  ┌──────────────────┴──────┐
//!                                  ▼                         ▼
//!                             render_2d                 build_mesh
//! ```

pub mod config;
pub mod pipeline;

pub use config::PipelineConfig;
pub use pipeline::{Pipeline, RenderOutput};
