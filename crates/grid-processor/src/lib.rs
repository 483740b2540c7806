//! Elevation grid loading, clipping and decimation.
//!
//! This crate turns raster sources into georeferenced elevation grids and
//! prepares them for rendering:
//!
//! - **Loading**: raw rasters and single-band GeoTIFFs, with no-data normalization
//! - **Cropping**: windows around a region's extent
//! - **Clipping**: boolean masks of cells inside a (multi-part) boundary
//! - **Decimation**: stride plans that bound the vertex count of a surface
//!
//! # Architecture
//!
//! ```text
//! RawRaster / GeoTIFF
//!      │
//!      ▼
//! ElevationGridLoader::load()
//!      │
//!      ▼
//! ElevationGrid (planar, after warping)
//!      │
//!      ├─► RasterClipper::clip(geometry)
//!      │         │
//!      │         ├─► bbox reject
//!      │         │
//!      │         └─► even-odd test (direct, or EdgeIndex for large parts)
//!      │
//!      ▼
//! Mask ──► DecimationPlan::for_ceiling() ──► renderer
//! ```

pub mod clip;
pub mod config;
pub mod crop;
pub mod decimate;
pub mod edge_index;
pub mod error;
pub mod geotiff;
pub mod loader;

// Re-export commonly used types at crate root
pub use clip::RasterClipper;
pub use config::{ClipConfig, LoaderConfig};
pub use crop::crop_to_extent;
pub use decimate::DecimationPlan;
pub use edge_index::EdgeIndex;
pub use error::{GridProcessorError, Result};
pub use geotiff::{decode_geotiff, read_geotiff, GeoTiffRaster};
pub use loader::{ElevationGridLoader, RawRaster};
