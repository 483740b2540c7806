//! Coordinate reference system transformations.
//!
//! Implements the map projections used to bring boundary geometries and
//! elevation grids into one planar frame, without external projection
//! libraries.

pub mod equal_area;
pub mod interpolation;
pub mod lambert;
pub mod mercator;
pub mod transform;
pub mod transverse_mercator;
pub mod warp;

pub use equal_area::LambertAzimuthalEqualArea;
pub use interpolation::Resampling;
pub use lambert::LambertConformal;
pub use mercator::WebMercator;
pub use transform::{reproject_geometry, PlanarTarget, Projector, Reprojector};
pub use transverse_mercator::TransverseMercator;
pub use warp::{warp_grid, WarpOptions};
