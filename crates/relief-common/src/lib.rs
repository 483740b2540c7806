//! Common types shared across the relief rendering crates.

pub mod bbox;
pub mod crs;
pub mod error;
pub mod geometry;
pub mod grid;

pub use bbox::BoundingBox;
pub use crs::Crs;
pub use error::{ReliefError, ReliefResult};
pub use geometry::{Geometry, Polygon, Ring};
pub use grid::{AffineTransform, ElevationGrid, Mask, DEFAULT_NODATA};
