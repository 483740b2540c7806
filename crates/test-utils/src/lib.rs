//! Test support for the relief rendering workspace.
//!
//! - `generators`: synthetic elevation rasters, planar grids and boundary
//!   shapes (squares, circles, stars)
//! - `fixtures`: the 4x4 end-to-end scenario, a GeoJSON boundary sample,
//!   reference extents and temp files
//! - tolerance assertions for values and projected coordinates
//!
//! ```ignore
//! use test_utils::{assert_coords_approx_eq, e2e_grid, square_geometry};
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::*;
pub use generators::*;

/// Assert two numbers are within `epsilon` of each other.
///
/// Both sides are widened to `f64`, so `f32` grid samples compare against
/// `f64` coordinates directly.
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if !(diff <= epsilon) {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Assert two `(x, y)` pairs agree on both axes within `epsilon`.
///
/// Used for projection round trips, where `epsilon` is in the units of
/// the CRS (degrees or meters).
#[macro_export]
macro_rules! assert_coords_approx_eq {
    (($x1:expr, $y1:expr), ($x2:expr, $y2:expr), $epsilon:expr) => {{
        $crate::assert_approx_eq!($x1, $x2, $epsilon);
        $crate::assert_approx_eq!($y1, $y2, $epsilon);
    }};
}
