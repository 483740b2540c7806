//! Common test fixtures for relief rendering tests.
//!
//! This module provides pre-defined regions, grids and boundary documents
//! that represent common scenarios.

use std::io::Write;

use relief_common::{Crs, ElevationGrid, Geometry};
use tempfile::NamedTempFile;

use crate::generators::{planar_grid, square_geometry};

/// Common geographic extents as (min_lon, min_lat, max_lon, max_lat).
pub mod bbox {
    /// Bangladesh
    pub const BANGLADESH: (f64, f64, f64, f64) = (88.01, 20.59, 92.67, 26.63);

    /// Netherlands (partly below sea level)
    pub const NETHERLANDS: (f64, f64, f64, f64) = (3.36, 50.75, 7.23, 53.55);

    /// Straddles the equator symmetrically
    pub const EQUATORIAL: (f64, f64, f64, f64) = (10.0, -5.0, 20.0, 5.0);

    /// Southern hemisphere (New Zealand, South Island)
    pub const SOUTH_ISLAND: (f64, f64, f64, f64) = (166.4, -46.7, 174.4, -40.5);
}

/// Elevation values of the 4x4 end-to-end scenario, row-major.
pub const E2E_ELEVATION: [f32; 16] = [
    -1.0, -1.0, 2.0, 2.0, //
    -1.0, -1.0, 2.0, 2.0, //
    3.0, 3.0, 5.0, 5.0, //
    3.0, 3.0, 5.0, 5.0,
];

/// The 4x4 grid with unit cells covering [0, 4] x [0, 4] in the local frame.
pub fn e2e_grid() -> ElevationGrid {
    planar_grid(E2E_ELEVATION.to_vec(), 4, 4, 1.0)
}

/// 2x2 square covering the top-left quadrant of [`e2e_grid`].
pub fn e2e_boundary() -> Geometry {
    square_geometry(0.0, 2.0, 2.0, Crs::Local)
}

/// A small GeoJSON document with a square region, an island nation and a
/// point feature that must be skipped.
pub const SAMPLE_GEOJSON: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {
      "type": "Feature",
      "properties": {"NAME": "Squareland", "ADMIN": "Republic of Squareland", "ISO_N3": 999},
      "geometry": {
        "type": "Polygon",
        "coordinates": [[[90.0, 23.0], [91.0, 23.0], [91.0, 24.0], [90.0, 24.0], [90.0, 23.0]]]
      }
    },
    {
      "type": "Feature",
      "properties": {"NAME": "Twin Isles", "NAME_EN": "Twin Islands"},
      "geometry": {
        "type": "MultiPolygon",
        "coordinates": [
          [[[92.0, 21.0], [92.5, 21.0], [92.5, 21.5], [92.0, 21.5], [92.0, 21.0]]],
          [[[93.0, 21.0], [93.2, 21.0], [93.2, 21.2], [93.0, 21.2], [93.0, 21.0]]]
        ]
      }
    },
    {
      "type": "Feature",
      "properties": {"NAME": "Capital City"},
      "geometry": {"type": "Point", "coordinates": [90.4, 23.8]}
    }
  ]
}"#;

/// Write `contents` to a temporary file with the given suffix.
///
/// The file is deleted when the returned handle is dropped.
pub fn write_temp_file(contents: &[u8], suffix: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("create temp file");
    file.write_all(contents).expect("write temp file");
    file.flush().expect("flush temp file");
    file
}
