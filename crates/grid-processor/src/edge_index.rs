//! Edge-bucket index for point-in-polygon tests on large polygons.
//!
//! Edges of every ring are grouped into horizontal bands. A query only walks
//! the band that contains its y coordinate, so the cost per point drops from
//! O(edges) to roughly O(edges / bands).

use relief_common::geometry::edge_crosses_ray;
use relief_common::{BoundingBox, Polygon};

type Edge = ((f64, f64), (f64, f64));

/// Banded edge index over all rings of one polygon part.
#[derive(Debug, Clone)]
pub struct EdgeIndex {
    bbox: BoundingBox,
    band_height: f64,
    bands: Vec<Vec<Edge>>,
}

impl EdgeIndex {
    /// Build an index with about one band per four edges, capped at 4096.
    pub fn new(polygon: &Polygon) -> Self {
        let edge_count: usize = polygon.rings().iter().map(|r| r.vertex_count()).sum();
        Self::with_bands(polygon, (edge_count / 4).clamp(1, 4096))
    }

    pub fn with_bands(polygon: &Polygon, band_count: usize) -> Self {
        let bbox = polygon.bbox();
        let band_count = band_count.max(1);
        let band_height = if bbox.height() > 0.0 {
            bbox.height() / band_count as f64
        } else {
            1.0
        };

        let mut index = Self {
            bbox,
            band_height,
            bands: vec![Vec::new(); band_count],
        };

        for ring in polygon.rings() {
            for (a, b) in ring.edges() {
                // Horizontal edges never cross a horizontal ray
                if a.1 == b.1 {
                    continue;
                }
                let lo = index.band_of(a.1.min(b.1));
                let hi = index.band_of(a.1.max(b.1));
                for band in &mut index.bands[lo..=hi] {
                    band.push((a, b));
                }
            }
        }
        index
    }

    #[inline]
    fn band_of(&self, y: f64) -> usize {
        let band = ((y - self.bbox.min_y) / self.band_height).floor();
        if band <= 0.0 {
            0
        } else {
            (band as usize).min(self.bands.len() - 1)
        }
    }

    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    pub fn band_count(&self) -> usize {
        self.bands.len()
    }

    /// Even-odd containment, identical to `Polygon::contains`.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        if !self.bbox.contains_point(x, y) {
            return false;
        }
        let crossings = self.bands[self.band_of(y)]
            .iter()
            .filter(|&&(a, b)| edge_crosses_ray(a, b, x, y))
            .count();
        crossings % 2 == 1
    }
}
