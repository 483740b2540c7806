//! Polygon geometry tagged with its coordinate reference system.
//!
//! A [`Geometry`] is one or more [`Polygon`] parts; each part is one or more
//! closed [`Ring`]s where the first ring is the exterior and the rest are
//! holes. Containment follows the even-odd rule over all rings of a part, and
//! a point is inside the geometry when it is inside any part.

use serde::{Deserialize, Serialize};

use crate::{BoundingBox, Crs, ReliefError, ReliefResult};

/// Mean radius of the WGS84 authalic sphere (meters).
pub const AUTHALIC_RADIUS: f64 = 6_371_007.180_9;

/// A closed ring of coordinate pairs. The last point always repeats the first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ring {
    points: Vec<(f64, f64)>,
}

impl Ring {
    /// Build a ring, closing it if the input is open.
    ///
    /// Requires at least three distinct vertices and finite coordinates.
    pub fn new(mut points: Vec<(f64, f64)>) -> ReliefResult<Self> {
        if points.iter().any(|(x, y)| !x.is_finite() || !y.is_finite()) {
            return Err(ReliefError::InvalidGeometry(
                "ring contains non-finite coordinates".to_string(),
            ));
        }
        if let (Some(first), Some(last)) = (points.first().copied(), points.last().copied()) {
            if first != last {
                points.push(first);
            }
        }
        if points.len() < 4 {
            return Err(ReliefError::InvalidGeometry(format!(
                "ring needs at least 3 vertices, got {}",
                points.len().saturating_sub(1)
            )));
        }
        Ok(Self { points })
    }

    /// Axis-aligned rectangle ring, counter-clockwise.
    pub fn rectangle(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> ReliefResult<Self> {
        Ring::new(vec![
            (min_x, min_y),
            (max_x, min_y),
            (max_x, max_y),
            (min_x, max_y),
        ])
    }

    /// Points including the closing repeat of the first point.
    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    /// Number of distinct vertices (closing point not counted).
    pub fn vertex_count(&self) -> usize {
        self.points.len() - 1
    }

    /// Iterate over the ring's edges as (start, end) pairs.
    pub fn edges(&self) -> impl Iterator<Item = ((f64, f64), (f64, f64))> + '_ {
        self.points.windows(2).map(|w| (w[0], w[1]))
    }

    pub fn bbox(&self) -> BoundingBox {
        // A valid ring always has points
        BoundingBox::from_points(self.points.iter().copied())
            .unwrap_or_else(|| BoundingBox::new(0.0, 0.0, 0.0, 0.0))
    }

    /// Number of edges crossed by a ray cast from (x, y) towards +x.
    ///
    /// Uses the half-open rule on y so that vertices are never counted twice.
    pub fn crossings(&self, x: f64, y: f64) -> usize {
        self.edges()
            .filter(|&(a, b)| edge_crosses_ray(a, b, x, y))
            .count()
    }

    /// Even-odd containment test against this ring alone.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.crossings(x, y) % 2 == 1
    }

    /// Signed shoelace area in coordinate units squared (CCW positive).
    pub fn signed_area(&self) -> f64 {
        self.edges()
            .map(|((x1, y1), (x2, y2))| x1 * y2 - x2 * y1)
            .sum::<f64>()
            / 2.0
    }

    /// Area in square meters of a lon/lat ring on the authalic sphere.
    pub fn geodesic_area(&self) -> f64 {
        let sum: f64 = self
            .edges()
            .map(|((lon1, lat1), (lon2, lat2))| {
                (lon2 - lon1).to_radians()
                    * (2.0 + lat1.to_radians().sin() + lat2.to_radians().sin())
            })
            .sum();
        (sum * AUTHALIC_RADIUS * AUTHALIC_RADIUS / 2.0).abs()
    }

    fn map_points<F>(&self, f: &mut F) -> ReliefResult<Ring>
    where
        F: FnMut(f64, f64) -> ReliefResult<(f64, f64)>,
    {
        let points = self
            .points
            .iter()
            .map(|&(x, y)| f(x, y))
            .collect::<ReliefResult<Vec<_>>>()?;
        Ring::new(points)
    }
}

/// Whether the edge a→b crosses the horizontal ray from (x, y) towards +x.
#[inline]
pub fn edge_crosses_ray(a: (f64, f64), b: (f64, f64), x: f64, y: f64) -> bool {
    let (x1, y1) = a;
    let (x2, y2) = b;
    if (y1 > y) == (y2 > y) {
        return false;
    }
    let x_at_y = x1 + (y - y1) * (x2 - x1) / (y2 - y1);
    x < x_at_y
}

/// A polygon part: exterior ring followed by zero or more holes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    rings: Vec<Ring>,
}

impl Polygon {
    pub fn new(exterior: Ring, holes: Vec<Ring>) -> Self {
        let mut rings = Vec::with_capacity(1 + holes.len());
        rings.push(exterior);
        rings.extend(holes);
        Self { rings }
    }

    /// Build from rings in GeoJSON order (exterior first).
    pub fn from_rings(rings: Vec<Ring>) -> ReliefResult<Self> {
        if rings.is_empty() {
            return Err(ReliefError::InvalidGeometry(
                "polygon has no rings".to_string(),
            ));
        }
        Ok(Self { rings })
    }

    pub fn rings(&self) -> &[Ring] {
        &self.rings
    }

    pub fn exterior(&self) -> &Ring {
        &self.rings[0]
    }

    pub fn holes(&self) -> &[Ring] {
        &self.rings[1..]
    }

    pub fn vertex_count(&self) -> usize {
        self.rings.iter().map(Ring::vertex_count).sum()
    }

    /// Extent of the exterior ring (holes lie inside it).
    pub fn bbox(&self) -> BoundingBox {
        self.exterior().bbox()
    }

    /// Even-odd containment over every ring of the part.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let bbox = self.bbox();
        if !bbox.contains_point(x, y) {
            return false;
        }
        let crossings: usize = self.rings.iter().map(|r| r.crossings(x, y)).sum();
        crossings % 2 == 1
    }

    /// Planar area: exterior minus holes.
    pub fn planar_area(&self) -> f64 {
        let holes: f64 = self.holes().iter().map(|r| r.signed_area().abs()).sum();
        self.exterior().signed_area().abs() - holes
    }

    /// Geodesic area of a lon/lat part: exterior minus holes.
    pub fn geodesic_area(&self) -> f64 {
        let holes: f64 = self.holes().iter().map(Ring::geodesic_area).sum();
        self.exterior().geodesic_area() - holes
    }
}

/// A possibly multi-part polygon geometry tagged with its CRS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    parts: Vec<Polygon>,
    crs: Crs,
}

impl Geometry {
    pub fn new(parts: Vec<Polygon>, crs: Crs) -> ReliefResult<Self> {
        if parts.is_empty() {
            return Err(ReliefError::InvalidGeometry(
                "geometry has no parts".to_string(),
            ));
        }
        Ok(Self { parts, crs })
    }

    /// Single-part geometry from one exterior ring.
    pub fn from_ring(ring: Ring, crs: Crs) -> Self {
        Self {
            parts: vec![Polygon::new(ring, Vec::new())],
            crs,
        }
    }

    pub fn parts(&self) -> &[Polygon] {
        &self.parts
    }

    pub fn crs(&self) -> Crs {
        self.crs
    }

    pub fn is_multi_part(&self) -> bool {
        self.parts.len() > 1
    }

    /// Iterate over every ring of every part.
    pub fn rings(&self) -> impl Iterator<Item = &Ring> + '_ {
        self.parts.iter().flat_map(|p| p.rings().iter())
    }

    pub fn vertex_count(&self) -> usize {
        self.parts.iter().map(Polygon::vertex_count).sum()
    }

    /// Bounding extent in the geometry's own CRS.
    pub fn bbox(&self) -> BoundingBox {
        let mut parts = self.parts.iter().map(Polygon::bbox);
        let first = parts.next().unwrap_or_else(|| BoundingBox::new(0.0, 0.0, 0.0, 0.0));
        parts.fold(first, |acc, b| acc.union(&b))
    }

    /// Fail unless the geometry is in planar coordinates.
    pub fn ensure_planar(&self, operation: &'static str) -> ReliefResult<()> {
        if self.crs.is_geographic() {
            return Err(ReliefError::GeographicInput { operation });
        }
        Ok(())
    }

    /// Containment test; only meaningful in planar coordinates.
    pub fn contains(&self, x: f64, y: f64) -> ReliefResult<bool> {
        self.ensure_planar("point containment")?;
        Ok(self.parts.iter().any(|p| p.contains(x, y)))
    }

    /// Area of every part: square meters for geographic input (geodesic),
    /// square CRS units otherwise.
    pub fn area(&self) -> f64 {
        self.parts.iter().map(|p| self.part_area(p)).sum()
    }

    fn part_area(&self, part: &Polygon) -> f64 {
        if self.crs.is_geographic() {
            part.geodesic_area()
        } else {
            part.planar_area()
        }
    }

    /// Area-weighted centroid over all parts (planar only).
    pub fn centroid(&self) -> ReliefResult<(f64, f64)> {
        self.ensure_planar("centroid")?;
        let mut area_sum = 0.0;
        let mut cx = 0.0;
        let mut cy = 0.0;
        for ring in self.rings() {
            for ((x1, y1), (x2, y2)) in ring.edges() {
                let cross = x1 * y2 - x2 * y1;
                area_sum += cross;
                cx += (x1 + x2) * cross;
                cy += (y1 + y2) * cross;
            }
        }
        // Holes are wound opposite to exteriors in well-formed input; when they
        // are not, fall back to the extent center rather than dividing by ~0.
        if area_sum.abs() < f64::EPSILON {
            return Ok(self.bbox().center());
        }
        Ok((cx / (3.0 * area_sum), cy / (3.0 * area_sum)))
    }

    /// Copy containing only the part with the greatest area.
    pub fn largest_part(&self) -> Geometry {
        let largest = self
            .parts
            .iter()
            .max_by(|a, b| self.part_area(a).total_cmp(&self.part_area(b)))
            .cloned();
        Geometry {
            parts: largest.into_iter().collect(),
            crs: self.crs,
        }
    }

    /// New geometry with every coordinate passed through `f`, tagged `target`.
    pub fn map_points<F>(&self, target: Crs, mut f: F) -> ReliefResult<Geometry>
    where
        F: FnMut(f64, f64) -> ReliefResult<(f64, f64)>,
    {
        let parts = self
            .parts
            .iter()
            .map(|part| {
                let rings = part
                    .rings()
                    .iter()
                    .map(|r| r.map_points(&mut f))
                    .collect::<ReliefResult<Vec<_>>>()?;
                Polygon::from_rings(rings)
            })
            .collect::<ReliefResult<Vec<_>>>()?;
        Geometry::new(parts, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: f64, y0: f64, size: f64) -> Ring {
        Ring::rectangle(x0, y0, x0 + size, y0 + size).unwrap()
    }

    #[test]
    fn test_ring_closes_itself() {
        let ring = Ring::new(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]).unwrap();
        assert_eq!(ring.points().len(), 4);
        assert_eq!(ring.points()[0], ring.points()[3]);
        assert_eq!(ring.vertex_count(), 3);
    }

    #[test]
    fn test_ring_rejects_degenerate() {
        assert!(Ring::new(vec![(0.0, 0.0), (1.0, 0.0)]).is_err());
        assert!(Ring::new(vec![(0.0, 0.0), (f64::NAN, 0.0), (1.0, 1.0)]).is_err());
    }

    #[test]
    fn test_signed_area_orientation() {
        let ccw = square(0.0, 0.0, 2.0);
        assert!((ccw.signed_area() - 4.0).abs() < 1e-12);
        let cw = Ring::new(ccw.points().iter().rev().copied().collect()).unwrap();
        assert!((cw.signed_area() + 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_polygon_hole_excluded() {
        let poly = Polygon::new(square(0.0, 0.0, 10.0), vec![square(4.0, 4.0, 2.0)]);
        assert!(poly.contains(1.0, 1.0));
        assert!(!poly.contains(5.0, 5.0));
        assert!(!poly.contains(11.0, 5.0));
        assert!((poly.planar_area() - 96.0).abs() < 1e-9);
    }

    #[test]
    fn test_geometry_contains_requires_planar() {
        let geo = Geometry::from_ring(square(0.0, 0.0, 1.0), Crs::Geographic);
        assert!(matches!(
            geo.contains(0.5, 0.5),
            Err(ReliefError::GeographicInput { .. })
        ));
        assert!(geo.centroid().is_err());

        let planar = Geometry::from_ring(square(0.0, 0.0, 1.0), Crs::Local);
        assert!(planar.contains(0.5, 0.5).unwrap());
    }

    #[test]
    fn test_multi_part_bbox_and_centroid() {
        let geom = Geometry::new(
            vec![
                Polygon::new(square(0.0, 0.0, 2.0), vec![]),
                Polygon::new(square(10.0, 0.0, 2.0), vec![]),
            ],
            Crs::Local,
        )
        .unwrap();
        assert_eq!(geom.bbox(), BoundingBox::new(0.0, 0.0, 12.0, 2.0));
        let (cx, cy) = geom.centroid().unwrap();
        assert!((cx - 6.0).abs() < 1e-9);
        assert!((cy - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_largest_part() {
        let geom = Geometry::new(
            vec![
                Polygon::new(square(0.0, 0.0, 1.0), vec![]),
                Polygon::new(square(5.0, 5.0, 3.0), vec![]),
            ],
            Crs::Local,
        )
        .unwrap();
        let largest = geom.largest_part();
        assert_eq!(largest.parts().len(), 1);
        assert_eq!(largest.bbox(), BoundingBox::new(5.0, 5.0, 8.0, 8.0));
    }

    #[test]
    fn test_geodesic_area_one_degree_cell() {
        // One degree square at the equator is roughly 12,364 km^2
        let ring = square(0.0, 0.0, 1.0);
        let area_km2 = ring.geodesic_area() / 1e6;
        assert!((area_km2 - 12_364.0).abs() < 60.0, "got {}", area_km2);
    }
}
